//! Selective lowering of inline markup into builder calls.
//!
//! A [`Translator`] walks a parsed document and decides, per node, whether to
//! copy its text through unchanged or to rewrite it. Ordinary host code is
//! reproduced byte for byte; every `Element` becomes a call to the configured
//! element builder, recursively, including elements nested inside
//! interpolated expressions.
//!
//! The work is split by concern:
//!
//! - [`detector`]: which nodes contain markup at all;
//! - [`expression`]: host expressions used as builder arguments;
//! - [`element`]: one element to one builder call;
//! - [`compose`]: verbatim text with lowered markup spliced in;
//! - [`assemble`]: the whole document.

use tracing::debug;

use crate::config::TranslateConfig;
use crate::diagnostics::{SourceArc, SourceContext};
use crate::syntax::{SourceParser, SyntaxNode, SyntaxTree};
use crate::{err_src, MbxError};

pub mod assemble;
pub mod compose;
pub mod detector;
pub mod element;
pub mod expression;

pub use detector::MarkupIndex;

/// Parses and translates one document.
pub fn translate(source: &SourceContext, config: &TranslateConfig) -> Result<String, MbxError> {
    let tree = SourceParser::new().parse(source)?;
    let translator = Translator::new(&tree, source.to_named_source(), config);
    let output = translator.assemble()?;
    debug!(
        name = %source.name,
        elements = translator.index().element_count(),
        "translated document"
    );
    Ok(output)
}

/// Per-document lowering state. Borrowed tree, immutable side-table; nothing
/// survives the translation call.
pub struct Translator<'t> {
    tree: &'t SyntaxTree,
    index: MarkupIndex,
    config: &'t TranslateConfig,
    source: SourceArc,
}

impl<'t> Translator<'t> {
    pub fn new(tree: &'t SyntaxTree, source: SourceArc, config: &'t TranslateConfig) -> Self {
        Self {
            tree,
            index: MarkupIndex::build(tree),
            config,
            source,
        }
    }

    pub fn index(&self) -> &MarkupIndex {
        &self.index
    }

    /// Guards every recursive lowering step.
    fn enter(&self, node: SyntaxNode<'_>, depth: usize) -> Result<(), MbxError> {
        if depth <= self.config.max_depth {
            return Ok(());
        }
        Err(err_src!(
            NestingLimit,
            format!("markup nested deeper than {} levels", self.config.max_depth),
            &self.source,
            node.span()
        )
        .with_help("raise `max_depth` in mbx.yaml or split the element into helper functions"))
    }
}
