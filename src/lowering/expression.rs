//! Host expressions used as builder arguments.

use tracing::trace;

use super::compose::line_break;
use super::Translator;
use crate::syntax::{SyntaxKind, SyntaxNode};
use crate::MbxError;

/// Longest wrapper chain looked through before giving up and treating the
/// node as a compound expression.
const MAX_UNWRAP: usize = 16;

impl Translator<'_> {
    /// Lowers an expression subtree to the text of a builder argument.
    ///
    /// Plain names come out as their text, a bare element becomes its builder
    /// call, anything else is emitted verbatim unless it contains markup, in
    /// which case it is composed.
    pub(crate) fn lower_expression(
        &self,
        node: SyntaxNode<'_>,
        depth: usize,
    ) -> Result<String, MbxError> {
        self.enter(node, depth)?;
        let core = unwrap_transparent(node);
        let mut out = match core.kind() {
            SyntaxKind::Identifier | SyntaxKind::QualifiedName => core.text().to_string(),
            SyntaxKind::Element => self.lower_element(core, depth + 1)?,
            _ if self.index.contains(node) => self.compose(node, depth + 1)?,
            _ => node.text().to_string(),
        };
        if node.ends_with_comment() {
            trace!(span = ?node.span(), "expression ends in a line comment");
            let source = self.tree.source();
            out.push_str(line_break(source, ""));
            out.push_str(line_indent(source, node.span().start));
        }
        Ok(out)
    }
}

/// Follows single-operand wrappers (`Expression`, `Unary`, `Postfix`,
/// `ParenExpr`) down to the node that carries the meaning.
pub(crate) fn unwrap_transparent(node: SyntaxNode<'_>) -> SyntaxNode<'_> {
    let mut current = node;
    for _ in 0..MAX_UNWRAP {
        let transparent = matches!(
            current.kind(),
            SyntaxKind::Expression | SyntaxKind::Unary | SyntaxKind::Postfix | SyntaxKind::ParenExpr
        );
        match single_operand(current) {
            Some(inner) if transparent => current = inner,
            _ => break,
        }
    }
    current
}

fn single_operand(node: SyntaxNode<'_>) -> Option<SyntaxNode<'_>> {
    let mut operands = node.children().filter(|child| {
        child.kind() != SyntaxKind::Comment && !child.is_token("(") && !child.is_token(")")
    });
    let first = operands.next()?;
    operands.next().is_none().then_some(first)
}

/// Leading whitespace of the line containing `offset`.
pub(crate) fn line_indent(source: &str, offset: usize) -> &str {
    let offset = offset.min(source.len());
    let line_start = source
        .get(..offset)
        .and_then(|before| before.rfind('\n'))
        .map_or(0, |i| i + 1);
    let line = source.get(line_start..).unwrap_or("");
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}
