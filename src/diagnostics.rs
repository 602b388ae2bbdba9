//! Unified, `miette`-based diagnostics for the translator.
//!
//! Every failure in the pipeline (parsing, markup structure, limits, file
//! I/O, configuration) is an [`MbxError`]. Errors are built with the
//! [`err_msg!`] and [`err_src!`] macros:
//!
//! - `err_msg!(Internal, "unexpected rule {:?}", rule)` for message-only errors.
//! - `err_src!(UnmatchedElement, "element <div> is never closed", &source, span)`
//!   when a source and span are at hand; an optional fifth argument carries
//!   related labels.
//!
//! Help text is attached afterwards with [`MbxError::with_help`].

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::Span;

pub type SourceArc = Arc<NamedSource<String>>;

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// A named document handed to the parser and carried into diagnostics.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Source without a backing file (tests, stdin-like use).
    pub fn inline(content: impl Into<String>) -> Self {
        Self::from_file("<inline>", content)
    }

    pub fn to_named_source(&self) -> SourceArc {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Coarse classification of an [`MbxError`], for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Parse,
    UnmatchedElement,
    MalformedElement,
    NestingLimit,
    UnsupportedSyntax,
    Io,
    Config,
    Internal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Parse => "parse",
            ErrorType::UnmatchedElement => "unmatched_element",
            ErrorType::MalformedElement => "malformed_element",
            ErrorType::NestingLimit => "nesting_limit",
            ErrorType::UnsupportedSyntax => "unsupported_syntax",
            ErrorType::Io => "io",
            ErrorType::Config => "config",
            ErrorType::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single additional label for multi-span diagnostics.
#[derive(Debug)]
pub struct RelatedLabel {
    pub span: Span,
    pub label: String,
}

impl RelatedLabel {
    pub fn new(span: Span, label: impl Into<String>) -> Self {
        Self {
            span,
            label: label.into(),
        }
    }
}

/// Where an error happened and how to help.
#[derive(Debug, Default)]
pub struct ErrorContext {
    pub source: Option<SourceArc>,
    pub span: Option<Span>,
    pub help: Option<String>,
    pub related: Vec<RelatedLabel>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Error)]
pub enum MbxError {
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Unmatched element: {message}")]
    UnmatchedElement {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Malformed element: {message}")]
    MalformedElement {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Nesting limit exceeded: {message}")]
    NestingLimit {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Unsupported syntax: {message}")]
    UnsupportedSyntax {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("I/O error: {message}")]
    Io {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl MbxError {
    /// Wraps an I/O failure on `path`, keeping the OS error as the cause.
    pub fn io(path: &std::path::Path, error: std::io::Error) -> Self {
        MbxError::Io {
            message: format!("{}: {}", path.display(), error),
            ctx: ErrorContext::none(),
            source: Some(Box::new(error)),
        }
    }

    fn parts(&self) -> (&str, &ErrorContext) {
        match self {
            MbxError::Parse { message, ctx, .. }
            | MbxError::UnmatchedElement { message, ctx, .. }
            | MbxError::MalformedElement { message, ctx, .. }
            | MbxError::NestingLimit { message, ctx, .. }
            | MbxError::UnsupportedSyntax { message, ctx, .. }
            | MbxError::Io { message, ctx, .. }
            | MbxError::Config { message, ctx, .. }
            | MbxError::Internal { message, ctx, .. } => (message, ctx),
        }
    }

    fn ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            MbxError::Parse { ctx, .. }
            | MbxError::UnmatchedElement { ctx, .. }
            | MbxError::MalformedElement { ctx, .. }
            | MbxError::NestingLimit { ctx, .. }
            | MbxError::UnsupportedSyntax { ctx, .. }
            | MbxError::Io { ctx, .. }
            | MbxError::Config { ctx, .. }
            | MbxError::Internal { ctx, .. } => ctx,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            MbxError::Parse { .. } => ErrorType::Parse,
            MbxError::UnmatchedElement { .. } => ErrorType::UnmatchedElement,
            MbxError::MalformedElement { .. } => ErrorType::MalformedElement,
            MbxError::NestingLimit { .. } => ErrorType::NestingLimit,
            MbxError::UnsupportedSyntax { .. } => ErrorType::UnsupportedSyntax,
            MbxError::Io { .. } => ErrorType::Io,
            MbxError::Config { .. } => ErrorType::Config,
            MbxError::Internal { .. } => ErrorType::Internal,
        }
    }

    pub fn message(&self) -> &str {
        self.parts().0
    }

    pub fn span(&self) -> Option<Span> {
        self.parts().1.span
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.ctx_mut().help = Some(help.into());
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        match &mut self {
            MbxError::Parse { source, .. }
            | MbxError::UnmatchedElement { source, .. }
            | MbxError::MalformedElement { source, .. }
            | MbxError::NestingLimit { source, .. }
            | MbxError::UnsupportedSyntax { source, .. }
            | MbxError::Io { source, .. }
            | MbxError::Config { source, .. }
            | MbxError::Internal { source, .. } => *source = Some(Box::new(cause)),
        }
        self
    }

    /// 1-based line and column of the primary span, when the error has one.
    pub fn location(&self) -> Option<(usize, usize)> {
        let ctx = self.parts().1;
        let span = ctx.span?;
        let source = ctx.source.as_ref()?;
        Some(line_col(source.inner(), span.start))
    }
}

/// 1-based line and column (in characters) of a byte offset.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

impl Diagnostic for MbxError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(format!("mbx::{}", self.error_type())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.parts()
            .1
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.parts()
            .1
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let (message, ctx) = self.parts();
        ctx.source.as_ref()?;
        let mut labels = Vec::new();
        if let Some(span) = ctx.span {
            labels.push(LabeledSpan::new(
                Some(message.to_string()),
                span.start,
                span.len().max(1),
            ));
        }
        for rel in &ctx.related {
            labels.push(LabeledSpan::new(
                Some(rel.label.clone()),
                rel.span.start,
                rel.span.len().max(1),
            ));
        }
        if labels.is_empty() {
            None
        } else {
            Some(Box::new(labels.into_iter()))
        }
    }
}

/// Constructs an [`MbxError`] variant with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $($fmt:tt)+) => {
        $crate::MbxError::$variant {
            message: format!($($fmt)+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs an [`MbxError`] variant pointing at `span` in a pre-built source,
/// optionally with related labels.
#[macro_export]
macro_rules! err_src {
    ($variant:ident, $msg:expr, $source:expr, $span:expr, $related:expr) => {
        $crate::MbxError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext {
                source: Some(std::sync::Arc::clone($source)),
                span: Some($span),
                help: None,
                related: $related,
            },
            source: None,
        }
    };
    ($variant:ident, $msg:expr, $source:expr, $span:expr) => {
        $crate::err_src!($variant, $msg, $source, $span, vec![])
    };
}
