//! Concrete syntax for MBX sources.
//!
//! The parser produces an immutable, arena-backed concrete syntax tree that keeps
//! every byte of the input addressable: each node records its kind and its byte
//! range, and the text between named children is materialized as `Token` nodes.

use serde::{Deserialize, Serialize};

pub mod parser;
pub mod tree;

pub use parser::SourceParser;
pub use tree::{NodeId, SyntaxNode, SyntaxTree, TreeBuilder};

/// Represents a span in the source code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Closed vocabulary of CST node kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntaxKind {
    Program,
    Comment,

    // Host structure
    Declaration,
    Head,
    Block,
    LetStatement,
    GuardStatement,
    JumpStatement,
    ExprStatement,
    Opaque,
    Pattern,
    TypeAnnotation,
    Parameters,

    // Host expressions
    Expression,
    Unary,
    Postfix,
    ParenExpr,
    TupleExpr,
    ArrayExpr,
    RecordExpr,
    RecordField,
    RecordSuffix,
    Identifier,
    QualifiedName,
    Literal,
    CallArgs,
    Argument,
    FieldAccess,
    IndexAccess,
    IfExpr,
    MatchExpr,
    MatchArm,
    ForExpr,
    WhileExpr,
    LoopExpr,
    TryExpr,
    Lambda,
    MatchLambda,
    ArrowFn,

    // Markup
    Element,
    ElementOpening,
    ElementSelfClosing,
    ElementClosing,
    TagName,
    Attribute,
    AttributeName,
    AttributeValue,
    AttributeContent,
    Interpolation,
    Text,
    MarkupComment,

    // Lexical
    Token,
    Keyword,
    Operator,
}

impl SyntaxKind {
    /// Leaf kinds never have children; their text is a single grammar token.
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            SyntaxKind::Comment
                | SyntaxKind::Head
                | SyntaxKind::Opaque
                | SyntaxKind::Pattern
                | SyntaxKind::TypeAnnotation
                | SyntaxKind::Parameters
                | SyntaxKind::Identifier
                | SyntaxKind::QualifiedName
                | SyntaxKind::Literal
                | SyntaxKind::TagName
                | SyntaxKind::AttributeName
                | SyntaxKind::AttributeContent
                | SyntaxKind::Text
                | SyntaxKind::MarkupComment
                | SyntaxKind::Token
                | SyntaxKind::Keyword
                | SyntaxKind::Operator
        )
    }

    /// Kinds whose trailing whitespace is content rather than layout.
    pub fn keeps_trailing_whitespace(self) -> bool {
        matches!(
            self,
            SyntaxKind::Program
                | SyntaxKind::Comment
                | SyntaxKind::Literal
                | SyntaxKind::Text
                | SyntaxKind::AttributeContent
                | SyntaxKind::MarkupComment
        )
    }

    /// Host leaves copied out as raw text. Markup inside them cannot be lowered.
    pub fn is_verbatim_host(self) -> bool {
        matches!(
            self,
            SyntaxKind::Opaque
                | SyntaxKind::Head
                | SyntaxKind::Pattern
                | SyntaxKind::TypeAnnotation
                | SyntaxKind::Parameters
        )
    }

    pub fn is_markup(self) -> bool {
        matches!(self, SyntaxKind::Element)
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
