//! MBX parser.
//!
//! Runs the pest grammar over a source document and converts the resulting
//! pairs into a [`SyntaxTree`]. Conversion is iterative, so deeply nested
//! input cannot overflow the stack here. After conversion two passes finish
//! the tree:
//!
//! 1. trailing layout whitespace is trimmed from node spans (children first);
//! 2. the text between named children of composite nodes is split into
//!    `Token` nodes, so braces, `=`, quotes and friends are addressable.

use pest::{
    error::{Error, InputLocation, LineColLocation},
    iterators::Pair,
    Parser,
};
use pest_derive::Parser;
use tracing::trace;

use crate::diagnostics::SourceContext;
use crate::syntax::{NodeId, Span, SyntaxKind, SyntaxTree, TreeBuilder};
use crate::{err_msg, err_src, MbxError};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct MbxGrammar;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses MBX documents. Holds no state between calls; construct one where needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceParser;

impl SourceParser {
    pub fn new() -> Self {
        SourceParser
    }

    pub fn parse(&self, source: &SourceContext) -> Result<SyntaxTree, MbxError> {
        let text = source.content.as_str();
        let mut pairs = MbxGrammar::parse(Rule::program, text)
            .map_err(|e| convert_parse_error(e, source))?;
        let program = pairs
            .next()
            .ok_or_else(|| err_msg!(Internal, "grammar produced no program node"))?;

        let (mut builder, root) = convert_pairs(program);
        trim_trailing_layout(&mut builder, text);
        materialize_tokens(&mut builder, text);
        trace!(name = %source.name, nodes = builder.len(), "parsed document");
        Ok(builder.finish(text, root))
    }
}

// ============================================================================
// PAIRS -> ARENA
// ============================================================================

fn convert_pairs(program: Pair<'_, Rule>) -> (TreeBuilder, NodeId) {
    let mut builder = TreeBuilder::new();
    let root = builder.push(SyntaxKind::Program, span_of(&program), None);

    let mut stack: Vec<(Pair<'_, Rule>, NodeId)> = program
        .into_inner()
        .rev()
        .map(|pair| (pair, root))
        .collect();

    while let Some((pair, parent)) = stack.pop() {
        let Some(kind) = kind_of(pair.as_rule()) else {
            continue;
        };
        let id = builder.push(kind, span_of(&pair), Some(parent));
        if kind.is_leaf() {
            continue;
        }
        let inner: Vec<_> = pair.into_inner().collect();
        stack.extend(inner.into_iter().rev().map(|child| (child, id)));
    }
    (builder, root)
}

fn kind_of(rule: Rule) -> Option<SyntaxKind> {
    let kind = match rule {
        Rule::program => SyntaxKind::Program,
        Rule::COMMENT => SyntaxKind::Comment,

        Rule::decl => SyntaxKind::Declaration,
        Rule::decl_head | Rule::for_head | Rule::guard_head => SyntaxKind::Head,
        Rule::block => SyntaxKind::Block,
        Rule::let_stmt => SyntaxKind::LetStatement,
        Rule::guard_stmt => SyntaxKind::GuardStatement,
        Rule::jump_stmt => SyntaxKind::JumpStatement,
        Rule::expr_stmt => SyntaxKind::ExprStatement,
        Rule::raw_stmt | Rule::raw_item => SyntaxKind::Opaque,
        Rule::pattern | Rule::pattern_text => SyntaxKind::Pattern,
        Rule::type_expr | Rule::return_type => SyntaxKind::TypeAnnotation,
        Rule::lambda_params => SyntaxKind::Parameters,

        Rule::expression => SyntaxKind::Expression,
        Rule::unary => SyntaxKind::Unary,
        Rule::postfix => SyntaxKind::Postfix,
        Rule::paren_expr => SyntaxKind::ParenExpr,
        Rule::tuple_expr => SyntaxKind::TupleExpr,
        Rule::array_expr => SyntaxKind::ArrayExpr,
        Rule::record_expr => SyntaxKind::RecordExpr,
        Rule::record_field => SyntaxKind::RecordField,
        Rule::record_suffix => SyntaxKind::RecordSuffix,
        Rule::identifier => SyntaxKind::Identifier,
        Rule::qualified_name => SyntaxKind::QualifiedName,
        Rule::literal => SyntaxKind::Literal,
        Rule::call_args => SyntaxKind::CallArgs,
        Rule::argument => SyntaxKind::Argument,
        Rule::field_access => SyntaxKind::FieldAccess,
        Rule::index_access => SyntaxKind::IndexAccess,
        Rule::if_expr => SyntaxKind::IfExpr,
        Rule::match_expr => SyntaxKind::MatchExpr,
        Rule::match_arm => SyntaxKind::MatchArm,
        Rule::for_expr => SyntaxKind::ForExpr,
        Rule::while_expr => SyntaxKind::WhileExpr,
        Rule::loop_expr => SyntaxKind::LoopExpr,
        Rule::try_expr => SyntaxKind::TryExpr,
        Rule::lambda => SyntaxKind::Lambda,
        Rule::match_lambda => SyntaxKind::MatchLambda,
        Rule::arrow_fn => SyntaxKind::ArrowFn,

        Rule::element => SyntaxKind::Element,
        Rule::opening_tag => SyntaxKind::ElementOpening,
        Rule::self_closing_tag => SyntaxKind::ElementSelfClosing,
        Rule::closing_tag => SyntaxKind::ElementClosing,
        Rule::tag_name => SyntaxKind::TagName,
        Rule::attribute => SyntaxKind::Attribute,
        Rule::attribute_name => SyntaxKind::AttributeName,
        Rule::attribute_value => SyntaxKind::AttributeValue,
        Rule::attribute_content | Rule::attribute_content_single => SyntaxKind::AttributeContent,
        Rule::interpolation => SyntaxKind::Interpolation,
        Rule::text => SyntaxKind::Text,
        Rule::markup_comment => SyntaxKind::MarkupComment,

        Rule::kw_if
        | Rule::kw_else
        | Rule::kw_match
        | Rule::kw_for
        | Rule::kw_while
        | Rule::kw_fn
        | Rule::kw_let
        | Rule::kw_mut
        | Rule::kw_return
        | Rule::kw_raise
        | Rule::kw_break
        | Rule::kw_continue
        | Rule::kw_guard
        | Rule::kw_loop
        | Rule::kw_try
        | Rule::kw_catch
        | Rule::kw_noraise => SyntaxKind::Keyword,

        Rule::infix_op
        | Rule::prefix_op
        | Rule::assign_op
        | Rule::try_op
        | Rule::try_mark
        | Rule::label_eq
        | Rule::punned
        | Rule::dot => SyntaxKind::Operator,

        _ => return None,
    };
    Some(kind)
}

fn span_of(pair: &Pair<'_, Rule>) -> Span {
    let span = pair.as_span();
    Span::new(span.start(), span.end())
}

// ============================================================================
// POST-PROCESSING
// ============================================================================

/// Pulls span ends back over trailing spaces, tabs and newlines that the
/// grammar consumed as layout, but never before the node's last child.
fn trim_trailing_layout(builder: &mut TreeBuilder, text: &str) {
    for index in (0..builder.len()).rev() {
        let id = NodeId::from_index(index);
        if builder.kind(id).keeps_trailing_whitespace() {
            continue;
        }
        let span = builder.span(id);
        let Some(slice) = text.get(span.start..span.end) else {
            continue;
        };
        let trimmed = span.start + slice.trim_end_matches([' ', '\t', '\r', '\n']).len();
        let floor = builder
            .children(id)
            .last()
            .map_or(span.start, |child| builder.span(*child).end);
        builder.set_end(id, trimmed.max(floor));
    }
}

/// Inserts `Token` children for the non-whitespace text between the named
/// children of every composite node.
fn materialize_tokens(builder: &mut TreeBuilder, text: &str) {
    let named = builder.len();
    for index in 0..named {
        let id = NodeId::from_index(index);
        if builder.kind(id).is_leaf() {
            continue;
        }
        let span = builder.span(id);
        let children = builder.children(id).to_vec();
        let mut merged = Vec::with_capacity(children.len() * 2 + 2);
        let mut cursor = span.start;
        for child in children {
            let child_span = builder.span(child);
            push_gap_tokens(builder, text, cursor, child_span.start, &mut merged);
            merged.push(child);
            cursor = cursor.max(child_span.end);
        }
        push_gap_tokens(builder, text, cursor, span.end, &mut merged);
        builder.replace_children(id, merged);
    }
}

fn push_gap_tokens(
    builder: &mut TreeBuilder,
    text: &str,
    start: usize,
    end: usize,
    out: &mut Vec<NodeId>,
) {
    if start >= end {
        return;
    }
    let Some(gap) = text.get(start..end) else {
        return;
    };
    for span in split_tokens(gap, start) {
        out.push(builder.push(SyntaxKind::Token, span, None));
    }
}

/// Splits gap text into token spans: identifier runs, single brackets and
/// separators, and runs of any other symbols. Whitespace is dropped.
fn split_tokens(gap: &str, offset: usize) -> Vec<Span> {
    fn class(c: char) -> u8 {
        if c.is_whitespace() {
            0
        } else if c.is_alphanumeric() || c == '_' {
            1
        } else if matches!(c, '{' | '}' | '(' | ')' | '[' | ']' | ',' | ';' | '"' | '\'') {
            2
        } else {
            3
        }
    }

    let mut spans = Vec::new();
    let mut current: Option<(usize, u8)> = None;
    for (i, c) in gap.char_indices() {
        let k = class(c);
        if let Some((start, open)) = current {
            if open == k && k != 2 {
                continue;
            }
            spans.push(Span::new(offset + start, offset + i));
            current = None;
        }
        if k != 0 {
            current = Some((i, k));
        }
    }
    if let Some((start, _)) = current {
        spans.push(Span::new(offset + start, offset + gap.len()));
    }
    spans
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(error: Error<Rule>, source: &SourceContext) -> MbxError {
    let error = error.renamed_rules(describe_rule);
    let span = match error.location {
        InputLocation::Pos(pos) => Span::new(pos, pos),
        InputLocation::Span((start, end)) => Span::new(start, end),
    };
    let (line, column) = match error.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    let message = format!("{} at {}:{}", error.variant.message(), line, column);
    err_src!(Parse, message, &source.to_named_source(), span)
        .with_help(parse_help(&source.content, span.start))
}

fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::EOI => "end of input",
        Rule::program | Rule::decl | Rule::let_stmt | Rule::expr_stmt | Rule::jump_stmt => {
            "a statement"
        }
        Rule::raw_item | Rule::raw_stmt => "a declaration",
        Rule::block => "a block",
        Rule::expression | Rule::unary | Rule::postfix => "an expression",
        Rule::identifier | Rule::qualified_name => "an identifier",
        Rule::literal => "a literal",
        Rule::element => "a markup element",
        Rule::opening_tag | Rule::self_closing_tag => "a tag",
        Rule::closing_tag => "a closing tag",
        Rule::tag_name => "a tag name",
        Rule::attribute | Rule::attribute_name => "an attribute",
        Rule::attribute_value => "a quoted attribute value",
        Rule::interpolation => "an interpolation",
        Rule::text => "text",
        Rule::infix_op => "an operator",
        Rule::call_args => "call arguments",
        other => return format!("{:?}", other),
    }
    .to_string()
}

fn parse_help(text: &str, offset: usize) -> String {
    let rest = text.get(offset..).unwrap_or("");
    if rest.starts_with('<') {
        "a `<` directly followed by a letter or `/` always starts markup; \
         put spaces around the less-than operator"
            .to_string()
    } else if rest.starts_with('{') || rest.starts_with('}') {
        "check that braces in element content are balanced".to_string()
    } else {
        "the input is not valid MBX at this position".to_string()
    }
}
