//! Pass-through composition: original text, with lowered markup spliced in.

use super::expression::line_indent;
use super::Translator;
use crate::syntax::{SyntaxKind, SyntaxNode};
use crate::MbxError;

impl Translator<'_> {
    /// Reproduces `node`. Subtrees without markup are copied byte for byte;
    /// subtrees with markup are rebuilt from their children, joined by the
    /// layout the original gaps imply.
    pub(crate) fn compose(&self, node: SyntaxNode<'_>, depth: usize) -> Result<String, MbxError> {
        self.enter(node, depth)?;
        if !self.index.contains(node) {
            return Ok(node.text().to_string());
        }
        if node.kind() == SyntaxKind::Element {
            return self.lower_element(node, depth + 1);
        }

        let mut out = String::with_capacity(node.span().len());
        let mut previous: Option<SyntaxNode<'_>> = None;
        for child in node.children() {
            if let Some(previous) = previous {
                out.push_str(&self.joiner(previous, child));
            }
            out.push_str(&self.compose(child, depth + 1)?);
            previous = Some(child);
        }
        Ok(out)
    }

    /// Layout between two composed siblings.
    fn joiner(&self, previous: SyntaxNode<'_>, next: SyntaxNode<'_>) -> String {
        let source = self.tree.source();
        let gap = source
            .get(previous.span().end..next.span().start)
            .unwrap_or("");
        let breaks_line = previous.is_token("{")
            || previous.is_token(";")
            || previous.ends_with_comment()
            || next.is_token("}")
            || gap.contains('\n');
        if breaks_line {
            format!(
                "{}{}",
                line_break(source, gap),
                line_indent(source, next.span().start)
            )
        } else if gap.is_empty() {
            String::new()
        } else {
            " ".to_string()
        }
    }
}

/// The line ending to emit: the one in `gap` if it has one, else the
/// document's own.
pub(crate) fn line_break(source: &str, gap: &str) -> &'static str {
    let sample = if gap.contains('\n') { gap } else { source };
    if sample.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}
