//! One markup element to one builder call:
//! `h("tag", [attr("name", value), ...], [child, ...])`.

use tracing::{trace, warn};

use super::expression::unwrap_transparent;
use super::Translator;
use crate::diagnostics::{line_col, RelatedLabel};
use crate::syntax::{SyntaxKind, SyntaxNode};
use crate::{err_src, MbxError};

/// Logical view over an `Element` node.
struct ElementParts<'t> {
    open: Option<SyntaxNode<'t>>,
    self_closing: bool,
    content: Vec<SyntaxNode<'t>>,
    close: Option<SyntaxNode<'t>>,
}

impl<'t> ElementParts<'t> {
    fn of(node: SyntaxNode<'t>) -> Self {
        let mut parts = ElementParts {
            open: None,
            self_closing: false,
            content: Vec::new(),
            close: None,
        };
        for child in node.children() {
            match child.kind() {
                SyntaxKind::ElementOpening => parts.open = Some(child),
                SyntaxKind::ElementSelfClosing => {
                    parts.open = Some(child);
                    parts.self_closing = true;
                }
                SyntaxKind::ElementClosing => parts.close = Some(child),
                _ => parts.content.push(child),
            }
        }
        parts
    }
}

impl Translator<'_> {
    pub(crate) fn lower_element(
        &self,
        node: SyntaxNode<'_>,
        depth: usize,
    ) -> Result<String, MbxError> {
        self.enter(node, depth)?;
        let parts = ElementParts::of(node);
        let open = parts.open.ok_or_else(|| {
            err_src!(MalformedElement, "element without an opening tag", &self.source, node.span())
        })?;
        let tag = open
            .first_child(SyntaxKind::TagName)
            .map(|name| name.text())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                err_src!(MalformedElement, "element has no tag name", &self.source, open.span())
                    .with_help("write a tag name right after `<`, e.g. `<div>`")
            })?;

        if !parts.self_closing {
            self.check_closing_tag(tag, open, parts.close)?;
        }

        let attributes = open
            .children()
            .filter(|child| child.kind() == SyntaxKind::Attribute)
            .map(|attribute| self.lower_attribute(attribute, depth + 1))
            .collect::<Result<Vec<_>, _>>()?;

        let mut children = Vec::new();
        for child in &parts.content {
            if let Some(lowered) = self.lower_child(*child, depth + 1)? {
                children.push(lowered);
            }
        }

        trace!(
            tag,
            attributes = attributes.len(),
            children = children.len(),
            "lowered element"
        );
        Ok(format!(
            "{}(\"{}\", [{}], [{}])",
            self.config.builders.element,
            tag,
            attributes.join(", "),
            children.join(", ")
        ))
    }

    fn check_closing_tag(
        &self,
        tag: &str,
        open: SyntaxNode<'_>,
        close: Option<SyntaxNode<'_>>,
    ) -> Result<(), MbxError> {
        let Some(close) = close else {
            return Err(err_src!(
                UnmatchedElement,
                format!("element <{}> is never closed", tag),
                &self.source,
                open.span()
            )
            .with_help(format!("add `</{}>` after the element's content", tag)));
        };
        let closing_name = close
            .first_child(SyntaxKind::TagName)
            .map_or("", |name| name.text());
        if closing_name == tag {
            return Ok(());
        }
        let (line, column) = line_col(self.tree.source(), open.span().start);
        Err(err_src!(
            UnmatchedElement,
            format!("closing tag </{}> does not match <{}>", closing_name, tag),
            &self.source,
            close.span(),
            vec![RelatedLabel::new(open.span(), format!("<{}> opened here", tag))]
        )
        .with_help(format!(
            "the element opened at {}:{} must be closed with `</{}>`",
            line, column, tag
        )))
    }

    fn lower_attribute(&self, attribute: SyntaxNode<'_>, depth: usize) -> Result<String, MbxError> {
        self.enter(attribute, depth)?;
        let name = attribute
            .first_child(SyntaxKind::AttributeName)
            .map_or("", |name| name.text());
        let has_equals = attribute.children().any(|child| child.is_token("="));

        let value = if let Some(literal) = attribute.first_child(SyntaxKind::AttributeValue) {
            quote_attribute_value(literal)
        } else if let Some(interpolation) = attribute.first_child(SyntaxKind::Interpolation) {
            match interpolation.first_child(SyntaxKind::Expression) {
                Some(expr) => self.lower_expression(expr, depth + 1)?,
                None => {
                    warn!(attribute = name, span = ?attribute.span(), "empty attribute value, using \"\"");
                    "\"\"".to_string()
                }
            }
        } else if has_equals {
            warn!(attribute = name, span = ?attribute.span(), "attribute has `=` but no value, using \"\"");
            "\"\"".to_string()
        } else {
            "true".to_string()
        };

        trace!(attribute = name, "lowered attribute");
        Ok(format!(
            "{}(\"{}\", {})",
            self.config.builders.attribute, name, value
        ))
    }

    /// `None` for content that produces no child (blank text, comments,
    /// empty interpolations).
    fn lower_child(&self, child: SyntaxNode<'_>, depth: usize) -> Result<Option<String>, MbxError> {
        let lowered = match child.kind() {
            SyntaxKind::Text => normalize_text(child.text()).map(|text| {
                format!("{}(\"{}\")", self.config.builders.text, escape_text(&text))
            }),
            SyntaxKind::Element => Some(self.lower_element(child, depth)?),
            SyntaxKind::Interpolation => match child.first_child(SyntaxKind::Expression) {
                Some(expr) if unwrap_transparent(expr).kind() == SyntaxKind::Element => {
                    Some(self.lower_element(unwrap_transparent(expr), depth + 1)?)
                }
                Some(expr) => Some(format!(
                    "{}({})",
                    self.config.builders.text,
                    self.lower_expression(expr, depth + 1)?
                )),
                None => None,
            },
            _ => None,
        };
        Ok(lowered)
    }
}

/// Double-quoted values are kept exactly as written; single-quoted ones are
/// re-quoted.
fn quote_attribute_value(value: SyntaxNode<'_>) -> String {
    let raw = value.text();
    if !raw.starts_with('\'') {
        return raw.to_string();
    }
    let content = value
        .first_child(SyntaxKind::AttributeContent)
        .map_or("", |content| content.text());
    let mut out = String::with_capacity(content.len() + 2);
    out.push('"');
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\'') => out.push('\''),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push_str("\\\\"),
            },
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Applies the line rule to a text run: every line but the first loses its
/// leading whitespace, every line but the last its trailing whitespace, empty
/// lines disappear and the rest are joined with single spaces.
pub(crate) fn normalize_text(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let last = lines.len().saturating_sub(1);
    let kept: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let line = if i > 0 { line.trim_start() } else { line };
            if i < last {
                line.trim_end()
            } else {
                line
            }
        })
        .filter(|line| !line.is_empty())
        .collect();
    let joined = kept.join(" ");
    if joined.trim().is_empty() {
        None
    } else {
        Some(joined)
    }
}

pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_rule_trims_across_lines_only() {
        assert_eq!(normalize_text("Hello World").as_deref(), Some("Hello World"));
        assert_eq!(normalize_text("Hi ").as_deref(), Some("Hi "));
        assert_eq!(
            normalize_text("\n    first line  \n\n    second\n  ").as_deref(),
            Some("first line second")
        );
        assert_eq!(normalize_text("  a\n  b  ").as_deref(), Some("  a b  "));
    }

    #[test]
    fn blank_runs_are_dropped() {
        assert_eq!(normalize_text("\n    \n  "), None);
        assert_eq!(normalize_text(" "), None);
        assert_eq!(normalize_text(""), None);
    }

    #[test]
    fn text_escaping() {
        assert_eq!(escape_text(r#"say "hi"\now"#), r#"say \"hi\"\\now"#);
        assert_eq!(escape_text("a\tb"), "a\\tb");
    }
}
