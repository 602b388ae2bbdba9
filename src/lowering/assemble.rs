//! Whole-document assembly.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::compose::line_break;
use super::Translator;
use crate::diagnostics::RelatedLabel;
use crate::syntax::SyntaxKind;
use crate::{err_src, MbxError, Span};

static MARKUP_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[A-Za-z_][\w.:-]*(\s[^<>]*)?/?>|</[A-Za-z_][\w.:-]*\s*>")
        .expect("valid markup pattern")
});

impl Translator<'_> {
    /// Produces the translated document.
    ///
    /// A document without markup comes back unchanged, byte for byte. Otherwise
    /// top-level items are composed one by one, the text between them is copied
    /// as is, and the result ends with a newline.
    pub fn assemble(&self) -> Result<String, MbxError> {
        self.reject_verbatim_markup()?;
        let source = self.tree.source();
        let root = self.tree.root();
        if !self.index.contains(root) {
            return Ok(source.to_string());
        }

        let mut out = String::with_capacity(source.len() + source.len() / 2);
        let mut cursor = 0;
        for item in root.children() {
            let span = item.span();
            out.push_str(source.get(cursor..span.start).unwrap_or(""));
            out.push_str(&self.compose(item, 1)?);
            cursor = span.end;
        }
        out.push_str(source.get(cursor..).unwrap_or(""));
        if !out.ends_with('\n') {
            out.push_str(line_break(source, ""));
        }
        Ok(out)
    }

    /// Raw host leaves are copied verbatim, so markup inside one would reach
    /// the output untranslated. That fails the document.
    fn reject_verbatim_markup(&self) -> Result<(), MbxError> {
        for node in self.tree.nodes() {
            if !node.kind().is_verbatim_host() {
                continue;
            }
            let code = mask_literals(node.text());
            let Some(found) = MARKUP_LIKE.find(&code) else {
                continue;
            };
            let start = node.span().start + found.start();
            let span = Span::new(start, node.span().start + found.end());
            debug!(kind = %node.kind(), span = ?span, "markup in verbatim host code");
            return Err(err_src!(
                UnsupportedSyntax,
                format!(
                    "markup inside a {} construct that cannot be translated",
                    describe(node.kind())
                ),
                &self.source,
                span,
                vec![RelatedLabel::new(node.span(), "copied as plain text")]
            )
            .with_help(
                "bind the markup to a `let` first, or rewrite the surrounding \
                 code with `if`, `match`, `for`, `loop`, `try` or a lambda",
            ));
        }
        Ok(())
    }
}

fn describe(kind: SyntaxKind) -> &'static str {
    match kind {
        SyntaxKind::Head => "declaration or loop header",
        SyntaxKind::Pattern => "pattern",
        SyntaxKind::TypeAnnotation => "type",
        SyntaxKind::Parameters => "parameter list",
        _ => "host",
    }
}

/// Blanks the contents of string and char literals and of comments, keeping
/// byte offsets, so that only code is searched for tags.
fn mask_literals(text: &str) -> String {
    #[derive(Clone, Copy)]
    enum Scan {
        Code,
        Quoted(char),
        Comment,
    }

    let mut out = String::with_capacity(text.len());
    let mut scan = Scan::Code;
    let mut escaped = false;
    let mut previous = '\0';
    for c in text.chars() {
        let keep = match scan {
            Scan::Code => {
                match c {
                    '"' | '\'' => scan = Scan::Quoted(c),
                    '/' if previous == '/' => scan = Scan::Comment,
                    '|' if previous == '#' || previous == '$' => scan = Scan::Comment,
                    _ => {}
                }
                true
            }
            Scan::Quoted(close) => {
                if escaped {
                    escaped = false;
                    false
                } else if c == '\\' {
                    escaped = true;
                    false
                } else if c == close || c == '\n' {
                    scan = Scan::Code;
                    true
                } else {
                    false
                }
            }
            Scan::Comment => {
                if c == '\n' {
                    scan = Scan::Code;
                }
                c == '\n'
            }
        };
        if keep {
            out.push(c);
        } else {
            out.extend(std::iter::repeat(' ').take(c.len_utf8()));
        }
        previous = c;
    }
    out
}
