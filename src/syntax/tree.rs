//! Arena-backed concrete syntax tree.
//!
//! Nodes are stored in a flat vector and addressed by [`NodeId`]. A node is
//! always pushed after its parent, so every child id is greater than its
//! parent id. Passes that need children before parents simply walk the arena
//! in reverse.

use std::fmt;

use serde::Serialize;

use super::{Span, SyntaxKind};

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: SyntaxKind,
    span: Span,
    children: Vec<NodeId>,
}

/// Immutable CST for one document. Owns the source text it points into.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> SyntaxNode<'_> {
        SyntaxNode { tree: self, id }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in id order (parents before their children).
    pub fn nodes(&self) -> impl Iterator<Item = SyntaxNode<'_>> + '_ {
        (0..self.nodes.len()).map(move |index| self.node(NodeId::from_index(index)))
    }

    /// Indented, one node per line rendering used by `mbx cst`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = self.node(id);
            let span = node.span();
            out.push_str(&"  ".repeat(depth));
            out.push_str(&format!("{}@{}..{}", node.kind(), span.start, span.end));
            if node.kind().is_leaf() {
                out.push_str(&format!(" {:?}", node.text()));
            }
            out.push('\n');
            for child in self.nodes[id.index()].children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        out
    }
}

/// Borrowed handle to a node. Cheap to copy.
#[derive(Copy, Clone)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> SyntaxNode<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id.index()]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    pub fn span(&self) -> Span {
        self.data().span
    }

    /// The node's slice of the source. Empty if the span is out of range.
    pub fn text(&self) -> &'t str {
        let span = self.span();
        self.tree.source.get(span.start..span.end).unwrap_or("")
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = SyntaxNode<'t>> + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |id| SyntaxNode { tree, id: *id })
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn first_child(&self, kind: SyntaxKind) -> Option<SyntaxNode<'t>> {
        self.children().find(|child| child.kind() == kind)
    }

    pub fn last_child(&self) -> Option<SyntaxNode<'t>> {
        self.children().next_back()
    }

    /// True for a `Token` node with exactly this text.
    pub fn is_token(&self, text: &str) -> bool {
        self.kind() == SyntaxKind::Token && self.text() == text
    }

    /// Whether the node's text ends inside a line comment, so that anything
    /// appended on the same line would be commented out.
    pub fn ends_with_comment(&self) -> bool {
        let mut current = *self;
        while let Some(last) = current.last_child() {
            current = last;
        }
        match current.kind() {
            SyntaxKind::Comment => true,
            SyntaxKind::Opaque
            | SyntaxKind::Head
            | SyntaxKind::Pattern
            | SyntaxKind::TypeAnnotation => has_trailing_line_comment(current.text()),
            _ => false,
        }
    }

    /// Serializable view of the subtree, used for `mbx cst --json`.
    pub fn snapshot(&self) -> NodeSnapshot<'t> {
        NodeSnapshot {
            kind: self.kind(),
            span: self.span(),
            text: self.kind().is_leaf().then(|| self.text()),
            children: self.children().map(|child| child.snapshot()).collect(),
        }
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.span();
        write!(f, "{}@{}..{}", self.kind(), span.start, span.end)
    }
}

#[derive(Debug, Serialize)]
pub struct NodeSnapshot<'t> {
    pub kind: SyntaxKind,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'t str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot<'t>>,
}

fn has_trailing_line_comment(text: &str) -> bool {
    let line = text.rsplit('\n').next().unwrap_or(text);
    let mut in_string = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if in_string => {
                chars.next();
            }
            '"' => in_string = !in_string,
            '/' if !in_string && chars.peek() == Some(&'/') => return true,
            _ => {}
        }
    }
    false
}

// ============================================================================
// BUILDER
// ============================================================================

/// Mutable arena used while a tree is being assembled.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and registers it as the last child of `parent`.
    pub fn push(&mut self, kind: SyntaxKind, span: Span, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            span,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn set_end(&mut self, id: NodeId, end: usize) {
        self.nodes[id.index()].span.end = end;
    }

    pub fn replace_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        self.nodes[id.index()].children = children;
    }

    pub fn finish(self, source: impl Into<String>, root: NodeId) -> SyntaxTree {
        SyntaxTree {
            source: source.into(),
            nodes: self.nodes,
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SyntaxTree {
        // let a = b // note
        let source = "let a = b // note";
        let mut builder = TreeBuilder::new();
        let root = builder.push(SyntaxKind::Program, Span::new(0, source.len()), None);
        let stmt = builder.push(SyntaxKind::LetStatement, Span::new(0, source.len()), Some(root));
        builder.push(SyntaxKind::Keyword, Span::new(0, 3), Some(stmt));
        builder.push(SyntaxKind::Pattern, Span::new(4, 5), Some(stmt));
        builder.push(SyntaxKind::Token, Span::new(6, 7), Some(stmt));
        builder.push(SyntaxKind::Identifier, Span::new(8, 9), Some(stmt));
        builder.push(SyntaxKind::Comment, Span::new(10, 17), Some(stmt));
        builder.finish(source, root)
    }

    #[test]
    fn children_are_ordered_and_sliced() {
        let tree = sample();
        let stmt = tree.root().children().next().unwrap();
        let texts: Vec<_> = stmt.children().map(|c| c.text()).collect();
        assert_eq!(texts, vec!["let", "a", "=", "b", "// note"]);
        assert!(stmt.children().nth(2).unwrap().is_token("="));
    }

    #[test]
    fn child_ids_follow_parent_ids() {
        let tree = sample();
        for node in tree.nodes() {
            for child in node.children() {
                assert!(child.id() > node.id());
            }
        }
    }

    #[test]
    fn trailing_comment_is_detected() {
        let tree = sample();
        assert!(tree.root().ends_with_comment());
        let ident = tree.root().children().next().unwrap().children().nth(3).unwrap();
        assert!(!ident.ends_with_comment());
    }

    #[test]
    fn comment_markers_inside_strings_are_ignored() {
        assert!(!has_trailing_line_comment(r#"f("http://x")"#));
        assert!(has_trailing_line_comment("f(x) // call"));
        assert!(!has_trailing_line_comment("// old\nf(x)"));
    }

    #[test]
    fn dump_lists_every_node() {
        let tree = sample();
        let dump = tree.dump();
        assert_eq!(dump.lines().count(), tree.len());
        assert!(dump.starts_with("Program@0..17"));
        assert!(dump.contains("    Identifier@8..9 \"b\""));
    }

    #[test]
    fn out_of_range_span_yields_empty_text() {
        let mut builder = TreeBuilder::new();
        let root = builder.push(SyntaxKind::Program, Span::new(0, 50), None);
        let tree = builder.finish("short", root);
        assert_eq!(tree.root().text(), "");
    }
}
