//! Memoized "contains markup" side-table.

use crate::syntax::{NodeId, SyntaxKind, SyntaxNode, SyntaxTree};

/// One flag per node: true when the node is an element or has one below it.
///
/// Built in a single reverse pass over the arena. Children always have larger
/// ids than their parents, so every child is final before its parent is
/// looked at.
#[derive(Debug, Clone)]
pub struct MarkupIndex {
    flags: Vec<bool>,
    elements: usize,
}

impl MarkupIndex {
    pub fn build(tree: &SyntaxTree) -> Self {
        let mut flags = vec![false; tree.len()];
        let mut elements = 0;
        for index in (0..tree.len()).rev() {
            let node = tree.node(NodeId::from_index(index));
            let is_element = node.kind() == SyntaxKind::Element;
            if is_element {
                elements += 1;
            }
            flags[index] = is_element || node.children().any(|child| flags[child.id().index()]);
        }
        Self { flags, elements }
    }

    pub fn contains(&self, node: SyntaxNode<'_>) -> bool {
        self.flags.get(node.id().index()).copied().unwrap_or(false)
    }

    pub fn element_count(&self) -> usize {
        self.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Span, TreeBuilder};

    #[test]
    fn no_markup_anywhere() {
        let mut builder = TreeBuilder::new();
        let root = builder.push(SyntaxKind::Program, Span::new(0, 9), None);
        let stmt = builder.push(SyntaxKind::LetStatement, Span::new(0, 9), Some(root));
        builder.push(SyntaxKind::Identifier, Span::new(4, 5), Some(stmt));
        let tree = builder.finish("let a = 1", root);

        let index = MarkupIndex::build(&tree);
        assert!(tree.nodes().all(|n| !index.contains(n)));
        assert_eq!(index.element_count(), 0);
    }

    #[test]
    fn element_at_top_level() {
        let mut builder = TreeBuilder::new();
        let root = builder.push(SyntaxKind::Program, Span::new(0, 6), None);
        let element = builder.push(SyntaxKind::Element, Span::new(0, 6), Some(root));
        let tree = builder.finish("<br/> ", root);

        let index = MarkupIndex::build(&tree);
        assert!(index.contains(tree.root()));
        assert!(index.contains(tree.node(element)));
    }

    #[test]
    fn deep_element_marks_only_its_ancestors() {
        let mut builder = TreeBuilder::new();
        let root = builder.push(SyntaxKind::Program, Span::new(0, 40), None);
        let sibling = builder.push(SyntaxKind::Opaque, Span::new(0, 5), Some(root));
        let mut parent = builder.push(SyntaxKind::Declaration, Span::new(6, 40), Some(root));
        let mut chain = vec![parent];
        for _ in 0..50 {
            parent = builder.push(SyntaxKind::Expression, Span::new(10, 30), Some(parent));
            chain.push(parent);
        }
        let element = builder.push(SyntaxKind::Element, Span::new(12, 20), Some(parent));
        let inner_text = builder.push(SyntaxKind::Text, Span::new(15, 16), Some(element));
        let tree = builder.finish(" ".repeat(40), root);

        let index = MarkupIndex::build(&tree);
        assert!(index.contains(tree.root()));
        assert!(chain.iter().all(|id| index.contains(tree.node(*id))));
        assert!(index.contains(tree.node(element)));
        assert!(!index.contains(tree.node(inner_text)));
        assert!(!index.contains(tree.node(sibling)));
        assert_eq!(index.element_count(), 1);
    }
}
