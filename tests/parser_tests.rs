// tests/parser_tests.rs

use mbx::lowering::MarkupIndex;
use mbx::syntax::{SourceParser, SyntaxKind, SyntaxTree};
use mbx::SourceContext;

fn parse(text: &str) -> SyntaxTree {
    SourceParser::new()
        .parse(&SourceContext::inline(text))
        .unwrap_or_else(|e| panic!("parse failed: {e:?}"))
}

fn kinds(tree: &SyntaxTree, kind: SyntaxKind) -> Vec<&str> {
    tree.nodes()
        .filter(|n| n.kind() == kind)
        .map(|n| n.text())
        .collect()
}

#[test]
fn tag_names_and_attributes_are_nodes() {
    let tree = parse(r#"let x = <a href="/" target={t}>go</a>"#);
    assert_eq!(kinds(&tree, SyntaxKind::TagName), vec!["a", "a"]);
    assert_eq!(kinds(&tree, SyntaxKind::AttributeName), vec!["href", "target"]);
    assert_eq!(kinds(&tree, SyntaxKind::AttributeValue), vec![r#""/""#]);
    assert_eq!(kinds(&tree, SyntaxKind::Text), vec!["go"]);
}

#[test]
fn multi_line_tags_parse() {
    let tree = parse("let x = <input\n  type=\"text\"\n  disabled\n/>");
    assert_eq!(kinds(&tree, SyntaxKind::AttributeName), vec!["type", "disabled"]);
    assert_eq!(
        tree.nodes()
            .filter(|n| n.kind() == SyntaxKind::ElementSelfClosing)
            .count(),
        1
    );
}

#[test]
fn generic_types_are_not_markup() {
    let tree = parse("let m : Map[String, Array[Int]] = Map::new()\nlet ok = a<b");
    assert_eq!(MarkupIndex::build(&tree).element_count(), 0);
}

#[test]
fn markup_index_flags_ancestors_only() {
    let tree = parse("fn f {\n  let a = 1\n  let b = <div><br/></div>\n}");
    let index = MarkupIndex::build(&tree);
    assert_eq!(index.element_count(), 2);
    assert!(index.contains(tree.root()));

    let lets: Vec<_> = tree
        .nodes()
        .filter(|n| n.kind() == SyntaxKind::LetStatement)
        .collect();
    assert_eq!(lets.len(), 2);
    assert!(!index.contains(lets[0]));
    assert!(index.contains(lets[1]));
}

#[test]
fn deep_nesting_parses() {
    let depth = 64;
    let text = format!("{}x{}", "<b>".repeat(depth), "</b>".repeat(depth));
    let tree = parse(&text);
    assert_eq!(MarkupIndex::build(&tree).element_count(), depth);
}

#[test]
fn dump_and_snapshot_describe_the_tree() {
    let tree = parse("<br/>");
    let dump = tree.dump();
    assert!(dump.starts_with("Program@0..5\n"), "{dump}");
    assert!(dump.contains("TagName@1..3 \"br\""), "{dump}");

    let json = serde_json::to_value(tree.root().snapshot()).unwrap();
    assert_eq!(json["kind"], "Program");
    assert_eq!(json["span"]["end"], 5);
}
