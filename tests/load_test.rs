//! Save/load path: Turtle document and SPARQL bindings into a rebuilt tree

use outliner::rdf::escape_literal;
use outliner::sparql::{BindingValue, QuerySolution, SparqlResults, LOAD_VARIABLES};
use outliner::*;

const BASE: &str = "http://example.org/outline/data/";
const TS: &str = "http://example.org/outline/schema#";

fn sample_store() -> (NodeStore, NodeId) {
    let mut store = NodeStore::new();
    let root = store.create_root().unwrap().id.clone();
    let quote = store
        .add_node(&root, "He said \"hi\"\\and", None)
        .unwrap()
        .id
        .clone();
    store.update_description(&quote, "line one\nline\ttwo");
    let list = store.add_node(&root, "List", None).unwrap().id.clone();
    store.add_node(&list, "first", None).unwrap();
    store.add_node(&list, "second", None).unwrap();
    (store, root)
}

#[test]
fn test_turtle_escaping_is_exact() {
    let (store, _) = sample_store();
    let turtle = write_outline(&store).unwrap();

    assert!(turtle.contains(r#"dc:title "He said \"hi\"\\and""#));
    assert!(turtle.contains(r#"dc:description "line one\nline\ttwo""#));
    assert_eq!(escape_literal("a\r\nb"), "a\\r\\nb");
}

#[test]
fn test_turtle_document_layout() {
    let (store, root) = sample_store();
    let turtle = write_outline(&store).unwrap();

    assert!(turtle.starts_with("@prefix dc: <http://purl.org/dc/terms/> .\n"));
    assert!(turtle.contains("@prefix ts: <http://example.org/outline/schema#> ."));
    assert!(turtle.contains(&format!("<{}{}> a ts:RootNode .", BASE, root)));
    assert_eq!(turtle.matches("a ts:Node ;").count(), 4);
    assert_eq!(turtle.matches("ts:index \"0\"").count(), 2);
    assert_eq!(turtle.matches(&format!("ts:parent <{}{}> .", BASE, root)).count(), 2);
}

#[test]
fn test_turtle_round_trip() {
    let (store, root) = sample_store();
    let turtle = write_outline(&store).unwrap();

    let records = parse_outline(&turtle, store.vocabulary()).unwrap();
    assert_eq!(records.len(), store.node_count());

    let mut loaded = NodeStore::new();
    assert!(loaded.rebuild_from_flat(records));
    loaded.validate().unwrap();

    assert_eq!(loaded.root_id(), Some(&root));
    for node in store.iter() {
        let other = loaded.get_node(&node.id).unwrap();
        assert_eq!(other.title, node.title);
        assert_eq!(other.children, node.children);
        assert_eq!(other.description, node.description);
        if !node.is_root() {
            assert_eq!(other.created_lexical(), node.created_lexical());
        }
    }
}

#[test]
fn test_bindings_load_scenario() {
    let mut root = QuerySolution::new();
    root.bind("node", BindingValue::uri(format!("{}root", BASE)));
    root.bind("type", BindingValue::uri(format!("{}RootNode", TS)));

    let mut child = QuerySolution::new();
    child.bind("node", BindingValue::uri(format!("{}child", BASE)));
    child.bind("type", BindingValue::uri(format!("{}Node", TS)));
    child.bind("title", BindingValue::literal("Child"));
    child.bind("parent", BindingValue::uri(format!("{}root", BASE)));

    let json = SparqlResults::from_solutions(&LOAD_VARIABLES, vec![root, child])
        .to_json()
        .unwrap();
    let parsed = parse_bindings(&json).unwrap();

    let mut store = NodeStore::new();
    assert!(store.rebuild_from_flat(parsed.records));
    let root = store.get_root().unwrap();
    assert_eq!(root.children, vec![NodeId::new("child")]);
    assert_eq!(store.get_node(&NodeId::new("child")).unwrap().index, 0);
    store.validate().unwrap();
}

#[test]
fn test_rebuild_prunes_bad_structure() {
    let root = FlatNodeRecord::new("root", NodeKind::Root);
    let kept = FlatNodeRecord::new("kept", NodeKind::Item)
        .with_parent("root")
        .with_index(3);
    let orphan = FlatNodeRecord::new("orphan", NodeKind::Item).with_parent("gone");
    let loop_a = FlatNodeRecord::new("loop-a", NodeKind::Item).with_parent("loop-b");
    let loop_b = FlatNodeRecord::new("loop-b", NodeKind::Item).with_parent("loop-a");
    let unsafe_id = FlatNodeRecord::new("a/b", NodeKind::Item).with_parent("root");

    let mut store = NodeStore::new();
    assert!(store.rebuild_from_flat(vec![kept, orphan, loop_a, root, loop_b, unsafe_id]));

    assert_eq!(store.node_count(), 2);
    let kept = store.get_node(&NodeId::new("kept")).unwrap();
    assert_eq!(kept.index, 0);
    store.validate().unwrap();
}

#[test]
fn test_rebuild_without_root_leaves_store_uninitialized() {
    let (mut store, _) = sample_store();
    let item = FlatNodeRecord::new("lonely", NodeKind::Item);

    assert!(!store.rebuild_from_flat(vec![item]));
    assert!(!store.is_ready());
    assert_eq!(store.node_count(), 0);
    assert!(store.quads().is_empty());
    assert!(matches!(write_outline(&store), Err(SerializeError::NoRoot)));
}

#[test]
fn test_quad_dump_parses_as_turtle() {
    let (store, _) = sample_store();
    let dump = serialize_quads(store.quads()).unwrap();
    assert!(dump.contains("http://purl.org/dc/terms/title"));

    // The dump is plain N-Triples-style Turtle; it must at least be well formed
    let records = parse_outline(&dump, store.vocabulary()).unwrap();
    assert_eq!(records.len(), store.node_count());
}
