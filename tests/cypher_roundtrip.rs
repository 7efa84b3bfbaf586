//! Interchange round-trip: export a graph, import the script into an empty
//! store, and check the result is the same graph up to id renumbering.

use kvgraph::cypher::{CypherError, CypherExporter, CypherImporter, ImportOptions};
use kvgraph::graph::{Direction, GraphStore, NodeId, PropertyMap, PropertyValue};
use kvgraph::kv::memory::MemoryStore;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn props(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn find_by_name(graph: &GraphStore<MemoryStore>, name: &str) -> (NodeId, PropertyMap) {
    for raw in 1..=graph.last_node_id().unwrap() {
        let id = NodeId::new(raw);
        if let Some(map) = graph.get_node(id).unwrap() {
            if map.get("name") == Some(&PropertyValue::from(name)) {
                return (id, map);
            }
        }
    }
    panic!("no node named {}", name);
}

/// Build a graph exercising every value variant, export it, import the
/// script into a fresh store, and verify properties, labels, weights and
/// topology all survived.
#[test]
fn roundtrip_preserves_content_and_topology() {
    init_tracing();
    let mut source = GraphStore::new(MemoryStore::new());
    let bio = "line one\nsaid \"quote\" and back\\slash\ttab".to_string();
    let alice = source
        .add_node(props(&[
            ("__label", "Person".into()),
            ("name", "Alice".into()),
            ("age", PropertyValue::Int(30)),
            ("score", PropertyValue::Float(4.0)),
            ("bio", PropertyValue::String(bio.clone())),
            (
                "tags",
                PropertyValue::List(vec![
                    "a,b".into(),
                    PropertyValue::Int(7),
                    PropertyValue::List(vec![PropertyValue::Null, PropertyValue::Bool(true)]),
                ]),
            ),
        ]))
        .unwrap();
    let bob = source
        .add_node(props(&[
            ("__label", "Person".into()),
            ("name", "Bob".into()),
            ("active", PropertyValue::Bool(true)),
            ("nickname", PropertyValue::Null),
        ]))
        .unwrap();
    let hub = source.add_node(PropertyMap::new()).unwrap();

    source
        .add_edge(alice, bob, 1.5, props(&[("__type", "FRIEND".into()), ("since", PropertyValue::Int(2020))]))
        .unwrap();
    source.add_edge(bob, hub, 2.0, PropertyMap::new()).unwrap();

    let (script, export_stats) = CypherExporter::new(&source).generate().unwrap();
    assert_eq!(export_stats.nodes_exported, 3);
    assert_eq!(export_stats.edges_exported, 2);

    let mut target = GraphStore::new(MemoryStore::new());
    let import_stats = CypherImporter::new(&mut target).import_str(&script).unwrap();
    assert_eq!(import_stats.nodes_created, 3);
    assert_eq!(import_stats.edges_created, 2);
    assert_eq!(import_stats.statements_processed, 5);
    assert!(import_stats.errors.is_empty());

    // node content survives byte-for-byte
    let (alice2, alice_map) = find_by_name(&target, "Alice");
    assert_eq!(alice_map.get("__label"), Some(&PropertyValue::from("Person")));
    assert_eq!(alice_map.get("age"), Some(&PropertyValue::Int(30)));
    assert_eq!(alice_map.get("score"), Some(&PropertyValue::Float(4.0)));
    assert_eq!(alice_map.get("bio"), Some(&PropertyValue::String(bio)));
    assert_eq!(
        alice_map.get("tags"),
        Some(&PropertyValue::List(vec![
            "a,b".into(),
            PropertyValue::Int(7),
            PropertyValue::List(vec![PropertyValue::Null, PropertyValue::Bool(true)]),
        ]))
    );
    // the export-side __id never lands in the imported property map
    assert!(alice_map.get("__id").is_none());

    let (bob2, bob_map) = find_by_name(&target, "Bob");
    assert_eq!(bob_map.get("active"), Some(&PropertyValue::Bool(true)));
    assert_eq!(bob_map.get("nickname"), Some(&PropertyValue::Null));

    // topology and weights survive; edge types travel as __type
    assert_eq!(target.adjacency(alice2, Direction::Out).unwrap(), vec![(bob2, 1.5)]);
    let friend = target.get_edge(alice2, bob2).unwrap().unwrap();
    assert_eq!(friend.get("__type"), Some(&PropertyValue::from("FRIEND")));
    assert_eq!(friend.get("since"), Some(&PropertyValue::Int(2020)));
    assert!(friend.get("weight").is_none());

    // the untyped edge got the default relationship tag
    let out = target.adjacency(bob2, Direction::Out).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].1, 2.0);
    let untyped = target.get_edge(bob2, out[0].0).unwrap().unwrap();
    assert_eq!(untyped.get("__type"), Some(&PropertyValue::from("CONNECTED_TO")));
}

/// Importing the same script twice into one store must renumber: the second
/// pass creates a second disjoint copy, never touching the first.
#[test]
fn import_renumbers_into_fresh_ids() {
    let mut source = GraphStore::new(MemoryStore::new());
    let a = source.add_node(props(&[("name", "A".into())])).unwrap();
    let b = source.add_node(props(&[("name", "B".into())])).unwrap();
    source.add_edge(a, b, 1.0, PropertyMap::new()).unwrap();
    let (script, _) = CypherExporter::new(&source).generate().unwrap();

    let mut target = GraphStore::new(MemoryStore::new());
    CypherImporter::new(&mut target).import_str(&script).unwrap();
    CypherImporter::new(&mut target).import_str(&script).unwrap();

    let stats = target.stats().unwrap();
    assert_eq!(stats.nodes, 4);
    assert_eq!(stats.edges, 2);
}

#[test]
fn import_from_handwritten_script() {
    let content = r#"
        // a couple of people
        CREATE (n1:Person {name: "Alice", age: 30, __id: 1});
        CREATE (n2:Person {name: "Bob", age: 25, __id: 2});
        MATCH (from {__id: 1}), (to {__id: 2})
        CREATE (from)-[r:FRIEND {weight: 1.0}]->(to);
    "#;

    let mut graph = GraphStore::new(MemoryStore::new());
    let stats = CypherImporter::new(&mut graph).import_str(content).unwrap();
    assert_eq!(stats.nodes_created, 2);
    assert_eq!(stats.edges_created, 1);

    let (alice, _) = find_by_name(&graph, "Alice");
    let (bob, _) = find_by_name(&graph, "Bob");
    assert!(graph.edge_exists(alice, bob).unwrap());
}

#[test]
fn unmapped_id_aborts_by_default() {
    let content = r#"
        CREATE (n1:Person {name: "Alice", __id: 1});
        MATCH (from {__id: 1}), (to {__id: 99})
        CREATE (from)-[r:FRIEND]->(to);
        CREATE (n3:Person {name: "Carol", __id: 3});
    "#;

    let mut graph = GraphStore::new(MemoryStore::new());
    let result = CypherImporter::new(&mut graph).import_str(content);
    assert!(matches!(result, Err(CypherError::UnmappedId(99))));

    // no rollback: the statement before the failure stays applied
    assert_eq!(graph.stats().unwrap().nodes, 1);
}

#[test]
fn continue_on_error_collects_and_proceeds() {
    let content = r#"
        CREATE (n1:Person {name: "Alice", __id: 1});
        CREATE (broken;
        MATCH (from {__id: 1}), (to {__id: 99})
        CREATE (from)-[r:X]->(to);
        CREATE (n2:Person {name: "Bob", __id: 2});
        MATCH (from {__id: 1}), (to {__id: 2})
        CREATE (from)-[r:FRIEND]->(to);
    "#;

    let mut graph = GraphStore::new(MemoryStore::new());
    let options = ImportOptions { continue_on_error: true };
    let stats = CypherImporter::with_options(&mut graph, options).import_str(content).unwrap();

    assert_eq!(stats.nodes_created, 2);
    assert_eq!(stats.edges_created, 1);
    assert_eq!(stats.errors.len(), 2);
    assert_eq!(stats.statements_processed, 3);

    let (alice, _) = find_by_name(&graph, "Alice");
    let (bob, _) = find_by_name(&graph, "Bob");
    assert!(graph.edge_exists(alice, bob).unwrap());
}

/// The id mapping is scoped to one import call: a second call cannot see
/// ids mapped by the first.
#[test]
fn id_mapping_does_not_leak_across_calls() {
    let mut graph = GraphStore::new(MemoryStore::new());
    CypherImporter::new(&mut graph)
        .import_str(r#"CREATE (n1:Person {name: "Alice", __id: 1});"#)
        .unwrap();

    let edge_only = "MATCH (a {__id: 1}), (b {__id: 1}) CREATE (a)-[r:SELF]->(b);";
    let result = CypherImporter::new(&mut graph).import_str(edge_only);
    assert!(matches!(result, Err(CypherError::UnmappedId(1))));
}

#[test]
fn file_roundtrip_with_extension_checks() {
    let dir = tempfile::tempdir().unwrap();

    let mut source = GraphStore::new(MemoryStore::new());
    let a = source.add_node(props(&[("name", "A".into())])).unwrap();
    let b = source.add_node(props(&[("name", "B".into())])).unwrap();
    source.add_edge(a, b, 1.0, props(&[("__type", "LINK".into())])).unwrap();

    let exporter = CypherExporter::new(&source);

    // wrong extension is rejected before anything is written
    let bad = dir.path().join("graph.txt");
    assert!(matches!(exporter.export_to_file(&bad), Err(CypherError::InvalidTarget(_))));
    assert!(!bad.exists());

    let path = dir.path().join("graph.cypher");
    let stats = exporter.export_to_file(&path).unwrap();
    assert_eq!(stats.nodes_exported, 2);

    let mut target = GraphStore::new(MemoryStore::new());
    let mut importer = CypherImporter::new(&mut target);
    assert!(matches!(
        importer.import_file(dir.path().join("missing.cypher")),
        Err(CypherError::SourceNotFound(_))
    ));
    let import_stats = importer.import_file(&path).unwrap();
    assert_eq!(import_stats.nodes_created, 2);
    assert_eq!(import_stats.edges_created, 1);
}
