//! End-to-end scenario over the store and traversal layers: a small
//! follow-graph, adjacency listings, traversals, then a cascading delete.

use kvgraph::algo::{dfs, shortest_path, DEFAULT_MAX_DEPTH};
use kvgraph::graph::{Direction, GraphStore, NodeId, PropertyMap, PropertyValue};
use kvgraph::kv::memory::MemoryStore;

fn person(name: &str, age: i64) -> PropertyMap {
    let mut props = PropertyMap::new();
    props.insert("__label".to_string(), PropertyValue::from("Person"));
    props.insert("name".to_string(), PropertyValue::from(name));
    props.insert("age".to_string(), PropertyValue::Int(age));
    props
}

fn follow() -> PropertyMap {
    let mut props = PropertyMap::new();
    props.insert("__type".to_string(), PropertyValue::from("FOLLOWS"));
    props
}

struct Fixture {
    graph: GraphStore<MemoryStore>,
    bob: NodeId,
    alice: NodeId,
    tom: NodeId,
    jack: NodeId,
    anni: NodeId,
}

fn fixture() -> Fixture {
    let mut graph = GraphStore::new(MemoryStore::new());
    let bob = graph.add_node(person("Bob", 32)).unwrap();
    let alice = graph.add_node(person("Alice", 28)).unwrap();
    let tom = graph.add_node(person("Tom", 25)).unwrap();
    let jack = graph.add_node(person("Jack", 30)).unwrap();
    let anni = graph.add_node(person("Anni", 27)).unwrap();

    graph.add_edge(bob, alice, 1.0, follow()).unwrap();
    graph.add_edge(alice, tom, 1.0, follow()).unwrap();
    graph.add_edge(tom, jack, 1.0, follow()).unwrap();
    graph.add_edge(jack, anni, 1.0, follow()).unwrap();
    // colleague link, heavier weight
    graph.add_edge(bob, jack, 2.0, PropertyMap::new()).unwrap();

    Fixture { graph, bob, alice, tom, jack, anni }
}

#[test]
fn neighbors_are_weight_ordered() {
    let f = fixture();
    let out = f.graph.neighbors_page(f.bob, Direction::Out, 1).unwrap();
    assert_eq!(out, vec![(f.alice, 1.0), (f.jack, 2.0)]);

    let incoming = f.graph.neighbors_page(f.jack, Direction::In, 1).unwrap();
    assert_eq!(incoming, vec![(f.tom, 1.0), (f.bob, 2.0)]);
}

#[test]
fn dfs_walks_lighter_edges_first() {
    let f = fixture();
    let order = dfs(&f.graph, f.bob, DEFAULT_MAX_DEPTH).unwrap();
    assert_eq!(order, vec![f.bob, f.alice, f.tom, f.jack, f.anni]);
}

#[test]
fn bfs_takes_fewest_hops_not_least_weight() {
    let f = fixture();
    // bob -> jack -> anni is 2 hops; the all-weight-1 route is 4
    let result = shortest_path(&f.graph, f.bob, f.anni, DEFAULT_MAX_DEPTH).unwrap().unwrap();
    assert_eq!(result.distance, 2);
    assert_eq!(result.path, vec![f.bob, f.jack, f.anni]);
}

#[test]
fn bfs_respects_depth_bound() {
    let f = fixture();
    // alice -> tom -> jack -> anni is 3 hops
    assert_eq!(shortest_path(&f.graph, f.alice, f.anni, 2).unwrap(), None);
    assert!(shortest_path(&f.graph, f.alice, f.anni, 3).unwrap().is_some());
}

#[test]
fn cascading_delete_detaches_neighbors() {
    let mut f = fixture();
    f.graph.del_node(f.tom).unwrap();

    assert!(!f.graph.node_exists(f.tom).unwrap());
    assert!(f.graph.node_exists(f.alice).unwrap());
    assert!(f.graph.node_exists(f.jack).unwrap());
    assert!(!f.graph.edge_exists(f.alice, f.tom).unwrap());
    assert!(!f.graph.edge_exists(f.tom, f.jack).unwrap());
    // alice and jack did not become adjacent
    assert!(!f.graph.edge_exists(f.alice, f.jack).unwrap());

    // alice's only outgoing route is gone
    assert_eq!(shortest_path(&f.graph, f.alice, f.anni, DEFAULT_MAX_DEPTH).unwrap(), None);
    // bob still reaches anni through jack
    let result = shortest_path(&f.graph, f.bob, f.anni, DEFAULT_MAX_DEPTH).unwrap().unwrap();
    assert_eq!(result.path, vec![f.bob, f.jack, f.anni]);
}

#[test]
fn delete_and_readd_never_reuses_ids() {
    let mut f = fixture();
    f.graph.del_node(f.anni).unwrap();
    let newcomer = f.graph.add_node(person("Nina", 22)).unwrap();
    assert!(newcomer > f.anni);
    assert!(f.graph.get_node(f.anni).unwrap().is_none());
}
