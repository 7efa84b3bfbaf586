//! kvgraph: a directed, weighted, property-labeled graph on a key-value
//! store.
//!
//! The graph is encoded as counter / field-map / ordered-set records behind
//! the [`kv::KvStore`] contract, traversed with hop-bounded BFS and DFS,
//! and exchanged through a restricted Cypher-style text format (two
//! statement shapes: node creation and matched relationship creation).
//!
//! Everything is synchronous and single-threaded; the only atomicity unit
//! is the store's batched commit. There is no query language and no index
//! beyond the per-node adjacency sets.
//!
//! # Example
//!
//! ```rust
//! use kvgraph::graph::{GraphStore, PropertyMap, PropertyValue};
//! use kvgraph::kv::memory::MemoryStore;
//! use kvgraph::algo::shortest_path;
//!
//! let mut graph = GraphStore::new(MemoryStore::new());
//!
//! let mut props = PropertyMap::new();
//! props.insert("name".to_string(), PropertyValue::from("Alice"));
//! let alice = graph.add_node(props).unwrap();
//! let bob = graph.add_node(PropertyMap::new()).unwrap();
//!
//! graph.add_edge(alice, bob, 1.0, PropertyMap::new()).unwrap();
//! assert!(graph.edge_exists(alice, bob).unwrap());
//!
//! let path = shortest_path(&graph, alice, bob, 6).unwrap().unwrap();
//! assert_eq!(path.distance, 1);
//! ```

pub mod algo;
pub mod cypher;
pub mod graph;
pub mod kv;

// Re-export main types for convenience
pub use algo::{dfs, shortest_path, PathResult, DEFAULT_MAX_DEPTH};
pub use cypher::{
    CypherError, CypherExporter, CypherImporter, CypherResult, ExportOptions, ExportStats,
    ImportOptions, ImportStats,
};
pub use graph::{
    Direction, GraphError, GraphResult, GraphStats, GraphStore, NodeId, PropertyMap,
    PropertyValue, DEFAULT_PAGE_SIZE,
};
pub use kv::memory::MemoryStore;
pub use kv::{Batch, BatchOp, KvError, KvResult, KvStore};
