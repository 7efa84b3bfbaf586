//! Serializer: walks the live graph and emits interchange statements.
//!
//! Export holds no lock over its run: a concurrent mutation can yield a
//! torn snapshot. Header and footer comments carry counts and timing and
//! are cosmetic only; the importer strips them before parsing.

use super::value::{encode_identifier, encode_value};
use super::{is_cypher_path, CypherError, CypherResult};
use crate::graph::{Direction, GraphStore, NodeId, PropertyMap, PropertyValue};
use crate::kv::KvStore;
use chrono::Utc;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Export options
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Label used when a node carries no `__label` property
    pub default_node_label: String,
    /// Relationship type used when an edge carries no `type`/`__type`
    /// property
    pub default_rel_type: String,
    /// Emit trailing per-statement comments
    pub include_comments: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            default_node_label: "Node".to_string(),
            default_rel_type: "CONNECTED_TO".to_string(),
            include_comments: true,
        }
    }
}

/// Counts and timing for one export call
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportStats {
    pub nodes_exported: u64,
    pub edges_exported: u64,
    /// Wall-clock seconds spent generating the script
    pub elapsed_secs: f64,
}

/// Serializes a graph store into interchange text
pub struct CypherExporter<'a, S: KvStore> {
    graph: &'a GraphStore<S>,
    options: ExportOptions,
}

impl<'a, S: KvStore> CypherExporter<'a, S> {
    pub fn new(graph: &'a GraphStore<S>) -> Self {
        CypherExporter { graph, options: ExportOptions::default() }
    }

    pub fn with_options(graph: &'a GraphStore<S>, options: ExportOptions) -> Self {
        CypherExporter { graph, options }
    }

    /// Generate the full script and its stats.
    pub fn generate(&self) -> CypherResult<(String, ExportStats)> {
        let started = Instant::now();
        let mut stats = ExportStats::default();
        let nodes = self.node_statements(&mut stats)?;
        let edges = self.edge_statements(&mut stats)?;
        stats.elapsed_secs = started.elapsed().as_secs_f64();

        let mut script = String::new();
        script.push_str(&self.header(&stats));
        if !nodes.is_empty() {
            script.push_str("// ==================== nodes ====================\n");
            script.push_str(&nodes.join("\n"));
            script.push('\n');
        }
        if !edges.is_empty() {
            script.push_str("\n// ==================== relationships ====================\n");
            script.push_str(&edges.join("\n"));
            script.push('\n');
        }
        script.push_str(&self.footer(&stats));

        info!(
            nodes = stats.nodes_exported,
            edges = stats.edges_exported,
            "cypher export finished"
        );
        Ok((script, stats))
    }

    /// Generate and write the script to `target`.
    pub fn write_to(&self, mut target: impl Write) -> CypherResult<ExportStats> {
        let (script, stats) = self.generate()?;
        target.write_all(script.as_bytes())?;
        Ok(stats)
    }

    /// Generate and write the script to a `.cypher` file. Creating parent
    /// directories is the caller's concern.
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> CypherResult<ExportStats> {
        let path = path.as_ref();
        if !is_cypher_path(path) {
            return Err(CypherError::InvalidTarget(path.to_path_buf()));
        }
        let (script, stats) = self.generate()?;
        fs::write(path, script)?;
        Ok(stats)
    }

    /// One CREATE statement per live node. Deleted ids leave gaps in the
    /// counter range and are skipped.
    fn node_statements(&self, stats: &mut ExportStats) -> CypherResult<Vec<String>> {
        let mut statements = Vec::new();
        for raw in 1..=self.graph.last_node_id()? {
            let id = NodeId::new(raw);
            let Some(properties) = self.graph.get_node(id)? else {
                continue;
            };
            statements.push(self.format_node(id, properties));
            stats.nodes_exported += 1;
        }
        Ok(statements)
    }

    fn format_node(&self, id: NodeId, mut properties: PropertyMap) -> String {
        let label = match properties.shift_remove("__label") {
            Some(PropertyValue::String(label)) => label,
            _ => self.options.default_node_label.clone(),
        };
        // the store id rides along so the importer can rebuild edges
        properties.insert("__id".to_string(), PropertyValue::Int(id.as_u64() as i64));

        let mut statement = format!("CREATE (n{}:{}", id, label);
        let props = format_properties(&properties);
        if !props.is_empty() {
            statement.push_str(&format!(" {{{}}}", props));
        }
        statement.push_str(");");
        if self.options.include_comments {
            statement.push_str(&format!(" // node {}", id));
        }
        statement
    }

    /// One MATCH + CREATE statement per edge, walking every live node's
    /// out-adjacency. The seen-set drops a (from, to) pair the scan would
    /// otherwise revisit.
    fn edge_statements(&self, stats: &mut ExportStats) -> CypherResult<Vec<String>> {
        let mut statements = Vec::new();
        let mut seen: FxHashSet<(u64, u64)> = FxHashSet::default();
        for raw in 1..=self.graph.last_node_id()? {
            let from = NodeId::new(raw);
            if !self.graph.node_exists(from)? {
                continue;
            }
            for (to, weight) in self.graph.adjacency(from, Direction::Out)? {
                if !seen.insert((from.as_u64(), to.as_u64())) {
                    continue;
                }
                let mut properties = self.graph.get_edge(from, to)?.unwrap_or_default();
                properties.insert("weight".to_string(), PropertyValue::Float(weight));
                statements.push(self.format_edge(from, to, properties));
                stats.edges_exported += 1;
            }
        }
        Ok(statements)
    }

    fn format_edge(&self, from: NodeId, to: NodeId, mut properties: PropertyMap) -> String {
        // `type` wins over `__type`; both are mechanism fields and neither
        // survives as an ordinary property
        let type_prop = properties.shift_remove("type");
        let dunder_type = properties.shift_remove("__type");
        let rel_type = string_prop(type_prop)
            .or_else(|| string_prop(dunder_type))
            .unwrap_or_else(|| self.options.default_rel_type.clone());

        let mut statement =
            format!("MATCH (from {{__id: {}}}), (to {{__id: {}}})\nCREATE (from)-[r:{}", from, to, rel_type);
        let props = format_properties(&properties);
        if !props.is_empty() {
            statement.push_str(&format!(" {{{}}}", props));
        }
        statement.push_str("]->(to);");
        if self.options.include_comments {
            statement.push_str(&format!(" // edge {} -> {}", from, to));
        }
        statement
    }

    fn header(&self, stats: &ExportStats) -> String {
        format!(
            "// ====================================================================\n\
             // kvgraph cypher export\n\
             // Generated: {}\n\
             // Nodes: {}, Edges: {}\n\
             // ====================================================================\n\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            stats.nodes_exported,
            stats.edges_exported
        )
    }

    fn footer(&self, stats: &ExportStats) -> String {
        format!(
            "\n// ====================================================================\n\
             // Export completed\n\
             // Exported nodes: {}\n\
             // Exported edges: {}\n\
             // Export time: {:.4}s\n\
             // ====================================================================\n",
            stats.nodes_exported, stats.edges_exported, stats.elapsed_secs
        )
    }
}

fn string_prop(value: Option<PropertyValue>) -> Option<String> {
    match value {
        Some(PropertyValue::String(s)) => Some(s),
        _ => None,
    }
}

fn format_properties(properties: &PropertyMap) -> String {
    properties
        .iter()
        .map(|(key, value)| format!("{}: {}", encode_identifier(key), encode_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}
