//! Importer: applies interchange statements to a graph store.
//!
//! Statements apply independently and in order; there is no cross-statement
//! rollback, so everything created before a failing statement stays.

use super::ast::{EdgeCreate, NodeCreate, Statement};
use super::parser::parse_statement;
use super::{is_cypher_path, CypherError, CypherResult};
use crate::graph::{GraphStore, NodeId, PropertyValue};
use crate::kv::KvStore;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Import options
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Record a failing statement and continue instead of aborting the
    /// whole import
    pub continue_on_error: bool,
}

/// Counts for one import call.
///
/// `errors` is the accumulated per-statement failure list filled under
/// [`ImportOptions::continue_on_error`]; a fatal failure is returned as an
/// error instead, never through this list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportStats {
    pub nodes_created: u64,
    pub edges_created: u64,
    pub statements_processed: u64,
    pub errors: Vec<String>,
}

/// Key in the call-scoped id mapping: a statement variable or an original
/// id embedded in the export.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MapKey {
    Variable(String),
    Original(u64),
}

/// Mapping from statement variables and embedded original export ids to
/// freshly assigned store ids. Created at the start of one import call,
/// discarded at its end; never persisted.
#[derive(Debug, Default)]
struct IdMap {
    entries: HashMap<MapKey, NodeId>,
}

impl IdMap {
    fn record_variable(&mut self, name: String, id: NodeId) {
        self.entries.insert(MapKey::Variable(name), id);
    }

    fn record_original(&mut self, original: u64, id: NodeId) {
        self.entries.insert(MapKey::Original(original), id);
    }

    fn resolve_original(&self, original: u64) -> Option<NodeId> {
        self.entries.get(&MapKey::Original(original)).copied()
    }
}

/// Applies interchange text to a graph store
pub struct CypherImporter<'a, S: KvStore> {
    graph: &'a mut GraphStore<S>,
    options: ImportOptions,
}

impl<'a, S: KvStore> CypherImporter<'a, S> {
    pub fn new(graph: &'a mut GraphStore<S>) -> Self {
        CypherImporter { graph, options: ImportOptions::default() }
    }

    pub fn with_options(graph: &'a mut GraphStore<S>, options: ImportOptions) -> Self {
        CypherImporter { graph, options }
    }

    /// Import from a `.cypher` file.
    pub fn import_file(&mut self, path: impl AsRef<Path>) -> CypherResult<ImportStats> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CypherError::SourceNotFound(path.to_path_buf()));
        }
        if !is_cypher_path(path) {
            return Err(CypherError::InvalidTarget(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        self.import_str(&content)
    }

    /// Import from a string of statements.
    pub fn import_str(&mut self, content: &str) -> CypherResult<ImportStats> {
        let mut stats = ImportStats::default();
        let mut ids = IdMap::default();

        for (index, statement) in split_statements(content).into_iter().enumerate() {
            match self.apply_statement(&statement, &mut ids, &mut stats) {
                Ok(()) => stats.statements_processed += 1,
                Err(err) => {
                    if !self.options.continue_on_error {
                        return Err(err);
                    }
                    stats.errors.push(format!("statement {}: {}", index, err));
                }
            }
        }

        info!(
            nodes = stats.nodes_created,
            edges = stats.edges_created,
            failed = stats.errors.len(),
            "cypher import finished"
        );
        Ok(stats)
    }

    fn apply_statement(
        &mut self,
        statement: &str,
        ids: &mut IdMap,
        stats: &mut ImportStats,
    ) -> CypherResult<()> {
        match parse_statement(statement)? {
            Statement::NodeCreate(node) => self.apply_node(node, ids, stats),
            Statement::EdgeCreate(edge) => self.apply_edge(edge, ids, stats),
        }
    }

    /// Create a brand-new node: the store assigns a fresh id, independent of
    /// the `__id` the statement carried; both the variable and the original
    /// id map to the new id for the rest of this call.
    fn apply_node(
        &mut self,
        node: NodeCreate,
        ids: &mut IdMap,
        stats: &mut ImportStats,
    ) -> CypherResult<()> {
        let NodeCreate { variable, label, mut properties } = node;

        let original_id = match properties.shift_remove("__id") {
            Some(PropertyValue::Int(id)) if id >= 0 => Some(id as u64),
            _ => None,
        };
        properties.insert("__label".to_string(), PropertyValue::String(label));

        let id = self.graph.add_node(properties)?;
        if let Some(original) = original_id {
            ids.record_original(original, id);
        }
        ids.record_variable(variable, id);
        stats.nodes_created += 1;
        Ok(())
    }

    /// Resolve both endpoints strictly through this call's id mapping, then
    /// add the edge. `weight` is pulled out of the properties (default 1.0)
    /// and the relationship type travels as the `__type` property.
    fn apply_edge(
        &mut self,
        edge: EdgeCreate,
        ids: &mut IdMap,
        stats: &mut ImportStats,
    ) -> CypherResult<()> {
        let EdgeCreate { bindings, from_var, rel_type, mut properties, to_var, .. } = edge;

        let mut bound: HashMap<String, NodeId> = HashMap::new();
        for binding in bindings {
            let id = ids
                .resolve_original(binding.original_id)
                .ok_or(CypherError::UnmappedId(binding.original_id))?;
            bound.insert(binding.variable, id);
        }
        let from = *bound.get(&from_var).ok_or(CypherError::UnknownVariable(from_var.clone()))?;
        let to = *bound.get(&to_var).ok_or(CypherError::UnknownVariable(to_var.clone()))?;

        let weight = match properties.shift_remove("weight") {
            Some(PropertyValue::Float(w)) => w,
            Some(PropertyValue::Int(w)) => w as f64,
            _ => 1.0,
        };
        properties.insert("__type".to_string(), PropertyValue::String(rel_type));

        self.graph.add_edge(from, to, weight, properties)?;
        stats.edges_created += 1;
        Ok(())
    }
}

/// Strip comments and split on `;`.
///
/// Both passes treat quoted strings and backtick-quoted identifiers as
/// opaque, so a `;`, `//` or `/*` inside them is content. Newlines are
/// ordinary whitespace, which keeps a MATCH clause and its CREATE clause on
/// the next line inside one logical statement.
fn split_statements(content: &str) -> Vec<String> {
    let stripped = strip_comments(content);
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut in_backtick = false;
    let mut escaped = false;

    for c in stripped.chars() {
        if in_string {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if in_backtick {
            current.push(c);
            if c == '`' {
                in_backtick = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                current.push(c);
            }
            '`' => {
                in_backtick = true;
                current.push(c);
            }
            ';' => statements.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    statements.push(current);

    statements
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn strip_comments(content: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    let mut out = String::with_capacity(content.len());
    let mut i = 0;
    let mut in_string = false;
    let mut in_backtick = false;
    let mut escaped = false;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        if in_backtick {
            out.push(c);
            if c == '`' {
                in_backtick = false;
            }
            i += 1;
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            '`' => {
                in_backtick = true;
                out.push(c);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(chars.len());
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}
