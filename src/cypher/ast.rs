//! Typed statement AST for the interchange subset

use crate::graph::PropertyMap;

/// One parsed interchange statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    NodeCreate(NodeCreate),
    EdgeCreate(EdgeCreate),
}

/// `CREATE (<var>:<label> {<props>?})`
#[derive(Debug, Clone, PartialEq)]
pub struct NodeCreate {
    pub variable: String,
    pub label: String,
    pub properties: PropertyMap,
}

/// One `(<var> {__id: N})` binding of a MATCH clause
#[derive(Debug, Clone, PartialEq)]
pub struct MatchBinding {
    pub variable: String,
    pub original_id: u64,
}

/// `MATCH (<v1> {__id: N1}), (<v2> {__id: N2})
///  CREATE (<v1>)-[<rv>:<TYPE> {<props>?}]->(<v2>)`
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeCreate {
    /// The two MATCH bindings, in clause order
    pub bindings: Vec<MatchBinding>,
    pub from_var: String,
    /// Relationship variable, `[r:TYPE]`; optional, `[:TYPE]` parses too
    pub rel_variable: Option<String>,
    pub rel_type: String,
    pub properties: PropertyMap,
    pub to_var: String,
}
