//! Cypher-subset interchange: serializer, tokenizer/parser, importer.
//!
//! The format is deliberately small: two statement shapes (node creation,
//! matched relationship creation), `;`-terminated, with `//` and `/* */`
//! comments. Reserved property names (`__id`, `__label`, `__type`, `type`,
//! `weight`) are mechanism fields, stripped or repurposed on import and
//! never treated as ordinary user data.

pub mod ast;
pub mod export;
pub mod import;
pub mod lexer;
pub mod parser;
pub mod value;

use crate::graph::GraphError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the interchange layer
#[derive(Error, Debug)]
pub enum CypherError {
    #[error("parse error: {0}")]
    Parse(#[from] parser::ParseError),

    #[error("no node with original id {0} was created by this import")]
    UnmappedId(u64),

    #[error("variable '{0}' is not bound by the MATCH clause")]
    UnknownVariable(String),

    #[error("import source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("target must use the .cypher extension: {}", .0.display())]
    InvalidTarget(PathBuf),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type CypherResult<T> = Result<T, CypherError>;

/// Both the exporter target and the importer source must carry the
/// `.cypher` extension; anything deeper (directories, permissions) is the
/// caller's concern.
pub(crate) fn is_cypher_path(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("cypher"))
}

pub use ast::{EdgeCreate, MatchBinding, NodeCreate, Statement};
pub use export::{CypherExporter, ExportOptions, ExportStats};
pub use import::{CypherImporter, ImportOptions, ImportStats};
pub use parser::{parse_statement, ParseError, ParseResult};
pub use value::{decode_value, encode_identifier, encode_value};
