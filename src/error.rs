//! Unified error type for query compilation.

use std::fmt;

use thiserror::Error;

use crate::metadata::FieldId;

/// Result type for compilation operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while compiling a query.
///
/// There is no local recovery: every error propagates to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// An `expression` reference with no matching entry in the enclosing
    /// query's expressions map.
    #[error("unknown expression '{0}'")]
    UnknownExpression(String),

    /// An aggregation reference out of range at the current nesting level.
    #[error("no aggregation at index {index} (nesting level {level})")]
    UnknownAggregationIndex { index: usize, level: usize },

    /// A foreign-key clause whose fk field matches no join info.
    #[error("no join info matches foreign-key field {0}")]
    MissingJoinInfo(FieldId),

    /// The inner query is structurally unusable.
    #[error("invalid inner query: {0}")]
    InvalidInnerQuery(String),

    /// The formatter failed to render the SQL AST. Includes the
    /// pretty-printed AST for diagnostics.
    #[error("failed to render SQL: {cause}\noffending AST:\n{ast}")]
    SqlFormat { ast: String, cause: String },

    /// A table or field lookup failed in the metadata store.
    #[error("{kind} {id} not found in metadata store")]
    MetadataMiss { kind: MetadataKind, id: i64 },
}

/// The kind of record a metadata lookup was after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    Table,
    Field,
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataKind::Table => write!(f, "table"),
            MetadataKind::Field => write!(f, "field"),
        }
    }
}
