//! Metadata records for tables and fields.
//!
//! The compiler never talks to a database: it resolves `field-id` and
//! `source-table` references against an in-memory [`MetadataStore`] that
//! callers populate up front. Records are deliberately small - just what
//! identifier construction and emission-time rewrites need.

mod store;

pub use store::MetadataStore;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseId(pub i64);

/// Identifier of a table record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub i64);

/// Identifier of a field record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub i64);

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A table record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    /// True when `name` is a query alias rather than a physical table.
    /// Aliased records never qualify with a schema.
    #[serde(default)]
    pub alias: bool,
}

impl Table {
    pub fn new(id: TableId, name: &str) -> Self {
        Self {
            id,
            name: name.into(),
            schema: None,
            alias: false,
        }
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// A synthetic record that shadows table `id` under a query alias.
    pub fn aliased(id: TableId, alias: &str) -> Self {
        Self {
            id,
            name: alias.into(),
            schema: None,
            alias: true,
        }
    }
}

/// A field (column) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub table_id: TableId,
    pub base_type: BaseType,
    #[serde(default)]
    pub special_type: Option<SpecialType>,
}

impl Field {
    pub fn new(id: FieldId, name: &str, table_id: TableId, base_type: BaseType) -> Self {
        Self {
            id,
            name: name.into(),
            table_id,
            base_type,
            special_type: None,
        }
    }

    pub fn with_special_type(mut self, special_type: SpecialType) -> Self {
        self.special_type = Some(special_type);
        self
    }
}

/// Storage type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaseType {
    Integer,
    BigInteger,
    Float,
    Decimal,
    Text,
    Boolean,
    Date,
    DateTime,
    Time,
}

/// Semantic tag on a field. Only the UNIX-timestamp tags trigger
/// emission-time rewrites; the rest are carried for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialType {
    Pk,
    Fk,
    Name,
    Category,
    UnixTimestampSeconds,
    UnixTimestampMilliseconds,
}

impl SpecialType {
    /// The UNIX timestamp resolution this tag implies, if any.
    pub fn timestamp_resolution(&self) -> Option<TimestampResolution> {
        match self {
            SpecialType::UnixTimestampSeconds => Some(TimestampResolution::Seconds),
            SpecialType::UnixTimestampMilliseconds => Some(TimestampResolution::Milliseconds),
            _ => None,
        }
    }
}

/// Resolution of a UNIX timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampResolution {
    Seconds,
    Milliseconds,
}
