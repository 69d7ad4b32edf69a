//! The input query language: a nested tree of tagged clauses describing a
//! SELECT.
//!
//! A query is an outer envelope around an [`InnerQuery`], which either names
//! a source table or wraps another inner query (arbitrarily deep). Clause
//! trees are plain data with serde derives, so queries can be built in code
//! or deserialized from their wire shape.

mod aggregation;
mod expression;
mod field;
mod filter;

pub use aggregation::{Aggregation, AggregationOperand};
pub use expression::{ArithmeticOp, Expression, LiteralValue};
pub use field::{BinningOptions, BinningStrategy, DatetimeUnit, FieldRef};
pub use filter::{CompareOp, Filter, StringFilterOptions};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::metadata::{DatabaseId, FieldId, TableId};

/// The outer query envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OuterQuery {
    pub database: DatabaseId,
    pub query: InnerQuery,
}

/// One nesting level of a query.
///
/// Every key is optional; an empty `InnerQuery` is valid data but fails
/// compilation because it has neither a `source-table` nor a `source-query`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct InnerQuery {
    pub source_table: Option<TableId>,
    pub source_query: Option<SourceQuery>,
    pub breakout: Vec<FieldRef>,
    pub aggregation: Vec<Aggregation>,
    pub fields: Vec<FieldRef>,
    pub filter: Option<Filter>,
    pub join_tables: Vec<JoinInfo>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub page: Option<Page>,
    pub expressions: HashMap<String, Expression>,
}

impl InnerQuery {
    /// The physical table underneath this query, found by walking the
    /// source-query chain. `None` for native source queries.
    pub fn source_table_id(&self) -> Option<TableId> {
        if let Some(id) = self.source_table {
            return Some(id);
        }
        match &self.source_query {
            Some(SourceQuery::Query(inner)) => inner.source_table_id(),
            _ => None,
        }
    }
}

/// The source of a nested query: either another clause tree or an opaque
/// native SQL string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceQuery {
    Native(String),
    Query(Box<InnerQuery>),
}

/// An `order-by` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OrderBy {
    pub direction: SortDirection,
    pub field: FieldRef,
}

impl OrderBy {
    pub fn asc(field: FieldRef) -> Self {
        Self {
            direction: SortDirection::Asc,
            field,
        }
    }

    pub fn desc(field: FieldRef) -> Self {
        Self {
            direction: SortDirection::Desc,
            field,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Pagination: `page` is 1-indexed, `items` is the page size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: u64,
    pub page: u64,
}

/// Join information computed by upstream middleware for a foreign-key
/// navigation or an explicit joined source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JoinInfo {
    /// The joined (destination) table.
    pub table_id: TableId,
    /// Alias the joined table is known by within this query.
    pub join_alias: String,
    /// Foreign-key field on the source table.
    pub fk_field_id: FieldId,
    /// Primary-key field on the destination table.
    pub pk_field_id: FieldId,
    /// Present when the join target is itself a query over `table_id`
    /// rather than the bare table.
    #[serde(default)]
    pub source_query: Option<Box<InnerQuery>>,
}
