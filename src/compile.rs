//! High-level compilation from MBQL to SQL text.
//!
//! ```text
//! OuterQuery → translation (clause orchestrator) → sql::Query → (text, params)
//! ```
//!
//! # Example
//!
//! ```
//! use mbql::compile::mbql_to_native;
//! use mbql::mbql::{FieldRef, InnerQuery, OuterQuery};
//! use mbql::metadata::{BaseType, DatabaseId, Field, FieldId, MetadataStore, Table, TableId};
//! use mbql::sql::dialect::Ansi;
//!
//! let mut store = MetadataStore::new();
//! store.add_table(Table::new(TableId(1), "orders").with_schema("public"));
//! store.add_field(Field::new(FieldId(10), "id", TableId(1), BaseType::Integer));
//!
//! let query = OuterQuery {
//!     database: DatabaseId(1),
//!     query: InnerQuery {
//!         source_table: Some(TableId(1)),
//!         fields: vec![FieldRef::field(10)],
//!         ..InnerQuery::default()
//!     },
//! };
//!
//! let compiled = mbql_to_native(&Ansi, &store, &query).unwrap();
//! assert_eq!(
//!     compiled.query,
//!     r#"SELECT "public"."orders"."id" FROM "public"."orders""#
//! );
//! assert!(compiled.params.is_empty());
//! ```

use crate::error::{QueryError, QueryResult};
use crate::mbql::OuterQuery;
use crate::metadata::MetadataStore;
use crate::sql::dialect::SqlDialect;
use crate::sql::query::Query;
use crate::sql::token::SqlParam;
use crate::translation::{self, Context};

/// A compiled query: SQL text plus positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// The rendered SQL.
    pub query: String,
    /// Parameter values, in placeholder order.
    pub params: Vec<SqlParam>,
}

/// Compile an outer query to SQL text and positional parameters.
pub fn mbql_to_native(
    dialect: &dyn SqlDialect,
    store: &MetadataStore,
    outer: &OuterQuery,
) -> QueryResult<CompiledQuery> {
    let ast = mbql_to_sql_ast(dialect, store, outer)?;
    tracing::debug!(dialect = dialect.name(), ast = ?ast, "compiled SQL AST");
    let (query, params) = ast.to_sql(dialect).map_err(|cause| QueryError::SqlFormat {
        ast: format!("{:#?}", ast),
        cause: cause.to_string(),
    })?;
    Ok(CompiledQuery { query, params })
}

/// Compile an outer query to the SQL AST, stopping before textualization.
/// Useful to embedders that post-process the query and to tests asserting
/// on structure.
pub fn mbql_to_sql_ast(
    dialect: &dyn SqlDialect,
    store: &MetadataStore,
    outer: &OuterQuery,
) -> QueryResult<Query> {
    let ctx = Context::new(store, &outer.query);
    translation::build_query(dialect, &ctx, &outer.query)
}
