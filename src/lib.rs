//! # mbql
//!
//! A query compiler: translates MBQL - a nested tree representation of a
//! SELECT-style analytic query - into a SQL string plus positional
//! parameter vector, parameterized over an open set of SQL dialects.
//!
//! ## Quick Start
//!
//! ```
//! use mbql::prelude::*;
//!
//! let mut store = MetadataStore::new();
//! store.add_table(Table::new(TableId(1), "orders").with_schema("public"));
//! store.add_field(Field::new(FieldId(11), "status", TableId(1), BaseType::Text));
//!
//! let query = OuterQuery {
//!     database: DatabaseId(1),
//!     query: InnerQuery {
//!         source_table: Some(TableId(1)),
//!         breakout: vec![FieldRef::field(11)],
//!         aggregation: vec![Aggregation::count()],
//!         ..InnerQuery::default()
//!     },
//! };
//!
//! let compiled = mbql_to_native(&Postgres, &store, &query).unwrap();
//! assert_eq!(
//!     compiled.query,
//!     "SELECT \"public\".\"orders\".\"status\", COUNT(*) AS \"count\" \
//!      FROM \"public\".\"orders\" GROUP BY \"public\".\"orders\".\"status\""
//! );
//! ```
//!
//! ## Architecture
//!
//! The compiler is a staged, pure tree rewrite:
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────────┐   ┌────────────────────┐
//! │  mbql clause │ → │ translation (clause   │ → │ sql::Query tokens  │
//! │  trees       │   │ appliers + expression │   │ → (text, params)   │
//! │              │   │ compiler)             │   │                    │
//! └──────────────┘   └───────────────────────┘   └────────────────────┘
//!          ▲                    ▲
//!          │                    │
//!   metadata store       SqlDialect hooks
//!   (scoped overrides)   (open recursion)
//! ```
//!
//! Field references resolve against the [`metadata::MetadataStore`];
//! foreign-key navigation and nested source queries shadow table records
//! with scoped overrides so identifiers qualify against the right alias.
//! Every node compiles through the [`sql::dialect::SqlDialect`] hooks, so
//! a dialect can override the rendering of any node at any depth.

pub mod compile;
pub mod error;
pub mod mbql;
pub mod metadata;
pub mod sql;
pub mod translation;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{mbql_to_native, mbql_to_sql_ast, CompiledQuery};
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::mbql::{
        Aggregation, AggregationOperand, ArithmeticOp, BinningOptions, BinningStrategy, CompareOp,
        DatetimeUnit, Expression, FieldRef, Filter, InnerQuery, JoinInfo, LiteralValue, OrderBy,
        OuterQuery, Page, SortDirection, SourceQuery, StringFilterOptions,
    };
    pub use crate::metadata::{
        BaseType, DatabaseId, Field, FieldId, MetadataStore, SpecialType, Table, TableId,
    };
    pub use crate::sql::dialect::{Ansi, MySql, Oracle, Postgres, QuoteStyle, SqlDialect, SqlServer, H2};
    pub use crate::sql::SqlParam;
}

// Also export the entry points and dialect trait at the crate root.
pub use compile::{mbql_to_native, mbql_to_sql_ast, CompiledQuery};
pub use error::{QueryError, QueryResult};
pub use sql::dialect::SqlDialect;
