//! SQL dialect definitions.
//!
//! [`SqlDialect`] is the crate's open dispatch point: the trait's default
//! method bodies are the root `sql` dialect, and every built-in dialect is
//! a unit struct overriding only what differs. The compiler recurses
//! through the trait object at every node, so an override is honored at
//! any depth (a dialect that rewrites `date` sees nested datetime fields
//! inside filters, aggregations, and source queries alike).
//!
//! Override points:
//!
//! - quoting: [`SqlDialect::quote_style`]
//! - time: [`SqlDialect::current_datetime`], [`SqlDialect::date`],
//!   [`SqlDialect::date_interval`], [`SqlDialect::add_interval`],
//!   [`SqlDialect::unix_timestamp_to_timestamp`]
//! - naming: [`SqlDialect::field_to_identifier`],
//!   [`SqlDialect::field_to_alias`], [`SqlDialect::format_custom_field_name`]
//! - compilation: [`SqlDialect::apply_top_level_clause`] and the four
//!   node-family hooks, which default to the compilers in
//!   [`crate::translation`]
//! - pagination: [`SqlDialect::emit_limit_offset`]

mod ansi;
pub mod helpers;
mod h2;
mod mysql;
mod oracle;
mod postgres;
mod sqlserver;

pub use ansi::Ansi;
pub use h2::H2;
pub use mysql::MySql;
pub use oracle::Oracle;
pub use postgres::Postgres;
pub use sqlserver::SqlServer;

use std::fmt;

use crate::error::QueryResult;
use crate::mbql::{Aggregation, DatetimeUnit, Expression, FieldRef, Filter, InnerQuery};
use crate::metadata::{Field, MetadataStore, TimestampResolution};
use crate::translation::{self, ClauseKind, Context};

use super::expr::{func, lit_int, Expr, ExprExt};
use super::query::Query;
use super::token::{Token, TokenStream};

/// Identifier quoting style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteStyle {
    /// Double quotes: `"name"`.
    #[default]
    Ansi,
    /// Backticks: `` `name` ``.
    MySql,
    /// Brackets: `[name]`.
    SqlServer,
    /// Double quotes, Oracle semantics.
    Oracle,
    /// Double quotes, identifier upcased inside them.
    H2,
}

impl QuoteStyle {
    /// Quote an identifier (table, column, alias).
    pub fn quote(&self, ident: &str) -> String {
        match self {
            QuoteStyle::Ansi | QuoteStyle::Oracle => helpers::quote_double(ident),
            QuoteStyle::MySql => helpers::quote_backtick(ident),
            QuoteStyle::SqlServer => helpers::quote_bracket(ident),
            QuoteStyle::H2 => helpers::quote_double(&ident.to_uppercase()),
        }
    }
}

/// A SQL dialect. Default method bodies are the root `sql` dialect;
/// implementations override individual methods and may call the free
/// functions in [`crate::translation`] to reuse the root behavior.
pub trait SqlDialect: fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Quoting
    // =========================================================================

    fn quote_style(&self) -> QuoteStyle {
        QuoteStyle::Ansi
    }

    // =========================================================================
    // Date and time
    // =========================================================================

    /// Expression for the current date and time.
    fn current_datetime(&self) -> Expr {
        func("NOW", vec![])
    }

    /// Truncate a datetime expression to `unit`, or extract `unit` from
    /// it. The root dialect passes the expression through untouched;
    /// concrete dialects specialize.
    fn date(&self, unit: DatetimeUnit, expr: Expr) -> Expr {
        let _ = unit;
        expr
    }

    /// Expression for now offset by `amount` units.
    fn date_interval(&self, unit: DatetimeUnit, amount: i64) -> Expr {
        self.add_interval(self.current_datetime(), amount, unit)
    }

    /// Shift an arbitrary datetime expression by `amount` units.
    fn add_interval(&self, expr: Expr, amount: i64, unit: DatetimeUnit) -> Expr {
        expr.add(Expr::Raw(format!(
            "INTERVAL '{} {}'",
            amount,
            unit.interval_keyword()
        )))
    }

    /// Convert a UNIX timestamp column to a timestamp expression.
    /// Millisecond columns divide by 1000 and recurse at second
    /// resolution, so dialects usually only override the seconds arm.
    fn unix_timestamp_to_timestamp(&self, expr: Expr, resolution: TimestampResolution) -> Expr {
        match resolution {
            TimestampResolution::Seconds => func("TO_TIMESTAMP", vec![expr]),
            TimestampResolution::Milliseconds => {
                self.unix_timestamp_to_timestamp(expr.div(lit_int(1000)), TimestampResolution::Seconds)
            }
        }
    }

    // =========================================================================
    // Naming
    // =========================================================================

    /// Qualified identifier for a stored field.
    fn field_to_identifier(&self, store: &MetadataStore, field: &Field) -> QueryResult<Expr> {
        translation::expression::field_identifier(store, field)
    }

    /// Select-list alias for a stored field. `None` suppresses the alias.
    fn field_to_alias(&self, field: &Field) -> Option<String> {
        Some(field.name.clone())
    }

    /// Adjust a computed column name to the dialect's rules (length
    /// limits, case folding).
    fn format_custom_field_name(&self, name: &str) -> String {
        name.to_string()
    }

    // =========================================================================
    // Compilation hooks
    // =========================================================================

    /// Fold one top-level clause into the accumulating query. The default
    /// applies the standard clause appliers; a dialect can intercept a
    /// clause kind and delegate the rest back to
    /// [`translation::apply_standard_clause`].
    fn apply_top_level_clause<'a>(
        &self,
        ctx: &Context<'a>,
        kind: ClauseKind,
        query: Query,
        inner: &'a InnerQuery,
    ) -> QueryResult<Query> {
        translation::apply_standard_clause(self, ctx, kind, query, inner)
    }

    /// Compile a field reference.
    fn field_to_expr(&self, ctx: &Context<'_>, field: &FieldRef) -> QueryResult<Expr> {
        translation::expression::compile_field(self, ctx, field)
    }

    /// Compile an expression.
    fn expression_to_expr(&self, ctx: &Context<'_>, expression: &Expression) -> QueryResult<Expr> {
        translation::expression::compile_expression(self, ctx, expression)
    }

    /// Compile a filter clause.
    fn filter_to_expr(&self, ctx: &Context<'_>, filter: &Filter) -> QueryResult<Expr> {
        translation::filter::compile_filter(self, ctx, filter)
    }

    /// Compile an aggregation clause.
    fn aggregation_to_expr(&self, ctx: &Context<'_>, aggregation: &Aggregation) -> QueryResult<Expr> {
        translation::aggregation::compile_aggregation(self, ctx, aggregation)
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit LIMIT/OFFSET or the dialect's equivalent.
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        let mut ts = TokenStream::new();
        if let Some(limit) = limit {
            ts.push(Token::Limit).space().push(Token::LitInt(limit as i64));
        }
        if let Some(offset) = offset {
            if limit.is_some() {
                ts.space();
            }
            ts.push(Token::Offset)
                .space()
                .push(Token::LitInt(offset as i64));
        }
        ts
    }
}
