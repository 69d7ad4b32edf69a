//! Translation of MBQL queries to the SQL AST.
//!
//! The orchestrator folds the top-level clauses of an inner query into a
//! [`Query`] in a fixed order, recursing into nested source queries. All
//! node compilation goes through the dialect's hooks, so dialects can
//! override the rendering of any clause or node.

pub mod aggregation;
pub mod alias;
pub mod annotate;
mod context;
pub mod expression;
pub mod filter;

pub use context::Context;

use crate::error::{QueryError, QueryResult};
use crate::mbql::{InnerQuery, SortDirection, SourceQuery};
use crate::metadata::Table;
use crate::sql::dialect::SqlDialect;
use crate::sql::expr::ExprExt;
use crate::sql::query::{FromSource, OrderByExpr, Query, SelectExpr, TableRef};
use crate::sql::token::escape_dots;

/// Alias nested source queries are known by in their outer query.
pub const SOURCE_ALIAS: &str = "source";

/// The top-level clause kinds, in no particular order; application order
/// is [`CLAUSE_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    SourceTable,
    Breakout,
    Aggregation,
    Fields,
    Filter,
    JoinTables,
    OrderBy,
    Page,
    Limit,
}

/// Fixed clause-application order. Output is deterministic regardless of
/// how the input was built.
const CLAUSE_ORDER: [ClauseKind; 9] = [
    ClauseKind::SourceTable,
    ClauseKind::Breakout,
    ClauseKind::Aggregation,
    ClauseKind::Fields,
    ClauseKind::Filter,
    ClauseKind::JoinTables,
    ClauseKind::OrderBy,
    ClauseKind::Page,
    ClauseKind::Limit,
];

/// Build the SQL AST for one nesting level.
pub fn build_query<'a, D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'a>,
    inner: &'a InnerQuery,
) -> QueryResult<Query> {
    if inner.source_table.is_none() && inner.source_query.is_none() {
        return Err(QueryError::InvalidInnerQuery(
            "a query needs a source-table or a source-query".into(),
        ));
    }
    match &inner.source_query {
        Some(source) => build_nested(dialect, ctx, inner, source),
        None => apply_clauses(dialect, ctx, Query::new(), inner),
    }
}

/// Apply every top-level clause in order, then default an empty SELECT
/// to `*`.
fn apply_clauses<'a, D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'a>,
    mut query: Query,
    inner: &'a InnerQuery,
) -> QueryResult<Query> {
    for kind in CLAUSE_ORDER {
        query = dialect.apply_top_level_clause(ctx, kind, query, inner)?;
    }
    if query.select.is_empty() {
        query.select.push(SelectExpr::new(crate::sql::expr::star()));
    }
    Ok(query)
}

/// Compile a query whose FROM is a nested source query. The source
/// becomes a parenthesized subquery (or native fragment) aliased
/// `source`, and the underlying physical table is rebound to that alias
/// while the outer clauses compile, so outer field references qualify as
/// `source.column`.
fn build_nested<'a, D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'a>,
    inner: &'a InnerQuery,
    source: &'a SourceQuery,
) -> QueryResult<Query> {
    let from = match source {
        SourceQuery::Native(sql) => {
            let stripped = sql.trim_end().trim_end_matches(';').trim_end();
            FromSource::Native {
                sql: stripped.to_string(),
                alias: SOURCE_ALIAS.into(),
            }
        }
        SourceQuery::Query(source_inner) => {
            let nested_ctx = ctx.nested(source_inner);
            let compiled = build_query(dialect, &nested_ctx, source_inner)?;
            FromSource::Subquery {
                query: Box::new(compiled),
                alias: SOURCE_ALIAS.into(),
            }
        }
    };
    let query = Query::new().from_source(from);

    match inner.source_table_id() {
        Some(table_id) => {
            let store = ctx.store();
            store.with_pushed_scope(|| {
                store.store_table(Table::aliased(table_id, SOURCE_ALIAS));
                apply_clauses(dialect, ctx, query, inner)
            })
        }
        // Native sources have no table record to rebind; outer references
        // are field-literals.
        None => apply_clauses(dialect, ctx, query, inner),
    }
}

/// The standard clause appliers - the root dialect's
/// `apply_top_level_clause`.
pub fn apply_standard_clause<'a, D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'a>,
    kind: ClauseKind,
    query: Query,
    inner: &'a InnerQuery,
) -> QueryResult<Query> {
    match kind {
        ClauseKind::SourceTable => apply_source_table(ctx, query, inner),
        ClauseKind::Breakout => apply_breakout(dialect, ctx, query, inner),
        ClauseKind::Aggregation => apply_aggregation(dialect, ctx, query, inner),
        ClauseKind::Fields => apply_fields(dialect, ctx, query, inner),
        ClauseKind::Filter => apply_filter(dialect, ctx, query, inner),
        ClauseKind::JoinTables => apply_join_tables(dialect, ctx, query, inner),
        ClauseKind::OrderBy => apply_order_by(dialect, ctx, query, inner),
        ClauseKind::Page => apply_page(query, inner),
        ClauseKind::Limit => apply_limit(query, inner),
    }
}

fn apply_source_table(ctx: &Context<'_>, query: Query, inner: &InnerQuery) -> QueryResult<Query> {
    let Some(table_id) = inner.source_table else {
        return Ok(query);
    };
    let table = ctx.store().table(table_id)?;
    let schema = if table.alias {
        None
    } else {
        table.schema.filter(|schema| !schema.is_empty())
    };
    Ok(query.from_source(FromSource::Table(TableRef {
        schema,
        table: table.name,
        alias: None,
    })))
}

/// Breakout columns join the select list (unless already selected by the
/// fields clause) and always join GROUP BY.
fn apply_breakout<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    mut query: Query,
    inner: &InnerQuery,
) -> QueryResult<Query> {
    for field in &inner.breakout {
        if !inner.fields.contains(field) {
            query = query.merge_select(alias::select_item(dialect, ctx, field)?);
        }
        query = query.merge_group_by(dialect.field_to_expr(ctx, field)?);
    }
    Ok(query)
}

fn apply_aggregation<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    mut query: Query,
    inner: &InnerQuery,
) -> QueryResult<Query> {
    for aggregation in &inner.aggregation {
        let expr = dialect.aggregation_to_expr(ctx, aggregation)?;
        let name = dialect.format_custom_field_name(&annotate::aggregation_name(aggregation));
        query = query.merge_select(SelectExpr {
            expr,
            alias: Some(escape_dots(&name)),
        });
    }
    Ok(query)
}

fn apply_fields<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    mut query: Query,
    inner: &InnerQuery,
) -> QueryResult<Query> {
    for field in &inner.fields {
        query = query.merge_select(alias::select_item(dialect, ctx, field)?);
    }
    Ok(query)
}

fn apply_filter<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    query: Query,
    inner: &InnerQuery,
) -> QueryResult<Query> {
    match &inner.filter {
        Some(filter) => Ok(query.filter(dialect.filter_to_expr(ctx, filter)?)),
        None => Ok(query),
    }
}

/// LEFT JOIN each join table (or join query) on
/// `source.fk = join-alias.pk`.
fn apply_join_tables<'a, D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'a>,
    mut query: Query,
    inner: &'a InnerQuery,
) -> QueryResult<Query> {
    for join in &inner.join_tables {
        let fk_field = ctx.store().field(join.fk_field_id)?;
        let pk_field = ctx.store().field(join.pk_field_id)?;
        let fk = dialect.field_to_identifier(ctx.store(), &fk_field)?;
        let pk = crate::sql::expr::Expr::Identifier {
            schema: None,
            table: Some(join.join_alias.clone()),
            column: pk_field.name,
        };

        let target = match &join.source_query {
            None => {
                let table = ctx.store().table(join.table_id)?;
                let schema = if table.alias {
                    None
                } else {
                    table.schema.filter(|schema| !schema.is_empty())
                };
                FromSource::Table(TableRef {
                    schema,
                    table: table.name,
                    alias: Some(join.join_alias.clone()),
                })
            }
            Some(source_inner) => {
                let nested_ctx = ctx.nested(source_inner);
                let compiled = build_query(dialect, &nested_ctx, source_inner)?;
                FromSource::Subquery {
                    query: Box::new(compiled),
                    alias: join.join_alias.clone(),
                }
            }
        };

        query = query.left_join(target, fk.eq(pk));
    }
    Ok(query)
}

fn apply_order_by<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    mut query: Query,
    inner: &InnerQuery,
) -> QueryResult<Query> {
    for order in &inner.order_by {
        let expr = dialect.field_to_expr(ctx, &order.field)?;
        query = query.merge_order_by(match order.direction {
            SortDirection::Asc => OrderByExpr::asc(expr),
            SortDirection::Desc => OrderByExpr::desc(expr),
        });
    }
    Ok(query)
}

/// `page` is 1-indexed: LIMIT items OFFSET items * (page - 1).
fn apply_page(query: Query, inner: &InnerQuery) -> QueryResult<Query> {
    match &inner.page {
        Some(page) => Ok(query
            .limit(page.items)
            .offset(page.items * page.page.saturating_sub(1))),
        None => Ok(query),
    }
}

fn apply_limit(query: Query, inner: &InnerQuery) -> QueryResult<Query> {
    match inner.limit {
        Some(limit) => Ok(query.limit(limit)),
        None => Ok(query),
    }
}
