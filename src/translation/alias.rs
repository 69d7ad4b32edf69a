//! Select-list alias derivation.

use crate::error::QueryResult;
use crate::mbql::FieldRef;
use crate::sql::dialect::SqlDialect;
use crate::sql::expr::Expr;
use crate::sql::query::SelectExpr;
use crate::sql::token::escape_dots;

use super::annotate;
use super::context::Context;

/// The alias a field clause projects under, dot-escaped. `None` means the
/// select item is emitted without an AS clause: field-literals are never
/// re-aliased.
pub fn field_clause_alias<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    field: &FieldRef,
) -> QueryResult<Option<String>> {
    Ok(match field {
        FieldRef::Expression(name) => Some(escape_dots(name)),
        FieldRef::FieldId(id) => dialect
            .field_to_alias(&ctx.store().field(*id)?)
            .map(|alias| escape_dots(&alias)),
        FieldRef::FieldLiteral { .. } => None,
        FieldRef::Fk { dest_field, .. } => field_clause_alias(dialect, ctx, dest_field)?,
        FieldRef::Datetime { field, .. } => field_clause_alias(dialect, ctx, field)?,
        FieldRef::Binned { field, .. } => field_clause_alias(dialect, ctx, field)?,
        FieldRef::Aggregation(index) => Some(escape_dots(&annotate::aggregation_name(
            ctx.aggregation_at(*index)?,
        ))),
    })
}

/// Compile a field clause into a select item. An alias that would merely
/// restate the identifier's column is redundant and suppressed.
pub fn select_item<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    field: &FieldRef,
) -> QueryResult<SelectExpr> {
    let expr = dialect.field_to_expr(ctx, field)?;
    let alias = field_clause_alias(dialect, ctx, field)?;
    let alias = match (&expr, alias) {
        (Expr::Identifier { column, .. }, Some(alias)) if *column == alias => None,
        (_, alias) => alias,
    };
    Ok(SelectExpr { expr, alias })
}
