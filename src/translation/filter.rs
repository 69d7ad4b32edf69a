//! Filter compilation.

use crate::error::{QueryError, QueryResult};
use crate::mbql::{CompareOp, Expression, Filter, LiteralValue, StringFilterOptions};
use crate::sql::dialect::SqlDialect;
use crate::sql::expr::{func, BinaryOperator, Expr, ExprExt, UnaryOperator};

use super::context::Context;

/// Compile a filter clause to a boolean SQL expression.
pub fn compile_filter<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    filter: &Filter,
) -> QueryResult<Expr> {
    match filter {
        Filter::And(filters) => combine(dialect, ctx, filters, BinaryOperator::And),
        Filter::Or(filters) => combine(dialect, ctx, filters, BinaryOperator::Or),

        Filter::Not(inner) => Ok(Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr: Box::new(dialect.filter_to_expr(ctx, inner)?),
        }),

        Filter::Compare { op, lhs, rhs } => {
            let lhs = dialect.expression_to_expr(ctx, lhs)?;
            let rhs = dialect.expression_to_expr(ctx, rhs)?;
            Ok(lhs.binary(comparison_operator(*op), rhs))
        }

        Filter::Between { expr, lower, upper } => Ok(Expr::Between {
            expr: Box::new(dialect.expression_to_expr(ctx, expr)?),
            low: Box::new(dialect.expression_to_expr(ctx, lower)?),
            high: Box::new(dialect.expression_to_expr(ctx, upper)?),
        }),

        Filter::StartsWith {
            field,
            value,
            options,
        } => like_clause(dialect, ctx, field, value, options, |v| format!("{}%", v)),

        Filter::Contains {
            field,
            value,
            options,
        } => like_clause(dialect, ctx, field, value, options, |v| format!("%{}%", v)),

        Filter::EndsWith {
            field,
            value,
            options,
        } => like_clause(dialect, ctx, field, value, options, |v| format!("%{}", v)),
    }
}

fn comparison_operator(op: CompareOp) -> BinaryOperator {
    match op {
        CompareOp::Eq => BinaryOperator::Eq,
        CompareOp::NotEq => BinaryOperator::Ne,
        CompareOp::Lt => BinaryOperator::Lt,
        CompareOp::Lte => BinaryOperator::Lte,
        CompareOp::Gt => BinaryOperator::Gt,
        CompareOp::Gte => BinaryOperator::Gte,
    }
}

/// Fold variadic and/or operands into a chain.
fn combine<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    filters: &[Filter],
    op: BinaryOperator,
) -> QueryResult<Expr> {
    let mut compiled = filters
        .iter()
        .map(|filter| dialect.filter_to_expr(ctx, filter))
        .collect::<QueryResult<Vec<_>>>()?
        .into_iter();
    let first = compiled.next().ok_or_else(|| {
        QueryError::InvalidInnerQuery("boolean combinator with no operands".into())
    })?;
    Ok(compiled.fold(first, |acc, operand| acc.binary(op, operand)))
}

/// Build a LIKE clause from a string-match filter. The pattern wraps the
/// user value in `%` wildcards; `%`/`_` already inside the value are left
/// as-is. When the match is case-insensitive, both sides wrap in LOWER
/// and the parameter keeps the caller's case - the runtime LOWER does the
/// folding.
fn like_clause<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    field: &Expression,
    value: &Expression,
    options: &StringFilterOptions,
    pattern: impl FnOnce(&str) -> String,
) -> QueryResult<Expr> {
    let field = dialect.expression_to_expr(ctx, field)?;
    let pattern = rewrite_text_value(value, pattern)?;
    let pattern = dialect.expression_to_expr(ctx, &pattern)?;
    Ok(if options.case_sensitive {
        field.like(pattern)
    } else {
        func("LOWER", vec![field]).like(func("LOWER", vec![pattern]))
    })
}

/// Rewrite the text inside a literal or value clause, preserving the
/// clause shape.
fn rewrite_text_value(
    value: &Expression,
    f: impl FnOnce(&str) -> String,
) -> QueryResult<Expression> {
    match value {
        Expression::Literal(LiteralValue::Text(text)) => {
            Ok(Expression::Literal(LiteralValue::Text(f(text))))
        }
        Expression::Value {
            value: LiteralValue::Text(text),
            base_type,
            special_type,
        } => Ok(Expression::Value {
            value: LiteralValue::Text(f(text)),
            base_type: *base_type,
            special_type: *special_type,
        }),
        other => Err(QueryError::InvalidInnerQuery(format!(
            "string filter requires a text value, got {:?}",
            other
        ))),
    }
}
