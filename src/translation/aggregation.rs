//! Aggregation compilation.

use crate::error::{QueryError, QueryResult};
use crate::mbql::{
    Aggregation, AggregationOperand, ArithmeticOp, Expression, Filter, LiteralValue,
};
use crate::sql::dialect::SqlDialect;
use crate::sql::expr::{count_star, func, lit_float, Expr, ExprExt};

use super::context::Context;
use super::expression::{fold_operator, guarded_division, literal_expr};

/// Compile an aggregation clause.
pub fn compile_aggregation<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    aggregation: &Aggregation,
) -> QueryResult<Expr> {
    match aggregation {
        Aggregation::Count(None) => Ok(count_star()),
        Aggregation::Count(Some(field)) => {
            Ok(func("COUNT", vec![dialect.field_to_expr(ctx, field)?]))
        }
        Aggregation::Avg(field) => Ok(func("AVG", vec![dialect.field_to_expr(ctx, field)?])),
        Aggregation::Sum(field) => Ok(func("SUM", vec![dialect.field_to_expr(ctx, field)?])),
        Aggregation::Min(field) => Ok(func("MIN", vec![dialect.field_to_expr(ctx, field)?])),
        Aggregation::Max(field) => Ok(func("MAX", vec![dialect.field_to_expr(ctx, field)?])),
        Aggregation::Stddev(field) => Ok(func("STDDEV", vec![dialect.field_to_expr(ctx, field)?])),

        Aggregation::Distinct(field) => Ok(Expr::Function {
            name: "COUNT".into(),
            args: vec![dialect.field_to_expr(ctx, field)?],
            distinct: true,
        }),

        Aggregation::SumWhere { field, predicate } => {
            sum_where(dialect, ctx, field, predicate)
        }

        // count-where is sum-where of the literal 1.
        Aggregation::CountWhere(predicate) => {
            sum_where(dialect, ctx, &Expression::integer(1), predicate)
        }

        // share is count-where divided by the row count.
        Aggregation::Share(predicate) => {
            let matched = sum_where(dialect, ctx, &Expression::integer(1), predicate)?;
            Ok(matched.div(count_star()))
        }

        Aggregation::Named { aggregation, .. } => dialect.aggregation_to_expr(ctx, aggregation),

        Aggregation::Arithmetic { op, operands } => {
            compile_arithmetic(dialect, ctx, *op, operands)
        }
    }
}

/// `SUM(CASE WHEN predicate THEN field ELSE 0.0 END)`.
fn sum_where<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    field: &Expression,
    predicate: &Filter,
) -> QueryResult<Expr> {
    let predicate = dialect.filter_to_expr(ctx, predicate)?;
    let value = dialect.expression_to_expr(ctx, field)?;
    Ok(func(
        "SUM",
        vec![Expr::Case {
            when_clauses: vec![(predicate, value)],
            else_clause: Some(Box::new(lit_float(0.0))),
        }],
    ))
}

/// Arithmetic over aggregations: same promotion and divide-by-zero
/// guarding as expression arithmetic.
fn compile_arithmetic<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    op: ArithmeticOp,
    operands: &[AggregationOperand],
) -> QueryResult<Expr> {
    if operands.is_empty() {
        return Err(QueryError::InvalidInnerQuery(format!(
            "arithmetic aggregation '{}' with no operands",
            op.symbol()
        )));
    }
    let operands: Vec<AggregationOperand> = if op == ArithmeticOp::Divide {
        operands.iter().map(promote_integer_operand).collect()
    } else {
        operands.to_vec()
    };
    let compiled = operands
        .iter()
        .map(|operand| compile_operand(dialect, ctx, operand))
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(if op == ArithmeticOp::Divide {
        guarded_division(compiled)
    } else {
        fold_operator(op, compiled)
    })
}

fn compile_operand<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    operand: &AggregationOperand,
) -> QueryResult<Expr> {
    match operand {
        AggregationOperand::Aggregation(aggregation) => {
            dialect.aggregation_to_expr(ctx, aggregation)
        }
        AggregationOperand::Literal(value) => Ok(literal_expr(value)),
    }
}

fn promote_integer_operand(operand: &AggregationOperand) -> AggregationOperand {
    match operand {
        AggregationOperand::Literal(LiteralValue::Integer(n)) => {
            AggregationOperand::Literal(LiteralValue::Float(*n as f64))
        }
        other => other.clone(),
    }
}
