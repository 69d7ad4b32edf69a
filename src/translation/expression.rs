//! Expression compilation: field references, values, datetime clauses,
//! and arithmetic.
//!
//! Composite nodes recurse through the dialect's compilation hooks, never
//! by calling sibling compilers directly, so a dialect override is
//! honored at every depth.

use crate::error::{QueryError, QueryResult};
use crate::mbql::{ArithmeticOp, BinningOptions, Expression, FieldRef, LiteralValue};
use crate::metadata::{Field, MetadataStore, Table};
use crate::sql::dialect::SqlDialect;
use crate::sql::expr::{func, lit_float, lit_int, Expr, ExprExt, Literal};
use crate::sql::token::escape_dots;

use super::annotate;
use super::context::Context;

/// Compile a field reference.
pub fn compile_field<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    field: &FieldRef,
) -> QueryResult<Expr> {
    match field {
        FieldRef::FieldId(id) => {
            let field = ctx.store().field(*id)?;
            let identifier = dialect.field_to_identifier(ctx.store(), &field)?;
            Ok(
                match field
                    .special_type
                    .and_then(|special| special.timestamp_resolution())
                {
                    Some(resolution) => dialect.unix_timestamp_to_timestamp(identifier, resolution),
                    None => identifier,
                },
            )
        }

        FieldRef::FieldLiteral { name, .. } => Ok(Expr::Identifier {
            schema: None,
            table: None,
            column: escape_dots(name),
        }),

        FieldRef::Fk {
            fk_field_id,
            dest_field,
        } => {
            let join = ctx
                .query()
                .join_tables
                .iter()
                .find(|join| join.fk_field_id == *fk_field_id)
                .ok_or(QueryError::MissingJoinInfo(*fk_field_id))?;
            // Rebind the destination table to its join alias for the
            // duration of the recursion, so the emitted identifier is
            // alias.column no matter how the handler qualifies.
            let store = ctx.store();
            store.with_pushed_scope(|| {
                store.store_table(Table::aliased(join.table_id, &join.join_alias));
                dialect.field_to_expr(ctx, dest_field)
            })
        }

        FieldRef::Datetime { field, unit } => {
            let inner = dialect.field_to_expr(ctx, field)?;
            Ok(dialect.date(*unit, inner))
        }

        FieldRef::Binned { field, options, .. } => {
            let inner = dialect.field_to_expr(ctx, field)?;
            Ok(binning_expr(inner, options))
        }

        FieldRef::Expression(name) => {
            let expression = ctx.expression(name)?;
            dialect.expression_to_expr(ctx, expression)
        }

        FieldRef::Aggregation(index) => aggregation_reference(dialect, ctx, *index),
    }
}

/// Default identifier construction for a stored field:
/// `schema.table.column`, with the schema omitted when empty or when the
/// active table record is an alias.
pub fn field_identifier(store: &MetadataStore, field: &Field) -> QueryResult<Expr> {
    let table = store.table(field.table_id)?;
    let schema = if table.alias {
        None
    } else {
        table.schema.filter(|schema| !schema.is_empty())
    };
    Ok(Expr::Identifier {
        schema,
        table: Some(table.name),
        column: field.name.clone(),
    })
}

/// Compile an aggregation reference: arithmetic aggregations inline by
/// recursion; anything else becomes a bare identifier named after the
/// aggregation. Aggregations sharing a head therefore collide - callers
/// disambiguate with named aggregations.
fn aggregation_reference<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    index: usize,
) -> QueryResult<Expr> {
    let aggregation = ctx.aggregation_at(index)?;
    match aggregation {
        crate::mbql::Aggregation::Arithmetic { .. } => dialect.aggregation_to_expr(ctx, aggregation),
        other => Ok(Expr::Identifier {
            schema: None,
            table: None,
            column: escape_dots(&annotate::aggregation_name(other)),
        }),
    }
}

/// Compile an expression.
pub fn compile_expression<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    expression: &Expression,
) -> QueryResult<Expr> {
    match expression {
        Expression::Field(field) => dialect.field_to_expr(ctx, field),

        Expression::Literal(value) => Ok(literal_expr(value)),

        // A value clause unwraps to its inner literal.
        Expression::Value { value, .. } => Ok(literal_expr(value)),

        Expression::AbsoluteDatetime { timestamp, unit } => {
            Ok(dialect.date(*unit, Expr::Literal(Literal::Timestamp(*timestamp))))
        }

        Expression::Time { time, unit } => {
            Ok(dialect.date(*unit, Expr::Literal(Literal::Time(*time))))
        }

        Expression::RelativeDatetime {
            anchor,
            amount,
            unit,
        } => match anchor {
            Some(anchor) => {
                let base = dialect.expression_to_expr(ctx, anchor)?;
                Ok(dialect.add_interval(base, *amount, *unit))
            }
            None if *amount == 0 => Ok(dialect.date(*unit, dialect.current_datetime())),
            None => Ok(dialect.date(*unit, dialect.date_interval(*unit, *amount))),
        },

        Expression::Arithmetic { op, operands } => {
            compile_arithmetic(dialect, ctx, *op, operands)
        }
    }
}

pub(crate) fn literal_expr(value: &LiteralValue) -> Expr {
    Expr::Literal(match value {
        LiteralValue::Integer(n) => Literal::Int(*n),
        LiteralValue::Float(f) => Literal::Float(*f),
        LiteralValue::Text(s) => Literal::String(s.clone()),
        LiteralValue::Boolean(b) => Literal::Bool(*b),
        LiteralValue::Date(d) => Literal::Date(*d),
        LiteralValue::Timestamp(ts) => Literal::Timestamp(*ts),
        LiteralValue::Null => Literal::Null,
    })
}

fn compile_arithmetic<D: SqlDialect + ?Sized>(
    dialect: &D,
    ctx: &Context<'_>,
    op: ArithmeticOp,
    operands: &[Expression],
) -> QueryResult<Expr> {
    if operands.is_empty() {
        return Err(QueryError::InvalidInnerQuery(format!(
            "arithmetic clause '{}' with no operands",
            op.symbol()
        )));
    }
    if op == ArithmeticOp::Divide {
        let promoted: Vec<Expression> = operands.iter().map(promote_integer_literal).collect();
        let compiled = promoted
            .iter()
            .map(|operand| dialect.expression_to_expr(ctx, operand))
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(guarded_division(compiled))
    } else {
        let compiled = operands
            .iter()
            .map(|operand| dialect.expression_to_expr(ctx, operand))
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(fold_operator(op, compiled))
    }
}

/// Integer literal operands of a division are promoted to double, so
/// integer division can never truncate.
pub(crate) fn promote_integer_literal(expression: &Expression) -> Expression {
    match expression {
        Expression::Literal(LiteralValue::Integer(n)) => {
            Expression::Literal(LiteralValue::Float(*n as f64))
        }
        Expression::Value {
            value: LiteralValue::Integer(n),
            base_type,
            special_type,
        } => Expression::Value {
            value: LiteralValue::Float(*n as f64),
            base_type: *base_type,
            special_type: *special_type,
        },
        other => other.clone(),
    }
}

/// Left-fold compiled operands with a binary operator.
pub(crate) fn fold_operator(op: ArithmeticOp, operands: Vec<Expr>) -> Expr {
    let operator = match op {
        ArithmeticOp::Add => crate::sql::expr::BinaryOperator::Plus,
        ArithmeticOp::Subtract => crate::sql::expr::BinaryOperator::Minus,
        ArithmeticOp::Multiply => crate::sql::expr::BinaryOperator::Mul,
        ArithmeticOp::Divide => crate::sql::expr::BinaryOperator::Div,
    };
    let mut operands = operands.into_iter();
    let first = operands.next().expect("fold_operator requires operands");
    operands.fold(first, |acc, operand| acc.binary(operator, operand))
}

/// Division where every divisor after the first is guarded against zero:
/// `a / CASE WHEN b = 0 THEN NULL ELSE b END`. SQL NULL-propagates
/// through division, so divide-by-zero yields NULL instead of an error.
pub(crate) fn guarded_division(operands: Vec<Expr>) -> Expr {
    let mut operands = operands.into_iter();
    let first = operands.next().expect("guarded_division requires operands");
    operands.fold(first, |acc, divisor| {
        let guarded = Expr::Case {
            when_clauses: vec![(divisor.clone().eq(lit_int(0)), Expr::Literal(Literal::Null))],
            else_clause: Some(Box::new(divisor)),
        };
        acc.div(guarded)
    })
}

/// The binning arithmetic:
/// `floor((expr - min-value) / bin-width) * bin-width + min-value`.
fn binning_expr(inner: Expr, options: &BinningOptions) -> Expr {
    let scaled = inner
        .sub(lit_float(options.min_value))
        .div(lit_float(options.bin_width));
    func("FLOOR", vec![scaled])
        .mul(lit_float(options.bin_width))
        .add(lit_float(options.min_value))
}
