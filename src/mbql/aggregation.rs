//! Aggregation clauses.

use serde::{Deserialize, Serialize};

use super::expression::{ArithmeticOp, Expression, LiteralValue};
use super::field::FieldRef;
use super::filter::Filter;

/// An aggregation clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Aggregation {
    /// Row count, or count of non-null values of a field.
    Count(Option<FieldRef>),
    Avg(FieldRef),
    Sum(FieldRef),
    Min(FieldRef),
    Max(FieldRef),
    Stddev(FieldRef),
    /// Count of distinct values.
    Distinct(FieldRef),

    /// Sum of `field` over the rows matching `predicate`.
    SumWhere {
        field: Expression,
        predicate: Filter,
    },

    /// Count of the rows matching the predicate. Equivalent to
    /// `sum-where` of the literal 1.
    CountWhere(Filter),

    /// Fraction of rows matching the predicate.
    Share(Filter),

    /// An aggregation carrying a caller-chosen display name.
    Named {
        aggregation: Box<Aggregation>,
        name: String,
    },

    /// Arithmetic over aggregations and numeric literals.
    Arithmetic {
        op: ArithmeticOp,
        operands: Vec<AggregationOperand>,
    },
}

impl Aggregation {
    pub fn count() -> Self {
        Aggregation::Count(None)
    }

    pub fn sum(field: FieldRef) -> Self {
        Aggregation::Sum(field)
    }

    pub fn named(aggregation: Aggregation, name: &str) -> Self {
        Aggregation::Named {
            aggregation: Box::new(aggregation),
            name: name.into(),
        }
    }
}

/// One operand of an arithmetic aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationOperand {
    Aggregation(Box<Aggregation>),
    Literal(LiteralValue),
}

impl AggregationOperand {
    pub fn aggregation(aggregation: Aggregation) -> Self {
        AggregationOperand::Aggregation(Box::new(aggregation))
    }

    pub fn integer(n: i64) -> Self {
        AggregationOperand::Literal(LiteralValue::Integer(n))
    }
}
