//! Expression clauses: literals, values, datetime arithmetic, and
//! arithmetic over fields and expressions.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::metadata::{BaseType, SpecialType};

use super::field::{DatetimeUnit, FieldRef};

/// An expression tree. Appears as named entries in a query's
/// `expressions` map, as filter operands, and inside `sum-where`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Expression {
    /// Any field reference.
    Field(FieldRef),

    /// A bare literal.
    Literal(LiteralValue),

    /// A literal annotated with type information from the column it is
    /// compared against. Compilation unwraps it to the inner literal.
    Value {
        value: LiteralValue,
        #[serde(default)]
        base_type: Option<BaseType>,
        #[serde(default)]
        special_type: Option<SpecialType>,
    },

    /// A fixed point in time, bucketed by `unit`.
    AbsoluteDatetime {
        timestamp: NaiveDateTime,
        unit: DatetimeUnit,
    },

    /// A point in time offset from `anchor` (or from now when `anchor`
    /// is absent) by `amount` units.
    RelativeDatetime {
        #[serde(default)]
        anchor: Option<Box<Expression>>,
        amount: i64,
        unit: DatetimeUnit,
    },

    /// A time of day, bucketed by `unit`.
    Time { time: NaiveTime, unit: DatetimeUnit },

    /// Variadic arithmetic over expressions.
    Arithmetic {
        op: ArithmeticOp,
        operands: Vec<Expression>,
    },
}

impl Expression {
    pub fn field(id: i64) -> Self {
        Expression::Field(FieldRef::field(id))
    }

    pub fn integer(n: i64) -> Self {
        Expression::Literal(LiteralValue::Integer(n))
    }

    pub fn float(f: f64) -> Self {
        Expression::Literal(LiteralValue::Float(f))
    }

    pub fn text(s: &str) -> Self {
        Expression::Literal(LiteralValue::Text(s.into()))
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LiteralValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Null,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Integer(n) => write!(f, "{}", n),
            LiteralValue::Float(x) => write!(f, "{}", x),
            LiteralValue::Text(s) => write!(f, "{}", s),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
            LiteralValue::Date(d) => write!(f, "{}", d),
            LiteralValue::Timestamp(ts) => write!(f, "{}", ts),
            LiteralValue::Null => write!(f, "null"),
        }
    }
}

/// Arithmetic operators. All are variadic in clause form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithmeticOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
        }
    }
}
