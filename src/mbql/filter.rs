//! Filter clauses.

use serde::{Deserialize, Serialize};

use super::expression::Expression;

/// A filter clause: boolean combinators over comparisons, ranges, and
/// string matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),

    Compare {
        op: CompareOp,
        lhs: Expression,
        rhs: Expression,
    },

    Between {
        expr: Expression,
        lower: Expression,
        upper: Expression,
    },

    StartsWith {
        field: Expression,
        value: Expression,
        #[serde(default)]
        options: StringFilterOptions,
    },

    Contains {
        field: Expression,
        value: Expression,
        #[serde(default)]
        options: StringFilterOptions,
    },

    EndsWith {
        field: Expression,
        value: Expression,
        #[serde(default)]
        options: StringFilterOptions,
    },
}

impl Filter {
    pub fn compare(op: CompareOp, lhs: Expression, rhs: Expression) -> Self {
        Filter::Compare { op, lhs, rhs }
    }

    pub fn equals(lhs: Expression, rhs: Expression) -> Self {
        Self::compare(CompareOp::Eq, lhs, rhs)
    }

    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
}

/// Options for the string-match filters.
///
/// `%` and `_` inside the user-provided value are passed through to the
/// LIKE pattern unescaped, so a value can itself act as a wildcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StringFilterOptions {
    pub case_sensitive: bool,
}

impl Default for StringFilterOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
        }
    }
}

impl StringFilterOptions {
    pub fn case_insensitive() -> Self {
        Self {
            case_sensitive: false,
        }
    }
}
