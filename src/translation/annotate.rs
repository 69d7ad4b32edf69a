//! Deterministic display names for aggregation clauses.
//!
//! The names double as select-list aliases and as the identifiers that
//! aggregation references emit, so they must be pure functions of the
//! clause tree.

use crate::mbql::{Aggregation, AggregationOperand};

/// The display name of an aggregation clause.
pub fn aggregation_name(aggregation: &Aggregation) -> String {
    match aggregation {
        Aggregation::Named { name, .. } => name.clone(),
        Aggregation::Count(_) | Aggregation::Distinct(_) => "count".into(),
        Aggregation::Avg(_) => "avg".into(),
        Aggregation::Sum(_) => "sum".into(),
        Aggregation::Min(_) => "min".into(),
        Aggregation::Max(_) => "max".into(),
        Aggregation::Stddev(_) => "stddev".into(),
        Aggregation::SumWhere { .. } => "sum-where".into(),
        Aggregation::CountWhere(_) => "count-where".into(),
        Aggregation::Share(_) => "share".into(),
        Aggregation::Arithmetic { op, operands } => operands
            .iter()
            .map(operand_name)
            .collect::<Vec<_>>()
            .join(&format!(" {} ", op.symbol())),
    }
}

fn operand_name(operand: &AggregationOperand) -> String {
    match operand {
        AggregationOperand::Aggregation(aggregation) => aggregation_name(aggregation),
        AggregationOperand::Literal(value) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mbql::{ArithmeticOp, FieldRef};

    #[test]
    fn test_simple_names() {
        assert_eq!(aggregation_name(&Aggregation::count()), "count");
        assert_eq!(
            aggregation_name(&Aggregation::Distinct(FieldRef::field(1))),
            "count"
        );
        assert_eq!(
            aggregation_name(&Aggregation::Sum(FieldRef::field(1))),
            "sum"
        );
        assert_eq!(
            aggregation_name(&Aggregation::Stddev(FieldRef::field(1))),
            "stddev"
        );
    }

    #[test]
    fn test_named_wins() {
        let ag = Aggregation::named(Aggregation::Sum(FieldRef::field(1)), "revenue");
        assert_eq!(aggregation_name(&ag), "revenue");
    }

    #[test]
    fn test_arithmetic_joins_operand_names() {
        let ag = Aggregation::Arithmetic {
            op: ArithmeticOp::Divide,
            operands: vec![
                AggregationOperand::aggregation(Aggregation::Sum(FieldRef::field(1))),
                AggregationOperand::integer(2),
            ],
        };
        assert_eq!(aggregation_name(&ag), "sum / 2");
    }

    #[test]
    fn test_arithmetic_over_two_aggregations() {
        let ag = Aggregation::Arithmetic {
            op: ArithmeticOp::Add,
            operands: vec![
                AggregationOperand::aggregation(Aggregation::Sum(FieldRef::field(1))),
                AggregationOperand::aggregation(Aggregation::count()),
            ],
        };
        assert_eq!(aggregation_name(&ag), "sum + count");
    }
}
