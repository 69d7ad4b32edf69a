//! Aggregation compilation: conditional aggregates, naming, references.

use mbql::prelude::*;
use mbql::sql::expr::{count_star, BinaryOperator, Expr};

fn store() -> MetadataStore {
    let mut store = MetadataStore::new();
    store.add_table(Table::new(TableId(1), "orders").with_schema("public"));
    store.add_field(Field::new(FieldId(11), "status", TableId(1), BaseType::Text));
    store.add_field(Field::new(FieldId(12), "email", TableId(1), BaseType::Text));
    store.add_field(Field::new(FieldId(13), "total", TableId(1), BaseType::Float));
    store
}

fn outer(inner: InnerQuery) -> OuterQuery {
    OuterQuery {
        database: DatabaseId(1),
        query: inner,
    }
}

fn compile(inner: InnerQuery) -> CompiledQuery {
    mbql_to_native(&Ansi, &store(), &outer(inner)).unwrap()
}

fn ast(inner: InnerQuery) -> mbql::sql::Query {
    mbql_to_sql_ast(&Ansi, &store(), &outer(inner)).unwrap()
}

fn paid() -> Filter {
    Filter::equals(Expression::field(11), Expression::text("paid"))
}

fn aggregate(aggregation: Aggregation) -> InnerQuery {
    InnerQuery {
        source_table: Some(TableId(1)),
        aggregation: vec![aggregation],
        ..InnerQuery::default()
    }
}

#[test]
fn test_sum_where_shape() {
    let compiled = compile(aggregate(Aggregation::SumWhere {
        field: Expression::field(13),
        predicate: paid(),
    }));
    assert_eq!(
        compiled.query,
        "SELECT SUM(CASE WHEN \"public\".\"orders\".\"status\" = ? \
         THEN \"public\".\"orders\".\"total\" ELSE 0.0 END) AS \"sum-where\" \
         FROM \"public\".\"orders\""
    );
    assert_eq!(compiled.params, vec![SqlParam::Text("paid".into())]);
}

#[test]
fn test_count_where_equals_sum_where_of_one() {
    let count_where = ast(aggregate(Aggregation::CountWhere(paid())));
    let sum_where_one = ast(aggregate(Aggregation::SumWhere {
        field: Expression::integer(1),
        predicate: paid(),
    }));
    assert_eq!(count_where.select[0].expr, sum_where_one.select[0].expr);
}

#[test]
fn test_share_is_count_where_over_count_star() {
    let share = ast(aggregate(Aggregation::Share(paid())));
    let count_where = ast(aggregate(Aggregation::CountWhere(paid())));
    let expected = Expr::BinaryOp {
        left: Box::new(count_where.select[0].expr.clone()),
        op: BinaryOperator::Div,
        right: Box::new(count_star()),
    };
    assert_eq!(share.select[0].expr, expected);
}

#[test]
fn test_distinct_count() {
    let compiled = compile(aggregate(Aggregation::Distinct(FieldRef::field(12))));
    assert_eq!(
        compiled.query,
        "SELECT COUNT(DISTINCT \"public\".\"orders\".\"email\") AS \"count\" \
         FROM \"public\".\"orders\""
    );
}

#[test]
fn test_named_aggregation_takes_its_alias() {
    let compiled = compile(aggregate(Aggregation::named(
        Aggregation::Sum(FieldRef::field(13)),
        "revenue",
    )));
    assert_eq!(
        compiled.query,
        "SELECT SUM(\"public\".\"orders\".\"total\") AS \"revenue\" \
         FROM \"public\".\"orders\""
    );
}

#[test]
fn test_simple_aggregations() {
    for (aggregation, rendered) in [
        (Aggregation::Avg(FieldRef::field(13)), "AVG"),
        (Aggregation::Min(FieldRef::field(13)), "MIN"),
        (Aggregation::Max(FieldRef::field(13)), "MAX"),
        (Aggregation::Stddev(FieldRef::field(13)), "STDDEV"),
    ] {
        let compiled = compile(aggregate(aggregation));
        assert!(
            compiled
                .query
                .starts_with(&format!("SELECT {}(\"public\".\"orders\".\"total\")", rendered)),
            "query: {}",
            compiled.query
        );
    }
}

#[test]
fn test_count_of_field() {
    let compiled = compile(aggregate(Aggregation::Count(Some(FieldRef::field(12)))));
    assert!(compiled
        .query
        .starts_with("SELECT COUNT(\"public\".\"orders\".\"email\") AS \"count\""));
}

// ============================================================================
// Aggregation references
// ============================================================================

#[test]
fn test_order_by_references_aggregation_by_name() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        aggregation: vec![Aggregation::Sum(FieldRef::field(13))],
        order_by: vec![OrderBy::desc(FieldRef::Aggregation(0))],
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT SUM(\"public\".\"orders\".\"total\") AS \"sum\" \
         FROM \"public\".\"orders\" ORDER BY \"sum\" DESC"
    );
}

#[test]
fn test_distinct_reference_emits_count() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        aggregation: vec![Aggregation::Distinct(FieldRef::field(12))],
        order_by: vec![OrderBy::asc(FieldRef::Aggregation(0))],
        ..InnerQuery::default()
    });
    assert!(
        compiled.query.ends_with("ORDER BY \"count\" ASC"),
        "query: {}",
        compiled.query
    );
}

#[test]
fn test_named_reference_emits_the_custom_name() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        aggregation: vec![Aggregation::named(
            Aggregation::Sum(FieldRef::field(13)),
            "revenue",
        )],
        order_by: vec![OrderBy::desc(FieldRef::Aggregation(0))],
        ..InnerQuery::default()
    });
    assert!(
        compiled.query.ends_with("ORDER BY \"revenue\" DESC"),
        "query: {}",
        compiled.query
    );
}

#[test]
fn test_arithmetic_reference_inlines_the_expression() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        aggregation: vec![Aggregation::Arithmetic {
            op: ArithmeticOp::Divide,
            operands: vec![
                AggregationOperand::aggregation(Aggregation::Sum(FieldRef::field(13))),
                AggregationOperand::integer(2),
            ],
        }],
        order_by: vec![OrderBy::desc(FieldRef::Aggregation(0))],
        ..InnerQuery::default()
    });
    assert!(
        compiled.query.ends_with(
            "ORDER BY SUM(\"public\".\"orders\".\"total\") / \
             CASE WHEN 2.0 = 0 THEN NULL ELSE 2.0 END DESC"
        ),
        "query: {}",
        compiled.query
    );
}

#[test]
fn test_arithmetic_over_two_aggregations() {
    let compiled = compile(aggregate(Aggregation::Arithmetic {
        op: ArithmeticOp::Add,
        operands: vec![
            AggregationOperand::aggregation(Aggregation::Sum(FieldRef::field(13))),
            AggregationOperand::aggregation(Aggregation::count()),
        ],
    }));
    assert_eq!(
        compiled.query,
        "SELECT SUM(\"public\".\"orders\".\"total\") + COUNT(*) AS \"sum + count\" \
         FROM \"public\".\"orders\""
    );
}

#[test]
fn test_division_of_two_aggregations_guards_the_divisor() {
    let compiled = compile(aggregate(Aggregation::Arithmetic {
        op: ArithmeticOp::Divide,
        operands: vec![
            AggregationOperand::aggregation(Aggregation::Sum(FieldRef::field(13))),
            AggregationOperand::aggregation(Aggregation::count()),
        ],
    }));
    assert_eq!(
        compiled.query,
        "SELECT SUM(\"public\".\"orders\".\"total\") / \
         CASE WHEN COUNT(*) = 0 THEN NULL ELSE COUNT(*) END AS \"sum / count\" \
         FROM \"public\".\"orders\""
    );
}
