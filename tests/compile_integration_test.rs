//! End-to-end compilation over an in-memory metadata store, default
//! (ANSI) dialect.

use mbql::prelude::*;

fn orders_store() -> MetadataStore {
    let mut store = MetadataStore::new();
    store.add_table(Table::new(TableId(1), "orders").with_schema("public"));
    store.add_field(Field::new(FieldId(10), "id", TableId(1), BaseType::Integer));
    store.add_field(Field::new(FieldId(11), "status", TableId(1), BaseType::Text));
    store.add_field(Field::new(FieldId(12), "name", TableId(1), BaseType::Text));
    store.add_field(Field::new(FieldId(13), "total", TableId(1), BaseType::Float));
    store.add_field(Field::new(
        FieldId(14),
        "created_at",
        TableId(1),
        BaseType::DateTime,
    ));
    store
}

fn outer(inner: InnerQuery) -> OuterQuery {
    OuterQuery {
        database: DatabaseId(1),
        query: inner,
    }
}

fn compile(inner: InnerQuery) -> CompiledQuery {
    mbql_to_native(&Ansi, &orders_store(), &outer(inner)).unwrap()
}

#[test]
fn test_select_single_field() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        fields: vec![FieldRef::field(10)],
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        r#"SELECT "public"."orders"."id" FROM "public"."orders""#
    );
    assert!(compiled.params.is_empty());
}

#[test]
fn test_count_by_status() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        breakout: vec![FieldRef::field(11)],
        aggregation: vec![Aggregation::count()],
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT \"public\".\"orders\".\"status\", COUNT(*) AS \"count\" \
         FROM \"public\".\"orders\" GROUP BY \"public\".\"orders\".\"status\""
    );
}

#[test]
fn test_breakout_already_in_fields_not_selected_twice() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        breakout: vec![FieldRef::field(11)],
        fields: vec![FieldRef::field(11)],
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT \"public\".\"orders\".\"status\" FROM \"public\".\"orders\" \
         GROUP BY \"public\".\"orders\".\"status\""
    );
}

#[test]
fn test_case_insensitive_starts_with() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        filter: Some(Filter::StartsWith {
            field: Expression::field(12),
            value: Expression::text("A"),
            options: StringFilterOptions::case_insensitive(),
        }),
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT * FROM \"public\".\"orders\" \
         WHERE LOWER(\"public\".\"orders\".\"name\") LIKE LOWER(?)"
    );
    assert_eq!(compiled.params, vec![SqlParam::Text("A%".into())]);
}

#[test]
fn test_case_sensitive_starts_with_is_the_default() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        filter: Some(Filter::StartsWith {
            field: Expression::field(12),
            value: Expression::text("A"),
            options: StringFilterOptions::default(),
        }),
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT * FROM \"public\".\"orders\" WHERE \"public\".\"orders\".\"name\" LIKE ?"
    );
    assert_eq!(compiled.params, vec![SqlParam::Text("A%".into())]);
}

#[test]
fn test_contains_and_ends_with_patterns() {
    let contains = compile(InnerQuery {
        source_table: Some(TableId(1)),
        filter: Some(Filter::Contains {
            field: Expression::field(12),
            value: Expression::text("mid"),
            options: StringFilterOptions::default(),
        }),
        ..InnerQuery::default()
    });
    assert_eq!(contains.params, vec![SqlParam::Text("%mid%".into())]);

    let ends_with = compile(InnerQuery {
        source_table: Some(TableId(1)),
        filter: Some(Filter::EndsWith {
            field: Expression::field(12),
            value: Expression::text("end"),
            options: StringFilterOptions::default(),
        }),
        ..InnerQuery::default()
    });
    assert_eq!(ends_with.params, vec![SqlParam::Text("%end".into())]);
}

#[test]
fn test_like_metacharacters_pass_through_unescaped() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        filter: Some(Filter::Contains {
            field: Expression::field(12),
            value: Expression::text("50%_off"),
            options: StringFilterOptions::default(),
        }),
        ..InnerQuery::default()
    });
    assert_eq!(compiled.params, vec![SqlParam::Text("%50%_off%".into())]);
}

#[test]
fn test_sum_divided_by_integer_literal() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        aggregation: vec![Aggregation::Arithmetic {
            op: ArithmeticOp::Divide,
            operands: vec![
                AggregationOperand::aggregation(Aggregation::Sum(FieldRef::field(13))),
                AggregationOperand::integer(2),
            ],
        }],
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT SUM(\"public\".\"orders\".\"total\") / \
         CASE WHEN 2.0 = 0 THEN NULL ELSE 2.0 END AS \"sum / 2\" \
         FROM \"public\".\"orders\""
    );
}

#[test]
fn test_expression_division_promotes_and_guards() {
    let mut expressions = std::collections::HashMap::new();
    expressions.insert(
        "rate".to_string(),
        Expression::Arithmetic {
            op: ArithmeticOp::Divide,
            operands: vec![Expression::field(13), Expression::integer(4)],
        },
    );
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        fields: vec![FieldRef::Expression("rate".into())],
        expressions,
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT \"public\".\"orders\".\"total\" / \
         CASE WHEN 4.0 = 0 THEN NULL ELSE 4.0 END AS \"rate\" \
         FROM \"public\".\"orders\""
    );
}

#[test]
fn test_nested_count_with_limit() {
    let compiled = compile(InnerQuery {
        source_query: Some(SourceQuery::Query(Box::new(InnerQuery {
            source_table: Some(TableId(1)),
            aggregation: vec![Aggregation::count()],
            ..InnerQuery::default()
        }))),
        limit: Some(10),
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT * FROM (SELECT COUNT(*) AS \"count\" FROM \"public\".\"orders\") \"source\" \
         LIMIT 10"
    );
}

#[test]
fn test_datetime_field_is_identity_for_the_default_dialect() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        fields: vec![FieldRef::field(14).datetime(DatetimeUnit::Month)],
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        r#"SELECT "public"."orders"."created_at" FROM "public"."orders""#
    );
}

#[test]
fn test_between_filter() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        filter: Some(Filter::Between {
            expr: Expression::field(13),
            lower: Expression::integer(10),
            upper: Expression::integer(20),
        }),
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT * FROM \"public\".\"orders\" \
         WHERE \"public\".\"orders\".\"total\" BETWEEN 10 AND 20"
    );
}

#[test]
fn test_boolean_combinators() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        filter: Some(Filter::And(vec![
            Filter::equals(Expression::field(11), Expression::text("open")),
            Filter::not(Filter::compare(
                CompareOp::Gt,
                Expression::field(13),
                Expression::integer(100),
            )),
        ])),
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT * FROM \"public\".\"orders\" \
         WHERE (\"public\".\"orders\".\"status\" = ?) \
         AND (NOT (\"public\".\"orders\".\"total\" > 100))"
    );
    assert_eq!(compiled.params, vec![SqlParam::Text("open".into())]);
}

#[test]
fn test_order_by_and_limit() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        fields: vec![FieldRef::field(10)],
        order_by: vec![
            OrderBy::desc(FieldRef::field(13)),
            OrderBy::asc(FieldRef::field(10)),
        ],
        limit: Some(3),
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT \"public\".\"orders\".\"id\" FROM \"public\".\"orders\" \
         ORDER BY \"public\".\"orders\".\"total\" DESC, \"public\".\"orders\".\"id\" ASC \
         LIMIT 3"
    );
}

#[test]
fn test_page_is_one_indexed() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        page: Some(Page { items: 5, page: 3 }),
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT * FROM \"public\".\"orders\" LIMIT 5 OFFSET 10"
    );
}

#[test]
fn test_first_page_has_zero_offset() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        page: Some(Page { items: 5, page: 1 }),
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT * FROM \"public\".\"orders\" LIMIT 5 OFFSET 0"
    );
}

#[test]
fn test_binning_arithmetic_shape() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        breakout: vec![FieldRef::Binned {
            field: Box::new(FieldRef::field(13)),
            strategy: BinningStrategy::NumBins,
            options: BinningOptions {
                bin_width: 10.0,
                min_value: 5.0,
                max_value: 105.0,
            },
        }],
        ..InnerQuery::default()
    });
    assert!(
        compiled
            .query
            .contains("FLOOR((\"public\".\"orders\".\"total\" - 5.0) / 10.0) * 10.0"),
        "query: {}",
        compiled.query
    );
}

#[test]
fn test_first_projection_rules() {
    // Breakout first when present.
    let with_breakout = compile(InnerQuery {
        source_table: Some(TableId(1)),
        breakout: vec![FieldRef::field(11)],
        aggregation: vec![Aggregation::count()],
        ..InnerQuery::default()
    });
    assert!(with_breakout
        .query
        .starts_with("SELECT \"public\".\"orders\".\"status\","));

    // Aggregation alias first otherwise.
    let with_aggregation = compile(InnerQuery {
        source_table: Some(TableId(1)),
        aggregation: vec![Aggregation::count()],
        ..InnerQuery::default()
    });
    assert!(with_aggregation
        .query
        .starts_with("SELECT COUNT(*) AS \"count\""));

    // Star when the select list would be empty.
    let bare = compile(InnerQuery {
        source_table: Some(TableId(1)),
        ..InnerQuery::default()
    });
    assert!(bare.query.starts_with("SELECT *"));
}

#[test]
fn test_field_literal_emits_bare_identifier_without_alias() {
    let compiled = compile(InnerQuery {
        source_query: Some(SourceQuery::Native("SELECT 1 AS x".into())),
        fields: vec![FieldRef::FieldLiteral {
            name: "x".into(),
            base_type: BaseType::Integer,
        }],
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT \"x\" FROM (SELECT 1 AS x) \"source\""
    );
}

#[test]
fn test_field_literal_name_with_dots_survives_quoting() {
    let compiled = compile(InnerQuery {
        source_query: Some(SourceQuery::Native("SELECT 1".into())),
        fields: vec![FieldRef::FieldLiteral {
            name: "weird.name".into(),
            base_type: BaseType::Integer,
        }],
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT \"weird.name\" FROM (SELECT 1) \"source\""
    );
}

#[test]
fn test_value_clause_unwraps_to_its_literal() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        filter: Some(Filter::equals(
            Expression::field(11),
            Expression::Value {
                value: LiteralValue::Text("open".into()),
                base_type: Some(BaseType::Text),
                special_type: None,
            },
        )),
        ..InnerQuery::default()
    });
    assert_eq!(compiled.params, vec![SqlParam::Text("open".into())]);
}

#[test]
fn test_comparison_against_null_renders_is_null() {
    let compiled = compile(InnerQuery {
        source_table: Some(TableId(1)),
        filter: Some(Filter::equals(
            Expression::field(11),
            Expression::Literal(LiteralValue::Null),
        )),
        ..InnerQuery::default()
    });
    assert_eq!(
        compiled.query,
        "SELECT * FROM \"public\".\"orders\" WHERE \"public\".\"orders\".\"status\" IS NULL"
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unknown_expression() {
    let result = mbql_to_native(
        &Ansi,
        &orders_store(),
        &outer(InnerQuery {
            source_table: Some(TableId(1)),
            fields: vec![FieldRef::Expression("nope".into())],
            ..InnerQuery::default()
        }),
    );
    assert_eq!(result, Err(QueryError::UnknownExpression("nope".into())));
}

#[test]
fn test_unknown_aggregation_index() {
    let result = mbql_to_native(
        &Ansi,
        &orders_store(),
        &outer(InnerQuery {
            source_table: Some(TableId(1)),
            aggregation: vec![Aggregation::count()],
            order_by: vec![OrderBy::asc(FieldRef::Aggregation(3))],
            ..InnerQuery::default()
        }),
    );
    assert_eq!(
        result,
        Err(QueryError::UnknownAggregationIndex { index: 3, level: 0 })
    );
}

#[test]
fn test_missing_join_info() {
    let result = mbql_to_native(
        &Ansi,
        &orders_store(),
        &outer(InnerQuery {
            source_table: Some(TableId(1)),
            fields: vec![FieldRef::fk(99, FieldRef::field(10))],
            ..InnerQuery::default()
        }),
    );
    assert_eq!(result, Err(QueryError::MissingJoinInfo(FieldId(99))));
}

#[test]
fn test_query_without_a_source_is_invalid() {
    let result = mbql_to_native(&Ansi, &orders_store(), &outer(InnerQuery::default()));
    assert!(matches!(result, Err(QueryError::InvalidInnerQuery(_))));
}

#[test]
fn test_metadata_miss_propagates() {
    let result = mbql_to_native(
        &Ansi,
        &orders_store(),
        &outer(InnerQuery {
            source_table: Some(TableId(1)),
            fields: vec![FieldRef::field(999)],
            ..InnerQuery::default()
        }),
    );
    assert!(matches!(result, Err(QueryError::MetadataMiss { .. })));
}

// ============================================================================
// Wire format
// ============================================================================

#[test]
fn test_query_deserialized_from_json_compiles_identically() {
    let json = r#"{
        "source-table": 1,
        "breakout": [{"field-id": 11}],
        "aggregation": [{"count": null}],
        "limit": 10
    }"#;
    let from_json: InnerQuery = serde_json::from_str(json).unwrap();

    let built = InnerQuery {
        source_table: Some(TableId(1)),
        breakout: vec![FieldRef::field(11)],
        aggregation: vec![Aggregation::count()],
        limit: Some(10),
        ..InnerQuery::default()
    };
    assert_eq!(from_json, built);

    let store = orders_store();
    assert_eq!(
        mbql_to_native(&Ansi, &store, &outer(from_json)).unwrap(),
        mbql_to_native(&Ansi, &store, &outer(built)).unwrap()
    );
}
