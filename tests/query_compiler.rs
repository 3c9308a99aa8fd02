mod common;

use pretty_assertions::assert_eq;
use resource_sdk::query::{
    compile, Condition, Direction, Operator, OrderSpec, QueryError, QuerySpec, DEFAULT_LIMIT,
    DEFAULT_OFFSET,
};
use resource_sdk::sql::{self, PgBindValue};

fn params<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Iterator<Item = (&'a str, &'a str)> {
    pairs.iter().copied()
}

#[test]
fn empty_params_use_defaults() {
    let schema = common::timeline();
    let spec = compile(&schema, params(&[])).unwrap();
    assert_eq!(spec, QuerySpec::default());
    assert!(spec.conditions.is_empty());
    assert_eq!(spec.limit, DEFAULT_LIMIT);
    assert_eq!(spec.offset, DEFAULT_OFFSET);
    assert_eq!(spec.order, None);
}

#[test]
fn equality_and_comparison_conditions() {
    let schema = common::timeline();
    let spec = compile(&schema, params(&[("name", "hello"), ("gt-timestamp", "2")])).unwrap();
    assert_eq!(
        spec.conditions,
        vec![
            Condition::new("name", Operator::Eq, "hello"),
            Condition::new("timestamp", Operator::Gt, "2"),
        ]
    );
    assert_eq!(spec.limit, 1000);
    assert_eq!(spec.offset, 0);
}

#[test]
fn in_keeps_split_order() {
    let schema = common::timeline();
    let spec = compile(&schema, params(&[("in-name", "john,brad,tim")])).unwrap();
    assert_eq!(
        spec.conditions,
        vec![Condition::within("name", ["john", "brad", "tim"])]
    );
}

#[test]
fn limit_and_offset() {
    let schema = common::timeline();

    let spec = compile(&schema, params(&[("q-limit", "1")])).unwrap();
    assert_eq!((spec.limit, spec.offset), (1, 0));

    let spec = compile(&schema, params(&[("q-offset", "1")])).unwrap();
    assert_eq!((spec.limit, spec.offset), (1000, 1));

    let spec = compile(&schema, params(&[("q-limit", "ten"), ("q-offset", "-3")])).unwrap();
    assert_eq!((spec.limit, spec.offset), (1000, 0));
}

#[test]
fn order_parses_direction_and_field() {
    let schema = common::timeline();
    let spec = compile(&schema, params(&[("q-order", "desc-timestamp")])).unwrap();
    assert_eq!(
        spec.order,
        Some(OrderSpec {
            field: "timestamp".into(),
            direction: Direction::Desc,
        })
    );
}

#[test]
fn malformed_order_is_an_error() {
    let schema = common::timeline();
    assert_eq!(
        compile(&schema, params(&[("q-order", "desc-times")])).unwrap_err(),
        QueryError::UnknownOrderField("times".into())
    );
    assert_eq!(
        compile(&schema, params(&[("q-order", "timestamp")])).unwrap_err(),
        QueryError::InvalidOrderFormat("timestamp".into())
    );
    assert_eq!(
        compile(&schema, params(&[("q-order", "down-timestamp")])).unwrap_err(),
        QueryError::InvalidOrderDirection("down".into())
    );
}

#[test]
fn order_checks_field_before_direction() {
    let schema = common::timeline();
    assert_eq!(
        compile(&schema, params(&[("q-order", "down-times")])).unwrap_err(),
        QueryError::UnknownOrderField("times".into())
    );
}

// Unmatched keys and operators are dropped, not rejected.
#[test]
fn unknown_keys_are_dropped() {
    let schema = common::timeline();
    let base = compile(&schema, params(&[("name", "a")])).unwrap();
    let spec = compile(
        &schema,
        params(&[
            ("name", "a"),
            ("madeUp", "x"),
            ("like-name", "a%"),
            ("gt-nothing", "1"),
            ("a-b-c", "1"),
        ]),
    )
    .unwrap();
    assert_eq!(spec, base);
}

#[test]
fn fields_without_a_column_are_not_filterable() {
    let schema = common::timeline();
    let spec = compile(&schema, params(&[("email", "a@b.co")])).unwrap();
    assert!(spec.conditions.is_empty());
}

#[test]
fn keys_match_case_insensitively() {
    let schema = common::timeline();
    let spec = compile(&schema, params(&[("NAME", "x"), ("lte-TimeStamp", "9")])).unwrap();
    assert_eq!(
        spec.conditions,
        vec![
            Condition::new("name", Operator::Eq, "x"),
            Condition::new("timestamp", Operator::Lte, "9"),
        ]
    );
}

#[test]
fn conditions_are_ordered_independently_of_input() {
    let schema = common::timeline();
    let a = compile(
        &schema,
        params(&[("timestamp", "3"), ("gt-id", "1"), ("name", "z"), ("lt-id", "9")]),
    )
    .unwrap();
    let b = compile(
        &schema,
        params(&[("lt-id", "9"), ("name", "z"), ("gt-id", "1"), ("timestamp", "3")]),
    )
    .unwrap();
    assert_eq!(a, b);
    let fields: Vec<_> = a
        .conditions
        .iter()
        .map(|c| (c.field.as_str(), c.operator))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("id", Operator::Lt),
            ("id", Operator::Gt),
            ("name", Operator::Eq),
            ("timestamp", Operator::Eq),
        ]
    );
}

#[test]
fn repeated_key_keeps_first_value() {
    let schema = common::timeline();
    let spec = compile(&schema, params(&[("name", "first"), ("name", "second")])).unwrap();
    assert_eq!(spec.conditions, vec![Condition::new("name", Operator::Eq, "first")]);
}

#[test]
fn field_projection() {
    let schema = common::timeline();
    let spec = compile(&schema, params(&[("q-fields", "name,timestamp")])).unwrap();
    assert_eq!(
        spec.fields,
        Some(vec!["name".to_string(), "timestamp".to_string()])
    );
}

#[test]
fn select_renders_typed_placeholders() {
    let schema = common::timeline();
    let spec = compile(
        &schema,
        params(&[
            ("name", "hello"),
            ("gt-timestamp", "2"),
            ("in-id", "4,5"),
            ("q-order", "desc-timestamp"),
            ("q-limit", "10"),
        ]),
    )
    .unwrap();
    let q = sql::select(&schema, &spec).unwrap();
    assert_eq!(
        q.sql,
        "SELECT \"id\", \"name\", \"timestamp\" FROM \"timeline\" \
         WHERE \"id\" IN ($1::bigint, $2::bigint) AND \"name\" = $3::text AND \"timestamp\" > $4::bigint \
         ORDER BY \"timestamp\" DESC LIMIT 10 OFFSET 0"
    );
    assert_eq!(
        q.params,
        vec![
            PgBindValue::I64(4),
            PgBindValue::I64(5),
            PgBindValue::String("hello".into()),
            PgBindValue::I64(2),
        ]
    );
}

#[test]
fn select_without_order_sorts_by_primary_key() {
    let schema = common::timeline();
    let q = sql::select(&schema, &QuerySpec::default()).unwrap();
    assert_eq!(
        q.sql,
        "SELECT \"id\", \"name\", \"timestamp\" FROM \"timeline\" ORDER BY \"id\" LIMIT 1000 OFFSET 0"
    );
    assert!(q.params.is_empty());
}

#[test]
fn untyped_literal_is_rejected_at_render() {
    let schema = common::timeline();
    let spec = compile(&schema, params(&[("gt-timestamp", "yesterday")])).unwrap();
    let err = sql::select(&schema, &spec).unwrap_err();
    assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
}
