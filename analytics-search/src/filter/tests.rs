use super::*;
use crate::error::SearchError;
use serde_json::{json, Value};

fn compile(field: &str, operator: &str, value: Value) -> Value {
    serde_json::to_value(compile_rule(&Rule::new(field, operator, value)).unwrap()).unwrap()
}

#[test]
fn test_equal_compiles_to_term() {
    assert_eq!(
        compile("status", "equal", json!(200)),
        json!({"term": {"status": 200}})
    );
}

#[test]
fn test_not_equal_wraps_term_in_must_not() {
    let equal = compile("user_email", "equal", json!("a@example.com"));
    let not_equal = compile("user_email", "not_equal", json!("a@example.com"));
    assert_eq!(not_equal, json!({"bool": {"must_not": [equal]}}));
}

#[test]
fn test_begins_with_compiles_to_prefix() {
    assert_eq!(
        compile("request_path", "begins_with", json!("/API/v1")),
        json!({"prefix": {"request_path": "/api/v1"}})
    );
    assert_eq!(
        compile("request_path", "not_begins_with", json!("/api")),
        json!({"bool": {"must_not": [{"prefix": {"request_path": "/api"}}]}})
    );
}

#[test]
fn test_contains_escapes_and_wraps_value() {
    assert_eq!(
        compile("request_url", "contains", json!("example.com/a+b")),
        json!({"regexp": {"request_url": ".*example\\.com/a\\+b.*"}})
    );
    assert_eq!(
        compile("request_url", "not_contains", json!("x")),
        json!({"bool": {"must_not": [{"regexp": {"request_url": ".*x.*"}}]}})
    );
}

#[test]
fn test_null_checks_use_exists() {
    assert_eq!(
        compile("user_id", "is_not_null", Value::Null),
        json!({"exists": {"field": "user_id"}})
    );
    assert_eq!(
        compile("user_id", "is_null", Value::Null),
        json!({"bool": {"must_not": [{"exists": {"field": "user_id"}}]}})
    );
}

#[test]
fn test_single_bound_ranges() {
    assert_eq!(
        compile("response_time", "less", json!(100)),
        json!({"range": {"response_time": {"lt": 100}}})
    );
    assert_eq!(
        compile("response_time", "less_or_equal", json!(100)),
        json!({"range": {"response_time": {"lte": 100}}})
    );
    assert_eq!(
        compile("response_time", "greater", json!(1.5)),
        json!({"range": {"response_time": {"gt": 1.5}}})
    );
    assert_eq!(
        compile("response_time", "greater_or_equal", json!("250")),
        json!({"range": {"response_time": {"gte": 250.0}}})
    );
}

#[test]
fn test_between_uses_both_bounds() {
    assert_eq!(
        compile("response_status", "between", json!([5, 10])),
        json!({"range": {"response_status": {"gte": 5, "lte": 10}}})
    );
}

#[test]
fn test_between_orders_bounds() {
    assert_eq!(
        compile("response_status", "between", json!([500, 400])),
        json!({"range": {"response_status": {"gte": 400, "lte": 500}}})
    );
}

#[test]
fn test_between_requires_two_bounds() {
    let rule = Rule::new("response_status", "between", json!([5]));
    assert!(matches!(
        compile_rule(&rule),
        Err(SearchError::InvalidFilterValue { .. })
    ));

    let rule = Rule::new("response_status", "between", json!(5));
    assert!(matches!(
        compile_rule(&rule),
        Err(SearchError::InvalidFilterValue { .. })
    ));
}

#[test]
fn test_range_accepts_date_bounds() {
    assert_eq!(
        compile("request_at", "less", json!("2024-01-15T00:00:00Z")),
        json!({"range": {"request_at": {"lt": "2024-01-15T00:00:00Z"}}})
    );
    assert_eq!(
        compile("request_at", "greater_or_equal", json!("now-1d")),
        json!({"range": {"request_at": {"gte": "now-1d"}}})
    );
}

#[test]
fn test_between_keeps_non_numeric_bounds_in_order() {
    assert_eq!(
        compile(
            "request_at",
            "between",
            json!(["2024-01-01T00:00:00Z", "2024-01-31T23:59:59Z"])
        ),
        json!({"range": {"request_at": {
            "gte": "2024-01-01T00:00:00Z",
            "lte": "2024-01-31T23:59:59Z"
        }}})
    );
}

#[test]
fn test_range_rejects_non_scalar_value() {
    let rule = Rule::new("response_time", "less", json!({"value": 5}));
    let err = compile_rule(&rule).unwrap_err();
    assert!(err.to_string().contains("expected a number or string bound"));

    let rule = Rule::new("response_time", "between", json!([1, null]));
    assert!(matches!(
        compile_rule(&rule),
        Err(SearchError::InvalidFilterValue { .. })
    ));
}

#[test]
fn test_unknown_operator_carries_rule() {
    let rule = Rule::new("status", "roughly_equal", json!(200));
    match compile_rule(&rule) {
        Err(SearchError::InvalidFilterOperator { operator, rule: failed }) => {
            assert_eq!(operator, "roughly_equal");
            assert_eq!(failed, rule);
        }
        other => panic!("expected InvalidFilterOperator, got {:?}", other),
    }
}

#[test]
fn test_uppercase_field_normalization() {
    assert_eq!(
        compile("request_ip_country", "equal", json!("us")),
        json!({"term": {"request_ip_country": "US"}})
    );
}

#[test]
fn test_default_field_lowercased() {
    assert_eq!(
        compile("user_email", "equal", json!("UserName")),
        json!({"term": {"user_email": "username"}})
    );
}

#[test]
fn test_case_sensitive_field_preserved() {
    assert_eq!(
        compile("api_key", "equal", json!("MixedCase")),
        json!({"term": {"api_key": "MixedCase"}})
    );
}

#[test]
fn test_or_condition_combines_with_should() {
    let tree = RuleTree::new(
        Condition::Or,
        vec![
            Rule::new("request_method", "equal", json!("get")),
            Rule::new("request_method", "equal", json!("post")),
        ],
    );
    let clause = compile_rule_tree(Some(&tree)).unwrap().unwrap();
    assert_eq!(
        serde_json::to_value(clause).unwrap(),
        json!({"bool": {
            "should": [
                {"term": {"request_method": "GET"}},
                {"term": {"request_method": "POST"}}
            ],
            "minimum_should_match": 1
        }})
    );
}

#[test]
fn test_default_condition_combines_with_must() {
    let tree: RuleTree = serde_json::from_value(json!({
        "rules": [
            {"field": "status", "operator": "equal", "value": 200},
            {"field": "user_id", "operator": "is_not_null", "value": null}
        ]
    }))
    .unwrap();
    assert_eq!(tree.condition, Condition::And);

    let clause = compile_rule_tree(Some(&tree)).unwrap().unwrap();
    match clause {
        FilterClause::Bool(bool_clause) => {
            assert_eq!(bool_clause.must.len(), 2);
            assert!(bool_clause.should.is_empty());
            assert_eq!(bool_clause.minimum_should_match, None);
        }
        other => panic!("expected bool clause, got {:?}", other),
    }
}

#[test]
fn test_unrecognized_condition_means_and() {
    let tree: RuleTree = serde_json::from_value(json!({
        "condition": "XOR",
        "rules": [{"field": "status", "operator": "equal", "value": 200}]
    }))
    .unwrap();
    assert_eq!(tree.condition, Condition::And);
}

#[test]
fn test_absent_or_empty_tree_yields_no_filter() {
    assert_eq!(compile_rule_tree(None).unwrap(), None);
    assert_eq!(compile_rule_tree(Some(&RuleTree::default())).unwrap(), None);
}

#[test]
fn test_tree_fails_on_any_bad_rule() {
    let tree = RuleTree::new(
        Condition::And,
        vec![
            Rule::new("status", "equal", json!(200)),
            Rule::new("status", "like", json!(200)),
        ],
    );
    assert!(matches!(
        compile_rule_tree(Some(&tree)),
        Err(SearchError::InvalidFilterOperator { .. })
    ));
}

#[test]
fn test_operator_negation_follows_name() {
    assert!(Operator::NotEqual.is_negated());
    assert!(Operator::NotContains.is_negated());
    assert!(Operator::IsNull.is_negated());
    assert!(!Operator::IsNotNull.is_negated());
    assert!(!Operator::Between.is_negated());
    assert_eq!(Operator::GreaterOrEqual.to_string(), "greater_or_equal");
}

#[test]
fn test_escape_regexp() {
    assert_eq!(escape_regexp("0/example.com/"), "0/example\\.com/");
    assert_eq!(escape_regexp("a@b<c>"), "a\\@b\\<c\\>");
    assert_eq!(escape_regexp("plain"), "plain");
}
