use super::types::{BoolClause, Condition, FilterClause, Operator, RangeBounds, Rule, RuleTree};
use crate::error::{Result, SearchError};
use crate::fields::FieldCase;
use serde_json::Value;
use std::str::FromStr;

/// Characters with special meaning in the backend's regexp syntax.
const REGEXP_RESERVED: &[char] = &[
    '.', '?', '+', '*', '|', '{', '}', '[', ']', '(', ')', '"', '\\', '#', '@', '&', '<', '>', '~',
];

/// Compiles a rule group into a single filter clause.
/// Returns `None` when there is no tree or it holds no rules.
pub fn compile_rule_tree(tree: Option<&RuleTree>) -> Result<Option<FilterClause>> {
    let tree = match tree {
        Some(tree) if !tree.is_empty() => tree,
        _ => return Ok(None),
    };

    let clauses = tree
        .rules
        .iter()
        .map(compile_rule)
        .collect::<Result<Vec<_>>>()?;

    let combined = match tree.condition {
        Condition::Or => BoolClause {
            should: clauses,
            // At least one rule must hold.
            minimum_should_match: Some(1),
            ..Default::default()
        },
        Condition::And => BoolClause {
            must: clauses,
            ..Default::default()
        },
    };
    Ok(Some(FilterClause::Bool(combined)))
}

/// Compiles one rule, wrapping negated operators in `must_not`.
pub fn compile_rule(rule: &Rule) -> Result<FilterClause> {
    let operator =
        Operator::from_str(&rule.operator).map_err(|_| SearchError::InvalidFilterOperator {
            operator: rule.operator.clone(),
            rule: rule.clone(),
        })?;

    let value = normalize_value(&rule.field, &rule.value);
    let field = rule.field.clone();

    let clause = match operator {
        Operator::Equal | Operator::NotEqual => FilterClause::Term { field, value },
        Operator::BeginsWith | Operator::NotBeginsWith => FilterClause::Prefix { field, value },
        Operator::Contains | Operator::NotContains => FilterClause::Regexp {
            field,
            pattern: format!(".*{}.*", escape_regexp(&value_to_string(&value))),
        },
        Operator::IsNull | Operator::IsNotNull => FilterClause::Exists { field },
        Operator::Less => range(field, |b, v| b.lt = Some(v), range_bound(rule, &value)?),
        Operator::LessOrEqual => range(field, |b, v| b.lte = Some(v), range_bound(rule, &value)?),
        Operator::Greater => range(field, |b, v| b.gt = Some(v), range_bound(rule, &value)?),
        Operator::GreaterOrEqual => {
            range(field, |b, v| b.gte = Some(v), range_bound(rule, &value)?)
        }
        Operator::Between => {
            let (low, high) = between_bounds(rule, &value)?;
            FilterClause::Range {
                field,
                bounds: RangeBounds {
                    gte: Some(low),
                    lte: Some(high),
                    ..Default::default()
                },
            }
        }
    };

    if operator.is_negated() {
        Ok(FilterClause::must_not(clause))
    } else {
        Ok(clause)
    }
}

/// Escapes every regexp-reserved character so the text matches literally.
pub fn escape_regexp(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if REGEXP_RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn normalize_value(field: &str, value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(FieldCase::of(field).apply(s)),
        other => other.clone(),
    }
}

fn range(
    field: String,
    set_bound: impl FnOnce(&mut RangeBounds, Value),
    value: Value,
) -> FilterClause {
    let mut bounds = RangeBounds::default();
    set_bound(&mut bounds, value);
    FilterClause::Range { field, bounds }
}

/// Numbers pass through as given and numeric strings are parsed. Other
/// strings (dates, keywords) are kept as is for the backend to interpret.
fn range_bound(rule: &Rule, value: &Value) -> Result<Value> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::String(_) => Ok(as_f64(value)
            .map(|n| serde_json::json!(n))
            .unwrap_or_else(|| value.clone())),
        other => Err(SearchError::InvalidFilterValue {
            rule: rule.clone(),
            reason: format!("expected a number or string bound, found {}", other),
        }),
    }
}

fn between_bounds(rule: &Rule, value: &Value) -> Result<(Value, Value)> {
    let bounds = match value {
        Value::Array(items) if items.len() == 2 => items,
        _ => {
            return Err(SearchError::InvalidFilterValue {
                rule: rule.clone(),
                reason: "expected exactly two bounds".to_string(),
            })
        }
    };

    let first = range_bound(rule, &bounds[0])?;
    let second = range_bound(rule, &bounds[1])?;
    match (as_f64(&first), as_f64(&second)) {
        (Some(low), Some(high)) if low > high => Ok((second, first)),
        _ => Ok((first, second)),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
