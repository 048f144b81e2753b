/// Types for rule-builder filters and the backend filter clauses they compile to
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use strum_macros::{AsRefStr, Display, EnumString};

/// One leaf condition from the rule-builder UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: Value,
}

impl Rule {
    pub fn new(field: &str, operator: &str, value: Value) -> Self {
        Self {
            field: field.to_string(),
            operator: operator.to_string(),
            value,
        }
    }
}

/// How the rules of a group combine. Anything other than "OR" means AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    #[default]
    And,
    Or,
}

impl From<String> for Condition {
    fn from(s: String) -> Self {
        if s == "OR" {
            Condition::Or
        } else {
            Condition::And
        }
    }
}

impl From<Condition> for String {
    fn from(c: Condition) -> Self {
        match c {
            Condition::And => "AND".to_string(),
            Condition::Or => "OR".to_string(),
        }
    }
}

/// A flat group of rules joined by one condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleTree {
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleTree {
    pub fn new(condition: Condition, rules: Vec<Rule>) -> Self {
        Self { condition, rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Operator {
    Equal,
    NotEqual,
    BeginsWith,
    NotBeginsWith,
    Contains,
    NotContains,
    IsNull,
    IsNotNull,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Between,
}

impl Operator {
    /// Negation follows the operator name: every `not_*` operator and `is_null`.
    pub fn is_negated(&self) -> bool {
        matches!(self, Operator::IsNull) || self.as_ref().starts_with("not_")
    }
}

/// Bounds of a range clause. Values are numbers for rule filters and
/// timestamps for the time-range filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RangeBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolClause {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<FilterClause>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<FilterClause>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<FilterClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<u32>,
}

/// A backend filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    Term { field: String, value: Value },
    Prefix { field: String, value: Value },
    Regexp { field: String, pattern: String },
    Range { field: String, bounds: RangeBounds },
    Exists { field: String },
    Bool(BoolClause),
}

impl FilterClause {
    pub fn term(field: &str, value: impl Into<Value>) -> Self {
        FilterClause::Term {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn prefix(field: &str, value: impl Into<Value>) -> Self {
        FilterClause::Prefix {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn exists(field: &str) -> Self {
        FilterClause::Exists {
            field: field.to_string(),
        }
    }

    pub fn must_not(clause: FilterClause) -> Self {
        FilterClause::Bool(BoolClause {
            must_not: vec![clause],
            ..Default::default()
        })
    }
}

impl Serialize for FilterClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            FilterClause::Term { field, value } => {
                map.serialize_entry("term", &BTreeMap::from([(field, value)]))?
            }
            FilterClause::Prefix { field, value } => {
                map.serialize_entry("prefix", &BTreeMap::from([(field, value)]))?
            }
            FilterClause::Regexp { field, pattern } => {
                map.serialize_entry("regexp", &BTreeMap::from([(field, pattern)]))?
            }
            FilterClause::Range { field, bounds } => {
                map.serialize_entry("range", &BTreeMap::from([(field, bounds)]))?
            }
            FilterClause::Exists { field } => {
                map.serialize_entry("exists", &BTreeMap::from([("field", field)]))?
            }
            FilterClause::Bool(clause) => map.serialize_entry("bool", clause)?,
        }
        map.end()
    }
}
