use super::aggregations::Aggregation;
use crate::filter::FilterClause;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Full request body sent to the search backend.
///
/// Filter and sort lists are `Vec`s so that they always serialize as arrays,
/// including when empty. The aggregation map is left out of the body when no
/// aggregation was added.
#[derive(Debug, Clone, Serialize)]
pub struct QueryDocument {
    pub query: QueryRoot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortSpec>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub aggregations: IndexMap<String, Aggregation>,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    #[serde(rename = "timeout", serialize_with = "serialize_seconds")]
    pub timeout_secs: u64,
}

impl QueryDocument {
    pub fn new(default_sort: SortSpec) -> Self {
        Self {
            query: QueryRoot::default(),
            sort: Some(vec![default_sort]),
            aggregations: IndexMap::new(),
            size: 0,
            from: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn must(&self) -> &[FilterClause] {
        &self.query.filtered.filter.bool.must
    }

    pub fn must_not(&self) -> &[FilterClause] {
        &self.query.filtered.filter.bool.must_not
    }

    pub(crate) fn push_must(&mut self, clause: FilterClause) {
        self.query.filtered.filter.bool.must.push(clause);
    }

    pub(crate) fn push_must_not(&mut self, clause: FilterClause) {
        self.query.filtered.filter.bool.must_not.push(clause);
    }

    pub fn base_query(&self) -> &BaseQuery {
        &self.query.filtered.query
    }

    pub(crate) fn set_base_query(&mut self, query: BaseQuery) {
        self.query.filtered.query = query;
    }
}

fn serialize_seconds<S: Serializer>(secs: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{}s", secs))
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryRoot {
    pub filtered: FilteredQuery,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FilteredQuery {
    pub query: BaseQuery,
    pub filter: DocumentFilter,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentFilter {
    pub bool: RequiredFilters,
}

/// Required and excluded filters of the document. Never skipped when empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequiredFilters {
    pub must: Vec<FilterClause>,
    pub must_not: Vec<FilterClause>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum BaseQuery {
    #[default]
    MatchAll,
    QueryString(String),
}

impl Serialize for BaseQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            BaseQuery::MatchAll => {
                map.serialize_entry("match_all", &BTreeMap::<&str, ()>::new())?
            }
            BaseQuery::QueryString(query) => {
                map.serialize_entry("query_string", &BTreeMap::from([("query", query)]))?
            }
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortSpec {
    Field { field: String, order: SortOrder },
    /// Index order, the cheapest sort for unordered scans.
    DocOrder,
}

impl SortSpec {
    pub fn field(field: &str, order: SortOrder) -> Self {
        SortSpec::Field {
            field: field.to_string(),
            order,
        }
    }
}

impl Serialize for SortSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SortSpec::DocOrder => serializer.serialize_str("_doc"),
            SortSpec::Field { field, order } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(field, &BTreeMap::from([("order", order)]))?;
                map.end()
            }
        }
    }
}
