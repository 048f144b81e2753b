use super::aggregations::Interval;
use super::model::{BaseQuery, QueryDocument, SortOrder, SortSpec};
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::fields;
use crate::filter::{compile_rule_tree, FilterClause, RangeBounds, RuleTree};
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde_json::Value;

/// Search filters as handed over by the reporting layer: either already
/// structured, or the rule builder's serialized JSON.
#[derive(Debug, Clone)]
pub enum FilterInput {
    Rules(RuleTree),
    Serialized(String),
}

impl From<RuleTree> for FilterInput {
    fn from(tree: RuleTree) -> Self {
        FilterInput::Rules(tree)
    }
}

impl From<&str> for FilterInput {
    fn from(raw: &str) -> Self {
        FilterInput::Serialized(raw.to_string())
    }
}

impl From<String> for FilterInput {
    fn from(raw: String) -> Self {
        FilterInput::Serialized(raw)
    }
}

/// Builds one request-log search over `[start_time, end_time]`.
///
/// The document starts as a match-all query sorted newest first, with no
/// hits returned (`size` 0) so that plain reports only fetch counts and
/// aggregations. Every setter mutates the owned document in place and
/// returns `&mut Self` for chaining.
#[derive(Debug, Clone)]
pub struct AnalyticsSearch {
    config: AnalyticsConfig,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    interval: Option<Interval>,
    document: QueryDocument,
    query_params: Vec<(String, String)>,
}

impl AnalyticsSearch {
    pub fn new(
        config: AnalyticsConfig,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        interval: Option<Interval>,
    ) -> Self {
        Self {
            config,
            start_time,
            end_time,
            interval,
            document: QueryDocument::new(SortSpec::field(fields::TIMESTAMP, SortOrder::Desc)),
            query_params: vec![
                ("ignore_unavailable".to_string(), "true".to_string()),
                ("allow_no_indices".to_string(), "true".to_string()),
            ],
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn interval(&self) -> Option<Interval> {
        self.interval
    }

    pub fn document(&self) -> &QueryDocument {
        &self.document
    }

    pub(crate) fn document_mut(&mut self) -> &mut QueryDocument {
        &mut self.document
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    /// The request body as JSON.
    pub fn body(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.document)
    }

    pub(crate) fn start_time_string(&self) -> String {
        self.start_time.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub(crate) fn end_time_string(&self) -> String {
        self.end_time.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Monthly indices covering the time range, oldest first.
    pub fn index_names(&self) -> Vec<String> {
        let (mut year, mut month) = (self.start_time.year(), self.start_time.month());
        let end = (self.end_time.year(), self.end_time.month());
        let mut names = Vec::new();
        while (year, month) <= end {
            names.push(format!("{}-{:04}-{:02}", self.config.index_prefix, year, month));
            if month == 12 {
                year += 1;
                month = 1;
            } else {
                month += 1;
            }
        }
        if names.is_empty() {
            names.push(format!("{}-*", self.config.index_prefix));
        }
        names
    }

    pub fn search_path(&self) -> String {
        format!("/{}/_search", self.index_names().join(","))
    }

    /// Restricts results to what the caller may see. Callers always pass the
    /// resolved scope of the requesting user.
    pub fn set_permission_scope(&mut self, scope: &RuleTree) -> Result<&mut Self> {
        match compile_rule_tree(Some(scope))? {
            Some(clause) => self.document.push_must(clause),
            None => tracing::warn!("empty permission scope, search is not restricted"),
        }
        Ok(self)
    }

    pub fn filter_by_time_range(&mut self) -> &mut Self {
        let clause = FilterClause::Range {
            field: fields::TIMESTAMP.to_string(),
            bounds: RangeBounds {
                gte: Some(Value::String(self.start_time_string())),
                lte: Some(Value::String(self.end_time_string())),
                ..Default::default()
            },
        };
        self.document.push_must(clause);
        self
    }

    /// Leaves out backfilled records imported from other systems.
    pub fn filter_exclude_imported(&mut self) -> &mut Self {
        self.document
            .push_must_not(FilterClause::exists(fields::IMPORTED));
        self
    }

    pub fn set_search_query_string(&mut self, query: &str) -> &mut Self {
        if !query.trim().is_empty() {
            self.document
                .set_base_query(BaseQuery::QueryString(query.to_string()));
        }
        self
    }

    pub fn set_search_filters(&mut self, filters: impl Into<FilterInput>) -> Result<&mut Self> {
        let tree = match filters.into() {
            FilterInput::Rules(tree) => Some(tree),
            FilterInput::Serialized(raw) if raw.trim().is_empty() => None,
            FilterInput::Serialized(raw) => serde_json::from_str::<Option<RuleTree>>(&raw)?,
        };
        if let Some(clause) = compile_rule_tree(tree.as_ref())? {
            self.document.push_must(clause);
        }
        Ok(self)
    }

    pub fn set_sort(&mut self, sort: Vec<SortSpec>) -> &mut Self {
        self.document.sort = Some(sort);
        self
    }

    pub fn set_offset(&mut self, offset: u64) -> &mut Self {
        self.document.from = Some(offset);
        self
    }

    pub fn set_limit(&mut self, limit: u64) -> &mut Self {
        self.document.size = limit;
        self
    }

    pub fn set_timeout(&mut self, seconds: u64) -> &mut Self {
        self.document.timeout_secs = seconds;
        self
    }

    /// Switches the document to a scroll scan kept alive for `keep_alive`.
    /// A zero page size is replaced by `default_page_size`.
    pub(crate) fn enable_scroll(&mut self, keep_alive: &str, default_page_size: u64) {
        self.query_params
            .push(("scroll".to_string(), keep_alive.to_string()));
        if self.document.size == 0 {
            self.document.size = default_page_size;
        }
        if self.config.is_legacy_backend() {
            self.document.sort = None;
            self.query_params
                .push(("search_type".to_string(), "scan".to_string()));
        } else {
            self.document.sort = Some(vec![SortSpec::DocOrder]);
        }
    }
}
