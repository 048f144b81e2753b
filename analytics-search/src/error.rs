use crate::filter::Rule;

/// Errors raised while compiling filters or shaping a query document.
///
/// Backend I/O failures are not represented here; those surface as
/// `anyhow::Error` from the [`crate::backend::SearchBackend`] boundary.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("unknown filter operator: {operator} (rule: {rule:?})")]
    InvalidFilterOperator { operator: String, rule: Rule },

    #[error("invalid value for filter operator {}: {reason} (rule: {rule:?})", rule.operator)]
    InvalidFilterValue { rule: Rule, reason: String },

    #[error("malformed search filters: {0}")]
    MalformedFilters(#[from] serde_json::Error),

    #[error("no histogram interval configured for this search")]
    MissingInterval,

    #[error("invalid region code: {0}")]
    InvalidRegion(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
