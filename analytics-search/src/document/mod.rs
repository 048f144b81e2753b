//! Query documents for request-log reports.
//!
//! [`AnalyticsSearch`] owns one [`QueryDocument`] and accumulates filters,
//! time range, sort, pagination, free-text search and aggregations onto it.

mod aggregations;
mod builder;
mod model;

pub use aggregations::{
    Aggregation, AggregationKind, CardinalityAggregation, DateHistogramAggregation,
    ExtendedBounds, FieldAggregation, Interval, TermsAggregation,
};
pub use builder::{AnalyticsSearch, FilterInput};
pub use model::{
    BaseQuery, DocumentFilter, FilteredQuery, QueryDocument, QueryRoot, RequiredFilters,
    SortOrder, SortSpec, DEFAULT_TIMEOUT_SECS,
};
