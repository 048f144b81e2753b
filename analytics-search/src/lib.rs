//! Query construction and result retrieval for API request analytics.
//!
//! [`AnalyticsSearch`] builds a search document over the monthly request-log
//! indices: time range, permission scope, user filters and aggregations.
//! [`ResultFetcher`] runs it against a [`SearchBackend`], either one page at a
//! time or as a full scroll scan.

pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod fetcher;
pub mod fields;
pub mod filter;

pub use backend::{HttpSearchBackend, SearchBackend};
pub use config::AnalyticsConfig;
pub use document::{AnalyticsSearch, FilterInput, Interval};
pub use error::SearchError;
pub use fetcher::{ResultFetcher, ScrollSummary};
pub use filter::{Condition, FilterClause, Rule, RuleTree};
