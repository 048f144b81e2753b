//! Dashboard aggregations added onto an [`AnalyticsSearch`] document.

use super::builder::AnalyticsSearch;
use crate::error::{Result, SearchError};
use crate::fields;
use crate::filter::{escape_regexp, FilterClause};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use strum_macros::{Display, EnumString};

/// Oversampling factor for per-shard term buckets, improving top-N accuracy.
const SHARD_SIZE_FACTOR: u64 = 4;
const CARDINALITY_PRECISION_THRESHOLD: u64 = 100;
const DRILLDOWN_OVER_TIME_SIZE: u64 = 10;
const REGION_BUCKETS: u64 = 500;

lazy_static! {
    static ref COUNTRY_CODE: Regex = Regex::new(r"^[A-Z]{2}$").unwrap();
    static ref SUBDIVISION_CODE: Regex = Regex::new(r"^([A-Z]{2})-([A-Z0-9]{1,3})$").unwrap();
}

/// Bucket width of a date histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Interval {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

/// A named aggregation, with optional nested sub-aggregations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    #[serde(flatten)]
    pub kind: AggregationKind,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub aggregations: IndexMap<String, Aggregation>,
}

impl Aggregation {
    pub fn new(kind: AggregationKind) -> Self {
        Self {
            kind,
            aggregations: IndexMap::new(),
        }
    }

    pub fn with_sub(mut self, name: &str, sub: Aggregation) -> Self {
        self.aggregations.insert(name.to_string(), sub);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    Terms(TermsAggregation),
    Cardinality(CardinalityAggregation),
    DateHistogram(DateHistogramAggregation),
    Missing(FieldAggregation),
    ValueCount(FieldAggregation),
    Avg(FieldAggregation),
    Max(FieldAggregation),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldAggregation {
    pub field: String,
}

impl FieldAggregation {
    fn of(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermsAggregation {
    pub field: String,
    /// Zero asks for every bucket.
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Value>,
}

impl TermsAggregation {
    fn new(field: &str, size: u64) -> Self {
        Self {
            field: field.to_string(),
            size,
            shard_size: None,
            include: None,
            order: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardinalityAggregation {
    pub field: String,
    pub precision_threshold: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateHistogramAggregation {
    pub field: String,
    pub interval: Interval,
    pub time_zone: String,
    pub min_doc_count: u64,
    pub extended_bounds: ExtendedBounds,
    /// Set only for legacy backends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_zone_adjust_large_interval: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedBounds {
    pub min: String,
    pub max: String,
}

fn drilldown_include(prefix: &str) -> String {
    format!("{}.*", escape_regexp(prefix))
}

impl AnalyticsSearch {
    /// Builds the timestamp histogram shared by every time-series aggregation.
    fn date_histogram(&self) -> Result<Aggregation> {
        let interval = self.interval().ok_or(SearchError::MissingInterval)?;
        let legacy = self.config().is_legacy_backend();
        Ok(Aggregation::new(AggregationKind::DateHistogram(
            DateHistogramAggregation {
                field: fields::TIMESTAMP.to_string(),
                interval,
                time_zone: self.config().timezone.clone(),
                min_doc_count: 0,
                extended_bounds: ExtendedBounds {
                    min: self.start_time_string(),
                    max: self.end_time_string(),
                },
                pre_zone_adjust_large_interval: legacy.then_some(true),
            },
        )))
    }

    /// Registers `aggregation` under `name`, replacing any earlier one.
    pub fn add_aggregation(&mut self, name: &str, aggregation: Aggregation) -> &mut Self {
        self.document_mut()
            .aggregations
            .insert(name.to_string(), aggregation);
        self
    }

    pub fn aggregate_by_interval(&mut self) -> Result<&mut Self> {
        let histogram = self.date_histogram()?;
        Ok(self.add_aggregation("hits_over_time", histogram))
    }

    /// Top-N terms for `field` plus its total value count and missing count.
    pub fn aggregate_by_term(&mut self, field: &str, size: u64) -> &mut Self {
        let mut terms = TermsAggregation::new(field, size);
        terms.shard_size = Some(size.saturating_mul(SHARD_SIZE_FACTOR));
        self.add_aggregation(
            &format!("top_{}", field),
            Aggregation::new(AggregationKind::Terms(terms)),
        )
        .add_aggregation(
            &format!("value_count_{}", field),
            Aggregation::new(AggregationKind::ValueCount(FieldAggregation::of(field))),
        )
        .add_aggregation(
            &format!("missing_{}", field),
            Aggregation::new(AggregationKind::Missing(FieldAggregation::of(field))),
        )
    }

    pub fn aggregate_by_cardinality(&mut self, field: &str) -> &mut Self {
        self.add_aggregation(
            &format!("unique_{}", field),
            Aggregation::new(AggregationKind::Cardinality(CardinalityAggregation {
                field: field.to_string(),
                precision_threshold: CARDINALITY_PRECISION_THRESHOLD,
            })),
        )
    }

    pub fn aggregate_by_users(&mut self, size: u64) -> &mut Self {
        self.aggregate_by_term(fields::USER_EMAIL, size)
            .aggregate_by_cardinality(fields::USER_EMAIL)
    }

    pub fn aggregate_by_request_ip(&mut self, size: u64) -> &mut Self {
        self.aggregate_by_term(fields::REQUEST_IP, size)
            .aggregate_by_cardinality(fields::REQUEST_IP)
    }

    pub fn aggregate_by_response_time_average(&mut self) -> &mut Self {
        self.add_aggregation(
            "response_time_average",
            Aggregation::new(AggregationKind::Avg(FieldAggregation::of(
                fields::RESPONSE_TIME,
            ))),
        )
    }

    /// Hierarchy buckets below `prefix` (e.g. `1/example.com/`). A `size` of 0
    /// returns every bucket.
    pub fn aggregate_by_drilldown(&mut self, prefix: &str, size: u64) -> &mut Self {
        let mut terms = TermsAggregation::new(fields::HIERARCHY, size);
        terms.include = Some(drilldown_include(prefix));
        self.add_aggregation("drilldown", Aggregation::new(AggregationKind::Terms(terms)))
    }

    /// Restricts hits to `prefix`, then charts the top paths below it over time
    /// next to the overall hit histogram.
    pub fn aggregate_by_drilldown_over_time(&mut self, prefix: &str) -> Result<&mut Self> {
        let path_histogram = self.date_histogram()?;
        let overall_histogram = self.date_histogram()?;

        self.document_mut()
            .push_must(FilterClause::prefix(fields::HIERARCHY, prefix));

        let mut terms = TermsAggregation::new(fields::HIERARCHY, DRILLDOWN_OVER_TIME_SIZE);
        terms.include = Some(drilldown_include(prefix));
        let top_paths = Aggregation::new(AggregationKind::Terms(terms))
            .with_sub("drilldown_over_time", path_histogram);

        Ok(self
            .add_aggregation("top_path_hits_over_time", top_paths)
            .add_aggregation("hits_over_time", overall_histogram))
    }

    /// Every user with the time of their latest request.
    pub fn aggregate_by_user_stats(&mut self, order: Option<Value>) -> &mut Self {
        let mut terms = TermsAggregation::new(fields::USER_ID, 0);
        terms.order = order;
        let stats = Aggregation::new(AggregationKind::Terms(terms)).with_sub(
            "last_request_at",
            Aggregation::new(AggregationKind::Max(FieldAggregation::of(fields::TIMESTAMP))),
        );
        self.add_aggregation("user_stats", stats)
    }

    pub fn aggregate_by_ip_region_field(&mut self, field: &str) -> &mut Self {
        self.add_aggregation(
            "regions",
            Aggregation::new(AggregationKind::Terms(TermsAggregation::new(
                field,
                REGION_BUCKETS,
            ))),
        )
        .add_aggregation(
            "missing_regions",
            Aggregation::new(AggregationKind::Missing(FieldAggregation::of(field))),
        )
    }

    /// Map report for a region code: `world`, a country (`US`), or a
    /// country subdivision (`US-CA`).
    pub fn aggregate_by_region(&mut self, region: &str) -> Result<&mut Self> {
        if region == "world" {
            return Ok(self.aggregate_by_ip_region_field(fields::IP_COUNTRY));
        }

        if region == "US" {
            return Ok(self
                .filter_by_ip_country(region)
                .aggregate_by_ip_region_field(fields::IP_REGION));
        }

        if let Some(captures) = SUBDIVISION_CODE.captures(region) {
            return Ok(self
                .filter_by_ip_country(&captures[1])
                .filter_by_ip_region(&captures[2])
                .aggregate_by_ip_region_field(fields::IP_CITY));
        }

        if COUNTRY_CODE.is_match(region) {
            return Ok(self
                .filter_by_ip_country(region)
                .aggregate_by_ip_region_field(fields::IP_CITY));
        }

        Err(SearchError::InvalidRegion(region.to_string()))
    }

    pub fn filter_by_ip_country(&mut self, country: &str) -> &mut Self {
        self.document_mut()
            .push_must(FilterClause::term(fields::IP_COUNTRY, country));
        self
    }

    pub fn filter_by_ip_region(&mut self, region: &str) -> &mut Self {
        self.document_mut()
            .push_must(FilterClause::term(fields::IP_REGION, region));
        self
    }
}
