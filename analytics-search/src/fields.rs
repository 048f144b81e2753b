//! Field names of the request-log documents and their case classification.

pub const TIMESTAMP: &str = "request_at";
pub const IMPORTED: &str = "imported";
pub const HIERARCHY: &str = "request_hierarchy";
pub const USER_EMAIL: &str = "user_email";
pub const USER_ID: &str = "user_id";
pub const REQUEST_IP: &str = "request_ip";
pub const RESPONSE_TIME: &str = "response_time";
pub const IP_COUNTRY: &str = "request_ip_country";
pub const IP_REGION: &str = "request_ip_region";
pub const IP_CITY: &str = "request_ip_city";

/// Fields indexed with their original casing; filter values pass through untouched.
pub const CASE_SENSITIVE_FIELDS: &[&str] = &["api_key", TIMESTAMP, IP_CITY];

/// Fields indexed uppercase (HTTP verbs, ISO country and region codes).
pub const UPPERCASE_FIELDS: &[&str] = &["request_method", IP_COUNTRY, IP_REGION];

/// How text values for a field must be cased before they reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCase {
    Preserve,
    Upper,
    Lower,
}

impl FieldCase {
    pub fn of(field: &str) -> Self {
        if CASE_SENSITIVE_FIELDS.contains(&field) {
            FieldCase::Preserve
        } else if UPPERCASE_FIELDS.contains(&field) {
            FieldCase::Upper
        } else {
            FieldCase::Lower
        }
    }

    pub fn apply(self, value: &str) -> String {
        match self {
            FieldCase::Preserve => value.to_string(),
            FieldCase::Upper => value.to_uppercase(),
            FieldCase::Lower => value.to_lowercase(),
        }
    }
}
