//! Search backend abstraction.
//!
//! The query builder and fetcher only depend on [`SearchBackend`]; transport,
//! retries and authentication belong to the implementation.

mod http;

pub use http::HttpSearchBackend;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One request to the backend, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub method: Method,
    pub query_params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl BackendRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query_params: Vec::new(),
            body: None,
        }
    }

    pub fn with_query_params(mut self, params: &[(String, String)]) -> Self {
        self.query_params.extend_from_slice(params);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Search backend trait - implement for each transport
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute a request and return the decoded JSON response.
    async fn query(&self, path: &str, request: BackendRequest) -> Result<Value>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests;
