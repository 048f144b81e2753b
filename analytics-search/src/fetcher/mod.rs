//! Executes finished searches against a [`SearchBackend`].
//!
//! Single pages go through [`ResultFetcher::fetch_results`]. Full result sets
//! are streamed page by page with [`ResultFetcher::fetch_results_bulk`], which
//! drives a backend scroll cursor and tears it down when the scan ends.

use crate::backend::{BackendRequest, Method, SearchBackend};
use crate::document::AnalyticsSearch;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::ops::ControlFlow;
use std::sync::Arc;

/// How long the backend keeps a scroll context alive between pages.
pub const SCROLL_KEEP_ALIVE: &str = "10m";
/// Hits per scroll page when the search does not set a limit.
pub const SCROLL_PAGE_SIZE: u64 = 1000;
const SCROLL_PATH: &str = "/_search/scroll";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollState {
    Initial,
    Scrolling,
    Done,
    Failed,
}

/// Client-side view of one backend scroll cursor.
#[derive(Debug)]
pub struct ScrollSession {
    scroll_id: Option<String>,
    state: ScrollState,
    pages: usize,
    hits: usize,
}

impl Default for ScrollSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollSession {
    pub fn new() -> Self {
        Self {
            scroll_id: None,
            state: ScrollState::Initial,
            pages: 0,
            hits: 0,
        }
    }

    pub fn scroll_id(&self) -> Option<&str> {
        self.scroll_id.as_deref()
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Records a successful page response. The backend may hand out a new
    /// cursor on any page, so the latest one always wins.
    fn record_page(&mut self, response: &Value) {
        if let Some(id) = response.get("_scroll_id").and_then(Value::as_str) {
            self.scroll_id = Some(id.to_string());
        }
        self.state = ScrollState::Scrolling;
    }

    fn record_delivered(&mut self, hits: usize) {
        self.pages += 1;
        self.hits += hits;
    }
}

/// Outcome of a completed bulk scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollSummary {
    /// Number of times the page callback ran.
    pub pages: usize,
    pub hits: usize,
    /// Whether the backend acknowledged the scroll teardown.
    pub cleared: bool,
    /// The page callback asked to stop before the scan was exhausted.
    pub stopped_early: bool,
}

pub struct ResultFetcher {
    backend: Arc<dyn SearchBackend>,
}

impl std::fmt::Debug for ResultFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultFetcher")
            .field("backend", &self.backend.name())
            .finish()
    }
}

fn page_hits(response: &Value) -> &[Value] {
    response
        .get("hits")
        .and_then(|hits| hits.get("hits"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

impl ResultFetcher {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Runs the search once and returns the backend response as is.
    pub async fn fetch_results(&self, search: &AnalyticsSearch) -> Result<Value> {
        let path = search.search_path();
        let body = search.body().context("Failed to serialize query document")?;
        let request = BackendRequest::new(Method::Post)
            .with_query_params(search.query_params())
            .with_body(body);

        match self.backend.query(&path, request).await {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::error!(
                    backend = self.backend.name(),
                    path = %path,
                    error = %e,
                    "failed to query search backend"
                );
                Err(e.context("Search query failed"))
            }
        }
    }

    /// Streams every hit of `search` through `on_page`, one backend page at a
    /// time. The callback runs for the first page even when it is empty, and
    /// can return `ControlFlow::Break` to stop the scan early.
    ///
    /// The scan runs on a copy of `search`, so the caller's document keeps
    /// its sort and parameters. Pages hold [`SCROLL_PAGE_SIZE`] hits unless
    /// the search sets its own limit.
    ///
    /// The scroll cursor is cleared once the scan ends, whether it ran out of
    /// hits or was stopped by the callback. A failing clear is logged and does
    /// not fail the scan. When a page request fails, the clear is attempted on
    /// a best-effort basis and the page error is returned.
    pub async fn fetch_results_bulk<F>(
        &self,
        search: &AnalyticsSearch,
        mut on_page: F,
    ) -> Result<ScrollSummary>
    where
        F: FnMut(&[Value]) -> ControlFlow<()>,
    {
        let mut scan = search.clone();
        scan.enable_scroll(SCROLL_KEEP_ALIVE, SCROLL_PAGE_SIZE);
        let mut session = ScrollSession::new();

        let first = self.fetch_results(&scan).await?;
        session.record_page(&first);

        let hits = page_hits(&first);
        session.record_delivered(hits.len());
        let mut stopped_early = on_page(hits).is_break();

        while !stopped_early {
            let scroll_id = match session.scroll_id() {
                Some(id) => id.to_string(),
                None => {
                    tracing::warn!("search response carried no scroll id, ending scan");
                    break;
                }
            };

            let request = BackendRequest::new(Method::Get).with_body(json!({
                "scroll": SCROLL_KEEP_ALIVE,
                "scroll_id": scroll_id,
            }));

            let page = match self.backend.query(SCROLL_PATH, request).await {
                Ok(page) => page,
                Err(e) => {
                    session.state = ScrollState::Failed;
                    tracing::error!(
                        backend = self.backend.name(),
                        scroll_id = %scroll_id,
                        pages = session.pages,
                        state = ?session.state(),
                        error = %e,
                        "failed to fetch scroll page"
                    );
                    self.clear_scroll(&scroll_id).await;
                    return Err(e.context("Scroll page request failed"));
                }
            };
            session.record_page(&page);

            let hits = page_hits(&page);
            if hits.is_empty() {
                break;
            }
            session.record_delivered(hits.len());
            tracing::debug!(page = session.pages, hits = hits.len(), "scroll page received");
            stopped_early = on_page(hits).is_break();
        }

        session.state = ScrollState::Done;
        let cleared = match session.scroll_id() {
            Some(id) => self.clear_scroll(id).await,
            None => false,
        };

        tracing::info!(
            pages = session.pages,
            hits = session.hits,
            cleared,
            stopped_early,
            state = ?session.state(),
            "bulk scan finished"
        );

        Ok(ScrollSummary {
            pages: session.pages,
            hits: session.hits,
            cleared,
            stopped_early,
        })
    }

    /// Releases the backend scroll context. Returns whether the request succeeded.
    async fn clear_scroll(&self, scroll_id: &str) -> bool {
        let request =
            BackendRequest::new(Method::Delete).with_body(json!({ "scroll_id": [scroll_id] }));
        match self.backend.query(SCROLL_PATH, request).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    backend = self.backend.name(),
                    scroll_id = %scroll_id,
                    error = %e,
                    "failed to clear scroll"
                );
                false
            }
        }
    }
}
