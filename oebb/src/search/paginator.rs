//! Connection search over the provider's fixed-size timetable pages.
//!
//! The timetable endpoint returns at most [`MAX_PAGE_SIZE`] connections and
//! can only be paged by departure time, not by offset. Advancing the cursor
//! to the last departure seen re-returns connections at the page boundary,
//! so each page is deduplicated by connection id. A page that yields nothing
//! new moves the cursor forward by a fixed probe increment instead.

use std::collections::HashSet;
use std::future::Future;

use tracing::{debug, info, warn};

use crate::domain::{
    ApiTime, ConnectionRecord, CredentialBundle, MAX_PAGE_SIZE, PageRequest, StationRef,
};
use crate::oebb::{ApiError, OebbClient};

use super::config::SearchConfig;

/// Error from connection search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Network or HTTP failure reaching the provider
    #[error("transport error: {0}")]
    Transport(#[source] ApiError),

    /// The provider rejected the session; refresh credentials and search again
    #[error("session expired")]
    SessionExpired,

    /// The response could not be decoded or contained an invalid timestamp
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Too many consecutive pages without a new connection
    #[error(
        "no new connections after {probes} probes ({} found)",
        .partial.len()
    )]
    ProviderExhausted {
        probes: u32,
        partial: Vec<ConnectionRecord>,
    },
}

impl From<ApiError> for SearchError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::SessionExpired => SearchError::SessionExpired,
            ApiError::Json { message, .. } => SearchError::MalformedResponse(message),
            ApiError::Conversion(e) => SearchError::MalformedResponse(e.to_string()),
            other => SearchError::Transport(other),
        }
    }
}

/// Source of timetable pages.
///
/// This abstraction allows the paginator to be tested with canned pages.
pub trait PageSource {
    /// Fetch up to `page.count` connections departing at or after
    /// `page.cursor`, ordered by departure.
    fn fetch_page(
        &self,
        from: &StationRef,
        to: &StationRef,
        creds: &CredentialBundle,
        page: &PageRequest,
    ) -> impl Future<Output = Result<Vec<ConnectionRecord>, ApiError>> + Send;
}

impl PageSource for OebbClient {
    fn fetch_page(
        &self,
        from: &StationRef,
        to: &StationRef,
        creds: &CredentialBundle,
        page: &PageRequest,
    ) -> impl Future<Output = Result<Vec<ConnectionRecord>, ApiError>> + Send {
        self.get_connections(from, to, creds, page)
    }
}

/// What a single page contributed to the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// New connections were appended.
    Accepted { new: usize },
    /// Nothing new; the cursor moved forward by the probe increment.
    Probed,
}

/// Accumulated state of one search.
///
/// Each step is a pure method so the pagination rules can be exercised
/// without performing any I/O.
#[derive(Debug, Clone)]
pub struct SearchState {
    remaining: usize,
    cursor: ApiTime,
    results: Vec<ConnectionRecord>,
    seen: HashSet<String>,
    consecutive_probes: u32,
}

impl SearchState {
    /// Start a search for `want` connections departing at or after `start`.
    pub fn new(start: ApiTime, want: usize) -> Self {
        Self {
            remaining: want,
            cursor: start,
            results: Vec::with_capacity(want),
            seen: HashSet::with_capacity(want),
            consecutive_probes: 0,
        }
    }

    /// Connections still wanted.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Lower bound for the next page.
    pub fn cursor(&self) -> ApiTime {
        self.cursor
    }

    pub fn results(&self) -> &[ConnectionRecord] {
        &self.results
    }

    pub fn consecutive_probes(&self) -> u32 {
        self.consecutive_probes
    }

    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// The next page to request, capped to the provider's page size.
    pub fn next_request(&self) -> PageRequest {
        PageRequest::capped(self.cursor, self.remaining)
    }

    /// Merge a fetched page into the accumulated results.
    ///
    /// Connections already seen are dropped. If nothing new remains, the
    /// cursor advances by the probe increment and `remaining` is unchanged.
    /// Otherwise the cursor moves to the latest new departure.
    pub fn accept_page(
        &mut self,
        page: Vec<ConnectionRecord>,
        config: &SearchConfig,
    ) -> Result<PageOutcome, SearchError> {
        let mut fresh = Vec::with_capacity(page.len());
        for conn in page {
            if fresh.len() == self.remaining {
                break;
            }
            if self.seen.insert(conn.id.clone()) {
                fresh.push(conn);
            }
        }

        if fresh.is_empty() {
            return self.probe(config);
        }

        // The provider sorts by departure, so this is the last new record;
        // taking the maximum keeps the cursor monotonic regardless.
        if let Some(latest) = fresh.iter().map(ConnectionRecord::departure_time).max() {
            self.cursor = self.cursor.max(latest);
        }

        let new = fresh.len();
        self.remaining -= new;
        self.consecutive_probes = 0;
        self.results.extend(fresh);

        Ok(PageOutcome::Accepted { new })
    }

    fn probe(&mut self, config: &SearchConfig) -> Result<PageOutcome, SearchError> {
        self.consecutive_probes += 1;

        if let Some(max) = config.max_consecutive_probes
            && self.consecutive_probes > max
        {
            return Err(SearchError::ProviderExhausted {
                probes: max,
                partial: std::mem::take(&mut self.results),
            });
        }

        self.cursor = self
            .cursor
            .checked_add(config.probe_increment())
            .ok_or_else(|| {
                SearchError::MalformedResponse(format!("cursor {} out of range", self.cursor))
            })?;

        Ok(PageOutcome::Probed)
    }

    /// Consume the state, returning connections in acceptance order.
    pub fn into_results(self) -> Vec<ConnectionRecord> {
        self.results
    }
}

/// Connection paginator.
pub struct Paginator<'a, S: PageSource> {
    source: &'a S,
    config: &'a SearchConfig,
}

impl<'a, S: PageSource> Paginator<'a, S> {
    /// Create a new paginator.
    pub fn new(source: &'a S, config: &'a SearchConfig) -> Self {
        Self { source, config }
    }

    /// Find `want` distinct connections from `from` to `to` departing at or
    /// after `start`.
    ///
    /// Pages are fetched strictly one after another because each cursor
    /// depends on the previous page. A session-expired response aborts the
    /// search with [`SearchError::SessionExpired`]; refreshing credentials
    /// is the caller's job.
    pub async fn search(
        &self,
        from: &StationRef,
        to: &StationRef,
        creds: &CredentialBundle,
        start: ApiTime,
        want: usize,
    ) -> Result<Vec<ConnectionRecord>, SearchError> {
        let mut state = SearchState::new(start, want);
        let mut pages = 0usize;

        while !state.is_complete() {
            let request = state.next_request();
            debug_assert!(request.count <= MAX_PAGE_SIZE);

            let page = self.source.fetch_page(from, to, creds, &request).await?;
            pages += 1;

            match state.accept_page(page, self.config) {
                Ok(PageOutcome::Accepted { new }) => {
                    debug!(
                        new,
                        remaining = state.remaining(),
                        cursor = %state.cursor(),
                        "accepted page"
                    );
                }
                Ok(PageOutcome::Probed) => {
                    debug!(
                        probes = state.consecutive_probes(),
                        cursor = %state.cursor(),
                        "page had no new connections, probing"
                    );
                }
                Err(e) => {
                    warn!(pages, error = %e, "search aborted");
                    return Err(e);
                }
            }
        }

        info!(
            from = %from,
            to = %to,
            found = state.results().len(),
            pages,
            "search complete"
        );

        Ok(state.into_results())
    }
}
