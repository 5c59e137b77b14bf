//! Page fetcher contract and implementations

use crate::config::ApiSettings;
use crate::{Listing, SearchRequest};
use async_trait::async_trait;
use std::sync::Arc;

pub mod fake;
pub mod funda_http;
pub mod funda_parser;
pub mod shared_resources;

/// Errors raised inside fetcher implementations.
///
/// These never cross the [`PageFetcher`] boundary: fetchers turn them into a
/// failed [`PageResult`] carrying the error text as its reason.
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Non-success HTTP status; the reason is the bare status code
    #[error("{0}")]
    Status(u16),

    /// Network error
    #[error("network error: {0}")]
    NetworkError(String),

    /// Response parse error
    #[error("parse error: {0}")]
    ParseError(String),

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for fetcher internals
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Outcome of fetching one page.
///
/// A failed result never carries items and always carries a reason; a
/// successful one never carries a reason.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    items: Vec<T>,
    failure_reason: Option<String>,
    total_page_count: u32,
    has_next_page: bool,
}

impl<T> PageResult<T> {
    /// Successful page with its pagination metadata
    pub fn success(items: Vec<T>, total_page_count: u32, has_next_page: bool) -> Self {
        Self {
            items,
            failure_reason: None,
            total_page_count,
            has_next_page,
        }
    }

    /// Failed page
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            failure_reason: Some(reason.into()),
            total_page_count: 0,
            has_next_page: false,
        }
    }

    /// Whether the fetch succeeded
    pub fn is_success(&self) -> bool {
        self.failure_reason.is_none()
    }

    /// Failure reason of a failed fetch
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Items of this page
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Total page count reported by the remote API
    pub fn total_page_count(&self) -> u32 {
        self.total_page_count
    }

    /// Whether the remote API reports a page after this one
    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// Consume the result, keeping only its items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Fetches one page of search results.
///
/// Ordinary remote failures are reported through [`PageResult::failure`];
/// implementations do not panic on them.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Item type carried by each page
    type Item: Send + 'static;

    /// Fetch page `page` (1-based) of `page_size` items for `terms`
    async fn fetch(&self, terms: &SearchRequest, page: u32, page_size: u32) -> PageResult<Self::Item>;
}

/// Listing fetcher selected at startup
pub type SharedListingFetcher = Arc<dyn PageFetcher<Item = Listing>>;

/// Where listings come from
#[derive(Debug, Clone)]
pub enum FetcherSource {
    /// Deterministic generated listings, no network
    Fake,
    /// The remote search API
    Http(ApiSettings),
}

/// Create the listing fetcher for this run
pub fn create_fetcher(source: FetcherSource) -> SharedListingFetcher {
    match source {
        FetcherSource::Fake => Arc::new(fake::FakePageFetcher::default()),
        FetcherSource::Http(settings) => Arc::new(funda_http::FundaHttpFetcher::new(
            shared_resources::global_http_client(),
            settings,
        )),
    }
}
