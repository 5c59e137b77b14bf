//! Retrieval configuration

use crate::config::ConfigError;
use crate::downloader::rate_limit::RateLimit;
use std::ops::Range;

/// Items requested per page.
/// 25 is the page size the search feed serves by default.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Ceiling on the page count of a retrievable result set.
/// At 59 requests per minute 4000 pages already take over an hour.
pub const MAX_RETRIEVABLE_PAGES: u32 = 4000;

/// Requests per second accepted by the search feed
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 5;

/// Requests per minute accepted by the search feed.
/// One below the documented 60 to leave room for clock skew.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 59;

/// Page fetches in flight at once (1 = sequential)
pub const DEFAULT_MAX_CONCURRENCY: usize = 1;

/// Upper bound accepted for `max_concurrency`
pub const MAX_CONCURRENCY: usize = 32;

/// Label passed to the progress sink when bulk retrieval starts
pub const PROGRESS_LABEL: &str = "Retrieving properties data...";

/// Which pages follow the discovery page.
///
/// The feed reports `AantalPaginas` as the page count and numbers pages from
/// 1. [`LastPagePolicy::Skip`] requests pages `2..total` and leaves the page
/// numbered `total` out; [`LastPagePolicy::Fetch`] requests `2..=total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastPagePolicy {
    /// Pages `2..total`
    #[default]
    Skip,
    /// Pages `2..=total`
    Fetch,
}

impl LastPagePolicy {
    /// Page numbers to request after the discovery page
    pub fn remaining_pages(self, total_page_count: u32) -> Range<u32> {
        match self {
            LastPagePolicy::Skip => 2..total_page_count.max(2),
            LastPagePolicy::Fetch => 2..total_page_count.saturating_add(1).max(2),
        }
    }
}

/// Settings of one aggregator
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalConfig {
    /// Items per page
    pub page_size: u32,
    /// Page-count ceiling
    pub max_pages: u32,
    /// Composed request caps
    pub rate_limits: Vec<RateLimit>,
    /// Page fetches in flight at once
    pub max_concurrency: usize,
    /// Remaining-page range policy
    pub last_page: LastPagePolicy,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: MAX_RETRIEVABLE_PAGES,
            rate_limits: vec![
                RateLimit::per_second(DEFAULT_REQUESTS_PER_SECOND),
                RateLimit::per_minute(DEFAULT_REQUESTS_PER_MINUTE),
            ],
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            last_page: LastPagePolicy::default(),
        }
    }
}

impl RetrievalConfig {
    /// Set the page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the page-count ceiling
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Replace the request caps
    pub fn with_rate_limits(mut self, rate_limits: Vec<RateLimit>) -> Self {
        self.rate_limits = rate_limits;
        self
    }

    /// Set the number of page fetches in flight
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set the remaining-page policy
    pub fn with_last_page(mut self, last_page: LastPagePolicy) -> Self {
        self.last_page = last_page;
        self
    }

    /// Reject settings the aggregator cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page size must be at least 1".to_string()));
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Invalid("page ceiling must be at least 1".to_string()));
        }
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::Invalid(format!(
                "concurrency {} outside 1..={MAX_CONCURRENCY}",
                self.max_concurrency
            )));
        }
        for limit in &self.rate_limits {
            if limit.max_count == 0 || limit.interval.is_zero() {
                return Err(ConfigError::Invalid(format!("rate limit {limit} admits nothing")));
            }
        }
        Ok(())
    }
}
