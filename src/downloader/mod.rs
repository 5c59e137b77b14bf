//! Paginated retrieval orchestration and rate limiting
//!
//! # Overview
//!
//! 1. **Discovery**: page 1 is fetched to learn the total page count
//! 2. **Limits**: result sets at or above the page ceiling are rejected via [`limits`]
//! 3. **Bulk retrieval**: remaining pages pass the shared [`rate_limit::RateGate`]
//!    before each fetch
//! 4. **Progress**: a [`progress::ProgressSink`] receives a tick per page
//!
//! ```no_run
//! use std::sync::Arc;
//! use listing_harvester::downloader::{PaginatedAggregator, RetrievalConfig};
//! use listing_harvester::downloader::progress::LogProgressSink;
//! use listing_harvester::fetcher::fake::FakePageFetcher;
//! use listing_harvester::SearchRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let aggregator = PaginatedAggregator::new(
//!     Arc::new(FakePageFetcher::default()),
//!     RetrievalConfig::default().with_max_concurrency(4),
//! )?
//! .with_progress(Arc::new(LogProgressSink::default()));
//!
//! let listings = aggregator.search_all(&SearchRequest::new(["amsterdam"])).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! A run either returns every retrieved item or one [`RetrievalError`]; there
//! is no partial result and no retry.

pub mod aggregator;
pub mod config;
pub mod limits;
pub mod progress;
pub mod rate_limit;

pub use aggregator::PaginatedAggregator;
pub use config::{LastPagePolicy, RetrievalConfig};
pub use limits::check_within_limit;
pub use progress::{ProgressMode, ProgressSink};
pub use rate_limit::{RateGate, RateLimit};

/// Retrieval errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetrievalError {
    /// Result set has too many pages to retrieve
    #[error("the request contains too many entries to be processed: {total_pages} pages (limit {ceiling})")]
    TooManyPages {
        /// Page count reported by the remote API
        total_pages: u32,
        /// Configured ceiling
        ceiling: u32,
    },

    /// A page fetch reported failure
    #[error("page {page} could not be retrieved: {reason}")]
    PageFetch {
        /// Failed page number
        page: u32,
        /// Reason supplied by the fetcher
        reason: String,
    },

    /// Shutdown requested before the run completed
    #[error("retrieval cancelled")]
    Cancelled,
}

impl RetrievalError {
    /// Fetcher-supplied reason of a page failure
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            RetrievalError::PageFetch { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
