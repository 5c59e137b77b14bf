//! # Listing Harvester Library
//!
//! Retrieves every page of a property search from a remote paged API while
//! staying under the API's request-rate caps, then ranks the real estate
//! agents with the most listings on sale.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use listing_harvester::downloader::{PaginatedAggregator, RetrievalConfig};
//! use listing_harvester::fetcher::fake::FakePageFetcher;
//! use listing_harvester::SearchRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Arc::new(FakePageFetcher::default());
//! let aggregator = PaginatedAggregator::new(fetcher, RetrievalConfig::default())?;
//!
//! let listings = aggregator
//!     .search_all(&SearchRequest::new(["amsterdam", "tuin"]))
//!     .await?;
//! let ranking = listing_harvester::ranking::top_agents(&listings, 10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`fetcher`] - Page fetch contract plus HTTP and deterministic implementations
//! - [`downloader`] - Rate gate, progress sinks and the paginated aggregator
//! - [`config`] - API settings loaded from a JSON settings file
//! - [`ranking`] - Top selling agents over a retrieved listing set
//! - [`cli`] - Command line surface

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// CLI command implementations
pub mod cli;

/// API settings
pub mod config;

/// Paginated retrieval orchestration
pub mod downloader;

/// Page fetchers
pub mod fetcher;

/// Agent ranking over retrieved listings
pub mod ranking;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

/// Search terms of one retrieval run.
///
/// Terms are trimmed and lowercased; empty terms are dropped and duplicates
/// collapse. Iteration order is sorted, so two requests built from the same
/// terms in a different order are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchRequest {
    terms: BTreeSet<String>,
}

impl SearchRequest {
    /// Build a request from any collection of terms
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|term| term.as_ref().trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        Self { terms }
    }

    /// Normalized terms in sorted order
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the request carries no terms at all
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// A property listed for sale
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Listing {
    /// Listing identifier assigned by the remote API
    pub id: String,
    /// Street address, when the API publishes one
    pub address: Option<String>,
    /// Identifier of the listing real estate agent
    pub agent_id: u64,
    /// Display name of the listing real estate agent
    pub agent_name: String,
}
