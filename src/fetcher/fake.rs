//! Deterministic in-memory page fetcher
//!
//! Serves generated listings with the same paging semantics as the remote
//! search API, so the full retrieval pipeline can run without network access.

use super::{PageFetcher, PageResult};
use crate::{Listing, SearchRequest};
use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

/// Listings served by the default fake
const DEFAULT_TOTAL_LISTINGS: u32 = 180;
/// Distinct agents listings are spread over
const DEFAULT_AGENT_COUNT: u32 = 12;

const AGENT_NAMES: &[&str] = &[
    "Van der Berg Makelaars",
    "De Vries Wonen",
    "Bakker & Visser",
    "Jansen Vastgoed",
    "Smit Makelaardij",
    "Mulder Huizen",
    "De Boer Makelaars",
    "Meijer & Bos",
    "Hendriks Wonen",
    "Dekker Vastgoed",
    "Peters Makelaardij",
    "Van Leeuwen Huizen",
];

/// Fetcher serving a fixed, generated result set
#[derive(Debug, Clone)]
pub struct FakePageFetcher {
    total_listings: u32,
    agent_count: u32,
    failing_page: Option<(u32, String)>,
    latency: Duration,
}

impl Default for FakePageFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_LISTINGS, DEFAULT_AGENT_COUNT)
    }
}

impl FakePageFetcher {
    /// Fake serving `total_listings` listings spread over `agent_count` agents
    pub fn new(total_listings: u32, agent_count: u32) -> Self {
        Self {
            total_listings,
            agent_count: agent_count.max(1),
            failing_page: None,
            latency: Duration::ZERO,
        }
    }

    /// Report `reason` as failure whenever `page` is requested
    pub fn with_failure_on_page(mut self, page: u32, reason: impl Into<String>) -> Self {
        self.failing_page = Some((page, reason.into()));
        self
    }

    /// Delay every response by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Page count for a given page size
    pub fn total_pages(&self, page_size: u32) -> u32 {
        if page_size == 0 {
            return 0;
        }
        self.total_listings.div_ceil(page_size)
    }

    fn listing(&self, index: u32) -> Listing {
        // Skewed assignment so the ranking has a clear order
        let agent = index.wrapping_mul(index).wrapping_add(index / 3) % self.agent_count;
        let name = AGENT_NAMES
            .get(agent as usize)
            .map(|name| name.to_string())
            .unwrap_or_else(|| format!("Makelaar {agent}"));
        Listing {
            id: format!("fake-{index:05}"),
            address: Some(format!("Teststraat {}", index + 1)),
            agent_id: 1000 + u64::from(agent),
            agent_name: name,
        }
    }
}

#[async_trait]
impl PageFetcher for FakePageFetcher {
    type Item = Listing;

    async fn fetch(&self, terms: &SearchRequest, page: u32, page_size: u32) -> PageResult<Listing> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some((failing, reason)) = &self.failing_page {
            if *failing == page {
                return PageResult::failure(reason.clone());
            }
        }

        if page == 0 || page_size == 0 {
            return PageResult::failure(format!("invalid page {page} of size {page_size}"));
        }

        let total_pages = self.total_pages(page_size);
        let start = (page - 1).saturating_mul(page_size).min(self.total_listings);
        let end = page.saturating_mul(page_size).min(self.total_listings);
        let items: Vec<Listing> = (start..end).map(|index| self.listing(index)).collect();

        trace!(
            "Fake page {}/{} for {} term(s): {} listings",
            page,
            total_pages,
            terms.len(),
            items.len()
        );

        PageResult::success(items, total_pages, page < total_pages)
    }
}
