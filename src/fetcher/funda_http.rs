//! HTTP fetcher for the listing search feed
//!
//! Requests look like
//! `{base_url}/{key}/?type=koop&zo=/amsterdam/tuin/&page=1&pagesize=25`.
//! No retries happen here: a failed request becomes a failed page and the
//! aggregator aborts the run.

use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, warn};

use super::funda_parser::parse_search_response;
use super::{FetcherError, FetcherResult, PageFetcher, PageResult};
use crate::config::ApiSettings;
use crate::{Listing, SearchRequest};
use async_trait::async_trait;

/// Offer type queried by the fetcher (properties for sale)
const OFFER_TYPE: &str = "koop";

/// Listing fetcher backed by the remote search API
pub struct FundaHttpFetcher {
    client: Arc<Client>,
    settings: ApiSettings,
}

impl FundaHttpFetcher {
    /// Create a fetcher on a shared client
    pub fn new(client: Arc<Client>, settings: ApiSettings) -> Self {
        Self { client, settings }
    }

    /// Feed URL including the key path segment
    pub fn feed_url(&self) -> String {
        format!(
            "{}/{}/",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.key
        )
    }

    /// Query parameters for one page
    pub fn query_params(terms: &SearchRequest, page: u32, page_size: u32) -> Vec<(&'static str, String)> {
        vec![
            ("type", OFFER_TYPE.to_string()),
            ("zo", search_path(terms)),
            ("page", page.to_string()),
            ("pagesize", page_size.to_string()),
        ]
    }

    async fn get_page(&self, terms: &SearchRequest, page: u32, page_size: u32) -> FetcherResult<PageResult<Listing>> {
        let params = Self::query_params(terms, page, page_size);
        debug!("Requesting page {} ({} per page)", page, page_size);

        let response = self
            .client
            .get(self.feed_url())
            .query(&params)
            .send()
            .await
            .map_err(|e| FetcherError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetcherError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetcherError::InvalidResponse(e.without_url().to_string()))?;

        parse_search_response(&body)
    }
}

#[async_trait]
impl PageFetcher for FundaHttpFetcher {
    type Item = Listing;

    async fn fetch(&self, terms: &SearchRequest, page: u32, page_size: u32) -> PageResult<Listing> {
        match self.get_page(terms, page, page_size).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Page {} request failed: {}", page, e);
                PageResult::failure(e.to_string())
            }
        }
    }
}

/// `zo` search path: `/term1/term2/`
fn search_path(terms: &SearchRequest) -> String {
    let mut path = String::from("/");
    for term in terms.terms() {
        path.push_str(term);
        path.push('/');
    }
    path
}
