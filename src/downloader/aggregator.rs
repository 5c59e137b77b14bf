//! Paginated aggregator
//!
//! Pulls every page of a search result set through a [`PageFetcher`] and
//! merges the pages into one collection. Page 1 is the discovery call and is
//! not rate-gated; every later page passes the shared [`RateGate`] and ticks
//! the [`ProgressSink`] right before it is fetched.

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, trace};

use super::config::{RetrievalConfig, PROGRESS_LABEL};
use super::limits::check_within_limit;
use super::progress::{NoopProgressSink, ProgressSink};
use super::rate_limit::RateGate;
use super::RetrievalError;
use crate::config::ConfigError;
use crate::fetcher::{PageFetcher, PageResult};
use crate::shutdown::SharedShutdown;
use crate::SearchRequest;

/// State owned by a single `search_all` call
#[derive(Debug)]
struct RetrievalRun<T> {
    items: Vec<T>,
    total_pages: u32,
    completed_pages: u32,
}

impl<T> RetrievalRun<T> {
    fn new(total_pages: u32) -> Self {
        Self {
            items: Vec::new(),
            total_pages,
            completed_pages: 0,
        }
    }

    fn merge(&mut self, page: PageResult<T>) {
        self.items.extend(page.into_items());
        self.completed_pages += 1;
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Retrieves all pages of a search through one fetcher
pub struct PaginatedAggregator<F: PageFetcher + ?Sized> {
    fetcher: Arc<F>,
    gate: Arc<RateGate>,
    progress: Arc<dyn ProgressSink>,
    config: RetrievalConfig,
    shutdown: Option<SharedShutdown>,
}

impl<F: PageFetcher + ?Sized> PaginatedAggregator<F> {
    /// Create an aggregator with its own rate gate built from `config`
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when `config` fails validation
    pub fn new(fetcher: Arc<F>, config: RetrievalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let gate = Arc::new(RateGate::from_limits(&config.rate_limits));
        Ok(Self {
            fetcher,
            gate,
            progress: Arc::new(NoopProgressSink),
            config,
            shutdown: None,
        })
    }

    /// Share a rate gate with other aggregators hitting the same API
    pub fn with_rate_gate(mut self, gate: Arc<RateGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Report progress to `progress`
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        progress.setup(PROGRESS_LABEL);
        self.progress = progress;
        self
    }

    /// Abort runs once `shutdown` is requested
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve every page for `terms`.
    ///
    /// Item order is unspecified. The first failed page aborts the run and
    /// discards everything retrieved so far.
    ///
    /// # Errors
    /// - [`RetrievalError::PageFetch`] when any page fetch fails
    /// - [`RetrievalError::TooManyPages`] when the page count reaches the ceiling
    /// - [`RetrievalError::Cancelled`] when shutdown is requested mid-run
    pub async fn search_all(&self, terms: &SearchRequest) -> Result<Vec<F::Item>, RetrievalError> {
        let first = self.fetch_page(terms, 1).await?;
        let has_next_page = first.has_next_page();
        trace!("Number of pages to inquire: {}", first.total_page_count());

        let mut run = RetrievalRun::new(first.total_page_count());
        run.merge(first);

        check_within_limit(run.total_pages, self.config.max_pages)?;

        if !has_next_page {
            debug!("Single page result: {} items", run.items.len());
            return Ok(run.into_items());
        }

        self.progress.initialize(run.total_pages, Some(PROGRESS_LABEL));
        self.retrieve_remaining_pages(terms, &mut run).await?;

        info!(
            "Retrieved {} items from {} pages",
            run.items.len(),
            run.completed_pages
        );
        Ok(run.into_items())
    }

    async fn retrieve_remaining_pages(
        &self,
        terms: &SearchRequest,
        run: &mut RetrievalRun<F::Item>,
    ) -> Result<(), RetrievalError> {
        let pages = self.config.last_page.remaining_pages(run.total_pages);
        debug!(
            "Fetching pages {}..{} with up to {} in flight",
            pages.start, pages.end, self.config.max_concurrency
        );

        // Dropping the stream on error cancels in-flight peers and schedules nothing more
        let mut fetches = stream::iter(pages)
            .map(|page| self.admit_and_fetch(terms, page))
            .buffer_unordered(self.config.max_concurrency);

        loop {
            let next = match &self.shutdown {
                Some(shutdown) => tokio::select! {
                    biased;
                    _ = shutdown.wait_for_shutdown() => return Err(RetrievalError::Cancelled),
                    next = fetches.next() => next,
                },
                None => fetches.next().await,
            };

            match next {
                Some(page) => {
                    run.merge(page?);
                    trace!("Completed {}/{} pages", run.completed_pages, run.total_pages);
                }
                None => return Ok(()),
            }
        }
    }

    async fn admit_and_fetch(&self, terms: &SearchRequest, page: u32) -> Result<PageResult<F::Item>, RetrievalError> {
        if self.shutdown_requested() {
            return Err(RetrievalError::Cancelled);
        }
        self.gate.acquire().await;
        self.progress.tick();
        self.fetch_page(terms, page).await
    }

    async fn fetch_page(&self, terms: &SearchRequest, page: u32) -> Result<PageResult<F::Item>, RetrievalError> {
        let result = self.fetcher.fetch(terms, page, self.config.page_size).await;
        match result.failure_reason() {
            Some(reason) => {
                debug!("Page {} failed: {}", page, reason);
                Err(RetrievalError::PageFetch {
                    page,
                    reason: reason.to_string(),
                })
            }
            None => Ok(result),
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|shutdown| shutdown.is_shutdown_requested())
    }
}
