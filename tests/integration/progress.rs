//! Integration tests for progress indicators

use indicatif::{ProgressBar, ProgressStyle};
use listing_harvester::downloader::config::PROGRESS_LABEL;
use listing_harvester::downloader::progress::{BarProgressSink, LogProgressSink, ProgressState};
use listing_harvester::downloader::{
    LastPagePolicy, PaginatedAggregator, ProgressMode, ProgressSink, RetrievalConfig,
};
use listing_harvester::fetcher::fake::FakePageFetcher;
use listing_harvester::SearchRequest;
use std::sync::Arc;

fn unthrottled() -> RetrievalConfig {
    RetrievalConfig::default().with_rate_limits(Vec::new())
}

#[test]
fn test_progress_bar_updates() {
    let pb = ProgressBar::new(100);

    pb.set_position(25);
    assert_eq!(pb.position(), 25);

    pb.inc(25);
    assert_eq!(pb.position(), 50);
    assert_eq!(pb.length(), Some(100));

    pb.finish_and_clear();
}

#[test]
fn test_progress_bar_styling() {
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.green/white}] {pos}/{len} ({percent}%) {msg}");
    assert!(style.is_ok());
}

#[tokio::test]
async fn test_log_sink_driven_by_aggregator() {
    // 200 listings at 25 per page: 8 pages, 7 fetched after discovery
    let sink = Arc::new(LogProgressSink::default());
    let aggregator = PaginatedAggregator::new(
        Arc::new(FakePageFetcher::new(200, 5)),
        unthrottled().with_last_page(LastPagePolicy::Fetch),
    )
    .unwrap()
    .with_progress(sink.clone());

    aggregator.search_all(&SearchRequest::new(["amsterdam"])).await.unwrap();

    let state = sink.snapshot().unwrap();
    assert_eq!(state.total_pages, 8);
    assert_eq!(state.current_page, 7);
    assert_eq!(state.label, PROGRESS_LABEL);
}

#[tokio::test]
async fn test_bar_sink_driven_by_aggregator() {
    let sink = Arc::new(BarProgressSink::new());
    let aggregator = PaginatedAggregator::new(Arc::new(FakePageFetcher::new(200, 5)), unthrottled())
        .unwrap()
        .with_progress(sink.clone());

    aggregator.search_all(&SearchRequest::new(["amsterdam"])).await.unwrap();

    // Skip policy: pages 2..8 tick six times
    assert_eq!(sink.position(), Some(6));
    sink.finish();
    assert_eq!(sink.position(), None);
}

#[tokio::test]
async fn test_single_page_never_initializes_sink() {
    let sink = Arc::new(LogProgressSink::default());
    let aggregator = PaginatedAggregator::new(Arc::new(FakePageFetcher::new(10, 2)), unthrottled())
        .unwrap()
        .with_progress(sink.clone());

    aggregator.search_all(&SearchRequest::new(["tuin"])).await.unwrap();

    assert!(sink.snapshot().is_none());
}

#[test]
fn test_progress_state_line() {
    let mut state = ProgressState::new(8, PROGRESS_LABEL);
    state.current_page = 2;
    assert!(state
        .format_progress()
        .starts_with("2/8 - 25% - Retrieving properties data..."));
}

#[tokio::test]
async fn test_every_mode_builds_a_usable_sink() {
    for mode in [ProgressMode::Bar, ProgressMode::Log, ProgressMode::None] {
        let aggregator = PaginatedAggregator::new(Arc::new(FakePageFetcher::new(80, 4)), unthrottled())
            .unwrap()
            .with_progress(mode.create_sink());

        let listings = aggregator.search_all(&SearchRequest::new(["tuin"])).await.unwrap();
        assert_eq!(listings.len(), 75, "{mode:?}");
    }
}
