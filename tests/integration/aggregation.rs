//! Integration tests for paginated aggregation

use crate::support::{items, RecordingSink, ScriptedFetcher};
use listing_harvester::downloader::config::PROGRESS_LABEL;
use listing_harvester::downloader::{LastPagePolicy, PaginatedAggregator, RetrievalConfig, RetrievalError};
use listing_harvester::fetcher::PageResult;
use listing_harvester::SearchRequest;
use std::sync::Arc;

fn unthrottled() -> RetrievalConfig {
    RetrievalConfig::default().with_rate_limits(Vec::new())
}

fn amsterdam() -> SearchRequest {
    SearchRequest::new(["amsterdam"])
}

#[tokio::test]
async fn test_three_page_scenario() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .with_page(1, PageResult::success(items(1, 5), 3, true))
            .with_page(2, PageResult::success(items(2, 5), 3, true)),
    );
    let sink = Arc::new(RecordingSink::default());
    let aggregator = PaginatedAggregator::new(fetcher.clone(), unthrottled())
        .unwrap()
        .with_progress(sink.clone());

    let result = aggregator.search_all(&amsterdam()).await.unwrap();

    assert_eq!(result.len(), 10);
    assert_eq!(
        sink.initializations(),
        vec![(3, Some(PROGRESS_LABEL.to_string()))]
    );
    assert_eq!(sink.tick_count(), 1);
    assert_eq!(fetcher.requested(), vec![1, 2]);
}

#[tokio::test]
async fn test_single_page_returns_page_one_without_progress() {
    let fetcher = Arc::new(
        ScriptedFetcher::new().with_page(1, PageResult::success(items(1, 7), 1, false)),
    );
    let sink = Arc::new(RecordingSink::default());
    let aggregator = PaginatedAggregator::new(fetcher.clone(), unthrottled())
        .unwrap()
        .with_progress(sink.clone());

    let result = aggregator.search_all(&amsterdam()).await.unwrap();

    assert_eq!(result, items(1, 7));
    assert!(sink.initializations().is_empty());
    assert_eq!(sink.tick_count(), 0);
    assert_eq!(fetcher.requested(), vec![1]);
}

#[tokio::test]
async fn test_has_next_false_wins_over_page_count() {
    // Page count says more, but the feed reports no successor
    let fetcher = Arc::new(
        ScriptedFetcher::new().with_page(1, PageResult::success(items(1, 3), 9, false)),
    );
    let aggregator = PaginatedAggregator::new(fetcher.clone(), unthrottled()).unwrap();

    let result = aggregator.search_all(&amsterdam()).await.unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(fetcher.requested(), vec![1]);
}

#[tokio::test]
async fn test_first_page_failure() {
    let fetcher = Arc::new(ScriptedFetcher::new().with_page(1, PageResult::failure("503")));
    let sink = Arc::new(RecordingSink::default());
    let aggregator = PaginatedAggregator::new(fetcher.clone(), unthrottled())
        .unwrap()
        .with_progress(sink.clone());

    let err = aggregator.search_all(&amsterdam()).await.unwrap_err();

    assert_eq!(
        err,
        RetrievalError::PageFetch {
            page: 1,
            reason: "503".to_string()
        }
    );
    assert_eq!(err.failure_reason(), Some("503"));
    assert_eq!(sink.tick_count(), 0);
    assert!(sink.initializations().is_empty());
}

#[tokio::test]
async fn test_too_many_pages_stops_after_discovery() {
    let fetcher = Arc::new(
        ScriptedFetcher::new().with_page(1, PageResult::success(items(1, 25), 4000, true)),
    );
    let sink = Arc::new(RecordingSink::default());
    let aggregator = PaginatedAggregator::new(fetcher.clone(), unthrottled())
        .unwrap()
        .with_progress(sink.clone());

    let err = aggregator.search_all(&amsterdam()).await.unwrap_err();

    assert!(matches!(
        err,
        RetrievalError::TooManyPages {
            total_pages: 4000,
            ceiling: 4000
        }
    ));
    assert_eq!(fetcher.requested(), vec![1]);
    assert!(sink.initializations().is_empty());
}

#[tokio::test]
async fn test_configured_ceiling() {
    let fetcher = Arc::new(ScriptedFetcher::uniform(10, 2));
    let aggregator =
        PaginatedAggregator::new(fetcher.clone(), unthrottled().with_max_pages(10)).unwrap();

    let err = aggregator.search_all(&amsterdam()).await.unwrap_err();
    assert!(matches!(err, RetrievalError::TooManyPages { .. }));

    let aggregator =
        PaginatedAggregator::new(Arc::new(ScriptedFetcher::uniform(10, 2)), unthrottled().with_max_pages(11))
            .unwrap();
    assert!(aggregator.search_all(&amsterdam()).await.is_ok());
}

#[tokio::test]
async fn test_later_page_failure_aborts_run() {
    let fetcher = Arc::new(
        ScriptedFetcher::uniform(6, 4).with_page(3, PageResult::failure("429")),
    );
    let sink = Arc::new(RecordingSink::default());
    let aggregator = PaginatedAggregator::new(fetcher.clone(), unthrottled())
        .unwrap()
        .with_progress(sink.clone());

    let err = aggregator.search_all(&amsterdam()).await.unwrap_err();

    assert_eq!(
        err,
        RetrievalError::PageFetch {
            page: 3,
            reason: "429".to_string()
        }
    );
    // Sequential retrieval stops scheduling at the failed page
    assert_eq!(fetcher.requested(), vec![1, 2, 3]);
    assert_eq!(sink.tick_count(), 2);
}

#[tokio::test]
async fn test_tick_count_per_last_page_policy() {
    for (policy, expected_ticks, expected_items) in [
        (LastPagePolicy::Skip, 8, 9 * 3),
        (LastPagePolicy::Fetch, 9, 10 * 3),
    ] {
        let fetcher = Arc::new(ScriptedFetcher::uniform(10, 3));
        let sink = Arc::new(RecordingSink::default());
        let aggregator = PaginatedAggregator::new(fetcher.clone(), unthrottled().with_last_page(policy))
            .unwrap()
            .with_progress(sink.clone());

        let result = aggregator.search_all(&amsterdam()).await.unwrap();

        assert_eq!(sink.tick_count(), expected_ticks, "{policy:?}");
        assert_eq!(result.len(), expected_items, "{policy:?}");
    }
}

#[tokio::test]
async fn test_fetch_policy_matches_feed_page_numbering() {
    // Feed numbers pages 1..=total; fetching the last page yields every item
    let fetcher = Arc::new(ScriptedFetcher::uniform(5, 2));
    let aggregator = PaginatedAggregator::new(
        fetcher.clone(),
        unthrottled().with_last_page(LastPagePolicy::Fetch),
    )
    .unwrap();

    let mut result = aggregator.search_all(&amsterdam()).await.unwrap();
    result.sort();

    let mut expected: Vec<String> = (1..=5).flat_map(|page| items(page, 2)).collect();
    expected.sort();
    assert_eq!(result, expected);
}

#[tokio::test]
async fn test_repeated_runs_return_same_multiset() {
    let fetcher = Arc::new(ScriptedFetcher::uniform(7, 5));
    let aggregator = PaginatedAggregator::new(fetcher, unthrottled().with_max_concurrency(3)).unwrap();

    let mut first = aggregator.search_all(&amsterdam()).await.unwrap();
    let mut second = aggregator.search_all(&amsterdam()).await.unwrap();
    first.sort();
    second.sort();

    assert_eq!(first.len(), second.len());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_setup_called_with_default_label() {
    let sink = Arc::new(RecordingSink::default());
    let _aggregator = PaginatedAggregator::new(Arc::new(ScriptedFetcher::uniform(1, 1)), unthrottled())
        .unwrap()
        .with_progress(sink.clone());

    assert_eq!(*sink.setups.lock().unwrap(), vec![PROGRESS_LABEL.to_string()]);
}
