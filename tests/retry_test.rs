// Retrying fetcher: budget, backoff and slot usage
mod common;

use common::{CallKind, MockSource};
use std::sync::Arc;
use std::time::{Duration, Instant};
use topic_faces::discovery::TopicSite;
use topic_faces::{ConcurrencyLimiter, FetchError, RetryPolicy, RetryingFetcher, Wikipedia};
use url::Url;

fn page_url(topic: &str) -> String {
    Wikipedia::new(Url::parse("https://en.wikipedia.org/w/api.php").unwrap()).page_url(topic)
}

fn fetcher(source: &Arc<MockSource>, slots: usize, retries: u32) -> RetryingFetcher {
    RetryingFetcher::new(source.clone(), ConcurrencyLimiter::new("fetch", slots)).with_policy(
        RetryPolicy {
            max_retries: retries,
            delay: Duration::from_millis(10),
        },
    )
}

#[tokio::test]
async fn test_two_failures_then_success_is_invisible() {
    let source = Arc::new(MockSource::new().with_page("Rust", 1).fail_page("Rust", 2));
    let fetcher = fetcher(&source, 5, 3);

    let body = fetcher.fetch(&page_url("Rust")).await.unwrap();

    assert!(body.contains("img0"));
    assert_eq!(source.count(CallKind::Page, "Rust"), 3);
    assert_eq!(fetcher.limiter().active(), 0);
}

#[tokio::test]
async fn test_exhausted_budget_reports_last_failure() {
    let source = Arc::new(MockSource::new().with_page("Rust", 1).fail_page("Rust", u32::MAX));
    let fetcher = fetcher(&source, 5, 3);

    let err = fetcher.fetch(&page_url("Rust")).await.unwrap_err();

    match &err {
        FetchError::Exhausted { attempts, last, .. } => {
            assert_eq!(*attempts, 4);
            assert!(matches!(**last, FetchError::Request { .. }));
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
    assert!(err.to_string().contains("status code 500"));
    assert_eq!(err.url(), page_url("Rust"));
    assert!(matches!(err.last_failure(), FetchError::Request { url, .. } if *url == page_url("Rust")));
    assert_eq!(source.count(CallKind::Page, "Rust"), 4);
    assert_eq!(fetcher.limiter().active(), 0);
}

#[tokio::test]
async fn test_zero_retries_means_single_attempt() {
    let source = Arc::new(MockSource::new().fail_page("Rust", 1).with_page("Rust", 1));
    let fetcher = fetcher(&source, 1, 0);

    assert!(fetcher.fetch(&page_url("Rust")).await.is_err());
    assert_eq!(source.count(CallKind::Page, "Rust"), 1);
}

#[tokio::test]
async fn test_backoff_does_not_hold_a_slot() {
    let source = Arc::new(
        MockSource::new()
            .with_page("Flaky", 1)
            .fail_page("Flaky", 1)
            .with_page("Steady", 1),
    );
    let fetcher = RetryingFetcher::new(source.clone(), ConcurrencyLimiter::new("fetch", 1))
        .with_policy(RetryPolicy {
            max_retries: 3,
            delay: Duration::from_millis(200),
        });

    let flaky = {
        let fetcher = fetcher.clone();
        tokio::spawn(async move { fetcher.fetch(&page_url("Flaky")).await })
    };
    // Let the first attempt fail and enter its backoff
    while source.count(CallKind::Page, "Flaky") == 0 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    let started = Instant::now();
    fetcher.fetch(&page_url("Steady")).await.unwrap();
    assert!(
        started.elapsed() < Duration::from_millis(150),
        "steady fetch waited for the flaky fetch's backoff"
    );

    assert!(flaky.await.unwrap().is_ok());
}
