mod common;

use std::sync::Arc;
use std::time::Duration;

use clarifind::indicators::{DetailLoader, DetailState};
use clarifind::IndicatorApi;
use common::{address_row, MockIndicatorApi};

fn loader(api: Arc<MockIndicatorApi>) -> Arc<DetailLoader> {
    let api: Arc<dyn IndicatorApi> = api;
    Arc::new(DetailLoader::new(api, "0105551234567"))
}

#[tokio::test]
async fn test_concurrent_ensure_fetches_once() {
    let api = Arc::new(
        MockIndicatorApi::new()
            .with_detail("AD10000", vec![Ok(vec![address_row()])])
            .with_detail_delay(Duration::from_millis(20)),
    );
    let loader = loader(Arc::clone(&api));

    let first = loader.spawn_ensure("ad10000");
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(loader.state("AD10000").await.is_loading());
    let second = loader.ensure("Ad10000").await;
    assert!(second.is_loading());

    let settled = first.await.unwrap();
    assert_eq!(settled.data().unwrap().details.rows.len(), 1);
    assert_eq!(api.detail_calls(), 1);

    // Cached
    loader.ensure("ad10000").await;
    assert_eq!(api.detail_calls(), 1);
}

#[tokio::test]
async fn test_failure_is_isolated_per_code() {
    let api = Arc::new(
        MockIndicatorApi::new()
            .with_detail("AD10000", vec![Ok(vec![address_row()])])
            .with_detail("D40000", vec![Err(500)]),
    );
    let loader = loader(api);

    let (ok, failed) = tokio::join!(loader.ensure("ad10000"), loader.ensure("d40000"));
    assert!(ok.data().is_some());
    assert!(matches!(failed, DetailState::Failed(_)));

    let snapshot = loader.snapshot().await;
    assert_eq!(snapshot.len(), 2);
    assert!(matches!(snapshot.get("AD10000"), Some(DetailState::Loaded(_))));
    assert_eq!(loader.state("c10000").await, DetailState::Idle);
}

#[tokio::test]
async fn test_retry_after_failure() {
    let api = Arc::new(
        MockIndicatorApi::new().with_detail("H20000", vec![Err(503), Ok(vec![address_row()])]),
    );
    let loader = loader(Arc::clone(&api));
    let mut settled = loader.subscribe();

    assert!(matches!(loader.ensure("h20000").await, DetailState::Failed(_)));
    assert_eq!(settled.recv().await.unwrap(), "H20000");

    assert!(loader.ensure("h20000").await.data().is_some());
    assert_eq!(settled.recv().await.unwrap(), "H20000");
    assert_eq!(api.detail_calls(), 2);
}

#[tokio::test]
async fn test_blank_code_is_ignored() {
    let api = Arc::new(MockIndicatorApi::new());
    let loader = loader(Arc::clone(&api));
    assert_eq!(loader.ensure("  ").await, DetailState::Idle);
    assert_eq!(api.detail_calls(), 0);
}
