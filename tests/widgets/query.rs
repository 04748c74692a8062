use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crudkit::{QueryCache, QueryConfig, QueryFilter, QueryKey, QueryStatus, ResourceError};
use serde_json::json;

use crate::support::{queries, NewWidget, Status, Widget};

#[tokio::test]
async fn reads_reflect_mutations() {
    let (widgets, _) = queries();
    assert_eq!(widgets.list().await.data.unwrap().len(), 3);

    let created = widgets
        .create(&NewWidget {
            name: "Widget",
            status: Status::Active,
        })
        .await
        .unwrap();

    let listed = widgets.list().await.data.unwrap();
    assert_eq!(listed.len(), 4);
    assert!(listed.contains(&created));

    widgets.update("1", &json!({ "name": "Sprocket v2" })).await.unwrap();
    assert_eq!(widgets.get("1").await.data.unwrap().name, "Sprocket v2");

    widgets.delete("1").await.unwrap();
    assert!(widgets.get("1").await.error.unwrap().is_not_found());
    assert_eq!(widgets.list().await.data.unwrap().len(), 3);
}

#[tokio::test]
async fn fresh_reads_do_not_hit_the_client() {
    let cache = QueryCache::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = QueryKey::list("widgets");

    for _ in 0..3 {
        let calls = calls.clone();
        let result = cache
            .fetch::<Vec<Widget>, _, _>(&key, move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(Vec::new()) }
            })
            .await;
        assert_eq!(result.status, QueryStatus::Success);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_mutation_leaves_cache_untouched() {
    let (widgets, client) = queries();
    widgets.list().await;
    client.fail_next(1);

    let err = widgets.update("1", &json!({ "name": "nope" })).await.unwrap_err();
    assert!(matches!(err, ResourceError::Transport(_)));

    let list = widgets.peek_list();
    assert!(!list.is_stale);
    assert_eq!(list.data.unwrap()[0].name, "Sprocket");
}

#[tokio::test]
async fn transient_read_failure_is_retried() {
    let (widgets, client) = queries();
    client.fail_next(1);

    let result = widgets.list().await;
    assert!(result.is_success());
    assert_eq!(result.data.unwrap().len(), 3);
}

#[tokio::test]
async fn read_error_keeps_previous_data() {
    let (widgets, client) = queries();
    widgets.list().await;
    widgets
        .cache()
        .invalidate(&QueryFilter::Collection("widgets".into()));
    client.fail_next(2);

    let result = widgets.list().await;
    assert!(result.is_error());
    assert!(result.error.unwrap().is_retryable());
    assert_eq!(result.data.unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn unobserved_entries_are_collected() {
    let cache = QueryCache::new(QueryConfig {
        gc_time: Duration::from_secs(10),
        ..QueryConfig::default()
    });
    let key = QueryKey::detail("widgets", "1");
    let observer = cache.observe(&key);
    cache.set_data(&key, &json!({ "id": "1" })).unwrap();

    tokio::time::advance(Duration::from_secs(60)).await;
    assert_eq!(cache.collect_garbage(), 0);

    drop(observer);
    tokio::time::advance(Duration::from_secs(11)).await;
    assert!(!cache.contains(&key));
    assert!(cache.is_empty());
}
