//! REST round trip: server router backed by a mock, HttpClient on the other end.

mod support;

use std::sync::Arc;

use chrono::Utc;
use crudkit::{HttpClient, QueryCache, ResourceClient, ResourceError, ResourceQueries};
use serde_json::json;

use support::{start_server, Widget};

#[tokio::test]
async fn health_check() {
    let (base, _) = start_server().await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["collection"], "widgets");
}

#[tokio::test]
async fn crud_round_trip() {
    let (base, backend) = start_server().await;
    let client = HttpClient::<Widget>::new(&base);

    let created = client
        .create(&json!({ "name": "Widget", "status": "active" }))
        .await
        .unwrap();
    assert_eq!(created.id, "2");
    assert_eq!(backend.collection().len().unwrap(), 2);

    let fetched = client.get("2").await.unwrap();
    assert_eq!(fetched, created);

    let updated = client.update("2", &json!({ "status": "inactive" })).await.unwrap();
    assert_eq!(updated.status, "inactive");
    assert_eq!(updated.name, "Widget");

    client.delete("1").await.unwrap();
    let names: Vec<String> = client.list().await.unwrap().into_iter().map(|w| w.name).collect();
    assert_eq!(names, vec!["Widget"]);
}

#[tokio::test]
async fn errors_map_back_to_resource_errors() {
    let (base, _) = start_server().await;
    let client = HttpClient::<Widget>::new(&base);

    let err = client
        .update("nonexistent-id", &json!({ "name": "x" }))
        .await
        .unwrap_err();
    assert_eq!(err, ResourceError::not_found("widgets", "nonexistent-id"));

    let err = client.create(&json!({ "name": "No status" })).await.unwrap_err();
    assert!(matches!(err, ResourceError::InvalidPayload { .. }));

    client.delete("missing").await.unwrap();
}

#[tokio::test]
async fn ids_are_sent_as_one_path_segment() {
    let (base, backend) = start_server().await;
    let client = HttpClient::<Widget>::new(&base);

    let err = client.get("1?x").await.unwrap_err();
    assert_eq!(err, ResourceError::not_found("widgets", "1?x"));

    backend
        .collection()
        .insert(Widget {
            id: "a/b".into(),
            name: "Slashed".into(),
            status: "active".into(),
            created_at: Utc::now(),
        })
        .unwrap();

    assert_eq!(client.get("a/b").await.unwrap().name, "Slashed");
    let updated = client.update("a/b", &json!({ "name": "Renamed" })).await.unwrap();
    assert_eq!(updated.id, "a/b");
    assert_eq!(updated.name, "Renamed");
    assert_eq!(backend.collection().get("1").unwrap().name, "Sprocket");

    client.delete("a/b").await.unwrap();
    assert!(backend.collection().get("a/b").unwrap_err().is_not_found());
    assert_eq!(backend.collection().len().unwrap(), 1);
}

#[tokio::test]
async fn backend_failure_is_transport_error() {
    let (base, backend) = start_server().await;
    let client = HttpClient::<Widget>::new(&base);
    backend.fail_next(1);

    let err = client.list().await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let client = HttpClient::<Widget>::new("http://127.0.0.1:1");
    assert!(matches!(client.list().await, Err(ResourceError::Transport(_))));
}

#[tokio::test]
async fn queries_work_over_http() {
    let (base, _) = start_server().await;
    let widgets = ResourceQueries::new(Arc::new(HttpClient::<Widget>::new(&base)), QueryCache::default());

    assert_eq!(widgets.list().await.data.unwrap().len(), 1);
    widgets
        .create(&json!({ "name": "Widget", "status": "active" }))
        .await
        .unwrap();
    assert_eq!(widgets.list().await.data.unwrap().len(), 2);
}
