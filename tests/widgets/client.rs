use std::time::Duration;

use crudkit::{Collection, IdStrategy, Latency, MockClient, ResourceClient, ResourceError};
use serde_json::json;
use tokio::time::Instant;

use crate::support::{client, NewWidget, Status, Widget};

#[tokio::test]
async fn create_assigns_id_and_timestamp() {
    let client = client();
    let before = chrono::Utc::now();

    let widget = client
        .create(&NewWidget {
            name: "Widget",
            status: Status::Active,
        })
        .await
        .unwrap();

    assert_eq!(widget.name, "Widget");
    assert_eq!(widget.status, Status::Active);
    assert_eq!(widget.id, "4");
    assert!(widget.created_at >= before);

    let listed = client.list().await.unwrap();
    assert_eq!(listed.len(), 4);
    assert_eq!(listed.last(), Some(&widget));
}

#[tokio::test]
async fn ids_in_payload_are_ignored() {
    let client = client();
    let widget = client
        .create(&json!({ "id": "1", "createdAt": "1999-01-01T00:00:00Z", "name": "Copy", "status": "inactive" }))
        .await
        .unwrap();

    assert_ne!(widget.id, "1");
    assert!(widget.created_at.timestamp() > 0);
    assert_eq!(client.get("1").await.unwrap().name, "Sprocket");
}

#[tokio::test]
async fn update_merges_given_keys_only() {
    let client = client();
    let updated = client
        .update("2", &json!({ "status": "inactive", "description": "spare" }))
        .await
        .unwrap();

    assert_eq!(updated.name, "Gear");
    assert_eq!(updated.status, Status::Inactive);
    assert_eq!(updated.description.as_deref(), Some("spare"));

    let cleared = client.update("2", &json!({ "description": null })).await.unwrap();
    assert_eq!(cleared.description, None);
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let client = client();
    let err = client
        .update("nonexistent-id", &json!({ "name": "x" }))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ResourceError::NotFound {
            collection: "widgets".into(),
            id: "nonexistent-id".into()
        }
    );
    assert_eq!(client.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let client = client();
    client.delete("1").await.unwrap();

    assert!(client.get("1").await.unwrap_err().is_not_found());
    assert_eq!(client.list().await.unwrap().len(), 2);

    // absent ids are fine
    client.delete("1").await.unwrap();
}

#[tokio::test]
async fn invalid_payload_is_rejected() {
    let client = client();
    let err = client.create(&json!({ "name": "No status" })).await.unwrap_err();
    assert!(matches!(err, ResourceError::InvalidPayload { .. }));
    assert_eq!(client.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn injected_failures_do_not_touch_the_store() {
    let client = client();
    client.fail_next(1);

    let err = client.delete("1").await.unwrap_err();
    assert!(err.is_retryable());
    assert!(client.get("1").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn default_latency_applies_per_operation() {
    let client: MockClient<Widget> = MockClient::new(Collection::new(IdStrategy::Uuid));
    assert_eq!(client.latency(), Latency::default());

    let start = Instant::now();
    client.list().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(500));

    let start = Instant::now();
    client.delete("anything").await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(300));
}
