use crudkit::ui::{Component, ToastVariant};
use std::sync::Arc;
use std::time::Duration;

use crudkit::{DeleteFlow, ListPage, QueryCache, QueryConfig, ResourceClient, ResourceQueries};

use crate::support::{client, queries, toaster, Widget, Widgets};

fn list_page(widgets: Widgets, toasts: crudkit::Toaster) -> ListPage<Widget, crudkit::MockClient<Widget>> {
    ListPage::new("Widgets", widgets, toasts)
        .column("Name", |w: &Widget| w.name.clone())
        .column("Status", |w: &Widget| format!("{:?}", w.status))
}

#[tokio::test]
async fn delete_flow_removes_the_row() {
    let (widgets, client) = queries();
    let toasts = toaster();
    let mut page = list_page(widgets, toasts.clone());

    assert!(page.load().await.is_success());
    assert!(page.render().contains(">Gear</td>"));

    assert!(page.request_delete("2"));
    assert!(matches!(page.flow(), DeleteFlow::Confirming(w) if w.name == "Gear"));
    let html = page.render();
    assert!(html.contains("role=\"dialog\""));
    assert!(html.contains("record 2"));

    assert_eq!(page.confirm_delete().await, Some(Ok(())));
    assert!(page.flow().is_idle());
    assert!(client.get("2").await.unwrap_err().is_not_found());
    assert!(!page.render().contains(">Gear</td>"));

    let active = toasts.active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].variant, ToastVariant::Success);
}

#[tokio::test]
async fn only_one_delete_at_a_time() {
    let (widgets, _) = queries();
    let mut page = list_page(widgets, toaster());
    page.load().await;

    assert!(page.request_delete("1"));
    assert!(!page.request_delete("3"));
    assert_eq!(page.flow().target().map(|w| w.id.as_str()), Some("1"));

    assert!(page.cancel_delete());
    assert!(!page.cancel_delete());
    assert!(page.request_delete("3"));
}

#[tokio::test]
async fn rows_escape_cell_text() {
    let (widgets, _) = queries();
    widgets
        .update("1", &serde_json::json!({ "name": "<script>" }))
        .await
        .unwrap();
    let page = list_page(widgets, toaster());
    page.load().await;

    let html = page.render();
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
}

#[tokio::test(start_paused = true)]
async fn closed_list_page_leaves_nothing_cached() {
    let cache = QueryCache::new(QueryConfig {
        gc_time: Duration::from_secs(1),
        ..QueryConfig::default()
    });
    let widgets = ResourceQueries::new(Arc::new(client()), cache.clone());
    let page = list_page(widgets, toaster());
    assert!(page.load().await.is_success());
    assert!(!cache.is_empty());

    drop(page);
    tokio::time::advance(Duration::from_secs(600)).await;
    assert_eq!(cache.len(), 0);
}
