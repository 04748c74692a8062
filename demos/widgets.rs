//! Widget admin prototype: seeded mock backend, list page with delete, and a
//! create form, rendered to stdout.
//!
//! Run with `cargo run --example widgets`. Pass a TOML path to override
//! latency and cache settings.

use std::sync::Arc;

use crudkit::chrono::{DateTime, Utc};
use crudkit::ui::{Component, ToastView};
use crudkit::{
    telemetry, Collection, FieldSchema, FormMode, FormPage, FormSchema, KitConfig, ListPage,
    MockClient, QueryCache, Resource, ResourceQueries, SubmitOutcome, UiStore,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Resource)]
#[serde(rename_all = "camelCase")]
struct Widget {
    id: String,
    name: String,
    status: String,
    #[serde(default)]
    description: Option<String>,
    created_at: DateTime<Utc>,
}

fn seed() -> Vec<Widget> {
    [("1", "Sprocket", "active"), ("2", "Gear", "inactive")]
        .into_iter()
        .map(|(id, name, status)| Widget {
            id: id.into(),
            name: name.into(),
            status: status.into(),
            description: None,
            created_at: Utc::now(),
        })
        .collect()
}

fn schema() -> FormSchema {
    FormSchema::new()
        .field(FieldSchema::text("name").min_len(3).max_len(50).placeholder("Widget name"))
        .field(
            FieldSchema::choice("status", [("active", "Active"), ("inactive", "Inactive")])
                .placeholder("Select a status"),
        )
        .field(FieldSchema::text("description").optional().max_len(200))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => KitConfig::load(path)?,
        None => KitConfig::default(),
    };
    telemetry::init(&config.log.filter);

    let collection = Collection::seeded(config.id_strategy(), seed())?;
    let client = MockClient::with_latency(collection, config.latency());
    let widgets = ResourceQueries::new(Arc::new(client), QueryCache::new(config.query()));
    let toaster = config.toaster();
    let ui = UiStore::default();

    let mut list = ListPage::new("Widgets", widgets.clone(), toaster.clone())
        .column("Name", |w: &Widget| w.name.clone())
        .column("Status", |w: &Widget| w.status.clone());
    list.load().await;
    println!("{}\n", list.render());

    let mut form = FormPage::new("New widget", FormMode::Create, schema(), widgets.clone(), toaster.clone());
    form.set("name", "Wi");
    form.set("status", "active");
    if let SubmitOutcome::Invalid(errors) = form.submit().await {
        println!("rejected: {:?}\n", errors.iter().collect::<Vec<_>>());
    }
    form.set("name", "Widget");
    if let SubmitOutcome::Submitted(widget) = form.submit().await {
        println!("created widget {}\n", widget.id);
    }

    list.load().await;
    if list.request_delete("1") {
        println!("{}\n", list.render());
        list.confirm_delete().await;
    }
    println!("{}\n", list.render());

    ui.toggle_sidebar();
    println!("sidebar open: {}", ui.sidebar_open());
    println!("{}", ToastView::new(toaster.active()).render());
    Ok(())
}
