//! Test domain: widgets with a name, status and price.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use crudkit::{
    Collection, FieldSchema, FormSchema, IdStrategy, Latency, MockClient, QueryCache, QueryConfig,
    Resource, ResourceQueries, Toaster,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: String,
    pub name: String,
    pub status: Status,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Draft payload for creating a widget.
#[derive(Serialize)]
pub struct NewWidget<'a> {
    pub name: &'a str,
    pub status: Status,
}

pub fn seed() -> Vec<Widget> {
    ["Sprocket", "Gear", "Flange"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| Widget {
            id: (i + 1).to_string(),
            name: name.to_string(),
            status: Status::Active,
            description: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1 + i as u32, 0, 0, 0).unwrap(),
        })
        .collect()
}

pub fn client() -> MockClient<Widget> {
    let collection = Collection::seeded(IdStrategy::Sequential, seed()).unwrap();
    MockClient::with_latency(collection, Latency::none())
}

pub type Widgets = ResourceQueries<Widget, MockClient<Widget>>;

/// Queries over a fresh seeded mock, retrying without delay.
pub fn queries() -> (Widgets, MockClient<Widget>) {
    let client = client();
    let config = QueryConfig {
        retry_delay: std::time::Duration::ZERO,
        ..QueryConfig::default()
    };
    let queries = ResourceQueries::new(Arc::new(client.clone()), QueryCache::new(config));
    (queries, client)
}

pub fn widget_schema() -> FormSchema {
    FormSchema::new()
        .field(FieldSchema::text("name").min_len(3).max_len(50))
        .field(FieldSchema::choice(
            "status",
            [("active", "Active"), ("inactive", "Inactive")],
        ))
        .field(FieldSchema::text("description").optional().max_len(200))
}

pub fn toaster() -> Toaster {
    Toaster::default()
}
