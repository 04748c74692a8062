//! Test domain and server fixture for the REST round trip.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crudkit::{server, Collection, IdStrategy, Latency, MockClient, Resource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[resource(collection = "widgets")]
pub struct Widget {
    pub id: String,
    pub name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Serve a seeded mock on port 0 and return the base URL.
pub async fn start_server() -> (String, MockClient<Widget>) {
    let seed = Widget {
        id: "1".into(),
        name: "Sprocket".into(),
        status: "active".into(),
        created_at: Utc::now(),
    };
    let collection = Collection::seeded(IdStrategy::Sequential, vec![seed]).unwrap();
    let client = MockClient::with_latency(collection, Latency::none());

    let app = server::router::<Widget, _>(Arc::new(client.clone()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), client)
}
