//! REST surface for one resource client.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /{collection}` - every record, in insertion order.
//! - `POST /{collection}` - create from a JSON object; `201` with the record.
//! - `GET /{collection}/:id` - one record.
//! - `PATCH /{collection}/:id` - merge a JSON object over the record.
//! - `DELETE /{collection}/:id` - remove; `204` whether or not it existed.
//! - `GET /health` - `{ "ok": true, "collection": ... }`.
//!
//! Errors are `{ "error": message }` with the status from
//! [`ResourceError::status_code`].
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use crudkit::{server, Collection, MockClient};
//!
//! let client = Arc::new(MockClient::new(Collection::<Widget>::default()));
//! server::serve(server::router(client), "0.0.0.0:3000").await?;
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::client::ResourceClient;
use crate::error::ResourceError;
use crate::resource::Resource;

struct Api<M, C> {
    client: Arc<C>,
    _marker: PhantomData<fn() -> M>,
}

impl<M, C> Clone for Api<M, C> {
    fn clone(&self) -> Self {
        Api {
            client: Arc::clone(&self.client),
            _marker: PhantomData,
        }
    }
}

/// Build an axum `Router` serving `M`'s collection through `client`.
pub fn router<M, C>(client: Arc<C>) -> Router
where
    M: Resource,
    C: ResourceClient<M> + 'static,
{
    let collection = format!("/{}", M::COLLECTION);
    let record = format!("/{}/:id", M::COLLECTION);
    Router::new()
        .route("/health", get(health_handler::<M>))
        .route(&collection, get(list_handler::<M, C>).post(create_handler::<M, C>))
        .route(
            &record,
            get(get_handler::<M, C>)
                .patch(update_handler::<M, C>)
                .delete(delete_handler::<M, C>),
        )
        .with_state(Api {
            client,
            _marker: PhantomData,
        })
}

/// Serve `app` at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve(app: Router, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "serving");
    axum::serve(listener, app).await
}

async fn health_handler<M: Resource>() -> impl IntoResponse {
    Json(json!({ "ok": true, "collection": M::COLLECTION }))
}

async fn list_handler<M, C>(State(api): State<Api<M, C>>) -> Response
where
    M: Resource,
    C: ResourceClient<M> + 'static,
{
    respond(api.client.list().await, StatusCode::OK)
}

async fn get_handler<M, C>(State(api): State<Api<M, C>>, Path(id): Path<String>) -> Response
where
    M: Resource,
    C: ResourceClient<M> + 'static,
{
    respond(api.client.get(&id).await, StatusCode::OK)
}

async fn create_handler<M, C>(State(api): State<Api<M, C>>, Json(fields): Json<Value>) -> Response
where
    M: Resource,
    C: ResourceClient<M> + 'static,
{
    respond(api.client.create(&fields).await, StatusCode::CREATED)
}

async fn update_handler<M, C>(
    State(api): State<Api<M, C>>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Response
where
    M: Resource,
    C: ResourceClient<M> + 'static,
{
    respond(api.client.update(&id, &patch).await, StatusCode::OK)
}

async fn delete_handler<M, C>(State(api): State<Api<M, C>>, Path(id): Path<String>) -> Response
where
    M: Resource,
    C: ResourceClient<M> + 'static,
{
    match api.client.delete(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

fn respond<T: serde::Serialize>(result: Result<T, ResourceError>, ok: StatusCode) -> Response {
    match result {
        Ok(value) => (ok, Json(value)).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: ResourceError) -> Response {
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        warn!(error = %e, "request failed");
    }
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}
