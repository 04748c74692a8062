//! Resource clients - the async boundary the rest of the kit depends on.
//!
//! [`ResourceClient`] is the five-operation contract every backend satisfies.
//! [`MockClient`] serves it from an in-memory [`Collection`](crate::Collection)
//! with fixed artificial latency; `HttpClient` (feature `http`) serves it from
//! a REST backend.

mod latency;
mod mock;

#[cfg(feature = "http")]
mod http;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ResourceError;
use crate::resource::Resource;

pub use latency::Latency;
pub use mock::MockClient;

#[cfg(feature = "http")]
pub use http::HttpClient;

/// CRUD operations over one resource type.
#[async_trait]
pub trait ResourceClient<M: Resource>: Send + Sync {
    /// Every record, in collection order.
    async fn list(&self) -> Result<Vec<M>, ResourceError>;

    /// The record with this id, or `NotFound`.
    async fn get(&self, id: &str) -> Result<M, ResourceError>;

    /// Create a record from `fields`; the backend assigns id and timestamp.
    async fn create<D>(&self, fields: &D) -> Result<M, ResourceError>
    where
        D: Serialize + Send + Sync + ?Sized;

    /// Merge `patch` into the record with this id, or `NotFound`.
    async fn update<P>(&self, id: &str, patch: &P) -> Result<M, ResourceError>
    where
        P: Serialize + Send + Sync + ?Sized;

    /// Delete the record with this id. Deleting an absent id succeeds.
    async fn delete(&self, id: &str) -> Result<(), ResourceError>;
}
