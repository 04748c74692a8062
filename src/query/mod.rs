//! Query cache - keyed read caching with invalidate-on-write.
//!
//! Reads go through [`QueryCache::fetch`], which returns fresh cached data or
//! calls the fetcher, sharing one in-flight request between concurrent readers
//! of the same key. Writes go through [`QueryCache::mutate`], which invalidates
//! the given keys once the mutation has succeeded.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use crudkit::{Collection, MockClient, QueryCache, ResourceQueries};
//!
//! let widgets = ResourceQueries::new(
//!     Arc::new(MockClient::new(Collection::<Widget>::default())),
//!     QueryCache::default(),
//! );
//!
//! let list = widgets.list().await;          // fetches
//! widgets.create(&new_widget).await?;        // invalidates "widgets"
//! let list = widgets.list().await;          // refetches, includes the new record
//! ```

mod cache;
mod resource;

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::ResourceError;

pub use cache::{QueryCache, QueryObserver};
pub use resource::ResourceQueries;

/// Identifies cached data: a collection, optionally narrowed to one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub collection: String,
    pub id: Option<String>,
}

impl QueryKey {
    /// Key for a whole collection.
    pub fn list(collection: impl Into<String>) -> Self {
        QueryKey {
            collection: collection.into(),
            id: None,
        }
    }

    /// Key for a single record.
    pub fn detail(collection: impl Into<String>, id: impl Into<String>) -> Self {
        QueryKey {
            collection: collection.into(),
            id: Some(id.into()),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}:{}", self.collection, id),
            None => write!(f, "{}", self.collection),
        }
    }
}

/// Selects which cache entries an invalidation touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFilter {
    /// Exactly this key.
    Exact(QueryKey),
    /// The list key and every detail key of a collection.
    Collection(String),
}

impl QueryFilter {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            QueryFilter::Exact(exact) => exact == key,
            QueryFilter::Collection(collection) => &key.collection == collection,
        }
    }
}

impl From<QueryKey> for QueryFilter {
    fn from(key: QueryKey) -> Self {
        QueryFilter::Exact(key)
    }
}

/// Status of a query as seen by a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No data and no error yet.
    Pending,
    /// The last fetch succeeded.
    Success,
    /// The last fetch failed. Previous data, if any, is still available.
    Error,
}

/// Latest known value of a query plus its status flags.
#[derive(Debug, Clone)]
pub struct QueryResult<T> {
    pub data: Option<T>,
    pub status: QueryStatus,
    pub error: Option<ResourceError>,
    /// Data was invalidated or is older than the stale time.
    pub is_stale: bool,
    /// A fetch for this key is in flight.
    pub is_fetching: bool,
    pub updated_at: Option<Instant>,
}

impl<T> QueryResult<T> {
    pub(crate) fn pending() -> Self {
        QueryResult {
            data: None,
            status: QueryStatus::Pending,
            error: None,
            is_stale: false,
            is_fetching: false,
            updated_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Data on success, the error otherwise. Pending results have neither and
    /// yield `None`.
    pub fn into_result(self) -> Option<Result<T, ResourceError>> {
        match (self.status, self.data, self.error) {
            (QueryStatus::Success, Some(data), _) => Some(Ok(data)),
            (QueryStatus::Error, _, Some(error)) => Some(Err(error)),
            _ => None,
        }
    }
}

/// Freshness, retention and retry settings for a [`QueryCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// How long fetched data counts as fresh.
    pub stale_time: Duration,
    /// How long an unobserved entry is kept before garbage collection.
    pub gc_time: Duration,
    /// Extra attempts after a failed fetch (transport errors only).
    pub retry: u32,
    pub retry_delay: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            stale_time: Duration::from_secs(60),
            gc_time: Duration::from_secs(5 * 60),
            retry: 1,
            retry_delay: Duration::from_secs(1),
        }
    }
}
