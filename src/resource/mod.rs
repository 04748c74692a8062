//! Resources - typed records stored in a collection.
//!
//! A resource is a plain serde struct with an opaque string id and a creation
//! timestamp. Creation and partial updates go through JSON objects so any
//! serialisable draft or patch type can be used.
//!
//! ## Example
//!
//! ```ignore
//! use crudkit::{chrono::{DateTime, Utc}, Resource};
//!
//! #[derive(Clone, Serialize, Deserialize, Resource)]
//! #[serde(rename_all = "camelCase")]
//! #[resource(collection = "widgets")]
//! struct Widget {
//!     pub id: String,
//!     pub name: String,
//!     pub created_at: DateTime<Utc>,
//! }
//! ```

mod fields;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

pub(crate) use fields::{build_record, merge_patch};
pub use fields::to_json_object;

/// Trait for types that can be stored in a resource collection.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name (e.g. "widgets"). Also the cache key prefix and the REST path.
    const COLLECTION: &'static str;

    /// JSON key holding the id.
    const ID_KEY: &'static str = "id";

    /// JSON key holding the creation timestamp.
    const CREATED_AT_KEY: &'static str = "created_at";

    /// Unique identifier within the collection.
    fn id(&self) -> &str;

    /// When the store created this record.
    fn created_at(&self) -> DateTime<Utc>;
}
