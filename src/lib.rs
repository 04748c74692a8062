//! Toolkit for CRUD prototypes: in-memory resource stores behind an async
//! client, a keyed query cache with invalidate-on-write, form validation,
//! page state machines and server-rendered UI components.

extern crate self as crudkit;

mod error;
mod notify;
mod resource;
mod store;
mod ui_state;

pub mod client;
pub mod config;
pub mod form;
pub mod page;
pub mod query;
pub mod telemetry;
pub mod ui;

#[cfg(feature = "http")]
pub mod server;

pub use chrono;
pub use crudkit_macros::Resource;

pub use client::{Latency, MockClient, ResourceClient};
pub use config::{ConfigError, KitConfig};
pub use error::ResourceError;
pub use form::{FieldErrors, FieldSchema, Form, FormPhase, FormSchema, FormValues, SubmitOutcome};
pub use notify::{Toast, ToastMessage, Toaster};
pub use page::{DeleteFlow, FormMode, FormPage, ListPage};
pub use query::{
    QueryCache, QueryConfig, QueryFilter, QueryKey, QueryObserver, QueryResult, QueryStatus,
    ResourceQueries,
};
pub use resource::{to_json_object, Resource};
pub use store::{Collection, IdStrategy};
pub use ui_state::{Theme, UiState, UiStore};

#[cfg(feature = "http")]
pub use client::HttpClient;
