//! KitConfig - TOML settings for latency, caching, ids, toasts and logging.
//!
//! Every section and key is optional; missing values fall back to the
//! defaults of the type they configure.
//!
//! ```toml
//! [latency]
//! list_ms = 500
//! get_ms = 300
//!
//! [query]
//! stale_time_ms = 60000
//! retry = 1
//!
//! [store]
//! id_strategy = "uuid"
//!
//! [toasts]
//! limit = 3
//! duration_ms = 5000
//!
//! [log]
//! filter = "crudkit=debug"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::Latency;
use crate::notify::{self, Toaster};
use crate::query::QueryConfig;
use crate::store::IdStrategy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    pub latency: LatencyConfig,
    pub query: QuerySection,
    pub store: StoreConfig,
    pub toasts: ToastConfig,
    pub log: LogConfig,
}

impl KitConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn latency(&self) -> Latency {
        Latency {
            list: Duration::from_millis(self.latency.list_ms),
            get: Duration::from_millis(self.latency.get_ms),
            create: Duration::from_millis(self.latency.create_ms),
            update: Duration::from_millis(self.latency.update_ms),
            delete: Duration::from_millis(self.latency.delete_ms),
        }
    }

    pub fn query(&self) -> QueryConfig {
        QueryConfig {
            stale_time: Duration::from_millis(self.query.stale_time_ms),
            gc_time: Duration::from_millis(self.query.gc_time_ms),
            retry: self.query.retry,
            retry_delay: Duration::from_millis(self.query.retry_delay_ms),
        }
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.store.id_strategy
    }

    pub fn toaster(&self) -> Toaster {
        Toaster::new(self.toasts.limit, Duration::from_millis(self.toasts.duration_ms))
    }
}

/// Per-operation mock latency in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub list_ms: u64,
    pub get_ms: u64,
    pub create_ms: u64,
    pub update_ms: u64,
    pub delete_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        let latency = Latency::default();
        LatencyConfig {
            list_ms: millis(latency.list),
            get_ms: millis(latency.get),
            create_ms: millis(latency.create),
            update_ms: millis(latency.update),
            delete_ms: millis(latency.delete),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySection {
    pub stale_time_ms: u64,
    pub gc_time_ms: u64,
    pub retry: u32,
    pub retry_delay_ms: u64,
}

impl Default for QuerySection {
    fn default() -> Self {
        let query = QueryConfig::default();
        QuerySection {
            stale_time_ms: millis(query.stale_time),
            gc_time_ms: millis(query.gc_time),
            retry: query.retry,
            retry_delay_ms: millis(query.retry_delay),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub id_strategy: IdStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    /// Toasts shown at once; 0 turns them off.
    pub limit: usize,
    pub duration_ms: u64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        ToastConfig {
            limit: notify::DEFAULT_LIMIT,
            duration_ms: millis(notify::DEFAULT_DURATION),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directives.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: "info".to_string(),
        }
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}
