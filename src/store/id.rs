use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a collection assigns ids to new records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Decimal counter ("1", "2", ...), continuing after the largest numeric seed id.
    #[default]
    Sequential,
    /// Random v4 UUIDs.
    Uuid,
}

/// Produces candidate ids. The collection rejects candidates already in use.
#[derive(Debug)]
pub(crate) struct IdGenerator {
    strategy: IdStrategy,
    next: AtomicU64,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        IdGenerator {
            strategy,
            next: AtomicU64::new(1),
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Make sure the counter starts past a seeded id.
    pub fn observe(&self, id: &str) {
        if let Ok(n) = id.parse::<u64>() {
            self.next.fetch_max(n.saturating_add(1), Ordering::Relaxed);
        }
    }

    pub fn next_id(&self) -> String {
        match self.strategy {
            IdStrategy::Sequential => self.next.fetch_add(1, Ordering::Relaxed).to_string(),
            IdStrategy::Uuid => Uuid::new_v4().to_string(),
        }
    }
}
