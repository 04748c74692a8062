//! Toaster - transient notifications shown after mutations.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use tracing::info;

use crate::ui::ToastVariant;

pub const DEFAULT_LIMIT: usize = 3;
pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);

/// What to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastMessage {
    pub title: String,
    pub description: Option<String>,
    pub variant: ToastVariant,
}

impl ToastMessage {
    pub fn new(title: impl Into<String>) -> Self {
        ToastMessage {
            title: title.into(),
            description: None,
            variant: ToastVariant::Default,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn variant(mut self, variant: ToastVariant) -> Self {
        self.variant = variant;
        self
    }
}

/// A toast currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub variant: ToastVariant,
    pub expires_at: Instant,
}

#[derive(Debug, Default)]
struct Queue {
    next_id: u64,
    toasts: VecDeque<Toast>,
}

/// Shared toast queue. Clones push to and read from the same queue.
///
/// Holds at most `limit` toasts; pushing past the limit drops the oldest.
/// A limit of 0 disables toasts: pushes are logged and then dropped.
#[derive(Debug, Clone)]
pub struct Toaster {
    queue: Arc<Mutex<Queue>>,
    limit: usize,
    duration: Duration,
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_DURATION)
    }
}

impl Toaster {
    pub fn new(limit: usize, duration: Duration) -> Self {
        Toaster {
            queue: Arc::new(Mutex::new(Queue::default())),
            limit,
            duration,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, message: ToastMessage) -> u64 {
        let mut queue = self.lock();
        queue.next_id += 1;
        let id = queue.next_id;
        info!(id, title = %message.title, variant = ?message.variant, "toast");

        queue.toasts.push_back(Toast {
            id,
            title: message.title,
            description: message.description,
            variant: message.variant,
            expires_at: Instant::now() + self.duration,
        });
        while queue.toasts.len() > self.limit {
            queue.toasts.pop_front();
        }
        id
    }

    pub fn success(&self, title: impl Into<String>, description: Option<&str>) -> u64 {
        self.push(with_description(
            ToastMessage::new(title).variant(ToastVariant::Success),
            description,
        ))
    }

    pub fn error(&self, title: impl Into<String>, description: Option<&str>) -> u64 {
        self.push(with_description(
            ToastMessage::new(title).variant(ToastVariant::Destructive),
            description,
        ))
    }

    /// Returns false if the toast was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut queue = self.lock();
        let before = queue.toasts.len();
        queue.toasts.retain(|t| t.id != id);
        queue.toasts.len() != before
    }

    /// Toasts still on screen, oldest first. Expired toasts are dropped.
    pub fn active(&self) -> Vec<Toast> {
        let now = Instant::now();
        let mut queue = self.lock();
        queue.toasts.retain(|t| t.expires_at > now);
        queue.toasts.iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().toasts.clear();
    }
}

fn with_description(message: ToastMessage, description: Option<&str>) -> ToastMessage {
    match description {
        Some(d) => message.description(d),
        None => message,
    }
}
