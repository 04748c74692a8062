//! Forms - field schemas, synchronous validation and the submission flow.
//!
//! A [`FormSchema`] turns raw string input into a typed JSON payload or a set
//! of per-field messages. A [`Form`] holds the values being edited and walks
//! `Editing -> Validating -> Submitting -> Succeeded`, returning to `Editing`
//! whenever validation or submission fails.

mod schema;
mod state;

use std::collections::BTreeMap;

use thiserror::Error;

pub use schema::{FieldKind, FieldSchema, FormSchema};
pub use state::{Form, FormPhase, SubmitOutcome};

/// Raw input values keyed by field name, as a browser form would submit them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<String, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(|v| v.as_str())
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.values.remove(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = FormValues::new();
        for (k, v) in iter {
            values.set(k, v);
        }
        values
    }
}

/// Per-field validation messages. Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(|m| m.as_str())
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.errors.remove(field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
