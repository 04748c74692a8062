use std::future::Future;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{FieldErrors, FormSchema, FormValues};
use crate::error::ResourceError;

/// Where a form is in its submission flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Validating,
    Submitting,
    Succeeded,
}

/// Result of [`Form::submit`].
#[derive(Debug)]
pub enum SubmitOutcome<T> {
    /// Validation failed; the submit function was not called.
    Invalid(FieldErrors),
    /// The submit function failed; the form is editable again.
    Failed(ResourceError),
    Submitted(T),
}

impl<T> SubmitOutcome<T> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

/// Values being edited against a schema, plus the submission state.
#[derive(Debug, Clone)]
pub struct Form {
    schema: FormSchema,
    values: FormValues,
    errors: FieldErrors,
    submit_error: Option<String>,
    phase: FormPhase,
}

impl Form {
    pub fn new(schema: FormSchema) -> Self {
        Self::with_values(schema, FormValues::new())
    }

    pub fn with_values(schema: FormSchema, values: FormValues) -> Self {
        Form {
            schema,
            values,
            errors: FieldErrors::new(),
            submit_error: None,
            phase: FormPhase::Editing,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Edit one field. Clears that field's message and any submit error.
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.values.set(field, value);
        self.errors.remove(field);
        self.submit_error = None;
        self.phase = FormPhase::Editing;
    }

    /// Replace every value, e.g. when an edit page has loaded its record.
    pub fn fill(&mut self, values: FormValues) {
        self.values = values;
        self.errors.clear();
        self.submit_error = None;
        self.phase = FormPhase::Editing;
    }

    /// Return a succeeded form to editing, keeping its values.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.submit_error = None;
        self.phase = FormPhase::Editing;
    }

    /// Validate, then hand the typed payload to `submit`.
    ///
    /// Invalid input never reaches `submit`. On failure the values are kept
    /// and the form returns to `Editing`.
    pub async fn submit<T, F, Fut>(&mut self, submit: F) -> SubmitOutcome<T>
    where
        F: FnOnce(Map<String, Value>) -> Fut,
        Fut: Future<Output = Result<T, ResourceError>>,
    {
        self.phase = FormPhase::Validating;
        self.submit_error = None;

        let payload = match self.schema.validate(&self.values) {
            Ok(payload) => payload,
            Err(errors) => {
                debug!(fields = errors.len(), "form validation failed");
                self.errors = errors.clone();
                self.phase = FormPhase::Editing;
                return SubmitOutcome::Invalid(errors);
            }
        };

        self.errors.clear();
        self.phase = FormPhase::Submitting;

        match submit(payload).await {
            Ok(value) => {
                self.phase = FormPhase::Succeeded;
                SubmitOutcome::Submitted(value)
            }
            Err(error) => {
                warn!(%error, "form submission failed");
                self.submit_error = Some(error.to_string());
                self.phase = FormPhase::Editing;
                SubmitOutcome::Failed(error)
            }
        }
    }
}
