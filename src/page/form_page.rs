use askama::Template;
use serde_json::Value;
use tracing::debug;

use crate::client::ResourceClient;
use crate::error::ResourceError;
use crate::form::{FieldKind, FieldSchema, Form, FormPhase, FormSchema, FormValues, SubmitOutcome};
use crate::notify::Toaster;
use crate::query::{QueryObserver, ResourceQueries};
use crate::resource::{to_json_object, Resource};
use crate::ui::html::render;
use crate::ui::{Attrs, Button, Card, Component, FormField, Input, InputType, Select};

/// Whether a form page creates a record or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

/// Create or edit screen for one resource.
///
/// In edit mode the record's key stays observed for as long as the page exists.
pub struct FormPage<M, C> {
    title: String,
    mode: FormMode,
    form: Form,
    queries: ResourceQueries<M, C>,
    toaster: Toaster,
    _observer: Option<QueryObserver>,
}

impl<M: Resource, C: ResourceClient<M> + 'static> FormPage<M, C> {
    pub fn new(
        title: impl Into<String>,
        mode: FormMode,
        schema: FormSchema,
        queries: ResourceQueries<M, C>,
        toaster: Toaster,
    ) -> Self {
        let observer = match &mode {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(queries.observe(id)),
        };
        FormPage {
            title: title.into(),
            mode,
            form: Form::new(schema),
            queries,
            toaster,
            _observer: observer,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Pre-fill the form from the record being edited. No-op when creating.
    pub async fn load(&mut self) -> Result<(), ResourceError> {
        let id = match &self.mode {
            FormMode::Create => return Ok(()),
            FormMode::Edit(id) => id.clone(),
        };

        let record = match self.queries.get(&id).await.into_result() {
            Some(result) => result?,
            None => return Err(ResourceError::not_found(M::COLLECTION, &id)),
        };
        let fields = to_json_object(M::COLLECTION, &record)?;

        let values: FormValues = self
            .form
            .schema()
            .fields()
            .iter()
            .filter_map(|field| {
                fields
                    .get(field.name())
                    .map(|value| (field.name().to_string(), display_value(value)))
            })
            .collect();
        debug!(collection = M::COLLECTION, %id, fields = values.iter().count(), "form prefilled");
        self.form.fill(values);
        Ok(())
    }

    /// Validate and save. Toasts on success and on client failure.
    pub async fn submit(&mut self) -> SubmitOutcome<M> {
        let queries = self.queries.clone();
        let mode = self.mode.clone();

        let outcome = self
            .form
            .submit(|payload| async move {
                match mode {
                    FormMode::Create => queries.create(&payload).await,
                    FormMode::Edit(id) => queries.update(&id, &payload).await,
                }
            })
            .await;

        match &outcome {
            SubmitOutcome::Submitted(record) => {
                let title = match self.mode {
                    FormMode::Create => "Created",
                    FormMode::Edit(_) => "Changes saved",
                };
                self.toaster
                    .success(title, Some(&format!("Record {} was saved.", record.id())));
            }
            SubmitOutcome::Failed(error) => {
                self.toaster.error("Could not save", Some(&error.to_string()));
            }
            SubmitOutcome::Invalid(_) => {}
        }
        outcome
    }

    fn render_field(&self, field: &FieldSchema) -> String {
        let name = field.name();
        let value = self.form.value(name).unwrap_or("");
        let error = self.form.error(name);
        let invalid = error.is_some();

        let control = match field.kind() {
            FieldKind::Choice(options) => {
                let mut select = Select::new(name)
                    .options(options.iter().cloned())
                    .selected(Some(value))
                    .invalid(invalid);
                if let Some(placeholder) = field.placeholder_text() {
                    select = select.placeholder(placeholder);
                }
                select.render()
            }
            kind => {
                let input_type = match kind {
                    FieldKind::Email => InputType::Email,
                    FieldKind::Number { .. } => InputType::Number,
                    FieldKind::Boolean => InputType::Checkbox,
                    _ => InputType::Text,
                };
                let mut input = Input::new(name)
                    .input_type(input_type)
                    .value(value)
                    .invalid(invalid);
                if let Some(placeholder) = field.placeholder_text() {
                    input = input.placeholder(placeholder);
                }
                if invalid {
                    input = input.attrs(Attrs::new().set("aria-describedby", format!("{}-error", name)));
                }
                input.render()
            }
        };

        FormField::new(name, field.label_text(), control)
            .error(error)
            .required(field.is_required())
            .render()
    }
}

#[derive(Template)]
#[template(path = "page/form.html")]
struct FormHtml<'a> {
    fields: Vec<String>,
    submit_error: Option<&'a str>,
    submit: String,
}

impl<M: Resource, C: ResourceClient<M> + 'static> Component for FormPage<M, C> {
    fn render(&self) -> String {
        let submitting = self.form.phase() == FormPhase::Submitting;
        let label = match (&self.mode, submitting) {
            (_, true) => "Saving...",
            (FormMode::Create, false) => "Create",
            (FormMode::Edit(_), false) => "Save",
        };

        let body = render(&FormHtml {
            fields: self
                .form
                .schema()
                .fields()
                .iter()
                .map(|field| self.render_field(field))
                .collect(),
            submit_error: self.form.submit_error(),
            submit: Button::new(label)
                .attrs(Attrs::new().set("type", "submit"))
                .disabled(submitting)
                .render(),
        });

        Card::new().title(self.title.as_str()).body(body).render()
    }
}

/// Raw input text for a stored JSON value.
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
