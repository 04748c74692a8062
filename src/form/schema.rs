use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Number, Value};

use super::{FieldErrors, FormValues};

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// What kind of value a field holds and how raw input is parsed.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    Email,
    /// Parsed as a number; `integer` rejects fractions.
    Number { integer: bool },
    /// Checkbox: "true"/"on"/"1"/"yes" or "false"/"off"/"0"/"no"; missing means false.
    Boolean,
    /// One of a closed set of `(value, label)` options.
    Choice(Vec<(String, String)>),
}

/// One field of a form: its kind and constraints.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    name: String,
    label: String,
    kind: FieldKind,
    required: bool,
    min_len: Option<usize>,
    max_len: Option<usize>,
    min: Option<f64>,
    max: Option<f64>,
    pattern: Option<(Regex, String)>,
    placeholder: Option<String>,
}

impl FieldSchema {
    fn new(name: &str, kind: FieldKind) -> Self {
        let required = !matches!(kind, FieldKind::Boolean);
        FieldSchema {
            name: name.to_string(),
            label: default_label(name),
            kind,
            required,
            min_len: None,
            max_len: None,
            min: None,
            max: None,
            pattern: None,
            placeholder: None,
        }
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn email(name: &str) -> Self {
        Self::new(name, FieldKind::Email)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, FieldKind::Number { integer: false })
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, FieldKind::Number { integer: true })
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn choice<V, L>(name: &str, options: impl IntoIterator<Item = (V, L)>) -> Self
    where
        V: Into<String>,
        L: Into<String>,
    {
        let options = options
            .into_iter()
            .map(|(value, label)| (value.into(), label.into()))
            .collect();
        Self::new(name, FieldKind::Choice(options))
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Require text input to match `pattern`, reporting `message` otherwise.
    pub fn pattern(mut self, pattern: Regex, message: impl Into<String>) -> Self {
        self.pattern = Some((pattern, message.into()));
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label_text(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn placeholder_text(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Parse and check one raw value. `None` input means the field was absent.
    pub fn validate(&self, raw: Option<&str>) -> Result<Value, String> {
        let raw = raw.map(str::trim).unwrap_or("");

        if let FieldKind::Boolean = self.kind {
            return parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| format!("{} must be true or false", self.label));
        }

        if raw.is_empty() {
            return if self.required {
                Err(format!("{} is required", self.label))
            } else {
                Ok(Value::Null)
            };
        }

        match &self.kind {
            FieldKind::Text | FieldKind::Email => self.check_text(raw),
            FieldKind::Number { integer } => self.check_number(raw, *integer),
            FieldKind::Choice(options) => {
                if options.iter().any(|(value, _)| value == raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    let allowed: Vec<&str> = options.iter().map(|(v, _)| v.as_str()).collect();
                    Err(format!("{} must be one of: {}", self.label, allowed.join(", ")))
                }
            }
            FieldKind::Boolean => unreachable!("handled above"),
        }
    }

    fn check_text(&self, raw: &str) -> Result<Value, String> {
        let length = raw.chars().count();
        if let Some(min) = self.min_len {
            if length < min {
                return Err(format!("{} must be at least {} characters", self.label, min));
            }
        }
        if let Some(max) = self.max_len {
            if length > max {
                return Err(format!("{} must be at most {} characters", self.label, max));
            }
        }
        if matches!(self.kind, FieldKind::Email) && !email_pattern().is_match(raw) {
            return Err(format!("{} must be a valid email address", self.label));
        }
        if let Some((pattern, message)) = &self.pattern {
            if !pattern.is_match(raw) {
                return Err(message.clone());
            }
        }
        Ok(Value::String(raw.to_string()))
    }

    fn check_number(&self, raw: &str, integer: bool) -> Result<Value, String> {
        let number: f64 = raw
            .parse()
            .ok()
            .filter(|n: &f64| n.is_finite())
            .ok_or_else(|| format!("{} must be a number", self.label))?;

        if integer && number.fract() != 0.0 {
            return Err(format!("{} must be a whole number", self.label));
        }
        if let Some(min) = self.min {
            if number < min {
                return Err(format!("{} must be at least {}", self.label, min));
            }
        }
        if let Some(max) = self.max {
            if number > max {
                return Err(format!("{} must be at most {}", self.label, max));
            }
        }

        if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
            Ok(Value::from(number as i64))
        } else {
            Number::from_f64(number)
                .map(Value::Number)
                .ok_or_else(|| format!("{} must be a number", self.label))
        }
    }
}

/// Ordered set of fields making up a form.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    fields: Vec<FieldSchema>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate every field, returning the typed payload or every field error.
    ///
    /// Values for names outside the schema are ignored.
    pub fn validate(&self, values: &FormValues) -> Result<Map<String, Value>, FieldErrors> {
        let mut payload = Map::new();
        let mut errors = FieldErrors::new();

        for field in &self.fields {
            match field.validate(values.get(&field.name)) {
                Ok(value) => {
                    payload.insert(field.name.clone(), value);
                }
                Err(message) => errors.insert(field.name.clone(), message),
            }
        }

        if errors.is_empty() {
            Ok(payload)
        } else {
            Err(errors)
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "" | "false" | "off" | "0" | "no" => Some(false),
        "true" | "on" | "1" | "yes" => Some(true),
        _ => None,
    }
}

/// "created_at" / "createdAt" -> "Created at"
fn default_label(name: &str) -> String {
    let mut words = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch == '_' || ch == '-' {
            words.push(' ');
        } else if ch.is_uppercase() && i > 0 {
            words.push(' ');
            words.extend(ch.to_lowercase());
        } else if i == 0 {
            words.extend(ch.to_uppercase());
        } else {
            words.push(ch);
        }
    }
    words
}
