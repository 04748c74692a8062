use askama::Template;

use super::html::{render, Attrs};
use super::Component;

const BASE: &str = "flex h-9 w-full rounded-md border border-input bg-transparent px-3 py-1 text-base shadow-sm transition-colors placeholder:text-muted-foreground focus-visible:outline-none focus-visible:ring-1 focus-visible:ring-ring disabled:cursor-not-allowed disabled:opacity-50 md:text-sm";
const INVALID: &str = "border-destructive focus-visible:ring-destructive";
const CHECKBOX: &str = "h-4 w-4 shrink-0 rounded-sm border border-primary shadow focus-visible:outline-none focus-visible:ring-1 focus-visible:ring-ring";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputType {
    #[default]
    Text,
    Email,
    Number,
    Password,
    Checkbox,
}

impl InputType {
    pub fn as_str(self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Email => "email",
            InputType::Number => "number",
            InputType::Password => "password",
            InputType::Checkbox => "checkbox",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Input {
    name: String,
    input_type: InputType,
    value: String,
    placeholder: Option<String>,
    invalid: bool,
    attrs: Attrs,
}

impl Input {
    pub fn new(name: impl Into<String>) -> Self {
        Input {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Style as invalid and set `aria-invalid`.
    pub fn invalid(mut self, invalid: bool) -> Self {
        self.invalid = invalid;
        self
    }

    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }
}

#[derive(Template)]
#[template(path = "ui/input.html")]
struct InputHtml<'a> {
    input_type: &'static str,
    name: &'a str,
    classes: Vec<&'a str>,
    checkbox: bool,
    checked: bool,
    value: &'a str,
    placeholder: Option<&'a str>,
    invalid: bool,
    attrs: Vec<(&'a str, Option<&'a str>)>,
}

impl Component for Input {
    fn render(&self) -> String {
        let checkbox = self.input_type == InputType::Checkbox;
        let own = if checkbox { CHECKBOX } else { BASE };
        let invalid = if self.invalid { INVALID } else { "" };
        render(&InputHtml {
            input_type: self.input_type.as_str(),
            name: &self.name,
            classes: self.attrs.classes(&[own, invalid]),
            checkbox,
            checked: is_checked(&self.value),
            value: &self.value,
            placeholder: self.placeholder.as_deref(),
            invalid: self.invalid,
            attrs: self.attrs.extra(),
        })
    }
}

fn is_checked(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "on" | "1" | "yes")
}

/// A labelled control with an optional error message below it.
#[derive(Debug, Clone)]
pub struct FormField {
    name: String,
    label: String,
    control: String,
    error: Option<String>,
    required: bool,
}

impl FormField {
    /// `control` is already-rendered HTML (an input or select).
    pub fn new(name: impl Into<String>, label: impl Into<String>, control: impl Component) -> Self {
        FormField {
            name: name.into(),
            label: label.into(),
            control: control.render(),
            error: None,
            required: false,
        }
    }

    pub fn error(mut self, error: Option<&str>) -> Self {
        self.error = error.map(String::from);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

#[derive(Template)]
#[template(path = "ui/form_field.html")]
struct FormFieldHtml<'a> {
    name: &'a str,
    label: &'a str,
    label_class: &'static str,
    required: bool,
    control: &'a str,
    error: Option<&'a str>,
}

impl Component for FormField {
    fn render(&self) -> String {
        let label_class = if self.error.is_some() {
            "text-sm font-medium leading-none text-destructive"
        } else {
            "text-sm font-medium leading-none"
        };
        render(&FormFieldHtml {
            name: &self.name,
            label: &self.label,
            label_class,
            required: self.required,
            control: &self.control,
            error: self.error.as_deref(),
        })
    }
}
