use askama::Template;

use super::html::{render, Attrs};
use super::Component;

const BASE: &str = "flex h-9 w-full items-center justify-between rounded-md border border-input bg-transparent px-3 py-2 text-sm shadow-sm focus:outline-none focus:ring-1 focus:ring-ring disabled:cursor-not-allowed disabled:opacity-50";

/// Native select over `(value, label)` options.
#[derive(Debug, Clone, Default)]
pub struct Select {
    name: String,
    options: Vec<(String, String)>,
    selected: Option<String>,
    placeholder: Option<String>,
    invalid: bool,
    attrs: Attrs,
}

impl Select {
    pub fn new(name: impl Into<String>) -> Self {
        Select {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn options<V, L>(mut self, options: impl IntoIterator<Item = (V, L)>) -> Self
    where
        V: Into<String>,
        L: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(v, l)| (v.into(), l.into()))
            .collect();
        self
    }

    pub fn selected(mut self, value: Option<&str>) -> Self {
        self.selected = value.filter(|v| !v.is_empty()).map(String::from);
        self
    }

    /// Disabled first option shown while nothing is selected.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn invalid(mut self, invalid: bool) -> Self {
        self.invalid = invalid;
        self
    }

    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }
}

struct OptionHtml<'a> {
    value: &'a str,
    label: &'a str,
    selected: bool,
}

#[derive(Template)]
#[template(path = "ui/select.html")]
struct SelectHtml<'a> {
    name: &'a str,
    classes: Vec<&'a str>,
    invalid: bool,
    attrs: Vec<(&'a str, Option<&'a str>)>,
    placeholder: Option<&'a str>,
    nothing_selected: bool,
    options: Vec<OptionHtml<'a>>,
}

impl Component for Select {
    fn render(&self) -> String {
        let invalid = if self.invalid { "border-destructive" } else { "" };
        let options = self
            .options
            .iter()
            .map(|(value, label)| OptionHtml {
                value,
                label,
                selected: self.selected.as_deref() == Some(value.as_str()),
            })
            .collect();

        render(&SelectHtml {
            name: &self.name,
            classes: self.attrs.classes(&[BASE, invalid]),
            invalid: self.invalid,
            attrs: self.attrs.extra(),
            placeholder: self.placeholder.as_deref(),
            nothing_selected: self.selected.is_none(),
            options,
        })
    }
}
