//! Shared plumbing for the component templates.

use askama::Template;
use tracing::warn;

/// Render a template, falling back to an inline error fragment.
pub(crate) fn render<T: Template>(tmpl: &T) -> String {
    tmpl.render().unwrap_or_else(|e| {
        warn!(error = %e, "template render failed");
        format!("<pre>Template error: {e}</pre>")
    })
}

/// Extra attributes passed through to the rendered element, in insertion order.
///
/// A `class` attribute is appended to the component's own classes instead of
/// replacing them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    pairs: Vec<(String, Option<String>)>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// `name="value"`. Setting a name twice keeps the last value.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name.into(), Some(value.into()));
        self
    }

    /// Boolean attribute such as `disabled`.
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.insert(name.into(), None);
        self
    }

    fn insert(&mut self, name: String, value: Option<String>) {
        match self.pairs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.pairs.iter().any(|(n, _)| n == name)
    }

    /// Classes to append to the component's own, if any.
    pub fn class(&self) -> Option<&str> {
        self.get("class").map(str::trim).filter(|c| !c.is_empty())
    }

    /// Every attribute except `class`, for the `_attrs.html` include.
    pub fn extra(&self) -> Vec<(&str, Option<&str>)> {
        self.pairs
            .iter()
            .filter(|(name, _)| name != "class")
            .map(|(name, value)| (name.as_str(), value.as_deref()))
            .collect()
    }

    /// `own` classes followed by the caller's `class` attribute.
    pub(crate) fn classes<'a>(&'a self, own: &[&'a str]) -> Vec<&'a str> {
        own.iter()
            .copied()
            .filter(|c| !c.is_empty())
            .chain(self.class())
            .collect()
    }
}
