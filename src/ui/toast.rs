use askama::Template;

use super::html::render;
use super::Component;
use crate::notify::Toast;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
    Success,
}

impl ToastVariant {
    pub fn classes(self) -> &'static str {
        match self {
            ToastVariant::Default => "border bg-background text-foreground",
            ToastVariant::Destructive => {
                "destructive group border-destructive bg-destructive text-destructive-foreground"
            }
            ToastVariant::Success => "border-green-600 bg-green-50 text-green-900",
        }
    }
}

/// Viewport listing the given toasts, newest last.
#[derive(Debug, Clone, Default)]
pub struct ToastView {
    toasts: Vec<Toast>,
}

impl ToastView {
    pub fn new(toasts: Vec<Toast>) -> Self {
        ToastView { toasts }
    }
}

struct ToastHtml<'a> {
    id: u64,
    title: &'a str,
    description: Option<&'a str>,
    classes: &'static str,
}

#[derive(Template)]
#[template(path = "ui/toasts.html")]
struct ToastsHtml<'a> {
    toasts: Vec<ToastHtml<'a>>,
}

impl Component for ToastView {
    fn render(&self) -> String {
        let toasts = self
            .toasts
            .iter()
            .map(|toast| ToastHtml {
                id: toast.id,
                title: &toast.title,
                description: toast.description.as_deref(),
                classes: toast.variant.classes(),
            })
            .collect();
        render(&ToastsHtml { toasts })
    }
}
