use askama::Template;

use super::html::{render, Attrs};
use super::Component;

const BASE: &str = "inline-flex items-center justify-center gap-2 whitespace-nowrap rounded-md text-sm font-medium transition-colors focus-visible:outline-none focus-visible:ring-1 focus-visible:ring-ring disabled:pointer-events-none disabled:opacity-50";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Default,
    Destructive,
    Outline,
    Secondary,
    Ghost,
    Link,
}

impl ButtonVariant {
    pub fn classes(self) -> &'static str {
        match self {
            ButtonVariant::Default => "bg-primary text-primary-foreground shadow hover:bg-primary/90",
            ButtonVariant::Destructive => {
                "bg-destructive text-destructive-foreground shadow-sm hover:bg-destructive/90"
            }
            ButtonVariant::Outline => {
                "border border-input bg-background shadow-sm hover:bg-accent hover:text-accent-foreground"
            }
            ButtonVariant::Secondary => {
                "bg-secondary text-secondary-foreground shadow-sm hover:bg-secondary/80"
            }
            ButtonVariant::Ghost => "hover:bg-accent hover:text-accent-foreground",
            ButtonVariant::Link => "text-primary underline-offset-4 hover:underline",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonSize {
    #[default]
    Default,
    Sm,
    Lg,
    Icon,
}

impl ButtonSize {
    pub fn classes(self) -> &'static str {
        match self {
            ButtonSize::Default => "h-9 px-4 py-2",
            ButtonSize::Sm => "h-8 rounded-md px-3 text-xs",
            ButtonSize::Lg => "h-10 rounded-md px-8",
            ButtonSize::Icon => "h-9 w-9",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Button {
    label: String,
    variant: ButtonVariant,
    size: ButtonSize,
    attrs: Attrs,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Button {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn size(mut self, size: ButtonSize) -> Self {
        self.size = size;
        self
    }

    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        if disabled {
            self.attrs = self.attrs.flag("disabled");
        }
        self
    }
}

#[derive(Template)]
#[template(path = "ui/button.html")]
struct ButtonHtml<'a> {
    classes: Vec<&'a str>,
    default_type: bool,
    attrs: Vec<(&'a str, Option<&'a str>)>,
    label: &'a str,
}

impl Component for Button {
    fn render(&self) -> String {
        render(&ButtonHtml {
            classes: self
                .attrs
                .classes(&[BASE, self.variant.classes(), self.size.classes()]),
            default_type: !self.attrs.has("type"),
            attrs: self.attrs.extra(),
            label: &self.label,
        })
    }
}
