use askama::Template;

use super::html::render;
use super::Component;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BadgeVariant {
    #[default]
    Default,
    Secondary,
    Destructive,
    Outline,
}

impl BadgeVariant {
    pub fn classes(self) -> &'static str {
        match self {
            BadgeVariant::Default => "border-transparent bg-primary text-primary-foreground shadow",
            BadgeVariant::Secondary => "border-transparent bg-secondary text-secondary-foreground",
            BadgeVariant::Destructive => {
                "border-transparent bg-destructive text-destructive-foreground shadow"
            }
            BadgeVariant::Outline => "text-foreground",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Badge {
    text: String,
    variant: BadgeVariant,
}

impl Badge {
    pub fn new(text: impl Into<String>) -> Self {
        Badge {
            text: text.into(),
            variant: BadgeVariant::default(),
        }
    }

    pub fn variant(mut self, variant: BadgeVariant) -> Self {
        self.variant = variant;
        self
    }
}

#[derive(Template)]
#[template(path = "ui/badge.html")]
struct BadgeHtml<'a> {
    classes: [&'a str; 2],
    text: &'a str,
}

impl Component for Badge {
    fn render(&self) -> String {
        render(&BadgeHtml {
            classes: [
                "inline-flex items-center rounded-md border px-2.5 py-0.5 text-xs font-semibold",
                self.variant.classes(),
            ],
            text: &self.text,
        })
    }
}
