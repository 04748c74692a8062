use askama::Template;

use super::html::{render, Attrs};
use super::Component;

#[derive(Debug, Clone, Default)]
pub struct Card {
    title: Option<String>,
    description: Option<String>,
    body: String,
    footer: String,
    attrs: Attrs,
}

impl Card {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn body(mut self, body: impl Component) -> Self {
        self.body = body.render();
        self
    }

    pub fn footer(mut self, footer: impl Component) -> Self {
        self.footer = footer.render();
        self
    }

    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }
}

#[derive(Template)]
#[template(path = "ui/card.html")]
struct CardHtml<'a> {
    classes: Vec<&'a str>,
    attrs: Vec<(&'a str, Option<&'a str>)>,
    title: Option<&'a str>,
    description: Option<&'a str>,
    body: &'a str,
    footer: &'a str,
}

impl Component for Card {
    fn render(&self) -> String {
        render(&CardHtml {
            classes: self
                .attrs
                .classes(&["rounded-xl border bg-card text-card-foreground shadow"]),
            attrs: self.attrs.extra(),
            title: self.title.as_deref(),
            description: self.description.as_deref(),
            body: &self.body,
            footer: &self.footer,
        })
    }
}
