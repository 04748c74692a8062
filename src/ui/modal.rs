use askama::Template;

use super::html::render;
use super::{Button, Component};

/// Dialog with a title, optional description and body, and footer buttons.
///
/// Renders nothing while closed.
#[derive(Debug, Clone, Default)]
pub struct Modal {
    open: bool,
    title: String,
    description: Option<String>,
    body: String,
    footer: Vec<Button>,
}

impl Modal {
    pub fn new(title: impl Into<String>) -> Self {
        Modal {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Already-rendered body HTML.
    pub fn body(mut self, body: impl Component) -> Self {
        self.body = body.render();
        self
    }

    pub fn action(mut self, button: Button) -> Self {
        self.footer.push(button);
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

#[derive(Template)]
#[template(path = "ui/modal.html")]
struct ModalHtml<'a> {
    title: &'a str,
    description: Option<&'a str>,
    body: &'a str,
    footer: String,
}

impl Component for Modal {
    fn render(&self) -> String {
        if !self.open {
            return String::new();
        }
        render(&ModalHtml {
            title: &self.title,
            description: self.description.as_deref(),
            body: &self.body,
            footer: self.footer.render(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ButtonVariant;

    #[test]
    fn closed_modal_renders_nothing() {
        assert_eq!(Modal::new("Delete?").render(), "");
    }

    #[test]
    fn open_modal_renders_title_and_actions() {
        let html = Modal::new("Delete widget?")
            .open(true)
            .description("This cannot be undone.")
            .action(Button::new("Cancel").variant(ButtonVariant::Outline))
            .action(Button::new("Delete").variant(ButtonVariant::Destructive))
            .render();
        assert!(html.contains("role=\"dialog\""));
        assert!(html.contains("Delete widget?"));
        assert!(html.contains("This cannot be undone."));
        assert!(html.find(">Cancel<").unwrap() < html.find(">Delete<").unwrap());
    }
}
