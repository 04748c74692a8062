//! Presentational components rendered to HTML strings through askama
//! templates under `templates/ui/`.
//!
//! Each component takes a variant from a closed enum and maps it to utility
//! classes with an exhaustive `match`, so adding a variant without styling it
//! does not compile. Extra attributes pass through via [`Attrs`]. Components
//! hold no business logic; open/closed state belongs to the caller.

mod badge;
mod button;
mod card;
pub mod html;
mod input;
mod modal;
mod select;
mod toast;

pub use badge::{Badge, BadgeVariant};
pub use button::{Button, ButtonSize, ButtonVariant};
pub use card::Card;
pub use html::Attrs;
pub use input::{FormField, Input, InputType};
pub use modal::Modal;
pub use select::Select;
pub use toast::{ToastVariant, ToastView};

/// Something that renders to an HTML fragment.
pub trait Component {
    fn render(&self) -> String;
}

impl<C: Component + ?Sized> Component for &C {
    fn render(&self) -> String {
        (**self).render()
    }
}

impl Component for str {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl Component for String {
    fn render(&self) -> String {
        self.clone()
    }
}

impl<C: Component> Component for Vec<C> {
    fn render(&self) -> String {
        self.iter().map(Component::render).collect()
    }
}
