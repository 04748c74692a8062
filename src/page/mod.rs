//! Pages - interaction state for a resource's list and form screens.
//!
//! Pages own no data. They read through [`ResourceQueries`](crate::ResourceQueries),
//! report outcomes through a [`Toaster`](crate::Toaster) and render with the
//! components in [`ui`](crate::ui).

mod form_page;
mod list;

pub use form_page::{FormMode, FormPage};
pub use list::{Column, DeleteFlow, ListPage};
