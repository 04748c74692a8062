//! In-memory resource collections.
//!
//! A [`Collection`] is the ordered sequence of records of one type. It is the
//! only place records live; clients own a handle to it and mutate it through
//! single synchronous steps.

mod collection;
mod id;

pub use collection::Collection;
pub use id::IdStrategy;
