//! Widget integration tests: mock client, query cache, forms and pages.

mod support;

mod client;
mod forms;
mod pages;
mod query;
