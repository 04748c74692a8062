use std::fmt;

use askama::Template;
use tracing::{debug, warn};

use crate::client::ResourceClient;
use crate::error::ResourceError;
use crate::notify::Toaster;
use crate::query::{QueryObserver, QueryResult, ResourceQueries};
use crate::resource::Resource;
use crate::ui::html::render;
use crate::ui::{Attrs, Button, ButtonSize, ButtonVariant, Card, Component, Modal};

/// Delete confirmation flow of a list page.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteFlow<M> {
    Idle,
    Confirming(M),
    Deleting(M),
}

impl<M> DeleteFlow<M> {
    pub fn is_idle(&self) -> bool {
        matches!(self, DeleteFlow::Idle)
    }

    /// The record being confirmed or deleted.
    pub fn target(&self) -> Option<&M> {
        match self {
            DeleteFlow::Idle => None,
            DeleteFlow::Confirming(record) | DeleteFlow::Deleting(record) => Some(record),
        }
    }
}

/// Holds the flow in `Deleting` and puts it back to `Idle` when dropped, so a
/// cancelled deletion never leaves the page stuck.
struct Deleting<'a, M> {
    flow: &'a mut DeleteFlow<M>,
}

impl<'a, M> Deleting<'a, M> {
    fn start(flow: &'a mut DeleteFlow<M>, record: M) -> Self {
        *flow = DeleteFlow::Deleting(record);
        Deleting { flow }
    }
}

impl<M> Drop for Deleting<'_, M> {
    fn drop(&mut self) {
        *self.flow = DeleteFlow::Idle;
    }
}

type Cell<M> = Box<dyn Fn(&M) -> String + Send + Sync>;

/// One table column: a header and how to print a record's cell.
pub struct Column<M> {
    header: String,
    cell: Cell<M>,
}

impl<M> Column<M> {
    pub fn new<F>(header: impl Into<String>, cell: F) -> Self
    where
        F: Fn(&M) -> String + Send + Sync + 'static,
    {
        Column {
            header: header.into(),
            cell: Box::new(cell),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }
}

impl<M> fmt::Debug for Column<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column").field("header", &self.header).finish()
    }
}

/// Table of a collection with a confirm-then-delete action per row.
///
/// Keeps the list key observed for as long as the page exists.
pub struct ListPage<M, C> {
    title: String,
    queries: ResourceQueries<M, C>,
    toaster: Toaster,
    columns: Vec<Column<M>>,
    flow: DeleteFlow<M>,
    _observer: QueryObserver,
}

impl<M: Resource, C: ResourceClient<M> + 'static> ListPage<M, C> {
    pub fn new(title: impl Into<String>, queries: ResourceQueries<M, C>, toaster: Toaster) -> Self {
        let observer = queries.observe_list();
        ListPage {
            title: title.into(),
            queries,
            toaster,
            columns: Vec::new(),
            flow: DeleteFlow::Idle,
            _observer: observer,
        }
    }

    pub fn column<F>(mut self, header: impl Into<String>, cell: F) -> Self
    where
        F: Fn(&M) -> String + Send + Sync + 'static,
    {
        self.columns.push(Column::new(header, cell));
        self
    }

    pub fn flow(&self) -> &DeleteFlow<M> {
        &self.flow
    }

    /// Read the list through the cache.
    pub async fn load(&self) -> QueryResult<Vec<M>> {
        self.queries.list().await
    }

    /// Current cached list state.
    pub fn state(&self) -> QueryResult<Vec<M>> {
        self.queries.peek_list()
    }

    /// Ask to delete a listed record. Only honored while idle.
    pub fn request_delete(&mut self, id: &str) -> bool {
        if !self.flow.is_idle() {
            debug!(%id, "delete requested while another is pending");
            return false;
        }
        let record = self
            .state()
            .data
            .and_then(|records| records.into_iter().find(|r| r.id() == id));
        match record {
            Some(record) => {
                self.flow = DeleteFlow::Confirming(record);
                true
            }
            None => false,
        }
    }

    /// Back out of a pending confirmation.
    pub fn cancel_delete(&mut self) -> bool {
        if let DeleteFlow::Confirming(_) = self.flow {
            self.flow = DeleteFlow::Idle;
            true
        } else {
            false
        }
    }

    /// Delete the confirmed record, toast the outcome and refresh the list.
    ///
    /// Returns `None` unless a deletion was being confirmed.
    pub async fn confirm_delete(&mut self) -> Option<Result<(), ResourceError>> {
        let record = match std::mem::replace(&mut self.flow, DeleteFlow::Idle) {
            DeleteFlow::Confirming(record) => record,
            other => {
                self.flow = other;
                return None;
            }
        };

        let id = record.id().to_string();
        let result = {
            let _deleting = Deleting::start(&mut self.flow, record);
            self.queries.delete(&id).await
        };

        match &result {
            Ok(()) => {
                self.toaster.success("Deleted", Some(&format!("Record {} was deleted.", id)));
                self.load().await;
            }
            Err(error) => {
                warn!(%id, %error, "delete failed");
                self.toaster.error("Delete failed", Some(&error.to_string()));
            }
        }
        Some(result)
    }

    fn render_modal(&self) -> Modal {
        let (open, busy) = match &self.flow {
            DeleteFlow::Idle => (false, false),
            DeleteFlow::Confirming(_) => (true, false),
            DeleteFlow::Deleting(_) => (true, true),
        };
        let id = self.flow.target().map(|r| r.id().to_string()).unwrap_or_default();
        Modal::new("Are you sure?")
            .open(open)
            .description(format!("This will permanently delete record {}.", id))
            .action(
                Button::new("Cancel")
                    .variant(ButtonVariant::Outline)
                    .attrs(Attrs::new().set("data-action", "cancel-delete"))
                    .disabled(busy),
            )
            .action(
                Button::new(if busy { "Deleting..." } else { "Delete" })
                    .variant(ButtonVariant::Destructive)
                    .attrs(Attrs::new().set("data-action", "confirm-delete"))
                    .disabled(busy),
            )
    }
}

struct RowHtml {
    cells: Vec<String>,
    action: String,
}

#[derive(Template)]
#[template(path = "page/list.html")]
struct ListHtml<'a> {
    error: Option<String>,
    headers: Vec<&'a str>,
    rows: Option<Vec<RowHtml>>,
    loading: bool,
}

impl<M: Resource, C: ResourceClient<M> + 'static> Component for ListPage<M, C> {
    fn render(&self) -> String {
        let state = self.state();
        let rows = state.data.as_ref().map(|records| {
            records
                .iter()
                .map(|record| RowHtml {
                    cells: self.columns.iter().map(|c| (c.cell)(record)).collect(),
                    action: Button::new("Delete")
                        .variant(ButtonVariant::Ghost)
                        .size(ButtonSize::Sm)
                        .attrs(Attrs::new().set("data-action", "delete").set("data-id", record.id()))
                        .disabled(!self.flow.is_idle())
                        .render(),
                })
                .collect()
        });

        let body = render(&ListHtml {
            error: state.error.as_ref().map(ToString::to_string),
            headers: self.columns.iter().map(Column::header).collect(),
            loading: rows.is_none() && state.error.is_none(),
            rows,
        });

        let card = Card::new().title(self.title.as_str()).body(body);
        format!("{}{}", card.render(), self.render_modal().render())
    }
}
