//! Document store abstraction.
//!
//! The calendar only needs four things from its backing database: a live
//! ordered query over a collection, and add / merge-update / delete of single
//! documents. Any store that can do that can back famcal.

mod memory;

pub use memory::MemoryStore;

use std::future::Future;
use tokio::sync::mpsc;

use crate::error::FamCalResult;
use crate::wire::Fields;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// All documents of a collection, optionally ordered by one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub collection: String,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn collection(name: &str) -> Self {
        Query {
            collection: name.to_string(),
            order_by: None,
        }
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub id: String,
    pub fields: Fields,
}

/// Every document matching a query at one point in time, in query order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub docs: Vec<DocumentSnapshot>,
}

/// Snapshots pushed by a live query, in the order the store commits them.
///
/// An `Err` item is terminal: nothing follows it.
pub struct SnapshotStream {
    rx: mpsc::UnboundedReceiver<FamCalResult<Snapshot>>,
}

impl SnapshotStream {
    pub fn new(rx: mpsc::UnboundedReceiver<FamCalResult<Snapshot>>) -> Self {
        SnapshotStream { rx }
    }

    pub async fn next(&mut self) -> Option<FamCalResult<Snapshot>> {
        self.rx.recv().await
    }
}

pub trait DocumentStore: Send + Sync + 'static {
    /// Start a live query. The first snapshot is the current state.
    fn listen(&self, query: Query) -> impl Future<Output = FamCalResult<SnapshotStream>> + Send;

    /// Insert a new document and return its store-assigned id.
    fn add(
        &self,
        collection: &str,
        fields: Fields,
    ) -> impl Future<Output = FamCalResult<String>> + Send;

    /// Merge `fields` into an existing document. Fails with `NotFound` if the
    /// document does not exist.
    fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> impl Future<Output = FamCalResult<()>> + Send;

    /// Remove a document. Removing a missing document is not an error.
    fn delete(&self, collection: &str, id: &str) -> impl Future<Output = FamCalResult<()>> + Send;
}
