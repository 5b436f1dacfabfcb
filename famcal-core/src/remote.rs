//! Event operations against the document store.
//!
//! `EventsRemote` is the only place that issues reads and writes for the
//! "events" collection. Write errors are returned to the caller untouched;
//! there is no retry.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::error::{FamCalError, FamCalResult};
use crate::event::{CalendarEvent, EventPatch, NewEvent};
use crate::store::{Direction, DocumentStore, Query, Snapshot};
use crate::wire::{self, EVENTS_COLLECTION, START_DATE};

pub struct EventsRemote<S> {
    store: Arc<S>,
}

impl<S> Clone for EventsRemote<S> {
    fn clone(&self) -> Self {
        EventsRemote {
            store: Arc::clone(&self.store),
        }
    }
}

/// Handle to a live event subscription.
///
/// Dropping the handle does not stop the subscription; call
/// [`Subscription::unsubscribe`].
#[must_use = "the subscription keeps running until unsubscribe() is called"]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    /// Permanently detach the listener.
    pub fn unsubscribe(self) {
        self.task.abort();
    }

    /// True once the store ended the subscription or it was detached.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<S: DocumentStore> EventsRemote<S> {
    pub fn new(store: S) -> Self {
        EventsRemote {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Watch all events, ordered by start date.
    ///
    /// `on_change` receives the complete list for the initial load and after
    /// every change by any client. Must be called from within a tokio runtime.
    pub fn subscribe_events<F>(&self, on_change: F) -> Subscription
    where
        F: FnMut(Vec<CalendarEvent>) + Send + 'static,
    {
        self.subscribe_events_or_else(on_change, |_| {})
    }

    /// Like [`subscribe_events`](Self::subscribe_events), also reporting the
    /// error that ended the subscription. No updates follow an error.
    pub fn subscribe_events_or_else<F, E>(&self, mut on_change: F, on_error: E) -> Subscription
    where
        F: FnMut(Vec<CalendarEvent>) + Send + 'static,
        E: FnOnce(FamCalError) + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let query =
            Query::collection(EVENTS_COLLECTION).order_by(START_DATE, Direction::Ascending);

        let task = tokio::spawn(async move {
            let mut stream = match store.listen(query).await {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::error!("Error subscribing to events: {}", e);
                    on_error(e);
                    return;
                }
            };

            while let Some(next) = stream.next().await {
                match next {
                    Ok(snapshot) => on_change(decode_snapshot(&snapshot)),
                    Err(e) => {
                        tracing::error!("Error fetching events: {}", e);
                        on_error(e);
                        return;
                    }
                }
            }

            tracing::debug!("Event stream closed by store");
        });

        Subscription { task }
    }

    /// Persist a new event and return its id. `created_at` is stamped by the store.
    pub async fn create_event(&self, event: &NewEvent) -> FamCalResult<String> {
        let id = self
            .store
            .add(EVENTS_COLLECTION, wire::encode_new(event))
            .await?;
        tracing::info!(id = %id, title = %event.title, "Created event");
        Ok(id)
    }

    /// Merge `patch` into the event `id`. Fails if the event does not exist.
    pub async fn update_event(&self, id: &str, patch: &EventPatch) -> FamCalResult<()> {
        self.store
            .update(EVENTS_COLLECTION, id, wire::encode_patch(patch))
            .await?;
        tracing::info!(id, "Updated event");
        Ok(())
    }

    pub async fn delete_event(&self, id: &str) -> FamCalResult<()> {
        self.store.delete(EVENTS_COLLECTION, id).await?;
        tracing::info!(id, "Deleted event");
        Ok(())
    }
}

fn decode_snapshot(snapshot: &Snapshot) -> Vec<CalendarEvent> {
    snapshot
        .docs
        .iter()
        .map(|doc| wire::decode(&doc.id, &doc.fields))
        .collect()
}
