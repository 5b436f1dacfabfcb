//! Live event list for a view.
//!
//! `LiveEvents` turns the push-based subscription into something a view can
//! read at any time: the latest list plus a loading flag. It owns exactly one
//! subscription for as long as it is alive.
//!
//! If the subscription fails, the last list delivered is kept and marked
//! stale rather than cleared, so a view can keep showing it with a warning.

use std::sync::Arc;
use tokio::sync::watch;

use crate::event::CalendarEvent;
use crate::remote::{EventsRemote, Subscription};
use crate::store::DocumentStore;

/// What a view renders from.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EventsSnapshot {
    pub events: Arc<Vec<CalendarEvent>>,
    pub loading: bool,
    /// Set once the subscription has failed; `events` is the last good list.
    pub stale: bool,
}

impl Default for EventsSnapshot {
    fn default() -> Self {
        EventsSnapshot {
            events: Arc::new(Vec::new()),
            loading: true,
            stale: false,
        }
    }
}

pub struct LiveEvents {
    state: watch::Receiver<EventsSnapshot>,
    subscription: Option<Subscription>,
}

impl LiveEvents {
    /// Open the subscription. Starts out loading with an empty list.
    ///
    /// Must be called from within a tokio runtime.
    pub fn activate<S: DocumentStore>(remote: &EventsRemote<S>) -> Self {
        let (tx, rx) = watch::channel(EventsSnapshot::default());
        let tx = Arc::new(tx);
        let on_error_tx = Arc::clone(&tx);

        let subscription = remote.subscribe_events_or_else(
            move |events| {
                tx.send_replace(EventsSnapshot {
                    events: Arc::new(events),
                    loading: false,
                    stale: false,
                });
            },
            move |_| {
                on_error_tx.send_modify(|state| {
                    state.loading = false;
                    state.stale = true;
                });
            },
        );

        LiveEvents {
            state: rx,
            subscription: Some(subscription),
        }
    }

    pub fn snapshot(&self) -> EventsSnapshot {
        self.state.borrow().clone()
    }

    pub fn events(&self) -> Arc<Vec<CalendarEvent>> {
        Arc::clone(&self.state.borrow().events)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_stale(&self) -> bool {
        self.state.borrow().stale
    }

    /// A receiver that is notified every time the list or flags change.
    pub fn watch(&self) -> watch::Receiver<EventsSnapshot> {
        self.state.clone()
    }

    /// Wait for the next change and return the new state.
    ///
    /// Returns `None` once the view has been deactivated or the subscription
    /// can produce no further updates.
    pub async fn changed(&mut self) -> Option<EventsSnapshot> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Detach the subscription. Also happens on drop.
    pub fn deactivate(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl Drop for LiveEvents {
    fn drop(&mut self) {
        self.detach();
    }
}
