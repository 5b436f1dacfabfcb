use chrono_tz::Tz;
use famcal_core::{EventsRemote, LiveEvents, MemoryStore};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub remote: EventsRemote<MemoryStore>,
    /// One live view shared by every request; it lives as long as the server
    pub live: Arc<LiveEvents>,
    pub tz: Tz,
}

impl AppState {
    /// Must be called from within the tokio runtime.
    pub fn new(store: MemoryStore, tz: Tz) -> Self {
        let remote = EventsRemote::new(store);
        let live = Arc::new(LiveEvents::activate(&remote));
        AppState { remote, live, tz }
    }
}
