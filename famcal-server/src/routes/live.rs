//! Live event stream over a WebSocket.
//!
//! Every snapshot the server's live view receives is pushed to the client as
//! one JSON text message, starting with the current state. Messages from the
//! client are ignored; a close frame ends the stream.

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use famcal_core::EventsSnapshot;
use tokio::sync::watch;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/events/live", get(live_events))
}

/// GET /events/live - Upgrade to a WebSocket streaming snapshots
async fn live_events(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let updates = state.live.watch();
    ws.on_upgrade(move |socket| push_snapshots(socket, updates))
}

async fn push_snapshots(mut socket: WebSocket, mut updates: watch::Receiver<EventsSnapshot>) {
    tracing::debug!("Live client connected");

    loop {
        let payload = serde_json::to_string(&*updates.borrow_and_update());
        let json = match payload {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize snapshot: {}", e);
                break;
            }
        };

        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }

        if !wait_for_change(&mut socket, &mut updates).await {
            break;
        }
    }

    tracing::debug!("Live client disconnected");
}

/// Returns false when either side has gone away.
async fn wait_for_change(
    socket: &mut WebSocket,
    updates: &mut watch::Receiver<EventsSnapshot>,
) -> bool {
    loop {
        tokio::select! {
            changed = updates.changed() => return changed.is_ok(),
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return false,
                Some(Ok(_)) => {}
            },
        }
    }
}
