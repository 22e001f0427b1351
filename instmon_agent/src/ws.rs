//! WebSocket upgrade and per-connection handler. Pushes samples; ignores
//! whatever the client sends.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::registry::{Rejection, NORMAL_CLOSURE, SERVER_SHUTTING_DOWN};
use crate::session::ChannelSink;
use crate::state::AppState;

/// Samples buffered per connection before producers start dropping.
pub const OUTBOUND_CAPACITY: usize = 64;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    // Upgrade even without an id so the rejection arrives as a close frame.
    let instance_id = q.get("instanceId").cloned();
    ws.on_upgrade(move |socket| handle_socket(socket, state, instance_id))
}

fn close_frame(code: u16, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: Cow::Borrowed(reason),
    }))
}

async fn handle_socket(socket: WebSocket, state: AppState, instance_id: Option<String>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_CAPACITY);
    let sink = Arc::new(ChannelSink::new(tx));

    let session = match state.registry.accept(instance_id.as_deref(), sink) {
        Ok(s) => s,
        Err(Rejection { code, reason }) => {
            let _ = sender.send(close_frame(code, reason)).await;
            return;
        }
    };

    let writer = async {
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(text) = msg else { break };
                    if let Err(e) = sender.send(Message::Text(text)).await {
                        debug!(session = session.id(), "send failed, closing: {e}");
                        break;
                    }
                }
                _ = session.stopped() => {
                    let _ = sender.send(close_frame(NORMAL_CLOSURE, SERVER_SHUTTING_DOWN)).await;
                    break;
                }
            }
        }
    };

    // Keep reading past the peer's Close: the next poll flushes the queued
    // close reply, then the stream ends.
    let reader = async {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => debug!(session = session.id(), "peer sent close"),
                Err(_) => break,
                Ok(_) => {}
            }
        }
    };

    tokio::select! {
        _ = reader => debug!(session = session.id(), "peer closed"),
        _ = writer => {}
    }

    state.registry.release(session.id());
    let _ = sender.close().await;
}
