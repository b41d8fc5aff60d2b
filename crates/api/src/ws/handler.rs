use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use guardian_core::topics::{MSG_TYPE_CONNECTED, MSG_TYPE_PONG};
use guardian_events::{LiveHub, LiveScope, RecvError};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::state::AppState;
use crate::ws::heartbeat::{heartbeat_ticker, HEARTBEAT_INTERVAL};

/// Replies queued by the receive loop for the sender task.
const REPLY_CHANNEL_CAPACITY: usize = 16;

/// First message sent on every connection.
#[derive(Debug, Serialize)]
struct Greeting<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    device_id: &'a str,
    message: String,
}

/// Messages a viewer may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ClientMessage {
    Ping,
}

/// HTTP handler that upgrades `/ws/{device_id}` to a live stream.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(device_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, device_id, state.hub))
}

/// Manage a single viewer connection after upgrade.
///
/// The hub subscription is registered before the greeting is sent, so any
/// event published after the greeting reaches the viewer. A sender task
/// forwards hub events, pong replies and heartbeat pings; the current task
/// reads inbound frames until the viewer leaves.
async fn handle_socket(socket: WebSocket, device_id: String, hub: Arc<LiveHub>) {
    let scope = LiveScope::from_device_id(&device_id);
    let mut subscription = hub.subscribe(scope.clone());
    let subscription_id = subscription.id();
    tracing::info!(subscription_id = %subscription_id, scope = %scope, "Live viewer connected");

    let (mut sink, mut stream) = socket.split();

    let greeting = Greeting {
        kind: MSG_TYPE_CONNECTED,
        device_id: &device_id,
        message: format!("Connected to telemetry stream for {device_id}"),
    };
    let sent = match serde_json::to_string(&greeting) {
        Ok(text) => sink.send(Message::Text(text.into())).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize greeting");
            false
        }
    };
    if !sent {
        hub.unsubscribe(subscription_id);
        return;
    }

    let (reply_tx, mut reply_rx) = mpsc::channel::<Message>(REPLY_CHANNEL_CAPACITY);

    let send_task = tokio::spawn(async move {
        let mut heartbeat = heartbeat_ticker(HEARTBEAT_INTERVAL);
        loop {
            let msg = tokio::select! {
                event = subscription.recv() => match event {
                    Ok(event) => match event.to_json() {
                        Ok(text) => Message::Text(text.into()),
                        Err(e) => {
                            tracing::error!(error = %e, kind = event.kind(), "Failed to serialize live event");
                            continue;
                        }
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            subscription_id = %subscription_id,
                            skipped,
                            "Live viewer too slow, oldest events dropped",
                        );
                        continue;
                    }
                    Err(RecvError::Closed) => {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                },
                Some(reply) = reply_rx.recv() => reply,
                _ = heartbeat.tick() => Message::Ping(Bytes::new()),
            };

            if sink.send(msg).await.is_err() {
                tracing::debug!(subscription_id = %subscription_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(ClientMessage::Ping) => {
                    let pong = serde_json::json!({ "type": MSG_TYPE_PONG }).to_string();
                    if reply_tx.send(Message::Text(pong.into())).await.is_err() {
                        break;
                    }
                }
                Err(_) => {
                    tracing::trace!(subscription_id = %subscription_id, "Ignoring viewer message");
                }
            },
            Ok(Message::Pong(_)) => {
                tracing::trace!(subscription_id = %subscription_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(subscription_id = %subscription_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    hub.unsubscribe(subscription_id);
    send_task.abort();
    tracing::info!(subscription_id = %subscription_id, "Live viewer disconnected");
}
