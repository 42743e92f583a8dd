//! WebSocket upgrade handler and per-connection event loop.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use crate::AppState;

use super::events::{Command, Notification};
use super::handler;
use super::session::GatewaySession;

pub fn router() -> Router<AppState> {
    Router::new().route("/gateway", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut session = GatewaySession::new();

    tracing::info!(connection_id = %session.connection_id, "client connected");

    // Handshake: hand the client its fresh identity before anything else.
    let hello = Notification::Connected {
        connection_id: session.connection_id.clone(),
    };
    if send_event(&mut ws_tx, &hello).await.is_err() {
        return;
    }

    // Subscribe before processing any command so no room event is missed.
    let mut broadcast_rx = state.broadcast.subscribe();

    'session: loop {
        tokio::select! {
            // Client sends us a command.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let cmd: Command = match serde_json::from_str(&text) {
                            Ok(cmd) => cmd,
                            Err(e) => {
                                // Malformed frames cause no state change; the
                                // client is told and may retry.
                                let reply = handler::malformed(e.to_string());
                                if send_event(&mut ws_tx, &reply).await.is_err() {
                                    break 'session;
                                }
                                continue;
                            }
                        };

                        for reply in handler::handle_command(&state, &mut session, cmd) {
                            if send_event(&mut ws_tx, &reply).await.is_err() {
                                break 'session;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, connection_id = %session.connection_id, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Room event from the fanout hub.
            result = broadcast_rx.recv() => {
                match result {
                    Ok(payload) => {
                        if !session.wants(&payload) {
                            continue;
                        }
                        if send_event(&mut ws_tx, &payload.event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            connection_id = %session.connection_id,
                            skipped = n,
                            "gateway session lagged behind broadcast"
                        );
                        // Continue — the next room-updated resynchronizes.
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        }
    }

    // Abrupt or graceful, the close runs the same cleanup as leave-room.
    handler::handle_disconnect(&state, &mut session);

    tracing::info!(connection_id = %session.connection_id, "client disconnected");
}

/// Serialize and send one notification frame.
async fn send_event(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    event: &Notification,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).unwrap();
    ws_tx.send(Message::Text(json.into())).await
}
