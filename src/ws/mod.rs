pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;

use crate::game::Outbound;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Connection identity lives exactly as long as the socket
    let conn_id = ulid::Ulid::new().to_string();
    let mut outbox = state.hub.register(&conn_id).await;

    tracing::info!(connection = %conn_id, "WebSocket connected");

    loop {
        tokio::select! {
            // Messages addressed to this connection
            queued = outbox.recv() => {
                let Some(msg) = queued else { break };
                match serde_json::to_string(&msg) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::error!("Failed to serialize message: {}", e),
                }
            }

            // Handle client messages
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!(connection = %conn_id, "Received message: {}", text.as_str());

                        let out = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                            Ok(client_msg) => handlers::handle_message(client_msg, &conn_id, &state).await,
                            Err(e) => {
                                tracing::warn!("Failed to parse client message: {}", e);
                                vec![Outbound::to(
                                    &conn_id,
                                    ServerMessage::Error {
                                        code: "PARSE_ERROR".to_string(),
                                        message: format!("Invalid message format: {}", e),
                                    },
                                )]
                            }
                        };
                        state.hub.dispatch(out).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!(connection = %conn_id, "WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    let out = handlers::handle_disconnect(&conn_id, &state).await;
    state.hub.dispatch(out).await;

    tracing::info!(connection = %conn_id, "WebSocket connection closed");
}
