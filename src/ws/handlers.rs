//! WebSocket message dispatch
//!
//! Maps each client command onto a registry call. Rejections become an
//! `Error` message addressed only to the connection that sent the command.

use crate::error::GameResult;
use crate::game::Outbound;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

fn reject_to(conn_id: &str, result: GameResult<Vec<Outbound>>) -> Vec<Outbound> {
    match result {
        Ok(out) => out,
        Err(e) => {
            tracing::warn!(connection = %conn_id, code = e.code(), "Command rejected: {}", e);
            vec![Outbound::to(conn_id, ServerMessage::from(&e))]
        }
    }
}

/// Handle a client message and return everything that should be delivered
pub async fn handle_message(
    msg: ClientMessage,
    conn_id: &str,
    state: &Arc<AppState>,
) -> Vec<Outbound> {
    let registry = &state.registry;

    let result = match msg {
        ClientMessage::CreateSession { player_name } => {
            tracing::info!("Create session request from {}", conn_id);
            registry.create_session(conn_id, &player_name).await
        }

        ClientMessage::JoinSession {
            session_id,
            player_name,
        } => {
            tracing::info!("Join request for session {} from {}", session_id, conn_id);
            registry.join(&session_id, conn_id, &player_name).await
        }

        // Host-only commands (authorization is checked by the session)
        ClientMessage::StartGame { session_id } => registry.start_game(&session_id, conn_id).await,

        ClientMessage::RefreshGame { session_id } => {
            registry.refresh_game(&session_id, conn_id).await
        }

        ClientMessage::StartNewRound { session_id } => {
            registry.start_new_round(&session_id, conn_id).await
        }

        ClientMessage::ReadyToVote { session_id } => {
            registry.ready_to_vote(&session_id, conn_id).await
        }

        ClientMessage::CastVote {
            session_id,
            target_id,
        } => registry.cast_vote(&session_id, conn_id, &target_id).await,
    };

    reject_to(conn_id, result)
}

/// Connection closed: leave every session the connection was part of
pub async fn handle_disconnect(conn_id: &str, state: &Arc<AppState>) -> Vec<Outbound> {
    state.hub.unregister(conn_id).await;
    state.registry.disconnect(conn_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_code(out: &[Outbound]) -> String {
        out.iter()
            .find_map(|o| match &o.message {
                ServerMessage::SessionCreated { session_id } => Some(session_id.clone()),
                _ => None,
            })
            .expect("Expected SessionCreated")
    }

    #[tokio::test]
    async fn test_unknown_session_error_goes_to_requester() {
        let state = Arc::new(AppState::default());
        let out = handle_message(
            ClientMessage::JoinSession {
                session_id: "NOPE0000".to_string(),
                player_name: "Bob".to_string(),
            },
            "bob",
            &state,
        )
        .await;

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].recipients, vec!["bob"]);
        match &out[0].message {
            ServerMessage::Error { code, .. } => assert_eq!(code, "SESSION_NOT_FOUND"),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_start() {
        let state = Arc::new(AppState::default());
        let out = handle_message(
            ClientMessage::CreateSession {
                player_name: "Host".to_string(),
            },
            "h",
            &state,
        )
        .await;
        let code = session_code(&out);

        let out = handle_message(
            ClientMessage::StartGame {
                session_id: code.clone(),
            },
            "intruder",
            &state,
        )
        .await;
        assert_eq!(out[0].recipients, vec!["intruder"]);
        assert!(matches!(
            &out[0].message,
            ServerMessage::Error { code, .. } if code == "NOT_AUTHORIZED"
        ));
        let phase = state.registry.inspect(&code, |s| s.phase()).await;
        assert_eq!(phase, Some(crate::types::Phase::Waiting));
    }

    #[tokio::test]
    async fn test_disconnect_unregisters_connection() {
        let state = Arc::new(AppState::default());
        let _rx = state.hub.register("h").await;
        handle_message(
            ClientMessage::CreateSession {
                player_name: "Host".to_string(),
            },
            "h",
            &state,
        )
        .await;

        let out = handle_disconnect("h", &state).await;
        assert!(out.is_empty());
        assert_eq!(state.hub.connection_count().await, 0);
        assert_eq!(state.registry.session_count().await, 0);
    }
}
