use crate::game::Outbound;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::ConnectionId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, RwLock};

/// Per-connection outbound channels
#[derive(Clone, Default)]
pub struct ConnectionHub {
    senders: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and return the receiving end of its channel
    pub async fn register(&self, id: &str) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.write().await.insert(id.to_string(), tx);
        rx
    }

    pub async fn unregister(&self, id: &str) {
        self.senders.write().await.remove(id);
    }

    pub async fn connection_count(&self) -> usize {
        self.senders.read().await.len()
    }

    /// Deliver each message to its recipients. Unknown or closed
    /// connections are skipped.
    pub async fn dispatch(&self, outbound: Vec<Outbound>) {
        let senders = self.senders.read().await;
        for out in outbound {
            for id in &out.recipients {
                if let Some(tx) = senders.get(id) {
                    // Ignore send errors (receiver is mid-disconnect)
                    let _ = tx.send(out.message.clone());
                }
            }
        }
    }
}

/// Spawn a background task that removes sessions nobody has touched within
/// the configured TTL
pub fn spawn_session_reaper(state: Arc<AppState>) {
    let Some(ttl) = state.config.idle_ttl else {
        tracing::info!("Idle session reaper disabled");
        return;
    };
    let interval = state.config.reaper_interval;

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            let expired = state.registry.reap_idle(Instant::now(), ttl).await;
            if !expired.is_empty() {
                state.hub.dispatch(expired).await;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatch_routes_to_recipients() {
        let hub = ConnectionHub::new();
        let mut a = hub.register("a").await;
        let mut b = hub.register("b").await;

        hub.dispatch(vec![
            Outbound::to(
                "a",
                ServerMessage::JoinedSession {
                    session_id: "CODE".to_string(),
                },
            ),
            Outbound {
                recipients: vec!["a".to_string(), "b".to_string(), "gone".to_string()],
                message: ServerMessage::PlayerLeft { players: vec![] },
            },
        ])
        .await;

        assert!(matches!(a.try_recv(), Ok(ServerMessage::JoinedSession { .. })));
        assert!(matches!(a.try_recv(), Ok(ServerMessage::PlayerLeft { .. })));
        assert!(a.try_recv().is_err());
        assert!(matches!(b.try_recv(), Ok(ServerMessage::PlayerLeft { .. })));
        assert!(b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unregister_stops_delivery() {
        let hub = ConnectionHub::new();
        let mut a = hub.register("a").await;
        hub.unregister("a").await;
        assert_eq!(hub.connection_count().await, 0);

        hub.dispatch(vec![Outbound::to(
            "a",
            ServerMessage::PlayerLeft { players: vec![] },
        )])
        .await;
        // Sender was dropped on unregister, so the channel is closed and empty
        assert!(a.try_recv().is_err());
    }
}
