//! Process-wide collection of live sessions keyed by public code
//!
//! Commands hold the map's read lock while they lock and mutate their own
//! session, so sessions progress independently. Creation and destruction take
//! the write lock, which makes them atomic with respect to every in-flight
//! command on any session.

use crate::error::{GameError, GameResult};
use crate::game::{Outbound, RandomSource, Session, ThreadRandom, WordBank};
use crate::protocol::ServerMessage;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Length of a public session code
pub const CODE_LENGTH: usize = 8;

type RngFactory = Arc<dyn Fn() -> Box<dyn RandomSource> + Send + Sync>;

/// Last `CODE_LENGTH` characters of a fresh ULID: the random part, already
/// upper-case Crockford base32
fn generate_session_code() -> SessionCode {
    let id = ulid::Ulid::new().to_string();
    id[id.len() - CODE_LENGTH..].to_string()
}

/// Codes are typed by hand; accept surrounding whitespace and lower case
fn normalize_code(code: &str) -> SessionCode {
    code.trim().to_uppercase()
}

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionCode, Arc<Mutex<Session>>>>>,
    words: WordBank,
    rng_factory: RngFactory,
}

impl SessionRegistry {
    pub fn new(words: WordBank) -> Self {
        Self::with_rng(words, || Box::new(ThreadRandom))
    }

    /// Registry whose sessions draw randomness from `factory`
    pub fn with_rng<F>(words: WordBank, factory: F) -> Self
    where
        F: Fn() -> Box<dyn RandomSource> + Send + Sync + 'static,
    {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            words,
            rng_factory: Arc::new(factory),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn contains(&self, code: &str) -> bool {
        self.sessions.read().await.contains_key(&normalize_code(code))
    }

    /// Read-only access to a session, e.g. for tests or diagnostics
    pub async fn inspect<R>(&self, code: &str, f: impl FnOnce(&Session) -> R) -> Option<R> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&normalize_code(code))?;
        let session = session.lock().await;
        Some(f(&*session))
    }

    /// Open a new session hosted by `host_id`
    pub async fn create_session(&self, host_id: &str, host_name: &str) -> GameResult<Vec<Outbound>> {
        let host_name = normalize_player_name(host_name).ok_or(GameError::InvalidPlayerName)?;

        let mut sessions = self.sessions.write().await;
        // Collision - try again (extremely rare with 40 random bits)
        let code = loop {
            let code = generate_session_code();
            if !sessions.contains_key(&code) {
                break code;
            }
        };

        let session = Session::new(
            code.clone(),
            host_id.to_string(),
            host_name,
            self.words.clone(),
            (self.rng_factory)(),
        );
        let out = session.created();
        sessions.insert(code.clone(), Arc::new(Mutex::new(session)));

        tracing::info!(session = %code, host = %host_id, "Session created ({} live)", sessions.len());
        Ok(out)
    }

    /// Run a command against one session, refreshing its activity on success
    async fn with_session<F>(&self, code: &str, f: F) -> GameResult<Vec<Outbound>>
    where
        F: FnOnce(&mut Session) -> GameResult<Vec<Outbound>>,
    {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(&normalize_code(code))
            .ok_or(GameError::SessionNotFound)?;
        let mut session = session.lock().await;
        let out = f(&mut *session)?;
        session.touch();
        Ok(out)
    }

    pub async fn join(&self, code: &str, player_id: &str, name: &str) -> GameResult<Vec<Outbound>> {
        self.with_session(code, |s| s.join(player_id, name)).await
    }

    pub async fn start_game(&self, code: &str, requester: &str) -> GameResult<Vec<Outbound>> {
        self.with_session(code, |s| s.start_game(requester)).await
    }

    pub async fn refresh_game(&self, code: &str, requester: &str) -> GameResult<Vec<Outbound>> {
        self.with_session(code, |s| s.refresh_game(requester)).await
    }

    pub async fn ready_to_vote(&self, code: &str, player_id: &str) -> GameResult<Vec<Outbound>> {
        self.with_session(code, |s| s.mark_ready_to_vote(player_id)).await
    }

    pub async fn cast_vote(&self, code: &str, voter_id: &str, target_id: &str) -> GameResult<Vec<Outbound>> {
        self.with_session(code, |s| s.cast_vote(voter_id, target_id)).await
    }

    pub async fn start_new_round(&self, code: &str, requester: &str) -> GameResult<Vec<Outbound>> {
        self.with_session(code, |s| s.start_new_round(requester)).await
    }

    /// Remove a connection from every session it belongs to, destroying any
    /// session left empty
    pub async fn disconnect(&self, player_id: &str) -> Vec<Outbound> {
        let mut sessions = self.sessions.write().await;
        let mut out = Vec::new();
        let mut emptied = Vec::new();

        for (code, session) in sessions.iter() {
            let mut session = session.lock().await;
            if let Some(messages) = session.leave(player_id) {
                out.extend(messages);
                if session.is_empty() {
                    emptied.push(code.clone());
                } else {
                    session.touch();
                }
            }
        }

        for code in emptied {
            sessions.remove(&code);
            tracing::info!(session = %code, "Session closed ({} live)", sessions.len());
        }

        out
    }

    /// Remove sessions with no accepted command since `now - ttl`, telling
    /// their members why
    pub async fn reap_idle(&self, now: Instant, ttl: Duration) -> Vec<Outbound> {
        let mut sessions = self.sessions.write().await;
        let mut out = Vec::new();
        let mut expired = Vec::new();

        for (code, session) in sessions.iter() {
            let session = session.lock().await;
            if now.saturating_duration_since(session.last_activity()) > ttl {
                expired.push(code.clone());
                out.push(Outbound {
                    recipients: session.roster().ids(),
                    message: ServerMessage::SessionExpired {
                        session_id: code.clone(),
                    },
                });
            }
        }

        for code in &expired {
            sessions.remove(code);
        }
        if !expired.is_empty() {
            tracing::info!("Reaped {} idle sessions ({} live)", expired.len(), sessions.len());
        }

        out
    }
}
