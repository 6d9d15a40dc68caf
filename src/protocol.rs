use crate::error::GameError;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    CreateSession {
        player_name: String,
    },
    JoinSession {
        session_id: SessionCode,
        player_name: String,
    },
    // Host-only messages
    StartGame {
        session_id: SessionCode,
    },
    RefreshGame {
        session_id: SessionCode,
    },
    StartNewRound {
        session_id: SessionCode,
    },
    // Round messages
    ReadyToVote {
        session_id: SessionCode,
    },
    CastVote {
        session_id: SessionCode,
        target_id: ConnectionId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Sent to the creator only
    SessionCreated {
        session_id: SessionCode,
    },
    /// Sent to the joiner only
    JoinedSession {
        session_id: SessionCode,
    },
    PlayerJoined {
        player_name: String,
        players: Vec<PlayerInfo>,
    },
    PlayerLeft {
        players: Vec<PlayerInfo>,
    },
    /// Per-player deal. `word` is empty for imposters.
    GameStarted {
        is_imposter: bool,
        word: String,
        round: u32,
        is_host: bool,
        imposter_count: usize,
    },
    GameStateChanged {
        state: Phase,
        players: Vec<PlayerInfo>,
    },
    ReadyCountUpdated {
        ready_count: usize,
        total_players: usize,
    },
    VotingStarted {
        players: Vec<PlayerInfo>,
    },
    VotingResults {
        voted_out_player: Option<PlayerInfo>,
        is_imposter_voted_out: bool,
        vote_counts: HashMap<ConnectionId, u32>,
        #[serde(rename = "imposter")]
        imposters: Vec<PlayerInfo>,
        word: String,
        used_words: Vec<String>,
    },
    NewRoundStarted {
        players: Vec<PlayerInfo>,
        round: u32,
    },
    /// Broadcast when an idle session is reaped
    SessionExpired {
        session_id: SessionCode,
    },
    Error {
        code: String,
        message: String,
    },
}

impl From<&GameError> for ServerMessage {
    fn from(e: &GameError) -> Self {
        ServerMessage::Error {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}
