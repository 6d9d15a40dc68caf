use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type ConnectionId = String;
pub type SessionCode = String;

/// Maximum number of players a single session can hold
pub const MAX_PLAYERS: usize = 15;

/// Minimum roster size required to start (or re-deal) a game
pub const MIN_PLAYERS: usize = 3;

/// Longest accepted display name, in characters
pub const MAX_NAME_CHARS: usize = 24;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Playing,
    Voting,
    Results,
}

impl Phase {
    /// Phases in which a word is in play
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Playing | Phase::Voting | Phase::Results)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: ConnectionId,
    pub name: String,
    pub is_host: bool,
    pub is_imposter: bool,
}

impl Player {
    pub fn new(id: ConnectionId, name: String) -> Self {
        Self {
            id,
            name,
            is_host: false,
            is_imposter: false,
        }
    }
}

/// Public player info (no imposter flag, so roster broadcasts never leak roles)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: ConnectionId,
    pub name: String,
    pub is_host: bool,
}

impl From<&Player> for PlayerInfo {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            is_host: p.is_host,
        }
    }
}

/// Trim and validate a display name
pub fn normalize_player_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        None
    } else {
        Some(name.to_string())
    }
}
