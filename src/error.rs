//! Rejection taxonomy for session commands
//!
//! Every variant is recoverable: the command is refused before any state is
//! touched and the error is reported only to the requesting connection.

use crate::types::{MAX_NAME_CHARS, MAX_PLAYERS, MIN_PLAYERS};

pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Only the host can {0}")]
    NotAuthorized(&'static str),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session is full (max {} players)", MAX_PLAYERS)]
    SessionFull,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Need at least {} players", MIN_PLAYERS)]
    InsufficientPlayers,

    #[error("Voting is not open")]
    NotVotingPhase,

    #[error("Cannot {0} right now")]
    WrongPhase(&'static str),

    #[error("You are not part of this session")]
    NotInSession,

    #[error("Vote target is not in this session")]
    InvalidVoteTarget,

    #[error("Player name must be 1-{} characters", MAX_NAME_CHARS)]
    InvalidPlayerName,
}

impl GameError {
    /// Stable machine-readable code sent alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NotAuthorized(_) => "NOT_AUTHORIZED",
            GameError::SessionNotFound => "SESSION_NOT_FOUND",
            GameError::SessionFull => "SESSION_FULL",
            GameError::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            GameError::InsufficientPlayers => "INSUFFICIENT_PLAYERS",
            GameError::NotVotingPhase => "NOT_VOTING_PHASE",
            GameError::WrongPhase(_) => "WRONG_PHASE",
            GameError::NotInSession => "NOT_IN_SESSION",
            GameError::InvalidVoteTarget => "INVALID_VOTE_TARGET",
            GameError::InvalidPlayerName => "INVALID_PLAYER_NAME",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GameError::NotAuthorized("start the game").to_string(),
            "Only the host can start the game"
        );
        assert_eq!(
            GameError::InsufficientPlayers.to_string(),
            "Need at least 3 players"
        );
        assert_eq!(GameError::SessionFull.code(), "SESSION_FULL");
    }
}
