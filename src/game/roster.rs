use crate::error::{GameError, GameResult};
use crate::types::*;

/// Players of one session in join order.
///
/// Whenever the roster is non-empty exactly one player is host.
#[derive(Debug, Clone)]
pub struct Roster {
    players: Vec<Player>,
}

/// What a removal did to the roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub player: Player,
    /// Set when the host left and someone else was promoted
    pub new_host: Option<ConnectionId>,
}

impl Roster {
    /// Roster seeded with its host
    pub fn with_host(id: ConnectionId, name: String) -> Self {
        let mut host = Player::new(id, name);
        host.is_host = true;
        Self {
            players: vec![host],
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn public_view(&self) -> Vec<PlayerInfo> {
        self.players.iter().map(PlayerInfo::from).collect()
    }

    /// Check whether `add` would currently succeed, without mutating
    pub fn check_can_add(&self, phase: Phase) -> GameResult<()> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::SessionFull);
        }
        if phase != Phase::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        Ok(())
    }

    /// Append a non-host player. Joining is only possible while waiting.
    pub fn add(&mut self, id: ConnectionId, name: String, phase: Phase) -> GameResult<()> {
        self.check_can_add(phase)?;
        if !self.contains(&id) {
            self.players.push(Player::new(id, name));
        }
        Ok(())
    }

    /// Remove a player, promoting the earliest remaining joiner if the host left
    pub fn remove(&mut self, id: &str) -> Option<Departure> {
        let index = self.players.iter().position(|p| p.id == id)?;
        let player = self.players.remove(index);

        let new_host = if player.is_host {
            self.players.first_mut().map(|next| {
                next.is_host = true;
                next.id.clone()
            })
        } else {
            None
        };

        Some(Departure { player, new_host })
    }
}
