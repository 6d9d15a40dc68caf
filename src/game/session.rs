//! Per-session state machine
//!
//! `Waiting -> Playing -> Voting -> Results -> Waiting (next round)`.
//! Every command validates its preconditions before touching state, so a
//! rejected command leaves the session exactly as it was. Accepted commands
//! return the messages the transport should deliver.

use super::rng::RandomSource;
use super::roles::{imposter_count, select_imposters};
use super::roster::Roster;
use super::vote::VoteTally;
use super::word_bank::WordBank;
use crate::error::{GameError, GameResult};
use crate::protocol::ServerMessage;
use crate::types::*;
use std::time::Instant;

/// A message addressed to specific connections
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub recipients: Vec<ConnectionId>,
    pub message: ServerMessage,
}

impl Outbound {
    pub fn to(id: &str, message: ServerMessage) -> Self {
        Self {
            recipients: vec![id.to_string()],
            message,
        }
    }
}

pub struct Session {
    code: SessionCode,
    host_id: ConnectionId,
    roster: Roster,
    phase: Phase,
    current_word: String,
    imposter_ids: Vec<ConnectionId>,
    votes: VoteTally,
    ready_to_vote: Vec<ConnectionId>,
    round: u32,
    used_words: Vec<String>,
    words: WordBank,
    rng: Box<dyn RandomSource>,
    last_activity: Instant,
}

impl Session {
    pub fn new(
        code: SessionCode,
        host_id: ConnectionId,
        host_name: String,
        words: WordBank,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            code,
            roster: Roster::with_host(host_id.clone(), host_name),
            host_id,
            phase: Phase::Waiting,
            current_word: String::new(),
            imposter_ids: Vec::new(),
            votes: VoteTally::default(),
            ready_to_vote: Vec::new(),
            round: 1,
            used_words: Vec::new(),
            words,
            rng,
            last_activity: Instant::now(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    pub fn imposter_ids(&self) -> &[ConnectionId] {
        &self.imposter_ids
    }

    pub fn used_words(&self) -> &[String] {
        &self.used_words
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn ready_count(&self) -> usize {
        self.ready_to_vote.len()
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.roster.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn to_all(&self, message: ServerMessage) -> Outbound {
        Outbound {
            recipients: self.roster.ids(),
            message,
        }
    }

    fn require_host(&self, requester: &str, action: &'static str) -> GameResult<()> {
        if requester != self.host_id {
            return Err(GameError::NotAuthorized(action));
        }
        Ok(())
    }

    fn require_member(&self, id: &str) -> GameResult<()> {
        if !self.roster.contains(id) {
            return Err(GameError::NotInSession);
        }
        Ok(())
    }

    /// Messages announcing a freshly created session to its host
    pub fn created(&self) -> Vec<Outbound> {
        vec![
            Outbound::to(
                &self.host_id,
                ServerMessage::SessionCreated {
                    session_id: self.code.clone(),
                },
            ),
            self.to_all(ServerMessage::PlayerJoined {
                player_name: self
                    .roster
                    .host()
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                players: self.roster.public_view(),
            }),
        ]
    }

    pub fn join(&mut self, player_id: &str, name: &str) -> GameResult<Vec<Outbound>> {
        let name = normalize_player_name(name).ok_or(GameError::InvalidPlayerName)?;
        if self.roster.contains(player_id) {
            return Ok(vec![Outbound::to(
                player_id,
                ServerMessage::JoinedSession {
                    session_id: self.code.clone(),
                },
            )]);
        }
        self.roster.add(player_id.to_string(), name.clone(), self.phase)?;

        tracing::info!(session = %self.code, player = %player_id, "Player joined ({} total)", self.roster.len());

        Ok(vec![
            Outbound::to(
                player_id,
                ServerMessage::JoinedSession {
                    session_id: self.code.clone(),
                },
            ),
            self.to_all(ServerMessage::PlayerJoined {
                player_name: name,
                players: self.roster.public_view(),
            }),
        ])
    }

    /// Remove a player in any phase. Returns `None` if they were not present.
    ///
    /// Ready flags are dropped without re-evaluating quorum. Votes cast by or
    /// for the player are dropped; if everyone left has then voted, the round
    /// is scored immediately. Otherwise voters who lost their ballot get
    /// `VotingStarted` again so they can pick someone else.
    pub fn leave(&mut self, player_id: &str) -> Option<Vec<Outbound>> {
        let departure = self.roster.remove(player_id)?;

        let orphaned_voters = self.votes.purge(player_id);
        self.ready_to_vote.retain(|id| id != player_id);
        self.imposter_ids.retain(|id| id != player_id);
        if let Some(new_host) = departure.new_host {
            tracing::info!(session = %self.code, "Host left, promoted {}", new_host);
            self.host_id = new_host;
        }

        tracing::info!(session = %self.code, player = %player_id, "Player left ({} remaining)", self.roster.len());

        if self.roster.is_empty() {
            return Some(Vec::new());
        }

        let mut out = vec![self.to_all(ServerMessage::PlayerLeft {
            players: self.roster.public_view(),
        })];

        match self.phase {
            Phase::Playing => out.push(self.ready_count_update()),
            Phase::Voting if !self.votes.is_empty() && self.votes.is_complete(self.roster.len()) => {
                out.push(self.finish_voting());
            }
            Phase::Voting if !orphaned_voters.is_empty() => {
                tracing::debug!(session = %self.code, "{} votes voided by departure", orphaned_voters.len());
                out.push(Outbound {
                    recipients: orphaned_voters,
                    message: ServerMessage::VotingStarted {
                        players: self.roster.public_view(),
                    },
                });
            }
            _ => {}
        }

        Some(out)
    }

    pub fn start_game(&mut self, requester: &str) -> GameResult<Vec<Outbound>> {
        self.require_host(requester, "start the game")?;
        if self.phase != Phase::Waiting {
            return Err(GameError::WrongPhase("start the game"));
        }
        if self.roster.len() < MIN_PLAYERS {
            return Err(GameError::InsufficientPlayers);
        }
        self.deal()
    }

    /// Re-deal word and imposters mid-round without changing the round number
    pub fn refresh_game(&mut self, requester: &str) -> GameResult<Vec<Outbound>> {
        self.require_host(requester, "refresh the game")?;
        if !self.phase.is_active() {
            return Err(GameError::WrongPhase("refresh the game"));
        }
        if self.roster.len() < MIN_PLAYERS {
            return Err(GameError::InsufficientPlayers);
        }
        self.deal()
    }

    fn deal(&mut self) -> GameResult<Vec<Outbound>> {
        let count = imposter_count(self.roster.len());
        let imposters = select_imposters(&mut self.roster, &self.host_id, count, self.rng.as_mut())?;

        let word = self.words.pick(&self.used_words, self.rng.as_mut());
        if self.words.is_exhausted(&self.used_words) {
            self.used_words.clear();
        }
        self.used_words.push(word.clone());

        self.current_word = word;
        self.imposter_ids = imposters;
        self.phase = Phase::Playing;
        self.votes.clear();
        self.ready_to_vote.clear();

        tracing::info!(
            session = %self.code,
            round = self.round,
            imposters = count,
            "Game dealt to {} players",
            self.roster.len()
        );

        let mut out: Vec<Outbound> = self
            .roster
            .iter()
            .map(|p| {
                Outbound::to(
                    &p.id,
                    ServerMessage::GameStarted {
                        is_imposter: p.is_imposter,
                        word: if p.is_imposter {
                            String::new()
                        } else {
                            self.current_word.clone()
                        },
                        round: self.round,
                        is_host: p.is_host,
                        imposter_count: count,
                    },
                )
            })
            .collect();
        out.push(self.to_all(ServerMessage::GameStateChanged {
            state: self.phase,
            players: self.roster.public_view(),
        }));
        Ok(out)
    }

    fn ready_count_update(&self) -> Outbound {
        self.to_all(ServerMessage::ReadyCountUpdated {
            ready_count: self.ready_to_vote.len(),
            total_players: self.roster.len(),
        })
    }

    pub fn mark_ready_to_vote(&mut self, player_id: &str) -> GameResult<Vec<Outbound>> {
        self.require_member(player_id)?;
        if self.phase != Phase::Playing {
            return Err(GameError::WrongPhase("vote yet"));
        }

        if self.ready_to_vote.iter().any(|id| id == player_id) {
            return Ok(vec![Outbound::to(
                player_id,
                ServerMessage::ReadyCountUpdated {
                    ready_count: self.ready_to_vote.len(),
                    total_players: self.roster.len(),
                },
            )]);
        }
        self.ready_to_vote.push(player_id.to_string());

        if self.ready_to_vote.len() > self.roster.len() / 2 {
            self.phase = Phase::Voting;
            self.votes.clear();
            tracing::info!(session = %self.code, "Voting started ({}/{} ready)", self.ready_to_vote.len(), self.roster.len());
            return Ok(vec![self.to_all(ServerMessage::VotingStarted {
                players: self.roster.public_view(),
            })]);
        }

        Ok(vec![self.ready_count_update()])
    }

    pub fn cast_vote(&mut self, voter_id: &str, target_id: &str) -> GameResult<Vec<Outbound>> {
        self.require_member(voter_id)?;
        if self.phase != Phase::Voting {
            return Err(GameError::NotVotingPhase);
        }
        if !self.roster.contains(target_id) {
            return Err(GameError::InvalidVoteTarget);
        }
        self.votes.cast_vote(voter_id, target_id);

        tracing::debug!(session = %self.code, "Vote recorded ({}/{})", self.votes.len(), self.roster.len());

        if self.votes.is_complete(self.roster.len()) {
            return Ok(vec![self.finish_voting()]);
        }
        Ok(Vec::new())
    }

    fn finish_voting(&mut self) -> Outbound {
        let result = self.votes.tally();
        self.phase = Phase::Results;

        let is_imposter_voted_out = result
            .winner
            .as_ref()
            .is_some_and(|id| self.imposter_ids.contains(id));

        tracing::info!(
            session = %self.code,
            round = self.round,
            caught = is_imposter_voted_out,
            "Voting finished"
        );

        self.to_all(ServerMessage::VotingResults {
            voted_out_player: result
                .winner
                .as_deref()
                .and_then(|id| self.roster.get(id))
                .map(PlayerInfo::from),
            is_imposter_voted_out,
            vote_counts: result.counts_map(),
            imposters: self
                .imposter_ids
                .iter()
                .filter_map(|id| self.roster.get(id))
                .map(PlayerInfo::from)
                .collect(),
            word: self.current_word.clone(),
            used_words: self.used_words.clone(),
        })
    }

    pub fn start_new_round(&mut self, requester: &str) -> GameResult<Vec<Outbound>> {
        self.require_host(requester, "start a new round")?;
        if self.phase == Phase::Waiting {
            return Err(GameError::WrongPhase("start a new round"));
        }

        self.phase = Phase::Waiting;
        self.current_word.clear();
        self.imposter_ids.clear();
        self.votes.clear();
        self.ready_to_vote.clear();
        self.round += 1;
        for player in self.roster.iter_mut() {
            player.is_imposter = false;
        }

        tracing::info!(session = %self.code, round = self.round, "New round");

        Ok(vec![self.to_all(ServerMessage::NewRoundStarted {
            players: self.roster.public_view(),
            round: self.round,
        })])
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        if !self.roster.is_empty() {
            assert_eq!(self.roster.iter().filter(|p| p.is_host).count(), 1);
            assert_eq!(self.roster.host().map(|p| p.id.as_str()), Some(self.host_id.as_str()));
        }
        assert!(self.roster.len() <= MAX_PLAYERS);
        assert!(self.imposter_ids.iter().all(|id| self.roster.contains(id)));
        assert!(self.ready_to_vote.iter().all(|id| self.roster.contains(id)));
        assert_eq!(!self.current_word.is_empty(), self.phase.is_active());
    }
}
