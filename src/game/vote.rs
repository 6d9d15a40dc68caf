use crate::types::ConnectionId;
use std::collections::HashMap;

/// One vote per connection per round, kept in the order votes were first cast.
///
/// The tally does not track whether voting is open; the session only routes
/// votes here while it is in the voting phase.
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    votes: Vec<(ConnectionId, ConnectionId)>,
}

/// Aggregated outcome of a round's votes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyResult {
    /// Per-target counts, ordered by first appearance
    pub counts: Vec<(ConnectionId, u32)>,
    /// Target with the most votes; ties go to the earliest-seen target
    pub winner: Option<ConnectionId>,
}

impl TallyResult {
    pub fn counts_map(&self) -> HashMap<ConnectionId, u32> {
        self.counts.iter().cloned().collect()
    }

    #[cfg(test)]
    fn total(&self) -> u32 {
        self.counts.iter().map(|(_, c)| c).sum()
    }
}

impl VoteTally {
    pub fn clear(&mut self) {
        self.votes.clear();
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    #[cfg(test)]
    fn vote_of(&self, voter_id: &str) -> Option<&ConnectionId> {
        self.votes
            .iter()
            .find(|(voter, _)| voter == voter_id)
            .map(|(_, target)| target)
    }

    /// Record or overwrite a voter's choice
    pub fn cast_vote(&mut self, voter_id: &str, target_id: &str) {
        match self.votes.iter_mut().find(|(voter, _)| voter == voter_id) {
            Some((_, target)) => *target = target_id.to_string(),
            None => self
                .votes
                .push((voter_id.to_string(), target_id.to_string())),
        }
    }

    /// Drop everything involving a departed player, as voter or target.
    ///
    /// Returns the remaining voters whose ballot named the departed player;
    /// they have to vote again.
    pub fn purge(&mut self, player_id: &str) -> Vec<ConnectionId> {
        let mut orphaned = Vec::new();
        self.votes.retain(|(voter, target)| {
            if voter == player_id {
                return false;
            }
            if target == player_id {
                orphaned.push(voter.clone());
                return false;
            }
            true
        });
        orphaned
    }

    pub fn is_complete(&self, roster_size: usize) -> bool {
        self.votes.len() == roster_size
    }

    pub fn tally(&self) -> TallyResult {
        let mut counts: Vec<(ConnectionId, u32)> = Vec::new();
        for (_, target) in &self.votes {
            match counts.iter_mut().find(|(id, _)| id == target) {
                Some((_, count)) => *count += 1,
                None => counts.push((target.clone(), 1)),
            }
        }

        let mut winner: Option<(&ConnectionId, u32)> = None;
        for (id, count) in &counts {
            let leads = match winner {
                Some((_, best)) => *count > best,
                None => true,
            };
            if leads {
                winner = Some((id, *count));
            }
        }
        let winner = winner.map(|(id, _)| id.clone());

        TallyResult { counts, winner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally_of(votes: &[(&str, &str)]) -> VoteTally {
        let mut tally = VoteTally::default();
        for (voter, target) in votes {
            tally.cast_vote(voter, target);
        }
        tally
    }

    #[test]
    fn test_vote_overwrite() {
        let mut tally = tally_of(&[("a", "b")]);
        tally.cast_vote("a", "c");
        assert_eq!(tally.len(), 1);
        assert_eq!(tally.vote_of("a").map(String::as_str), Some("c"));
    }

    #[test]
    fn test_is_complete() {
        let mut tally = tally_of(&[("a", "b"), ("b", "a")]);
        assert!(!tally.is_complete(3));
        tally.cast_vote("c", "a");
        assert!(tally.is_complete(3));
    }

    #[test]
    fn test_tally_plurality() {
        let result = tally_of(&[("v1", "b"), ("v2", "a"), ("v3", "a")]).tally();
        assert_eq!(result.winner.as_deref(), Some("a"));
        assert_eq!(result.counts_map().get("a"), Some(&2));
        assert_eq!(result.counts_map().get("b"), Some(&1));
        assert_eq!(result.total(), 3);
    }

    #[test]
    fn test_tie_goes_to_first_seen_target() {
        let tally = tally_of(&[("v1", "A"), ("v2", "B")]);
        assert_eq!(tally.tally().winner.as_deref(), Some("A"));

        let tally = tally_of(&[("v1", "B"), ("v2", "A"), ("v3", "A"), ("v4", "B")]);
        assert_eq!(tally.tally().winner.as_deref(), Some("B"));
    }

    #[test]
    fn test_empty_tally_has_no_winner() {
        let result = VoteTally::default().tally();
        assert!(result.counts.is_empty());
        assert_eq!(result.winner, None);
    }

    #[test]
    fn test_purge_removes_voter_and_target() {
        let mut tally = tally_of(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let orphaned = tally.purge("a");
        assert_eq!(tally.len(), 1);
        assert_eq!(tally.vote_of("b").map(String::as_str), Some("c"));
        // "a" voted for "b" (dropped as voter); "c" voted for "a" (orphaned)
        assert_eq!(orphaned, vec!["c"]);
    }

    #[test]
    fn test_purge_of_non_target_orphans_nobody() {
        let mut tally = tally_of(&[("a", "b"), ("b", "a"), ("c", "a")]);
        assert!(tally.purge("d").is_empty());
        assert_eq!(tally.len(), 3);
        // Only votes cast by "c" involve it
        assert!(tally.purge("c").is_empty());
        assert_eq!(tally.len(), 2);
    }

    #[test]
    fn test_clear_drops_previous_votes() {
        let mut tally = tally_of(&[("a", "b")]);
        tally.clear();
        assert!(tally.is_empty());
    }
}
