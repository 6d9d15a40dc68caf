//! Imposter selection

use super::rng::RandomSource;
use super::roster::Roster;
use crate::error::{GameError, GameResult};
use crate::types::ConnectionId;

/// Rosters of this size or larger get a second imposter
pub const TWO_IMPOSTER_THRESHOLD: usize = 8;

pub fn imposter_count(roster_size: usize) -> usize {
    if roster_size >= TWO_IMPOSTER_THRESHOLD {
        2
    } else {
        1
    }
}

/// Clear every imposter flag, then pick `count` distinct imposters.
///
/// The first pick excludes the host whenever the non-host players alone can
/// still cover `count`; later picks draw from everyone not yet chosen.
/// Returns the chosen ids in selection order.
pub fn select_imposters(
    roster: &mut Roster,
    host_id: &str,
    count: usize,
    rng: &mut dyn RandomSource,
) -> GameResult<Vec<ConnectionId>> {
    if roster.len() < count {
        return Err(GameError::InsufficientPlayers);
    }

    for player in roster.iter_mut() {
        player.is_imposter = false;
    }

    let all_ids = roster.ids();
    let mut chosen: Vec<ConnectionId> = Vec::with_capacity(count);

    for _ in 0..count {
        let remaining: Vec<&ConnectionId> = all_ids.iter().filter(|id| !chosen.contains(*id)).collect();

        let pool: Vec<&ConnectionId> = if chosen.is_empty() {
            let non_host: Vec<&ConnectionId> =
                remaining.iter().copied().filter(|id| id.as_str() != host_id).collect();
            if non_host.len() >= count {
                non_host
            } else {
                remaining
            }
        } else {
            remaining
        };

        let pick = pool[rng.pick_index(pool.len())].clone();
        chosen.push(pick);
    }

    for player in roster.iter_mut() {
        player.is_imposter = chosen.contains(&player.id);
    }

    Ok(chosen)
}
