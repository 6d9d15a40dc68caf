//! Injectable randomness for word and imposter selection

use rand::Rng;
use std::collections::VecDeque;

/// Source of uniform indices. Implementations must return a value in `0..len`.
pub trait RandomSource: Send {
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Thread-local RNG backed source used in production
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Replays a fixed sequence of indices (each taken modulo `len`), then
/// falls back to 0 once exhausted.
#[derive(Debug, Default, Clone)]
pub struct SequenceRandom {
    values: VecDeque<usize>,
}

impl SequenceRandom {
    pub fn new(values: impl IntoIterator<Item = usize>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        self.values.pop_front().unwrap_or(0) % len
    }
}
