//! Synchronous game core: no I/O, no async. Everything here is owned by a
//! single session and mutated only through `Session` methods.

pub mod rng;
pub mod roles;
pub mod roster;
pub mod session;
pub mod vote;
pub mod word_bank;

pub use rng::{RandomSource, SequenceRandom, ThreadRandom};
pub use roster::Roster;
pub use session::{Outbound, Session};
pub use vote::{TallyResult, VoteTally};
pub use word_bank::WordBank;
