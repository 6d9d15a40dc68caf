// Public API for integration tests and potential library usage

pub mod config;
pub mod error;
pub mod game;
pub mod protocol;
pub mod state;
pub mod types;
pub mod ws;

// Connection hub and idle-session reaper
pub mod broadcast;
