pub mod config;
pub mod error;
pub mod game;
pub mod phase_timer;
pub mod player_registry;
pub mod protocol;
pub mod session;
pub mod telegram;
pub mod vote;
