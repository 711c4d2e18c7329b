//! The game loop around the rules engine
//!
//! Provides:
//! - Idle / Running / Paused / GameOver phase machine
//! - A cancellable tick schedule owned by the session
//! - High score bookkeeping against a [`crate::storage::HighScoreStore`]
//! - Fire-and-forget frame publication for renderers

pub mod game_session;
pub mod ticker;

pub use game_session::{GameSession, Phase, Snapshot, TickOutcome};
pub use ticker::Ticker;
