//! High score persistence
//!
//! The game keeps a single scalar across runs. Stores never fail towards the
//! caller: a value that cannot be read is reported as 0 and a write that
//! cannot be completed is logged and dropped.

pub mod high_score;

pub use high_score::{HIGH_SCORE_KEY, HighScoreStore, JsonFileStore, MemoryStore};
