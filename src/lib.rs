//! Tick Snake - the classic Snake game on a fixed-period game loop
//!
//! This library provides:
//! - Core game logic (game module)
//! - The game loop state machine with its tick schedule (session module)
//! - High score persistence (storage module)
//! - TUI rendering, key mapping and play-time metrics
//! - The interactive terminal mode (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod session;
pub mod storage;
