use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use super::action::Direction;
use super::state::Position;

/// Largest board side accepted; two terminal columns are drawn per cell
pub const MAX_GRID_SIDE: usize = 200;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Segments the snake starts with, head first
    pub initial_snake: Vec<Position>,
    /// Heading the snake starts with
    pub initial_direction: Direction,
    /// Points awarded per food eaten
    pub food_score: u32,
    /// Period of the game loop in milliseconds
    pub tick_interval_ms: u64,
    /// Random samples tried before falling back to a free-cell scan
    pub food_placement_attempts: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 25,
            grid_height: 25,
            initial_snake: vec![
                Position::new(5, 10),
                Position::new(4, 10),
                Position::new(3, 10),
            ],
            initial_direction: Direction::Right,
            food_score: 10,
            tick_interval_ms: 150,
            food_placement_attempts: 64,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(12, 12)
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config in {:?}", path))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Number of cells on the board, `None` if it does not fit in a usize
    pub fn cell_count(&self) -> Option<usize> {
        self.grid_width.checked_mul(self.grid_height)
    }

    /// Check that a game can actually be started with this configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_width > 0 && self.grid_height > 0,
            "grid must be at least 1x1, got {}x{}",
            self.grid_width,
            self.grid_height
        );
        ensure!(
            self.grid_width <= MAX_GRID_SIDE && self.grid_height <= MAX_GRID_SIDE,
            "grid must be at most {}x{}, got {}x{}",
            MAX_GRID_SIDE,
            MAX_GRID_SIDE,
            self.grid_width,
            self.grid_height
        );
        let Some(cells) = self.cell_count() else {
            bail!(
                "grid {}x{} has too many cells",
                self.grid_width,
                self.grid_height
            );
        };
        ensure!(self.tick_interval_ms > 0, "tick interval must be non-zero");
        ensure!(!self.initial_snake.is_empty(), "initial snake is empty");

        let mut seen = HashSet::new();
        for pos in &self.initial_snake {
            if pos.x < 0
                || pos.y < 0
                || pos.x >= self.grid_width as i32
                || pos.y >= self.grid_height as i32
            {
                bail!(
                    "initial snake segment ({}, {}) lies outside the {}x{} grid",
                    pos.x,
                    pos.y,
                    self.grid_width,
                    self.grid_height
                );
            }
            if !seen.insert(*pos) {
                bail!("initial snake overlaps itself at ({}, {})", pos.x, pos.y);
            }
        }

        for pair in self.initial_snake.windows(2) {
            let (dx, dy) = (pair[0].x - pair[1].x, pair[0].y - pair[1].y);
            ensure!(
                dx.abs() + dy.abs() == 1,
                "initial snake segments ({}, {}) and ({}, {}) are not adjacent",
                pair[0].x,
                pair[0].y,
                pair[1].x,
                pair[1].y
            );
        }

        ensure!(
            self.initial_snake.len() < cells,
            "initial snake fills the whole grid, there is no room for food"
        );

        Ok(())
    }
}
