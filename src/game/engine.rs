use super::{
    action::Direction,
    config::GameConfig,
    state::{GameOverReason, GameState, Position, Snake},
};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Result of a game step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Whether the round is over (also true when stepping a finished round)
    pub terminated: bool,
    /// Why the round ended, set only on the step that ended it
    pub game_over: Option<GameOverReason>,
}

impl StepResult {
    fn moved(ate_food: bool) -> Self {
        Self {
            ate_food,
            terminated: false,
            game_over: None,
        }
    }

    fn ended(reason: GameOverReason, ate_food: bool) -> Self {
        Self {
            ate_food,
            terminated: true,
            game_over: Some(reason),
        }
    }
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an engine whose food placement is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to initial state
    pub fn reset(&mut self) -> GameState {
        let snake = Snake::from_segments(
            self.config.initial_snake.clone(),
            self.config.initial_direction,
        );
        let pending_direction = snake.direction;
        let food = self.spawn_food_avoid_snake(&snake);

        GameState {
            snake,
            food,
            pending_direction,
            grid_width: self.config.grid_width,
            grid_height: self.config.grid_height,
            score: 0,
            steps: 0,
            is_alive: food.is_some(),
        }
    }

    /// Buffer a heading for the next step.
    ///
    /// Returns false, leaving the pending heading untouched, when the round is
    /// over or the request would reverse the heading currently applied.
    pub fn request_direction(&self, state: &mut GameState, direction: Direction) -> bool {
        if !state.is_alive || state.snake.direction.is_opposite(direction) {
            return false;
        }
        state.pending_direction = direction;
        true
    }

    /// Execute one step of the game
    pub fn step(&mut self, state: &mut GameState) -> StepResult {
        if !state.is_alive {
            return StepResult {
                ate_food: false,
                terminated: true,
                game_over: None,
            };
        }

        // Input only takes effect at the tick boundary
        state.snake.direction = state.pending_direction;

        let new_head = state.snake.head().moved_in_direction(state.snake.direction);

        if let Some(reason) = self.check_collision(state, new_head) {
            state.is_alive = false;
            state.steps += 1;
            return StepResult::ended(reason, false);
        }

        let ate_food = state.food == Some(new_head);

        // Move snake (grow if ate food)
        state.snake.move_snake(ate_food);
        state.steps += 1;

        if !ate_food {
            return StepResult::moved(false);
        }

        state.score += self.config.food_score;
        state.food = self.spawn_food_avoid_snake(&state.snake);
        debug!(
            "food eaten: score={} length={} next food={:?}",
            state.score,
            state.snake.len(),
            state.food
        );

        if state.food.is_none() {
            state.is_alive = false;
            return StepResult::ended(GameOverReason::BoardFull, true);
        }

        StepResult::moved(true)
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<GameOverReason> {
        if !state.is_in_bounds(pos) {
            return Some(GameOverReason::Wall);
        }

        // The whole pre-move body counts, tail included
        if state.is_occupied_by_snake(pos) {
            return Some(GameOverReason::SelfCollision);
        }

        None
    }

    /// Pick a random empty cell, or `None` when the snake covers the board.
    ///
    /// Rejection sampling is tried a bounded number of times; after that the
    /// free cells are enumerated and one is drawn uniformly.
    fn spawn_food_avoid_snake(&mut self, snake: &Snake) -> Option<Position> {
        let (width, height) = (self.config.grid_width, self.config.grid_height);
        if width == 0 || height == 0 {
            return None;
        }

        for _ in 0..self.config.food_placement_attempts {
            let x = self.rng.gen_range(0..width) as i32;
            let y = self.rng.gen_range(0..height) as i32;
            let pos = Position::new(x, y);

            if !snake.body.contains(&pos) {
                return Some(pos);
            }
        }

        let occupied: HashSet<Position> = snake.body.iter().copied().collect();
        let free: Vec<Position> = (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| Position::new(x, y)))
            .filter(|pos| !occupied.contains(pos))
            .collect();

        free.choose(&mut self.rng).copied()
    }
}
