use log::{debug, info};
use tokio::sync::watch;

use super::ticker::Ticker;
use crate::game::{Direction, GameEngine, GameOverReason, GameState, Position};
use crate::storage::HighScoreStore;

/// Lifecycle phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing started yet
    Idle,
    Running,
    Paused,
    GameOver,
}

/// What the renderer needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub phase: Phase,
    /// Head first; empty while idle
    pub snake: Vec<Position>,
    pub direction: Direction,
    pub food: Option<Position>,
    pub score: u32,
    pub high_score: u32,
    pub grid_width: usize,
    pub grid_height: usize,
    pub game_over: Option<GameOverReason>,
    /// The round that just ended set a new high score
    pub new_high_score: bool,
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, nothing changed
    Skipped,
    Moved {
        ate_food: bool,
    },
    GameOver {
        reason: GameOverReason,
        final_score: u32,
        new_high_score: bool,
    },
}

/// The game loop: rules engine, phase machine, tick schedule and high score.
///
/// Input arrives through [`GameSession::change_direction`] and the phase
/// commands; it is buffered in the game state and only applied on the next
/// tick. Every change is published to [`GameSession::subscribe`]rs without
/// waiting on them.
pub struct GameSession<S: HighScoreStore> {
    engine: GameEngine,
    state: GameState,
    phase: Phase,
    store: S,
    high_score: u32,
    last_game_over: Option<(GameOverReason, bool)>,
    ticker: Ticker,
    frames: watch::Sender<Snapshot>,
}

impl<S: HighScoreStore> GameSession<S> {
    pub fn new(mut engine: GameEngine, store: S) -> Self {
        let state = engine.reset();
        let high_score = store.get();
        let ticker = Ticker::new(engine.config().tick_interval());

        let session = Self {
            engine,
            state,
            phase: Phase::Idle,
            store,
            high_score,
            last_game_over: None,
            ticker,
            frames: watch::Sender::new(Snapshot::empty()),
        };
        session.publish();
        session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    /// Receiver for the frames published after every change
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.frames.subscribe()
    }

    /// Begin a fresh round from any phase
    pub fn start(&mut self) {
        // Another writer may have raised the stored value since we last looked
        self.high_score = self.high_score.max(self.store.get());
        self.state = self.engine.reset();
        self.last_game_over = None;
        self.phase = Phase::Running;
        self.ticker.start();

        info!(
            "Round started: {}x{} grid, high score {}",
            self.state.grid_width, self.state.grid_height, self.high_score
        );
        self.publish();
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.phase = Phase::Paused;
        self.ticker.stop();
        debug!("Paused at score {}", self.state.score);
        self.publish();
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        self.phase = Phase::Running;
        self.ticker.start();
        debug!("Resumed");
        self.publish();
        true
    }

    /// Pause when running, resume when paused, otherwise ignore
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Idle | Phase::GameOver => false,
        }
    }

    /// Request a new heading for the next tick. Ignored outside a round and
    /// for reversals of the current heading.
    pub fn change_direction(&mut self, direction: Direction) -> bool {
        if !matches!(self.phase, Phase::Running | Phase::Paused) {
            return false;
        }
        self.engine.request_direction(&mut self.state, direction)
    }

    /// Advance the round by one cell
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Running {
            return TickOutcome::Skipped;
        }

        let result = self.engine.step(&mut self.state);
        if let Some(reason) = result.game_over {
            return self.finish(reason);
        }

        self.publish();
        TickOutcome::Moved {
            ate_food: result.ate_food,
        }
    }

    /// Wait for the ticker, then tick. Pending forever unless running.
    pub async fn next_tick(&mut self) -> TickOutcome {
        self.ticker.tick().await;
        self.tick()
    }

    fn finish(&mut self, reason: GameOverReason) -> TickOutcome {
        self.phase = Phase::GameOver;
        self.ticker.stop();

        let final_score = self.state.score;
        let new_high_score = final_score > self.high_score;
        if new_high_score {
            self.high_score = final_score;
            self.store.set(final_score);
        }
        self.last_game_over = Some((reason, new_high_score));

        info!(
            "Game over ({:?}) after {} steps: score {}, high score {}{}",
            reason,
            self.state.steps,
            final_score,
            self.high_score,
            if new_high_score { " (new)" } else { "" }
        );
        self.publish();

        TickOutcome::GameOver {
            reason,
            final_score,
            new_high_score,
        }
    }

    /// Current frame
    pub fn snapshot(&self) -> Snapshot {
        let idle = self.phase == Phase::Idle;
        Snapshot {
            phase: self.phase,
            snake: if idle {
                Vec::new()
            } else {
                self.state.snake.body.clone()
            },
            direction: self.state.snake.direction,
            food: if idle { None } else { self.state.food },
            score: self.state.score,
            high_score: self.high_score,
            grid_width: self.state.grid_width,
            grid_height: self.state.grid_height,
            game_over: self.last_game_over.map(|(reason, _)| reason),
            new_high_score: self.last_game_over.is_some_and(|(_, new)| new),
        }
    }

    fn publish(&self) {
        // send_replace works with zero receivers
        self.frames.send_replace(self.snapshot());
    }
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            phase: Phase::Idle,
            snake: Vec::new(),
            direction: Direction::Right,
            food: None,
            score: 0,
            high_score: 0,
            grid_width: 0,
            grid_height: 0,
            game_over: None,
            new_high_score: false,
        }
    }
}
