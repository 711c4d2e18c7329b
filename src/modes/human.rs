use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;

use crate::game::{GameConfig, GameEngine};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;
use crate::session::{GameSession, Phase, Snapshot, TickOutcome};
use crate::storage::HighScoreStore;

/// Render at 30 FPS, independent of the game tick
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

pub struct HumanMode<S: HighScoreStore> {
    session: GameSession<S>,
    frames: watch::Receiver<Snapshot>,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl<S: HighScoreStore> HumanMode<S> {
    pub fn new(config: GameConfig, store: S) -> Self {
        let session = GameSession::new(GameEngine::new(config), store);
        let frames = session.subscribe();

        Self {
            session,
            frames,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut render_timer = interval(FRAME_INTERVAL);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => {
                            return Err(err).context("Failed to read terminal event");
                        }
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick, only scheduled while a round is running
                outcome = self.session.next_tick() => {
                    self.on_tick(outcome);
                }

                // Render frame
                _ = render_timer.tick() => {
                    let snapshot = self.frames.borrow_and_update().clone();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &snapshot, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                info!("Quitting");
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            let action = self.input_handler.handle_key_event(key);
            self.apply(action);
        }
    }

    fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::Turn(direction) => {
                self.session.change_direction(direction);
            }
            KeyAction::Start => {
                // Enter only starts from the title or game-over screen
                if matches!(self.session.phase(), Phase::Idle | Phase::GameOver) {
                    self.start_round();
                }
            }
            KeyAction::Restart => self.start_round(),
            KeyAction::TogglePause => {
                if self.session.toggle_pause() {
                    match self.session.phase() {
                        Phase::Paused => self.metrics.on_pause(),
                        _ => self.metrics.on_resume(),
                    }
                }
            }
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    fn start_round(&mut self) {
        self.session.start();
        self.metrics.on_game_start();
    }

    fn on_tick(&mut self, outcome: TickOutcome) {
        if let TickOutcome::GameOver { .. } = outcome {
            self.metrics.on_game_over();
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;
    use crate::storage::MemoryStore;

    fn mode() -> HumanMode<MemoryStore> {
        HumanMode::new(GameConfig::default(), MemoryStore::with_value(90))
    }

    #[test]
    fn test_game_initialization() {
        let mode = mode();
        assert_eq!(mode.session.phase(), Phase::Idle);
        assert_eq!(mode.frames.borrow().high_score, 90);
        assert!(!mode.metrics.is_running());
    }

    #[test]
    fn test_enter_starts_once() {
        let mut mode = mode();
        mode.apply(KeyAction::Start);
        assert_eq!(mode.session.phase(), Phase::Running);
        assert!(mode.metrics.is_running());

        mode.session.tick();
        let steps = mode.session.state().steps;
        // Enter mid-round does not reset
        mode.apply(KeyAction::Start);
        assert_eq!(mode.session.state().steps, steps);
    }

    #[test]
    fn test_restart_resets_mid_round() {
        let mut mode = mode();
        mode.apply(KeyAction::Start);
        mode.session.tick();

        mode.apply(KeyAction::Restart);
        assert_eq!(mode.session.phase(), Phase::Running);
        assert_eq!(mode.session.state().steps, 0);
    }

    #[test]
    fn test_pause_toggles_clock() {
        let mut mode = mode();
        mode.apply(KeyAction::TogglePause);
        assert_eq!(mode.session.phase(), Phase::Idle);

        mode.apply(KeyAction::Start);
        mode.apply(KeyAction::TogglePause);
        assert_eq!(mode.session.phase(), Phase::Paused);
        assert!(!mode.metrics.is_running());

        mode.apply(KeyAction::TogglePause);
        assert_eq!(mode.session.phase(), Phase::Running);
        assert!(mode.metrics.is_running());
    }

    #[test]
    fn test_turn_is_buffered() {
        let mut mode = mode();
        mode.apply(KeyAction::Start);
        mode.apply(KeyAction::Turn(Direction::Up));

        assert_eq!(mode.session.state().pending_direction, Direction::Up);
        assert_eq!(mode.session.state().snake.direction, Direction::Right);
    }

    #[test]
    fn test_game_over_counts_game() {
        let mut mode = mode();
        mode.apply(KeyAction::Start);

        mode.apply(KeyAction::Turn(Direction::Up));
        let mut outcome = TickOutcome::Skipped;
        for _ in 0..25 {
            outcome = mode.session.tick();
            mode.on_tick(outcome);
            if mode.session.phase() == Phase::GameOver {
                break;
            }
        }

        assert!(matches!(outcome, TickOutcome::GameOver { .. }));
        assert_eq!(mode.metrics.games_played, 1);
        assert!(!mode.metrics.is_running());
    }

    #[test]
    fn test_quit() {
        let mut mode = mode();
        mode.apply(KeyAction::Quit);
        assert!(mode.should_quit);
    }
}
