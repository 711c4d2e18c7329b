use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{Direction as Heading, Position};
use crate::metrics::GameMetrics;
use crate::session::{Phase, Snapshot};

/// Green channel never fades below this
const MIN_BODY_GREEN: u8 = 50;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, snapshot: &Snapshot, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(snapshot, metrics), chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        let body = match snapshot.phase {
            Phase::Idle => self.render_start_screen(snapshot),
            Phase::Running | Phase::Paused => self.render_grid(snapshot),
            Phase::GameOver => self.render_game_over(snapshot),
        };
        frame.render_widget(body, game_area);

        frame.render_widget(self.render_controls(snapshot.phase), chunks[2]);
    }

    fn render_grid(&self, snapshot: &Snapshot) -> Paragraph<'_> {
        let mut lines = Vec::with_capacity(snapshot.grid_height);

        for y in 0..snapshot.grid_height {
            let mut spans = Vec::with_capacity(snapshot.grid_width);

            for x in 0..snapshot.grid_width {
                let pos = Position::new(x as i32, y as i32);
                let segment = snapshot.snake.iter().position(|s| *s == pos);

                let cell = match segment {
                    Some(0) => Span::styled(
                        head_glyph(snapshot.direction),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Some(index) => Span::styled("□ ", Style::default().fg(segment_color(index))),
                    None if snapshot.food == Some(pos) => Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    None => Span::styled(". ", Style::default().fg(Color::DarkGray)),
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        let (title, border) = if snapshot.phase == Phase::Paused {
            (" Snake - PAUSED ", Color::Yellow)
        } else {
            (" Snake ", Color::White)
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(border))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, snapshot: &Snapshot, metrics: &GameMetrics) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                snapshot.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("High Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                snapshot.high_score.to_string(),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_start_screen(&self, snapshot: &Snapshot) -> Paragraph<'_> {
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "SNAKE",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Enter",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to start", Style::default().fg(Color::Gray)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Best so far: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    snapshot.high_score.to_string(),
                    Style::default().fg(Color::White),
                ),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White)),
        )
    }

    fn render_game_over(&self, snapshot: &Snapshot) -> Paragraph<'_> {
        let won = snapshot.game_over.is_some_and(|reason| reason.is_win());
        let (headline, colour) = if won {
            ("BOARD CLEARED", Color::Green)
        } else {
            ("GAME OVER", Color::Red)
        };

        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                headline,
                Style::default().fg(colour).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    snapshot.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("High Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    snapshot.high_score.to_string(),
                    Style::default().fg(Color::White),
                ),
            ]),
        ];

        if snapshot.new_high_score {
            text.push(Line::from(vec![Span::styled(
                "New high score!",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )]));
        }

        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "R",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Q",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to quit", Style::default().fg(Color::Gray)),
        ]));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colour)),
        )
    }

    fn render_controls(&self, phase: Phase) -> Paragraph<'_> {
        let mut spans = vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
        ];

        match phase {
            Phase::Idle => {
                spans.push(Span::styled("Enter", Style::default().fg(Color::Green)));
                spans.push(Span::raw(" to start | "));
            }
            Phase::Running => {
                spans.push(Span::styled("Space", Style::default().fg(Color::Yellow)));
                spans.push(Span::raw(" to pause | "));
            }
            Phase::Paused => {
                spans.push(Span::styled("Space", Style::default().fg(Color::Yellow)));
                spans.push(Span::raw(" to resume | "));
            }
            Phase::GameOver => {}
        }

        spans.push(Span::styled("R", Style::default().fg(Color::Green)));
        spans.push(Span::raw(" to restart | "));
        spans.push(Span::styled("Q", Style::default().fg(Color::Red)));
        spans.push(Span::raw(" to quit"));

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn head_glyph(heading: Heading) -> &'static str {
    match heading {
        Heading::Up => "▲ ",
        Heading::Down => "▼ ",
        Heading::Left => "◀ ",
        Heading::Right => "▶ ",
    }
}

/// Body colour for the segment at `index`, fading from head to tail
fn segment_color(index: usize) -> Color {
    let green = 255usize
        .saturating_sub(index.saturating_mul(10))
        .max(MIN_BODY_GREEN as usize);
    Color::Rgb(50, green as u8, 50)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, GameOverReason};
    use ratatui::{Terminal, backend::TestBackend};

    fn snapshot(phase: Phase) -> Snapshot {
        Snapshot {
            phase,
            snake: vec![
                Position::new(5, 10),
                Position::new(4, 10),
                Position::new(3, 10),
            ],
            direction: Direction::Right,
            food: Some(Position::new(12, 3)),
            score: 30,
            high_score: 120,
            grid_width: 25,
            grid_height: 25,
            game_over: None,
            new_high_score: false,
        }
    }

    fn draw(snapshot: &Snapshot) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 40)).unwrap();
        let renderer = Renderer::new();
        let metrics = GameMetrics::new();
        terminal
            .draw(|frame| renderer.render(frame, snapshot, &metrics))
            .unwrap();

        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_segment_colors_fade_to_floor() {
        assert_eq!(segment_color(1), Color::Rgb(50, 245, 50));
        assert_eq!(segment_color(10), Color::Rgb(50, 155, 50));
        assert_eq!(segment_color(20), Color::Rgb(50, 55, 50));
        assert_eq!(segment_color(21), Color::Rgb(50, 50, 50));
        assert_eq!(segment_color(500), Color::Rgb(50, 50, 50));
    }

    #[test]
    fn test_running_frame_shows_board() {
        let text = draw(&snapshot(Phase::Running));

        assert!(text.contains("Score: 30"));
        assert!(text.contains("High Score: 120"));
        assert!(text.contains(" Snake "));
        assert!(text.contains('▶'));
        assert_eq!(text.matches('□').count(), 2);
        assert!(text.contains('O'));
        assert!(!text.contains("PAUSED"));
    }

    #[test]
    fn test_head_points_where_the_snake_is_going() {
        let mut climbing = snapshot(Phase::Running);
        climbing.snake = vec![
            Position::new(5, 8),
            Position::new(5, 9),
            Position::new(5, 10),
        ];
        climbing.direction = Direction::Up;

        let text = draw(&climbing);
        assert!(text.contains('▲'));
        assert!(!text.contains('▶'));
        assert_eq!(text.matches('□').count(), 2);
    }

    #[test]
    fn test_paused_frame_is_marked() {
        let text = draw(&snapshot(Phase::Paused));
        assert!(text.contains("PAUSED"));
        assert!(text.contains("to resume"));
    }

    #[test]
    fn test_idle_frame_prompts_start() {
        let mut idle = snapshot(Phase::Idle);
        idle.snake.clear();
        idle.food = None;

        let text = draw(&idle);
        assert!(text.contains("to start"));
        assert!(text.contains("Best so far: 120"));
        assert!(!text.contains('▶'));
    }

    #[test]
    fn test_game_over_frame() {
        let mut over = snapshot(Phase::GameOver);
        over.game_over = Some(GameOverReason::Wall);
        over.score = 150;
        over.high_score = 150;
        over.new_high_score = true;

        let text = draw(&over);
        assert!(text.contains("GAME OVER"));
        assert!(text.contains("Final Score: 150"));
        assert!(text.contains("New high score!"));
    }

    #[test]
    fn test_board_full_is_shown_as_a_win() {
        let mut over = snapshot(Phase::GameOver);
        over.game_over = Some(GameOverReason::BoardFull);

        let text = draw(&over);
        assert!(text.contains("BOARD CLEARED"));
        assert!(!text.contains("New high score!"));
    }
}
