use std::time::{Duration, Instant};

/// Play-time clock and game counter shown in the header.
///
/// The clock only runs while a round is being played: pausing and game over
/// freeze it.
pub struct GameMetrics {
    banked: Duration,
    running_since: Option<Instant>,
    pub games_played: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            banked: Duration::ZERO,
            running_since: None,
            games_played: 0,
        }
    }

    pub fn on_game_start(&mut self) {
        self.banked = Duration::ZERO;
        self.running_since = Some(Instant::now());
    }

    pub fn on_pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked += since.elapsed();
        }
    }

    pub fn on_resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    pub fn on_game_over(&mut self) {
        self.on_pause();
        self.games_played += 1;
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        self.banked + self.running_since.map_or(Duration::ZERO, |since| since.elapsed())
    }

    pub fn format_time(&self) -> String {
        format_duration(self.elapsed())
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn format_duration(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatting() {
        assert_eq!(format_duration(Duration::from_secs(125)), "02:05");
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00");
        assert_eq!(format_duration(Duration::from_secs(3661)), "61:01");
    }

    #[test]
    fn test_clock_idle_until_start() {
        let metrics = GameMetrics::new();
        assert!(!metrics.is_running());
        assert_eq!(metrics.elapsed(), Duration::ZERO);
        assert_eq!(metrics.format_time(), "00:00");
    }

    #[test]
    fn test_pause_freezes_clock() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_start();
        std::thread::sleep(Duration::from_millis(30));

        metrics.on_pause();
        let frozen = metrics.elapsed();
        assert!(frozen >= Duration::from_millis(30));

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(metrics.elapsed(), frozen);

        metrics.on_resume();
        std::thread::sleep(Duration::from_millis(10));
        assert!(metrics.elapsed() > frozen);
    }

    #[test]
    fn test_game_over_counts_and_stops() {
        let mut metrics = GameMetrics::new();

        metrics.on_game_start();
        metrics.on_game_over();
        assert_eq!(metrics.games_played, 1);
        assert!(!metrics.is_running());

        metrics.on_game_start();
        metrics.on_game_over();
        assert_eq!(metrics.games_played, 2);
    }

    #[test]
    fn test_game_start_resets_time() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_start();
        std::thread::sleep(Duration::from_millis(50));
        metrics.on_pause();
        assert!(metrics.elapsed().as_millis() >= 50);

        metrics.on_game_start();
        assert!(metrics.elapsed().as_millis() < 50);
    }
}
