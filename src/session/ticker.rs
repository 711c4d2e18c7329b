use std::future::pending;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

#[derive(Debug)]
enum TickerState {
    Stopped,
    /// Started, interval not built yet; first tick due at the instant
    Armed(Instant),
    Running(Interval),
}

/// Cancellable periodic tick source.
///
/// `start` and `stop` are plain synchronous calls so the owner can flip the
/// ticker from any state transition; the tokio interval itself is only built
/// the first time [`Ticker::tick`] is polled.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    state: TickerState,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            state: TickerState::Stopped,
        }
    }

    /// Start ticking one period from now, replacing any running schedule
    pub fn start(&mut self) {
        self.state = TickerState::Armed(Instant::now() + self.period);
    }

    pub fn stop(&mut self) {
        self.state = TickerState::Stopped;
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, TickerState::Stopped)
    }

    /// Wait for the next period boundary. Never completes while stopped.
    ///
    /// Cancel safe: dropping the future before it completes loses no tick.
    pub async fn tick(&mut self) {
        if let TickerState::Armed(first) = self.state {
            let mut interval = interval_at(first, self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.state = TickerState::Running(interval);
        }

        match &mut self.state {
            TickerState::Running(interval) => {
                interval.tick().await;
            }
            _ => pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, timeout};

    const PERIOD: Duration = Duration::from_millis(150);

    #[tokio::test(start_paused = true)]
    async fn test_stopped_ticker_never_fires() {
        let mut ticker = Ticker::new(PERIOD);
        assert!(!ticker.is_active());

        let fired = timeout(Duration::from_secs(10), ticker.tick()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let mut ticker = Ticker::new(PERIOD);
        let started = Instant::now();
        ticker.start();
        assert!(ticker.is_active());

        ticker.tick().await;
        assert_eq!(started.elapsed(), PERIOD);

        ticker.tick().await;
        assert_eq!(started.elapsed(), PERIOD * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_ticks() {
        let mut ticker = Ticker::new(PERIOD);
        ticker.start();
        ticker.tick().await;

        ticker.stop();
        assert!(!ticker.is_active());
        let fired = timeout(PERIOD * 10, ticker.tick()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_schedule() {
        let mut ticker = Ticker::new(PERIOD);
        ticker.start();

        advance(Duration::from_millis(100)).await;
        let restarted = Instant::now();
        ticker.start();

        // The old schedule would have fired 50ms from here
        ticker.tick().await;
        assert_eq!(restarted.elapsed(), PERIOD);
    }
}
