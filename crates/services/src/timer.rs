use std::time::Duration;
use tokio::time::{self, Interval, MissedTickBehavior};

/// Schedules the elapsed-time ticks for the runtime loop.
///
/// The coordinator is armed only while the session phase keeps the timer
/// active. Arming after a dormant stretch restarts the underlying interval,
/// so a session never receives a burst of ticks accrued while it was
/// inactive; disarming is idempotent.
pub(crate) struct TimerCoordinator {
    ticker: Interval,
    armed: bool,
}

impl TimerCoordinator {
    pub(crate) fn new(period: Duration) -> Self {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ticker,
            armed: false,
        }
    }

    /// Align arming with the session phase.
    pub(crate) fn sync(&mut self, active: bool) {
        if active && !self.armed {
            self.ticker.reset();
        }
        self.armed = active;
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }

    /// Wait for the next tick. Callers gate this on [`Self::is_armed`].
    pub(crate) async fn tick(&mut self) {
        self.ticker.tick().await;
    }
}
