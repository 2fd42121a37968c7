use chrono::{DateTime, Duration, Utc};

/// Returns true once the window has stayed in one place for at least `interval`.
pub fn should_reposition(elapsed_since_last_move: Duration, interval: Duration) -> bool {
    elapsed_since_last_move >= interval
}

/// Fires a periodic action at most once per `interval`, checked on every tick.
#[derive(Debug, Clone)]
pub struct Cadence {
    interval: Duration,
    last: Option<DateTime<Utc>>,
}

impl Cadence {
    /// Due on the first check.
    pub fn immediate(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// First due one `interval` after `start`.
    pub fn starting_at(interval: Duration, start: DateTime<Utc>) -> Self {
        Self {
            interval,
            last: Some(start),
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last {
            None => true,
            // A clock moved backwards restarts the period instead of blocking it.
            Some(last) if now < last => true,
            Some(last) => now - last >= self.interval,
        }
    }

    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.last = Some(now);
    }

    /// Checks and marks in one go. Returns whether the action should run now.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        let due = self.is_due(now);
        if due {
            self.mark(now);
        }
        due
    }
}
