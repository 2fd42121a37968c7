use chrono::Duration;

/// Decides whether the gap between two ticks means the machine was asleep.
#[derive(Debug, Clone, Copy)]
pub struct SuspendDetector {
    threshold: Duration,
}

impl SuspendDetector {
    pub fn from_duration(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn from_seconds(threshold_s: i64) -> Self {
        Self::from_duration(Duration::seconds(threshold_s))
    }

    pub fn is_suspend_gap(&self, delta: Duration) -> bool {
        self.threshold < delta
    }
}
