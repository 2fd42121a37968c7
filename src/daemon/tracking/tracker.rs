use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::{
    daemon::storage::entities::DailyUsageEntity,
    utils::time::{format_day, DayBoundary},
};

use super::suspend::SuspendDetector;

/// Longest a day can be, with an hour to spare for DST. Stored totals above it are corrupt.
fn max_daily_usage() -> Duration {
    Duration::hours(25)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    NotRunning,
    Running,
    /// The target is running, but the last gap between ticks looked like sleep.
    Suspended,
}

/// What the presentation side needs to know after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub accumulated_seconds: u64,
    pub is_running: bool,
    pub suspended: bool,
    pub day_changed: bool,
    pub phase: TrackerPhase,
}

/// Accumulates the time the target process has been running during the current day.
///
/// The tracker performs no I/O: it is fed timestamps and presence flags by the tracking module and
/// only reports back what changed.
#[derive(Debug, Clone)]
pub struct UsageTracker {
    is_target_running: bool,
    accumulated: Duration,
    last_tick: Option<DateTime<Utc>>,
    current_day: NaiveDate,
    suspended: bool,
    suspend_detector: SuspendDetector,
    day_boundary: DayBoundary,
}

impl UsageTracker {
    pub fn new(now: DateTime<Utc>, suspend_detector: SuspendDetector, day_boundary: DayBoundary) -> Self {
        Self {
            is_target_running: false,
            accumulated: Duration::zero(),
            last_tick: None,
            current_day: day_boundary.day_of(now),
            suspended: false,
            suspend_detector,
            day_boundary,
        }
    }

    /// Creates a tracker that continues from `stored` if it was saved today.
    pub fn resume(
        stored: Option<DailyUsageEntity>,
        now: DateTime<Utc>,
        suspend_detector: SuspendDetector,
        day_boundary: DayBoundary,
    ) -> Self {
        let mut tracker = Self::new(now, suspend_detector, day_boundary);
        let Some(stored) = stored else {
            return tracker;
        };

        match stored.for_day(tracker.current_day) {
            Some(seconds) => match i64::try_from(seconds)
                .ok()
                .and_then(Duration::try_seconds)
                .filter(|v| *v <= max_daily_usage())
            {
                Some(v) => {
                    info!("Resuming with {seconds}s of usage for {}", format_day(stored.date));
                    tracker.accumulated = v;
                }
                None => warn!("Stored usage {seconds}s is longer than a day, starting from zero"),
            },
            None => debug!(
                "Stored usage belongs to {}, starting from zero",
                format_day(stored.date)
            ),
        }
        tracker
    }

    /// Accounts the time since the previous tick.
    ///
    /// A backwards clock counts as zero elapsed time. A gap longer than the suspend threshold is
    /// never counted. When `now` falls into a new day the total is reset first, and only the part
    /// of the gap after midnight is counted.
    pub fn tick(&mut self, now: DateTime<Utc>, target_is_running: bool) -> TickOutcome {
        let delta = match self.last_tick {
            Some(last) if now > last => now - last,
            _ => Duration::zero(),
        };

        self.suspended = self.suspend_detector.is_suspend_gap(delta);
        if self.suspended {
            info!("Gap of {}s between ticks, treating it as a suspend", delta.num_seconds());
        }

        let today = self.day_boundary.day_of(now);
        // A clock stepped back over midnight keeps counting into the current day.
        let day_changed = today > self.current_day;
        let mut counted = delta;
        if day_changed {
            info!(
                "Day changed from {} to {}, resetting {}s of usage",
                format_day(self.current_day),
                format_day(today),
                self.accumulated_seconds()
            );
            self.accumulated = Duration::zero();
            self.current_day = today;
            counted = counted.min(now - self.day_boundary.day_start(now));
        }

        if target_is_running && !self.suspended {
            self.accumulated = self
                .accumulated
                .checked_add(&counted)
                .unwrap_or_else(max_daily_usage)
                .min(max_daily_usage());
        }

        self.is_target_running = target_is_running;
        self.last_tick = Some(now);

        TickOutcome {
            accumulated_seconds: self.accumulated_seconds(),
            is_running: self.is_target_running,
            suspended: self.suspended,
            day_changed,
            phase: self.phase(),
        }
    }

    pub fn phase(&self) -> TrackerPhase {
        match (self.is_target_running, self.suspended) {
            (false, _) => TrackerPhase::NotRunning,
            (true, true) => TrackerPhase::Suspended,
            (true, false) => TrackerPhase::Running,
        }
    }

    pub fn accumulated_seconds(&self) -> u64 {
        self.accumulated.num_seconds().max(0) as u64
    }

    pub fn is_target_running(&self) -> bool {
        self.is_target_running
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn current_day(&self) -> NaiveDate {
        self.current_day
    }

    pub fn snapshot(&self) -> DailyUsageEntity {
        DailyUsageEntity::new(self.current_day, self.accumulated_seconds())
    }
}
