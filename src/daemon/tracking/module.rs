use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::{
    daemon::storage::usage_storage::UsageStorage,
    display::{format_usage_label, random_position, TimerDisplay},
    process_api::ProcessMonitor,
    utils::{clock::Clock, logging::USAGE_TARGET, time::to_chrono},
};

use super::{
    schedule::{should_reposition, Cadence},
    tracker::{TickOutcome, UsageTracker},
};

/// How often the tracking module does each of its periodic jobs.
#[derive(Debug, Clone)]
pub struct TrackingIntervals {
    pub tick: Duration,
    pub save: Duration,
    pub log: Duration,
    pub reposition: Duration,
}

/// Drives the [UsageTracker] from a fixed schedule and pushes its results to the display, the
/// log and the storage.
pub struct TrackingModule<S: UsageStorage> {
    tracker: UsageTracker,
    monitor: Box<dyn ProcessMonitor>,
    display: Box<dyn TimerDisplay>,
    storage: S,
    shutdown: CancellationToken,
    title: String,
    tick_interval: Duration,
    reposition_interval: chrono::Duration,
    save_cadence: Cadence,
    log_cadence: Cadence,
    last_move: DateTime<Utc>,
    time_provider: Box<dyn Clock>,
}

impl<S: UsageStorage> TrackingModule<S> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tracker: UsageTracker,
        monitor: Box<dyn ProcessMonitor>,
        display: Box<dyn TimerDisplay>,
        storage: S,
        shutdown: CancellationToken,
        title: String,
        intervals: TrackingIntervals,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        let start = time_provider.time();
        Self {
            tracker,
            monitor,
            display,
            storage,
            shutdown,
            title,
            tick_interval: intervals.tick,
            reposition_interval: to_chrono(intervals.reposition),
            save_cadence: Cadence::immediate(to_chrono(intervals.save)),
            log_cadence: Cadence::starting_at(to_chrono(intervals.log), start),
            last_move: start,
            time_provider,
        }
    }

    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    fn check_target(&mut self) -> bool {
        match self.monitor.is_running() {
            Ok(v) => v,
            Err(e) => {
                warn!("Couldn't check the target process, assuming it isn't running {e:?}");
                false
            }
        }
    }

    fn update_display(&mut self, outcome: &TickOutcome, now: DateTime<Utc>) -> Result<()> {
        if outcome.is_running {
            if !self.display.is_visible() {
                self.display.show()?;
            }
            self.display
                .render(&format_usage_label(&self.title, outcome.accumulated_seconds))?;
        } else if self.display.is_visible() {
            self.display.hide()?;
        }

        let elapsed_since_last_move = (now - self.last_move).max(chrono::Duration::zero());
        if should_reposition(elapsed_since_last_move, self.reposition_interval) {
            let position = random_position(
                self.display.screen_size(),
                self.display.window_size(),
                &mut rand::thread_rng(),
            );
            self.display.move_to(position)?;
            self.last_move = now;
        }
        Ok(())
    }

    async fn persist(&mut self) -> Result<()> {
        let snapshot = self.tracker.snapshot();
        self.storage.save(&snapshot).await
    }

    /// Runs a single tick at `now`. Failures of the display or the storage are logged, the next
    /// tick tries again.
    pub async fn step(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let running = self.check_target();
        let outcome = self.tracker.tick(now, running);
        debug!("Tick {:?}", outcome);

        if let Err(e) = self.update_display(&outcome, now) {
            error!("Couldn't update the timer display {e:?}");
        }

        if self.save_cadence.poll(now) || outcome.day_changed {
            if let Err(e) = self.persist().await {
                error!("Couldn't save usage {e:?}");
            }
        }

        self.log_usage(&outcome, now);

        outcome
    }

    fn log_usage(&mut self, outcome: &TickOutcome, now: DateTime<Utc>) {
        if self.log_cadence.poll(now) {
            info!(
                target: USAGE_TARGET,
                "usage={}s running={}", outcome.accumulated_seconds, outcome.is_running
            );
        }
    }

    /// Executes the tracking loop until shutdown, then saves usage one last time.
    pub async fn run(mut self) -> Result<()> {
        let mut tick_point = self.time_provider.instant();
        loop {
            tick_point += self.tick_interval;

            let now = self.time_provider.time();
            self.step(now).instrument(info_span!("Tick", %now)).await;

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    break;
                }
                _ = self.time_provider.sleep_until(tick_point) => ()
            }
        }

        info!(
            "Stopping with {}s of usage",
            self.tracker.accumulated_seconds()
        );
        self.persist().await
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::predicate::eq;
    use tempfile::tempdir;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    use crate::{
        daemon::{
            storage::usage_storage::{UsageFileStorage, UsageStorage},
            tracking::{suspend::SuspendDetector, tracker::UsageTracker},
        },
        display::{MockTimerDisplay, Size},
        process_api::MockProcessMonitor,
        utils::{clock::Clock, logging::USAGE_TARGET, time::DayBoundary},
    };

    use super::{TrackingIntervals, TrackingModule};

    struct FixedClock(DateTime<Utc>);

    #[async_trait]
    impl Clock for FixedClock {
        fn time(&self) -> DateTime<Utc> {
            self.0
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn usage_lines(&self) -> usize {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .matches("usage=")
                .count()
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 7, 4, 12, 0, 0).unwrap()
    }

    fn intervals() -> TrackingIntervals {
        TrackingIntervals {
            tick: Duration::from_secs(1),
            save: Duration::from_secs(10),
            log: Duration::from_secs(60),
            reposition: Duration::from_secs(1800),
        }
    }

    fn module(
        monitor: MockProcessMonitor,
        display: MockTimerDisplay,
        storage: UsageFileStorage,
    ) -> TrackingModule<UsageFileStorage> {
        TrackingModule::new(
            UsageTracker::new(start(), SuspendDetector::from_seconds(5), DayBoundary::Utc),
            Box::new(monitor),
            Box::new(display),
            storage,
            CancellationToken::new(),
            "Usage".into(),
            intervals(),
            Box::new(FixedClock(start())),
        )
    }

    #[tokio::test]
    async fn test_running_target_shows_and_renders() -> Result<()> {
        let dir = tempdir()?;
        let mut monitor = MockProcessMonitor::new();
        monitor.expect_is_running().returning(|| Ok(true));

        let mut display = MockTimerDisplay::new();
        display.expect_is_visible().times(1).returning(|| false);
        display.expect_is_visible().returning(|| true);
        display.expect_show().times(1).returning(|| Ok(()));
        display
            .expect_render()
            .with(eq("Usage\n00:00:00"))
            .times(1)
            .returning(|_| Ok(()));
        display
            .expect_render()
            .with(eq("Usage\n00:00:01"))
            .times(1)
            .returning(|_| Ok(()));
        display.expect_move_to().never();

        let mut module = module(monitor, display, UsageFileStorage::new(dir.path().join("u.json")));

        module.step(start()).await;
        let outcome = module.step(start() + chrono::Duration::seconds(1)).await;

        assert_eq!(outcome.accumulated_seconds, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_process_check_counts_as_not_running() -> Result<()> {
        let dir = tempdir()?;
        let mut monitor = MockProcessMonitor::new();
        monitor.expect_is_running().times(1).returning(|| Ok(true));
        monitor
            .expect_is_running()
            .returning(|| Err(anyhow!("no process table")));

        let mut display = MockTimerDisplay::new();
        display.expect_is_visible().times(1).returning(|| false);
        display.expect_is_visible().returning(|| true);
        display.expect_show().times(1).returning(|| Ok(()));
        display.expect_render().times(1).returning(|_| Ok(()));
        display.expect_hide().times(1).returning(|| Ok(()));

        let mut module = module(monitor, display, UsageFileStorage::new(dir.path().join("u.json")));

        module.step(start()).await;
        let outcome = module.step(start() + chrono::Duration::seconds(1)).await;

        assert!(!outcome.is_running);
        assert_eq!(outcome.accumulated_seconds, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_reposition_when_due() -> Result<()> {
        let dir = tempdir()?;
        let mut monitor = MockProcessMonitor::new();
        monitor.expect_is_running().returning(|| Ok(false));

        let mut display = MockTimerDisplay::new();
        display.expect_is_visible().returning(|| false);
        display.expect_screen_size().returning(|| Size {
            width: 1920,
            height: 1080,
        });
        display.expect_window_size().returning(|| Size {
            width: 200,
            height: 80,
        });
        display
            .expect_move_to()
            .withf(|position| position.x <= 1720 && position.y <= 1000)
            .times(1)
            .returning(|_| Ok(()));

        let mut module = module(monitor, display, UsageFileStorage::new(dir.path().join("u.json")));

        module.step(start() + chrono::Duration::seconds(1799)).await;
        module.step(start() + chrono::Duration::seconds(1800)).await;
        module.step(start() + chrono::Duration::seconds(1801)).await;
        Ok(())
    }

    #[tokio::test]
    async fn test_saves_on_first_tick_and_every_interval() -> Result<()> {
        let dir = tempdir()?;
        let mut monitor = MockProcessMonitor::new();
        monitor.expect_is_running().returning(|| Ok(true));

        let mut display = MockTimerDisplay::new();
        display.expect_is_visible().returning(|| true);
        display.expect_render().returning(|_| Ok(()));

        let storage = UsageFileStorage::new(dir.path().join("u.json"));
        let mut module = module(monitor, display, storage);

        module.step(start()).await;
        let reader = UsageFileStorage::new(dir.path().join("u.json"));
        assert_eq!(reader.load().await?.map(|v| v.seconds), Some(0));

        for second in 1..=9 {
            module
                .step(start() + chrono::Duration::seconds(second))
                .await;
        }
        assert_eq!(reader.load().await?.map(|v| v.seconds), Some(0));

        module.step(start() + chrono::Duration::seconds(10)).await;
        assert_eq!(reader.load().await?.map(|v| v.seconds), Some(10));
        Ok(())
    }

    #[tokio::test]
    async fn test_usage_is_logged_once_per_interval() -> Result<()> {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(format!(
                "{USAGE_TARGET}=info"
            )))
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let dir = tempdir()?;
        let mut monitor = MockProcessMonitor::new();
        monitor.expect_is_running().returning(|| Ok(false));
        let mut display = MockTimerDisplay::new();
        display.expect_is_visible().returning(|| false);

        let mut module = module(monitor, display, UsageFileStorage::new(dir.path().join("u.json")));

        module.step(start()).await;
        module.step(start() + chrono::Duration::seconds(59)).await;
        assert_eq!(log.usage_lines(), 0);

        module.step(start() + chrono::Duration::seconds(60)).await;
        assert_eq!(log.usage_lines(), 1);

        module.step(start() + chrono::Duration::seconds(61)).await;
        module.step(start() + chrono::Duration::seconds(119)).await;
        assert_eq!(log.usage_lines(), 1);

        module.step(start() + chrono::Duration::seconds(120)).await;
        assert_eq!(log.usage_lines(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_saves_on_day_change() -> Result<()> {
        let dir = tempdir()?;
        let mut monitor = MockProcessMonitor::new();
        monitor.expect_is_running().returning(|| Ok(true));

        let mut display = MockTimerDisplay::new();
        display.expect_is_visible().returning(|| true);
        display.expect_render().returning(|_| Ok(()));

        let mut module = module(monitor, display, UsageFileStorage::new(dir.path().join("u.json")));
        let midnight = Utc.with_ymd_and_hms(2018, 7, 5, 0, 0, 0).unwrap();

        module.step(start()).await;
        module.step(midnight - chrono::Duration::seconds(2)).await;
        module.step(midnight + chrono::Duration::seconds(2)).await;

        let reader = UsageFileStorage::new(dir.path().join("u.json"));
        let saved = reader.load().await?.ok_or_else(|| anyhow!("nothing saved"))?;
        assert_eq!(saved.date, midnight.date_naive());
        assert_eq!(saved.seconds, 2);
        Ok(())
    }
}
