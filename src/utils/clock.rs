use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Source of wall-clock time and scheduling instants for the tracker. Swapped for a fixed clock in
/// tests so that accounting can be checked against known timestamps.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// Wall-clock time used for usage accounting and day boundaries.
    fn time(&self) -> DateTime<Utc>;

    /// Monotonic instant used for scheduling ticks.
    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
