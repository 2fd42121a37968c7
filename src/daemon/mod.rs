use anyhow::Result;
use storage::usage_storage::{UsageFileStorage, UsageStorage};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracking::{
    module::{TrackingIntervals, TrackingModule},
    suspend::SuspendDetector,
    tracker::UsageTracker,
};

use crate::{
    config::Config,
    display::{terminal::TerminalDisplay, TimerDisplay},
    process_api::{system::SystemProcessMonitor, ProcessMonitor},
    utils::{
        clock::{Clock, DefaultClock},
        time::to_chrono,
    },
};

pub mod args;
pub mod shutdown;
pub mod storage;
pub mod tracking;

/// Represents the starting point for tracking. Runs until a shutdown signal arrives.
pub async fn start_daemon(config: Config) -> Result<()> {
    info!(
        "Tracking {} into {:?}",
        config.general.process_name, config.general.data_file
    );

    let shutdown_token = CancellationToken::new();

    let module = create_tracking_module(
        &config,
        UsageFileStorage::new(config.general.data_file.clone()),
        SystemProcessMonitor::new(&config.general.process_name),
        TerminalDisplay::stdout(config.window.window_size(), config.window.screen_size()),
        &shutdown_token,
        DefaultClock,
    )
    .await;

    let tracking = async {
        let result = module.run().await;
        // Lets the signal listener finish if tracking stopped on its own.
        shutdown_token.cancel();
        result
    };

    let (_, tracking_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        tracking
    );

    if let Err(tracking_result) = tracking_result {
        error!("Tracking module got an error {:?}", tracking_result);
    }

    Ok(())
}

async fn create_tracking_module<S: UsageStorage>(
    config: &Config,
    storage: S,
    monitor: impl ProcessMonitor + 'static,
    display: impl TimerDisplay + 'static,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
) -> TrackingModule<S> {
    let stored = storage.load().await.unwrap_or_else(|e| {
        warn!("Couldn't load saved usage, starting from zero {e:?}");
        None
    });

    let tracker = UsageTracker::resume(
        stored,
        clock.time(),
        SuspendDetector::from_duration(to_chrono(config.general.suspend_threshold)),
        config.general.day_boundary,
    );

    TrackingModule::new(
        tracker,
        Box::new(monitor),
        Box::new(display),
        storage,
        shutdown_token.clone(),
        config.window.title.clone(),
        TrackingIntervals {
            tick: config.general.tick_interval,
            save: config.general.save_interval,
            log: config.general.log_interval,
            reposition: config.general.reposition_interval,
        },
        Box::new(clock),
    )
}
