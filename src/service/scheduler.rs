//! Periodic background pass over the waiting set.
//!
//! Each tick evicts participants that waited too long and then re-runs
//! matching for everyone left. The task is independent of request handling:
//! it takes the registry lock once per operation and never while a
//! connection holds it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::PairingCoordinator;
use crate::config::GatewayConfig;

/// Scheduler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time between ticks.
    pub interval: Duration,
    /// Evict participants waiting at least this long. `None` disables eviction.
    pub wait_timeout: Option<Duration>,
    /// Whether to re-run matching on every tick.
    pub rescan: bool,
}

impl SchedulerConfig {
    /// Derives scheduler settings from the gateway configuration.
    ///
    /// Returns `None` when `RESCAN_INTERVAL_SECS` is 0.
    #[must_use]
    pub fn from_gateway(config: &GatewayConfig) -> Option<Self> {
        config.rescan_interval().map(|interval| Self {
            interval,
            wait_timeout: config.wait_timeout(),
            rescan: true,
        })
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Participants evicted for waiting too long.
    pub expired: usize,
    /// Pairs made by the re-scan.
    pub paired: usize,
}

/// Runs a single scheduler tick.
pub async fn run_tick(coordinator: &PairingCoordinator, config: &SchedulerConfig) -> TickSummary {
    let expire = async {
        match config.wait_timeout {
            Some(max_wait) => coordinator.expire_waiting(max_wait).await.len(),
            None => 0,
        }
    };
    let rescan = async {
        if config.rescan {
            coordinator.rescan().await.len()
        } else {
            0
        }
    };
    // Eviction queues for the registry lock before the rescan does, so an
    // expired participant is never paired in the same tick.
    let (expired, paired) = tokio::join!(expire, rescan);
    if expired > 0 || paired > 0 {
        tracing::info!(expired, paired, "scheduler tick");
    }
    TickSummary { expired, paired }
}

/// Spawns the scheduler loop. It stops when `shutdown` is cancelled.
pub fn spawn_scheduler(
    coordinator: Arc<PairingCoordinator>,
    config: SchedulerConfig,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    run_tick(&coordinator, &config).await;
                }
            }
        }
        tracing::debug!("scheduler stopped");
    })
}
