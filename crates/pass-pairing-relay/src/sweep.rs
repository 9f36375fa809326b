//! Periodic removal of expired pairing records.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use pass_pairing_core::PairingStore;

const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// Spawn a task that purges expired pairings every `interval` until `shutdown`
/// is cancelled. Intervals below 10ms are raised to 10ms.
pub fn spawn_expiry_sweeper(
    store: Arc<PairingStore>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let interval = interval.max(MIN_SWEEP_INTERVAL);
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs_f64(), "Pairing expiry sweeper started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = store.purge_expired();
                    debug!(removed, remaining = store.len(), "Pairing sweep");
                }
            }
        }
        info!("Pairing expiry sweeper stopped");
    })
}
