use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::LimiterConfig;
use crate::error::Error;
use crate::metrics::SWEPT_TOTAL;
use crate::registry::ClientRegistry;

// Reclamation loop - sweeps idle clients every `sweep_interval` until cancelled

async fn reclaim_idle_clients(
    registry: Arc<ClientRegistry>,
    sweep_interval: Duration,
    idle_threshold: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = interval(sweep_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately, nothing can be idle yet
    ticker.tick().await;

    info!(?sweep_interval, ?idle_threshold, "reclamation loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = registry.sweep(Instant::now(), idle_threshold);
                SWEPT_TOTAL.inc_by(removed as f64);
            }
            _ = shutdown.cancelled() => {
                debug!("reclamation loop shutting down");
                break;
            }
        }
    }
}

/// Starts the reclamation loop on the current runtime. The intervals come
/// from a validated config, so the ticker period is never zero.
pub fn spawn_reclaimer(
    registry: Arc<ClientRegistry>,
    config: &LimiterConfig,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(reclaim_idle_clients(
        registry,
        config.sweep_interval(),
        config.idle_threshold(),
        shutdown,
    ))
}

// A panicked loop means idle clients were no longer being dropped
pub fn reclaimer_outcome(joined: Result<(), JoinError>) -> Result<(), Error> {
    joined.map_err(|e| {
        error!(error = %e, "reclamation task failed");
        Error::Reclaim(e)
    })
}
