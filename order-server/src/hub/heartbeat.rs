//! Periodic liveness sweep

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::SubscriptionHub;

/// Default heartbeat interval
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawn the heartbeat task
pub fn spawn_heartbeat(
    hub: SubscriptionHub,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_heartbeat(hub, interval, shutdown))
}

/// Sweep every `interval` until shutdown
pub async fn run_heartbeat(hub: SubscriptionHub, interval: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let terminated = hub.heartbeat_sweep();
                if terminated > 0 {
                    tracing::info!(
                        terminated,
                        remaining = hub.connection_count(),
                        "Heartbeat sweep"
                    );
                }
            }
        }
    }
    tracing::debug!("Heartbeat stopped");
}
