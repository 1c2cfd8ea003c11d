use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, instrument, warn};

use super::service::SessionCoordinator;

/// Configuration for the cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run the cleanup task
    pub cleanup_interval: Duration,
    /// How long a freshly created room may wait for its first member
    pub unclaimed_room_ttl: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(60),
            unclaimed_room_ttl: Duration::from_secs(10 * 60), // 10 minutes
        }
    }
}

/// Starts the background cleanup task that periodically removes rooms nobody joined
#[instrument(skip(coordinator))]
pub async fn start_cleanup_task(coordinator: Arc<SessionCoordinator>, config: CleanupConfig) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        unclaimed_room_ttl_secs = config.unclaimed_room_ttl.as_secs(),
        "Starting room cleanup background task"
    );

    let ttl = match chrono::Duration::from_std(config.unclaimed_room_ttl) {
        Ok(ttl) => ttl,
        Err(e) => {
            warn!(error = %e, "Unclaimed room TTL out of range, cleanup disabled");
            return;
        }
    };

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;

        let reaped = coordinator.reap_unclaimed_rooms(ttl).await;
        if reaped > 0 {
            info!(reaped_count = reaped, "Room cleanup completed");
        } else {
            debug!("Room cleanup found nothing to reap");
        }
    }
}
