// coupon-core/src/tasks/throttle_maintenance.rs

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use crate::throttle::ClaimThrottle;

/// Spawns a background task that periodically forgets addresses whose
/// throttle quota has fully refilled.
pub fn spawn_throttle_prune_task(throttle: ClaimThrottle, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            sleep(interval).await;
            throttle.retain_recent();
            debug!("Throttle pruned; {} addresses tracked", throttle.tracked_keys());
        }
    })
}
