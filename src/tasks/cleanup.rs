//! Expired Record Purge Task
//!
//! Background task that periodically reclaims expired records from a pool.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CachePool;

/// Spawns a background task that periodically purges expired records.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between runs. Lookups already treat expired records as misses, so the task
/// only reclaims space. Backend failures are logged and retried next interval.
///
/// # Arguments
/// * `pool` - Shared pool to purge
/// * `cleanup_interval_secs` - Interval in seconds between purge runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort it.
///
/// # Example
/// ```ignore
/// let pool = Arc::new(CachePool::new(1000, None)?);
/// let cleanup_handle = spawn_cleanup_task(pool.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(pool: Arc<CachePool>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expired record purge task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            match pool.purge_expired() {
                Ok(0) => debug!("Purge: no expired records found"),
                Ok(removed) => info!("Purge: removed {} expired records", removed),
                Err(err) => warn!(error = %err, "Purge failed"),
            }
        }
    })
}
