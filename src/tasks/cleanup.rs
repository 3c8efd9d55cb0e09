//! TTL Cleanup Task
//!
//! Background task that periodically purges expired cache entries, so
//! decisions for identities that never return do not sit in memory until
//! LRU pressure removes them.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryCache;

/// Spawns the purge loop. Abort the returned handle on shutdown.
pub fn spawn_cleanup_task(cache: MemoryCache, cleanup_interval_secs: u64) -> JoinHandle<()> {
    spawn_cleanup_every(cache, Duration::from_secs(cleanup_interval_secs.max(1)))
}

fn spawn_cleanup_every(cache: MemoryCache, interval: Duration) -> JoinHandle<()> {
    let store = cache.store();

    tokio::spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.write().await.cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
