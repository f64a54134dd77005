// crates/chih-daemon/src/scheduler.rs
//
// Snapshot scheduler for the Chih daemon.
//
// Writes the ledger to disk at a fixed interval and once more on shutdown.

use std::time::Duration;

use crate::shared::DaemonSharedState;

/// Periodically persists the ledger.
pub struct SnapshotScheduler {
    /// Seconds between snapshots; 0 means only on shutdown.
    interval_secs: u64,
    state: DaemonSharedState,
    /// Snapshots written so far.
    written: u64,
}

impl SnapshotScheduler {
    pub fn new(interval_secs: u64, state: DaemonSharedState) -> Self {
        Self {
            interval_secs,
            state,
            written: 0,
        }
    }

    /// Run until ctrl-c, then write a final snapshot.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        tracing::info!(
            "Snapshot scheduler started (interval={}s, path={})",
            self.interval_secs,
            self.state.snapshots.path().display()
        );

        if self.interval_secs == 0 {
            tokio::signal::ctrl_c().await?;
        } else {
            let mut ticker = tokio::time::interval(Duration::from_secs(self.interval_secs));
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    _ = ticker.tick() => self.snapshot_now().await,
                }
            }
        }

        tracing::info!("Snapshot scheduler received shutdown signal");
        self.snapshot_now().await;
        Ok(())
    }

    /// Write one snapshot, logging instead of failing.
    pub async fn snapshot_now(&mut self) {
        match self.state.save_snapshot().await {
            Ok(()) => {
                self.written += 1;
                tracing::trace!("Snapshot {} written", self.written);
            }
            Err(e) => tracing::error!("Ledger snapshot failed: {}", e),
        }
    }
}
