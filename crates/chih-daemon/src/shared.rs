// crates/chih-daemon/src/shared.rs
//
// DaemonSharedState: the ledger state plus what the daemon needs around it.
//
// Constructed once in main.rs, either from the last snapshot or fresh from
// config, then handed to the RPC server, the event logger and the snapshot
// scheduler.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chih_core::crypto::Keypair;
use chih_core::{ChihError, Clock};
use chih_ledger::{PoolConfig, StakingPool, TokenVault};
use chih_rpc::LedgerSharedState;

use crate::config::DaemonConfig;
use crate::persistence::{PersistedLedger, SnapshotStore};

/// File name of the ledger snapshot inside the data directory.
pub const SNAPSHOT_FILE: &str = "ledger.json";

#[derive(Clone)]
pub struct DaemonSharedState {
    /// Pool, vault handle, event channel and nonces shared with the RPC layer.
    pub ledger: LedgerSharedState,
    pub snapshots: SnapshotStore,
    /// Daemon start time for uptime calculation.
    pub start_time: Instant,
}

impl DaemonSharedState {
    /// Restore the ledger from `data_dir`, or create and fund a fresh pool.
    pub fn bootstrap(
        config: &DaemonConfig,
        data_dir: &Path,
        daemon_key: &Keypair,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ChihError> {
        let snapshots = SnapshotStore::new(data_dir.join(SNAPSHOT_FILE));

        let ledger = match snapshots.load()? {
            Some(saved) => {
                let vault = Arc::new(TokenVault::restore(saved.vault));
                let pool = StakingPool::restore(saved.pool, vault.clone(), vault.clone(), clock)?;
                tracing::info!(
                    "Restored ledger from {} (saved {}): {} accounts, total staked {}, {} known signers",
                    snapshots.path().display(),
                    saved.saved_at,
                    pool.account_count(),
                    pool.total_staked(),
                    saved.auth.nonces.len()
                );
                if let Some(configured) = config.owner_account()? {
                    if configured != *pool.owner() {
                        tracing::warn!(
                            "Configured owner {} differs from persisted owner {}; keeping persisted owner",
                            configured,
                            pool.owner()
                        );
                    }
                }
                LedgerSharedState::restore(pool, vault, saved.auth)
            }
            None => {
                let (pool, vault) = fresh_pool(config, daemon_key, clock)?;
                LedgerSharedState::new(pool, vault)
            }
        }
        .with_faucet(config.faucet_amount_wei()?);

        Ok(Self {
            ledger,
            snapshots,
            start_time: Instant::now(),
        })
    }

    /// Write the current ledger to disk.
    ///
    /// Holds the pool read lock while copying the pool, the vault and the
    /// replay state, so no custody movement can land between them.
    pub async fn save_snapshot(&self) -> Result<(), ChihError> {
        let persisted = {
            let pool = self.ledger.pool.read().await;
            let vault = self.ledger.vault.snapshot()?;
            let auth = self.ledger.auth_snapshot().await;
            PersistedLedger::new(pool.snapshot(), vault, auth)
        };
        self.snapshots.save(&persisted)
    }
}

fn fresh_pool(
    config: &DaemonConfig,
    daemon_key: &Keypair,
    clock: Arc<dyn Clock>,
) -> Result<(StakingPool, Arc<TokenVault>), ChihError> {
    let daemon_account = daemon_key.account_id();
    let owner = config.owner_account()?.unwrap_or(daemon_account);
    let vault = Arc::new(TokenVault::new(&config.asset_symbol));

    let mut pool = StakingPool::new(
        PoolConfig {
            staking_asset_id: config.asset_symbol.clone(),
            reward_asset_id: config.asset_symbol.clone(),
            owner,
            reward_rate: config.reward_rate_wei()?,
            emission: config.emission_mode,
        },
        vault.clone(),
        vault.clone(),
        clock,
    );

    let reserve = config.reward_reserve_wei()?;
    if reserve > 0 {
        vault.mint(&daemon_account, reserve)?;
        vault.approve(&daemon_account, reserve)?;
        pool.fund_rewards(&daemon_account, reserve)?;
    }
    for event in pool.take_events() {
        tracing::debug!("Startup event: {}", event.name());
    }

    Ok((pool, vault))
}
