// crates/chih-rpc/src/state.rs
//
// Shared ledger state handed to every RPC handler.
//
// The pool sits behind a single tokio RwLock: mutating calls hold the write
// lock for the whole operation, views take the read lock. Events drained from
// the pool after each mutation are forwarded on a broadcast channel.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use chih_core::{AccountId, Amount};
use chih_ledger::{PoolEvent, StakingPool, TokenVault};

/// Capacity of the pool event broadcast channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Replay-protection state that must outlive a restart: the last nonce
/// accepted per account and the accounts that already used the faucet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    pub nonces: BTreeMap<AccountId, u64>,
    pub faucet_claimed: BTreeSet<AccountId>,
}

/// Everything the RPC layer needs to serve the pool.
#[derive(Clone)]
pub struct LedgerSharedState {
    /// The staking pool. One lock serializes all mutations.
    pub pool: Arc<RwLock<StakingPool>>,
    /// Vault of the staking asset (allowances, balances, dev faucet).
    pub vault: Arc<TokenVault>,
    /// Publishes every committed pool event.
    pub events: broadcast::Sender<PoolEvent>,
    /// Highest nonce accepted per account.
    pub nonces: Arc<RwLock<HashMap<AccountId, u64>>>,
    /// Amount minted by `vault/faucet`, 0 when disabled.
    pub faucet_amount: Amount,
    faucet_claimed: Arc<RwLock<HashSet<AccountId>>>,
}

impl std::fmt::Debug for LedgerSharedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerSharedState")
            .field("vault", &self.vault.symbol())
            .field("faucet_amount", &self.faucet_amount)
            .field("subscribers", &self.events.receiver_count())
            .finish()
    }
}

impl LedgerSharedState {
    pub fn new(pool: StakingPool, vault: Arc<TokenVault>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            pool: Arc::new(RwLock::new(pool)),
            vault,
            events,
            nonces: Arc::new(RwLock::new(HashMap::new())),
            faucet_amount: 0,
            faucet_claimed: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Like `new`, but resuming the nonce table and faucet ledger saved by
    /// `auth_snapshot`.
    pub fn restore(pool: StakingPool, vault: Arc<TokenVault>, auth: AuthSnapshot) -> Self {
        let mut state = Self::new(pool, vault);
        state.nonces = Arc::new(RwLock::new(auth.nonces.into_iter().collect()));
        state.faucet_claimed = Arc::new(RwLock::new(auth.faucet_claimed.into_iter().collect()));
        state
    }

    /// Copy of the replay-protection state.
    ///
    /// Callers saving the pool alongside take this while holding the pool
    /// lock; nonces are consumed before the pool is touched, so the copy is
    /// never older than the pool it accompanies.
    pub async fn auth_snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            nonces: self
                .nonces
                .read()
                .await
                .iter()
                .map(|(k, v)| (*k, *v))
                .collect(),
            faucet_claimed: self.faucet_claimed.read().await.iter().copied().collect(),
        }
    }

    /// Enable the development faucet.
    pub fn with_faucet(mut self, amount: Amount) -> Self {
        self.faucet_amount = amount;
        self
    }

    /// Subscribe to committed pool events.
    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.events.subscribe()
    }

    /// Drain the pool's event journal onto the broadcast channel.
    ///
    /// Called while the write lock is still held so subscribers see events in
    /// commit order.
    pub fn publish_events(&self, pool: &mut StakingPool) {
        for event in pool.take_events() {
            // No subscribers is not an error.
            let _ = self.events.send(event);
        }
    }

    /// Record that `account` used the faucet. Returns false if it already had.
    pub async fn mark_faucet_claimed(&self, account: &AccountId) -> bool {
        self.faucet_claimed.write().await.insert(*account)
    }
}
