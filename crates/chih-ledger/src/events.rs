// crates/chih-ledger/src/events.rs
//
// Observable pool events consumed by UI and indexing layers.
//
// Each successful operation appends exactly its events to the pool's
// journal. Failed operations append nothing.

use serde::{Deserialize, Serialize};

use chih_core::{AccountId, Amount};

/// Events emitted by the staking pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PoolEvent {
    /// `amount` of the staking asset was deposited by `account`.
    Staked { account: AccountId, amount: Amount },
    /// `amount` of the staking asset was returned to `account`.
    Withdrawn { account: AccountId, amount: Amount },
    /// `amount` of the reward asset was paid to `account`.
    RewardPaid { account: AccountId, amount: Amount },
    /// The Rate Authority changed the emission rate.
    RewardRateChanged { old_rate: u128, new_rate: u128 },
    /// The Rate Authority handed control to a new identity.
    OwnershipTransferred {
        previous_owner: AccountId,
        new_owner: AccountId,
    },
    /// Reward asset was added to pool custody.
    RewardsFunded { funder: AccountId, amount: Amount },
}

impl PoolEvent {
    /// Short event name, as used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            PoolEvent::Staked { .. } => "Staked",
            PoolEvent::Withdrawn { .. } => "Withdrawn",
            PoolEvent::RewardPaid { .. } => "RewardPaid",
            PoolEvent::RewardRateChanged { .. } => "RewardRateChanged",
            PoolEvent::OwnershipTransferred { .. } => "OwnershipTransferred",
            PoolEvent::RewardsFunded { .. } => "RewardsFunded",
        }
    }
}
