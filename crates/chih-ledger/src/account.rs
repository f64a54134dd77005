// crates/chih-ledger/src/account.rs
//
// Account Accrual: per-participant staked balance and settled rewards.
//
// An account's pending reward is `staked * (rpt_now - reward_per_token_paid) / SCALE`.
// Settling moves that amount into `rewards` and re-snapshots the accumulator,
// so the next settlement only counts accrual after this instant.

use serde::{Deserialize, Serialize};

use chih_core::{Amount, ChihError};

use crate::fixed::{self, SCALE};

/// Accrual record for one participant.
///
/// Created on first stake and kept (possibly with zero balance) afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerAccount {
    /// Current staked balance in wei.
    pub staked: Amount,
    /// Accumulator value at this account's last checkpoint.
    pub reward_per_token_paid: u128,
    /// Settled, unclaimed reward in wei.
    pub rewards: Amount,
}

impl StakerAccount {
    /// Reward accrued since the last checkpoint, rounded down.
    fn accrued_since_paid(&self, reward_per_token: u128) -> Result<Amount, ChihError> {
        // rpt never decreases and `paid` is always a past rpt value.
        let delta = reward_per_token.saturating_sub(self.reward_per_token_paid);
        if delta == 0 || self.staked == 0 {
            return Ok(0);
        }
        fixed::mul_div_floor(self.staked, delta, SCALE)
    }

    /// Total reward owed if the account were settled at `reward_per_token`.
    pub fn pending(&self, reward_per_token: u128) -> Result<Amount, ChihError> {
        let accrued = self.accrued_since_paid(reward_per_token)?;
        fixed::add(self.rewards, accrued, "account rewards")
    }

    /// Settle accrual up to `reward_per_token` and snapshot it.
    pub fn settle(&mut self, reward_per_token: u128) -> Result<(), ChihError> {
        self.rewards = self.pending(reward_per_token)?;
        self.reward_per_token_paid = reward_per_token;
        Ok(())
    }
}
