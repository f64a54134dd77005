// crates/chih-ledger/src/accumulator.rs
//
// Ledger Core: the global reward-per-token accumulator.
//
// The accumulator `reward_per_token_stored` is the cumulative reward owed to
// one staked unit (scaled by SCALE) since the pool was created. Advancing it
// to "now" is O(1) regardless of how many accounts exist; each account then
// settles lazily against the difference from its own snapshot.
//
// Two emission modes interpret `reward_rate`:
//   - PerStakedUnit: reward per second per whole staked token (scaled).
//       rpt += elapsed * rate                      (exact, no division)
//   - PoolWide: reward per second for the whole pool (in wei).
//       rpt += floor(elapsed * rate * SCALE / total_staked)
//
// In both modes nothing accrues while total_staked is zero.

use serde::{Deserialize, Serialize};

use chih_core::{Amount, ChihError};

use crate::fixed::{self, SCALE};

/// How the configured reward rate maps onto the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionMode {
    /// `reward_rate` is paid per second to every staked token.
    #[default]
    PerStakedUnit,
    /// `reward_rate` is the whole pool's emission per second, shared pro rata.
    PoolWide,
}

/// Global accrual state owned exclusively by the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardAccumulator {
    /// Configured emission rate (18-decimal fixed point).
    pub reward_rate: u128,
    /// Cumulative reward per staked unit, scaled by SCALE. Never decreases.
    pub reward_per_token_stored: u128,
    /// Unix second of the most recent advancement.
    pub last_update_time: u64,
    /// Sum of every account's staked balance.
    pub total_staked: Amount,
    /// Interpretation of `reward_rate`.
    pub emission: EmissionMode,
}

impl RewardAccumulator {
    /// Create an accumulator starting at `now` with nothing staked.
    pub fn new(reward_rate: u128, emission: EmissionMode, now: u64) -> Self {
        Self {
            reward_rate,
            reward_per_token_stored: 0,
            last_update_time: now,
            total_staked: 0,
            emission,
        }
    }

    /// Accumulator growth over `elapsed` seconds at the current rate and stake.
    ///
    /// PoolWide rounds down; PerStakedUnit is exact.
    pub fn growth(&self, elapsed: u64) -> Result<u128, ChihError> {
        if elapsed == 0 || self.total_staked == 0 || self.reward_rate == 0 {
            return Ok(0);
        }
        match self.emission {
            EmissionMode::PerStakedUnit => {
                fixed::mul(elapsed as u128, self.reward_rate, "accumulator growth")
            }
            EmissionMode::PoolWide => {
                let emitted = fixed::mul(elapsed as u128, self.reward_rate, "pool emission")?;
                fixed::mul_div_floor(emitted, SCALE, self.total_staked)
            }
        }
    }

    /// Value the accumulator would hold at `now`, without mutating.
    pub fn reward_per_token(&self, now: u64) -> Result<u128, ChihError> {
        let growth = self.growth(self.elapsed_until(now))?;
        fixed::add(self.reward_per_token_stored, growth, "reward_per_token")
    }

    /// Advance the accumulator to `now` using the current rate.
    ///
    /// A clock reading behind `last_update_time` counts as zero elapsed time;
    /// neither field ever moves backwards.
    pub fn checkpoint(&mut self, now: u64) -> Result<u128, ChihError> {
        let rpt = self.reward_per_token(now)?;
        self.reward_per_token_stored = rpt;
        self.last_update_time = self.last_update_time.max(now);
        Ok(rpt)
    }

    /// Reward-per-token growth over one year at the current rate and stake.
    pub fn annual_growth(&self) -> Result<u128, ChihError> {
        self.growth(SECONDS_PER_YEAR)
    }

    fn elapsed_until(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_update_time)
    }
}

/// 365 days.
pub const SECONDS_PER_YEAR: u64 = 60 * 60 * 24 * 365;
