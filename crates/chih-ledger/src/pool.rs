// crates/chih-ledger/src/pool.rs
//
// StakingPool: the reward-accrual ledger.
//
// Every mutating operation follows the same shape:
//   1. Guard clauses (amount > 0, owner check).
//   2. Checkpoint on scratch copies: advance the accumulator to now under the
//      current rate, then settle the named account against it.
//   3. Apply the operation's balance change to the scratch copies.
//   4. Move assets through the collaborator.
//   5. Commit the scratch copies and journal the event.
//
// Any error in steps 2-4 returns before step 5, so a failed call leaves the
// accumulator, every account and the event journal exactly as they were.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use chih_core::{AccountId, Amount, AssetTransfer, ChihError, Clock};

use crate::account::StakerAccount;
use crate::accumulator::{EmissionMode, RewardAccumulator};
use crate::events::PoolEvent;
use crate::fixed;

/// Construction parameters for a pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Identifier of the asset participants deposit.
    pub staking_asset_id: String,
    /// Identifier of the asset rewards are paid in (may equal the staking asset).
    pub reward_asset_id: String,
    /// Rate Authority.
    pub owner: AccountId,
    /// Initial emission rate (18-decimal fixed point).
    pub reward_rate: u128,
    #[serde(default)]
    pub emission: EmissionMode,
}

/// Read-only summary of the pool, as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub staking_asset_id: String,
    pub reward_asset_id: String,
    pub owner: AccountId,
    pub emission: EmissionMode,
    pub reward_rate: u128,
    pub total_staked: Amount,
    /// Stored accumulator value.
    pub reward_per_token_stored: u128,
    /// Accumulator projected to `as_of`.
    pub reward_per_token: u128,
    pub last_update_time: u64,
    pub as_of: u64,
    pub account_count: usize,
    /// Reward per staked token over the next 365 days at the current rate and
    /// stake (scaled by SCALE). Divide by SCALE and multiply by 100 for an APR
    /// percentage when both assets share a price.
    pub annual_reward_per_token: u128,
}

/// Serializable image of the full ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub staking_asset_id: String,
    pub reward_asset_id: String,
    pub owner: AccountId,
    pub accumulator: RewardAccumulator,
    pub accounts: BTreeMap<AccountId, StakerAccount>,
}

/// Scratch state produced by a checkpoint, committed only on success.
struct Checkpoint {
    accumulator: RewardAccumulator,
    account: Option<(AccountId, StakerAccount)>,
}

impl Checkpoint {
    fn account_mut(&mut self) -> Result<&mut StakerAccount, ChihError> {
        self.account
            .as_mut()
            .map(|(_, acct)| acct)
            .ok_or_else(|| ChihError::InvalidState("checkpoint has no account".to_string()))
    }
}

/// The staking pool and its reward-accrual ledger.
///
/// Exclusively owns the global accumulator and all accounts. Callers that
/// share a pool across tasks wrap it in a single lock (see chih-daemon) so
/// mutations are serialized and reads observe a consistent state.
pub struct StakingPool {
    staking_asset_id: String,
    reward_asset_id: String,
    owner: AccountId,
    accumulator: RewardAccumulator,
    accounts: HashMap<AccountId, StakerAccount>,
    staking_asset: Arc<dyn AssetTransfer>,
    reward_asset: Arc<dyn AssetTransfer>,
    clock: Arc<dyn Clock>,
    events: Vec<PoolEvent>,
}

impl fmt::Debug for StakingPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StakingPool")
            .field("staking_asset_id", &self.staking_asset_id)
            .field("owner", &self.owner)
            .field("accumulator", &self.accumulator)
            .field("accounts", &self.accounts.len())
            .finish()
    }
}

impl StakingPool {
    /// Create a pool with nothing staked, starting its accumulator at the
    /// clock's current time.
    pub fn new(
        config: PoolConfig,
        staking_asset: Arc<dyn AssetTransfer>,
        reward_asset: Arc<dyn AssetTransfer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let accumulator = RewardAccumulator::new(config.reward_rate, config.emission, clock.now());
        tracing::info!(
            "Staking pool created: asset={} reward_asset={} owner={} rate={} mode={:?}",
            config.staking_asset_id,
            config.reward_asset_id,
            config.owner,
            config.reward_rate,
            config.emission
        );
        Self {
            staking_asset_id: config.staking_asset_id,
            reward_asset_id: config.reward_asset_id,
            owner: config.owner,
            accumulator,
            accounts: HashMap::new(),
            staking_asset,
            reward_asset,
            clock,
            events: Vec::new(),
        }
    }

    /// Rebuild a pool from a snapshot.
    ///
    /// # Errors
    /// Returns `ChihError::InvalidState` if the snapshot's total stake does
    /// not equal the sum of its account balances.
    pub fn restore(
        snapshot: PoolSnapshot,
        staking_asset: Arc<dyn AssetTransfer>,
        reward_asset: Arc<dyn AssetTransfer>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ChihError> {
        let sum = snapshot
            .accounts
            .values()
            .try_fold(0u128, |acc, a| fixed::add(acc, a.staked, "snapshot stake sum"))?;
        if sum != snapshot.accumulator.total_staked {
            return Err(ChihError::InvalidState(format!(
                "snapshot total_staked {} does not match account sum {}",
                snapshot.accumulator.total_staked, sum
            )));
        }

        Ok(Self {
            staking_asset_id: snapshot.staking_asset_id,
            reward_asset_id: snapshot.reward_asset_id,
            owner: snapshot.owner,
            accumulator: snapshot.accumulator,
            accounts: snapshot.accounts.into_iter().collect(),
            staking_asset,
            reward_asset,
            clock,
            events: Vec::new(),
        })
    }

    /// Capture the full ledger state.
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            staking_asset_id: self.staking_asset_id.clone(),
            reward_asset_id: self.reward_asset_id.clone(),
            owner: self.owner,
            accumulator: self.accumulator.clone(),
            accounts: self.accounts.iter().map(|(k, v)| (*k, v.clone())).collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Checkpoint
    // -----------------------------------------------------------------------

    /// Advance the accumulator to now and settle `account` against it, on
    /// scratch copies.
    fn update_reward(&self, account: Option<&AccountId>) -> Result<Checkpoint, ChihError> {
        let now = self.clock.now();
        let mut accumulator = self.accumulator.clone();
        let rpt = accumulator.checkpoint(now)?;

        let account = match account {
            Some(id) => {
                let mut acct = self.accounts.get(id).cloned().unwrap_or_default();
                acct.settle(rpt)?;
                Some((*id, acct))
            }
            None => None,
        };

        tracing::debug!(
            "Checkpoint at {}: rpt={} total_staked={}",
            now,
            rpt,
            accumulator.total_staked
        );

        Ok(Checkpoint {
            accumulator,
            account,
        })
    }

    fn commit(&mut self, checkpoint: Checkpoint) {
        self.accumulator = checkpoint.accumulator;
        if let Some((id, acct)) = checkpoint.account {
            // Accounts come into existence on first stake, not on a no-op claim.
            if acct.staked > 0 || acct.rewards > 0 || self.accounts.contains_key(&id) {
                self.accounts.insert(id, acct);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Participant operations
    // -----------------------------------------------------------------------

    /// Deposit `amount` of the staking asset for `account`.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount` is zero.
    /// - `TransferFailed` if the asset could not be pulled from `account`.
    pub fn stake(&mut self, account: &AccountId, amount: Amount) -> Result<(), ChihError> {
        if amount == 0 {
            tracing::warn!("Rejected stake of 0 by {}", account.short());
            return Err(ChihError::InvalidAmount);
        }

        let mut checkpoint = self.update_reward(Some(account))?;
        let acct = checkpoint.account_mut()?;
        acct.staked = fixed::add(acct.staked, amount, "staked balance")?;
        checkpoint.accumulator.total_staked =
            fixed::add(checkpoint.accumulator.total_staked, amount, "total staked")?;

        self.staking_asset
            .transfer_in(account, amount)
            .inspect_err(|e| tracing::warn!("Stake by {} failed: {}", account.short(), e))?;

        self.commit(checkpoint);
        self.events.push(PoolEvent::Staked {
            account: *account,
            amount,
        });
        tracing::info!(
            "Staked {} by {} (total staked {})",
            amount,
            account.short(),
            self.accumulator.total_staked
        );
        Ok(())
    }

    /// Return `amount` of the staking asset to `account`.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount` is zero.
    /// - `InsufficientStake` if `amount` exceeds the account's balance.
    /// - `TransferFailed` if the pool could not pay out.
    pub fn withdraw(&mut self, account: &AccountId, amount: Amount) -> Result<(), ChihError> {
        if amount == 0 {
            tracing::warn!("Rejected withdrawal of 0 by {}", account.short());
            return Err(ChihError::InvalidAmount);
        }

        let mut checkpoint = self.update_reward(Some(account))?;
        let acct = checkpoint.account_mut()?;
        if amount > acct.staked {
            tracing::warn!(
                "Rejected withdrawal of {} by {}: only {} staked",
                amount,
                account.short(),
                acct.staked
            );
            return Err(ChihError::InsufficientStake {
                requested: amount,
                staked: acct.staked,
            });
        }
        acct.staked = fixed::sub(acct.staked, amount, "staked balance")?;
        checkpoint.accumulator.total_staked =
            fixed::sub(checkpoint.accumulator.total_staked, amount, "total staked")?;

        self.staking_asset
            .transfer_out(account, amount)
            .inspect_err(|e| tracing::warn!("Withdrawal by {} failed: {}", account.short(), e))?;

        self.commit(checkpoint);
        self.events.push(PoolEvent::Withdrawn {
            account: *account,
            amount,
        });
        tracing::info!(
            "Withdrawn {} by {} (total staked {})",
            amount,
            account.short(),
            self.accumulator.total_staked
        );
        Ok(())
    }

    /// Pay out everything `account` has accrued. Returns the amount paid.
    ///
    /// Nothing owed is a successful no-op: no transfer and no event.
    ///
    /// # Errors
    /// `TransferFailed` if the pool's reward custody cannot cover the payout;
    /// the reward stays owed.
    pub fn claim_rewards(&mut self, account: &AccountId) -> Result<Amount, ChihError> {
        let mut checkpoint = self.update_reward(Some(account))?;
        let acct = checkpoint.account_mut()?;
        let reward = acct.rewards;

        if reward == 0 {
            self.commit(checkpoint);
            tracing::debug!("Claim by {}: nothing owed", account.short());
            return Ok(0);
        }
        acct.rewards = 0;

        self.reward_asset
            .transfer_out(account, reward)
            .inspect_err(|e| tracing::warn!("Reward claim by {} failed: {}", account.short(), e))?;

        self.commit(checkpoint);
        self.events.push(PoolEvent::RewardPaid {
            account: *account,
            amount: reward,
        });
        tracing::info!("Reward {} paid to {}", reward, account.short());
        Ok(reward)
    }

    /// Withdraw the whole staked balance, then claim rewards.
    ///
    /// Each step is atomic on its own. If the claim step fails the withdrawal
    /// stays committed and the settled reward remains claimable later.
    /// Returns `(withdrawn, reward_paid)`.
    ///
    /// # Errors
    /// `InvalidAmount` if nothing is staked, otherwise as `withdraw` and
    /// `claim_rewards`.
    pub fn exit(&mut self, account: &AccountId) -> Result<(Amount, Amount), ChihError> {
        let staked = self.balance_of(account);
        self.withdraw(account, staked)?;
        let reward = self.claim_rewards(account)?;
        Ok((staked, reward))
    }

    /// Add `amount` of the reward asset to pool custody from `funder`.
    ///
    /// Does not touch accrual state.
    pub fn fund_rewards(&mut self, funder: &AccountId, amount: Amount) -> Result<(), ChihError> {
        if amount == 0 {
            return Err(ChihError::InvalidAmount);
        }
        self.reward_asset.transfer_in(funder, amount)?;
        self.events.push(PoolEvent::RewardsFunded {
            funder: *funder,
            amount,
        });
        tracing::info!("Reward reserve funded with {} by {}", amount, funder.short());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Rate Authority
    // -----------------------------------------------------------------------

    fn require_owner(&self, caller: &AccountId, action: &str) -> Result<(), ChihError> {
        if *caller != self.owner {
            tracing::warn!("Rejected {} by non-owner {}", action, caller.short());
            return Err(ChihError::NotAuthorized(format!(
                "{} may only be called by the pool owner",
                action
            )));
        }
        Ok(())
    }

    /// Change the emission rate.
    ///
    /// Accrual up to now is settled at the old rate before the new one applies.
    ///
    /// # Errors
    /// `NotAuthorized` if `caller` is not the owner.
    pub fn set_reward_rate(&mut self, caller: &AccountId, new_rate: u128) -> Result<(), ChihError> {
        self.require_owner(caller, "set_reward_rate")?;

        let mut checkpoint = self.update_reward(None)?;
        let old_rate = checkpoint.accumulator.reward_rate;
        checkpoint.accumulator.reward_rate = new_rate;

        self.commit(checkpoint);
        self.events.push(PoolEvent::RewardRateChanged { old_rate, new_rate });
        tracing::info!("Reward rate changed: {} -> {}", old_rate, new_rate);
        Ok(())
    }

    /// Hand the Rate Authority role to `new_owner`.
    ///
    /// # Errors
    /// `NotAuthorized` if `caller` is not the owner.
    pub fn transfer_ownership(
        &mut self,
        caller: &AccountId,
        new_owner: AccountId,
    ) -> Result<(), ChihError> {
        self.require_owner(caller, "transfer_ownership")?;

        let previous_owner = self.owner;
        self.owner = new_owner;
        self.events.push(PoolEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        tracing::info!("Ownership transferred: {} -> {}", previous_owner, new_owner);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// What `claim_rewards` would pay right now. Does not mutate.
    pub fn earned(&self, account: &AccountId) -> Result<Amount, ChihError> {
        match self.accounts.get(account) {
            Some(acct) => acct.pending(self.reward_per_token()?),
            None => Ok(0),
        }
    }

    /// Accumulator projected to now.
    pub fn reward_per_token(&self) -> Result<u128, ChihError> {
        self.accumulator.reward_per_token(self.clock.now())
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.accounts.get(account).map(|a| a.staked).unwrap_or(0)
    }

    pub fn account(&self, account: &AccountId) -> Option<&StakerAccount> {
        self.accounts.get(account)
    }

    pub fn total_staked(&self) -> Amount {
        self.accumulator.total_staked
    }

    pub fn reward_rate(&self) -> u128 {
        self.accumulator.reward_rate
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn accumulator(&self) -> &RewardAccumulator {
        &self.accumulator
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Summary of the pool as of now.
    pub fn pool_info(&self) -> Result<PoolInfo, ChihError> {
        let as_of = self.clock.now();
        Ok(PoolInfo {
            staking_asset_id: self.staking_asset_id.clone(),
            reward_asset_id: self.reward_asset_id.clone(),
            owner: self.owner,
            emission: self.accumulator.emission,
            reward_rate: self.accumulator.reward_rate,
            total_staked: self.accumulator.total_staked,
            reward_per_token_stored: self.accumulator.reward_per_token_stored,
            reward_per_token: self.accumulator.reward_per_token(as_of)?,
            last_update_time: self.accumulator.last_update_time,
            as_of,
            account_count: self.accounts.len(),
            annual_reward_per_token: self.accumulator.annual_growth()?,
        })
    }

    /// Drain the events journaled since the last call.
    pub fn take_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check that `total_staked` equals the sum of all account balances.
    pub fn check_conservation(&self) -> Result<(), ChihError> {
        let sum = self
            .accounts
            .values()
            .try_fold(0u128, |acc, a| fixed::add(acc, a.staked, "stake sum"))?;
        if sum != self.accumulator.total_staked {
            return Err(ChihError::InvalidState(format!(
                "total_staked {} != sum of balances {}",
                self.accumulator.total_staked, sum
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::fixed::SCALE;
    use crate::vault::TokenVault;

    /// 0.01 CHIH per second per staked CHIH, the deployment test rate.
    const RATE: u128 = SCALE / 100;
    const START: u64 = 1_700_000_000;

    struct Harness {
        pool: StakingPool,
        vault: Arc<TokenVault>,
        clock: ManualClock,
        owner: AccountId,
    }

    fn id(n: u8) -> AccountId {
        AccountId::from_bytes([n; 32])
    }

    fn harness_with(mode: EmissionMode) -> Harness {
        let vault = Arc::new(TokenVault::new("CHIH"));
        let clock = ManualClock::new(START);
        let owner = id(0xaa);
        let pool = StakingPool::new(
            PoolConfig {
                staking_asset_id: "CHIH".to_string(),
                reward_asset_id: "CHIH".to_string(),
                owner,
                reward_rate: RATE,
                emission: mode,
            },
            vault.clone(),
            vault.clone(),
            Arc::new(clock.clone()),
        );
        let mut h = Harness {
            pool,
            vault,
            clock,
            owner,
        };
        // Pre-fund the reward reserve with 100,000 CHIH.
        h.fund(&owner, 100_000 * SCALE);
        h.pool.fund_rewards(&owner, 100_000 * SCALE).unwrap();
        h.pool.take_events();
        h
    }

    fn harness() -> Harness {
        harness_with(EmissionMode::PerStakedUnit)
    }

    impl Harness {
        fn fund(&self, who: &AccountId, amount: Amount) {
            self.vault.mint(who, amount).unwrap();
            self.vault
                .approve(who, self.vault.allowance(who).unwrap() + amount)
                .unwrap();
        }
    }

    #[test]
    fn test_stake_updates_balances_and_emits() {
        let mut h = harness();
        let alice = id(1);
        h.fund(&alice, 10_000 * SCALE);

        h.pool.stake(&alice, 1_000 * SCALE).unwrap();

        assert_eq!(h.pool.balance_of(&alice), 1_000 * SCALE);
        assert_eq!(h.pool.total_staked(), 1_000 * SCALE);
        assert_eq!(h.vault.balance_of(&alice).unwrap(), 9_000 * SCALE);
        assert_eq!(
            h.pool.take_events(),
            vec![PoolEvent::Staked {
                account: alice,
                amount: 1_000 * SCALE
            }]
        );
    }

    #[test]
    fn test_stake_zero_rejected() {
        let mut h = harness();
        assert_eq!(h.pool.stake(&id(1), 0), Err(ChihError::InvalidAmount));
        assert!(h.pool.take_events().is_empty());
    }

    #[test]
    fn test_stake_without_allowance_rolls_back_checkpoint() {
        let mut h = harness();
        let alice = id(1);
        let bob = id(2);
        h.fund(&alice, 1_000 * SCALE);
        h.pool.stake(&alice, 1_000 * SCALE).unwrap();
        h.pool.take_events();

        h.clock.advance(50);
        let acc_before = h.pool.accumulator().clone();

        // Bob has no tokens at all.
        let err = h.pool.stake(&bob, 10 * SCALE).unwrap_err();
        assert!(matches!(err, ChihError::TransferFailed(_)));

        assert_eq!(h.pool.accumulator(), &acc_before);
        assert!(h.pool.account(&bob).is_none());
        assert!(h.pool.take_events().is_empty());
    }

    #[test]
    fn test_withdraw_returns_tokens() {
        let mut h = harness();
        let alice = id(1);
        h.fund(&alice, 10_000 * SCALE);
        h.pool.stake(&alice, 1_000 * SCALE).unwrap();
        h.pool.take_events();

        h.pool.withdraw(&alice, 500 * SCALE).unwrap();

        assert_eq!(h.pool.balance_of(&alice), 500 * SCALE);
        assert_eq!(h.pool.total_staked(), 500 * SCALE);
        assert_eq!(h.vault.balance_of(&alice).unwrap(), 9_500 * SCALE);
        assert_eq!(
            h.pool.take_events(),
            vec![PoolEvent::Withdrawn {
                account: alice,
                amount: 500 * SCALE
            }]
        );
    }

    #[test]
    fn test_withdraw_guards() {
        let mut h = harness();
        let alice = id(1);
        h.fund(&alice, 1_000 * SCALE);
        h.pool.stake(&alice, 1_000 * SCALE).unwrap();

        assert_eq!(h.pool.withdraw(&alice, 0), Err(ChihError::InvalidAmount));
        assert_eq!(
            h.pool.withdraw(&alice, 1_000 * SCALE + 1),
            Err(ChihError::InsufficientStake {
                requested: 1_000 * SCALE + 1,
                staked: 1_000 * SCALE
            })
        );
        assert_eq!(h.pool.balance_of(&alice), 1_000 * SCALE);
    }

    #[test]
    fn test_account_persists_after_full_withdrawal() {
        let mut h = harness();
        let alice = id(1);
        h.fund(&alice, 1_000 * SCALE);
        h.pool.stake(&alice, 1_000 * SCALE).unwrap();
        h.pool.withdraw(&alice, 1_000 * SCALE).unwrap();
        assert!(h.pool.account(&alice).is_some());
        assert_eq!(h.pool.balance_of(&alice), 0);
    }

    #[test]
    fn test_single_staker_accrual_scenario() {
        let mut h = harness();
        let alice = id(1);
        h.fund(&alice, 10_000 * SCALE);
        h.pool.stake(&alice, 1_000 * SCALE).unwrap();

        h.clock.advance(100);

        // 0.01 * 1000 * 100 = 1000 CHIH, exact in per-staked-unit mode.
        assert_eq!(h.pool.earned(&alice).unwrap(), 1_000 * SCALE);
    }

    #[test]
    fn test_claim_pays_earned_and_resets() {
        let mut h = harness();
        let alice = id(1);
        h.fund(&alice, 1_000 * SCALE);
        h.pool.stake(&alice, 1_000 * SCALE).unwrap();
        h.pool.take_events();
        h.clock.advance(100);

        let earned = h.pool.earned(&alice).unwrap();
        let paid = h.pool.claim_rewards(&alice).unwrap();

        assert_eq!(paid, earned);
        assert_eq!(h.pool.earned(&alice).unwrap(), 0);
        assert_eq!(h.vault.balance_of(&alice).unwrap(), earned);
        assert_eq!(
            h.pool.take_events(),
            vec![PoolEvent::RewardPaid {
                account: alice,
                amount: earned
            }]
        );
    }

    #[test]
    fn test_claim_with_nothing_owed_emits_nothing() {
        let mut h = harness();
        let alice = id(1);
        h.fund(&alice, 1_000 * SCALE);
        h.pool.stake(&alice, 1_000 * SCALE).unwrap();
        h.pool.take_events();

        assert_eq!(h.pool.claim_rewards(&alice).unwrap(), 0);
        assert!(h.pool.take_events().is_empty());

        // A stranger claiming does not create an account.
        assert_eq!(h.pool.claim_rewards(&id(9)).unwrap(), 0);
        assert!(h.pool.account(&id(9)).is_none());
        assert!(h.pool.take_events().is_empty());
    }

    #[test]
    fn test_claim_fails_atomically_when_reserve_empty() {
        let vault = Arc::new(TokenVault::new("CHIH"));
        let rewards = Arc::new(TokenVault::new("RWD"));
        let clock = ManualClock::new(START);
        let owner = id(0xaa);
        let alice = id(1);
        let mut pool = StakingPool::new(
            PoolConfig {
                staking_asset_id: "CHIH".to_string(),
                reward_asset_id: "RWD".to_string(),
                owner,
                reward_rate: RATE,
                emission: EmissionMode::PerStakedUnit,
            },
            vault.clone(),
            rewards.clone(),
            Arc::new(clock.clone()),
        );
        vault.mint(&alice, SCALE).unwrap();
        vault.approve(&alice, SCALE).unwrap();
        pool.stake(&alice, SCALE).unwrap();
        pool.take_events();
        clock.advance(10);

        let owed = pool.earned(&alice).unwrap();
        let snapshot = pool.snapshot();
        assert!(matches!(
            pool.claim_rewards(&alice),
            Err(ChihError::TransferFailed(_))
        ));
        assert_eq!(pool.snapshot(), snapshot);
        assert_eq!(pool.earned(&alice).unwrap(), owed);
        assert!(pool.take_events().is_empty());
    }

    #[test]
    fn test_proportional_rewards() {
        let mut h = harness();
        let (a, b) = (id(1), id(2));
        h.fund(&a, 1_000 * SCALE);
        h.fund(&b, 2_000 * SCALE);
        h.pool.stake(&a, 1_000 * SCALE).unwrap();
        h.pool.stake(&b, 2_000 * SCALE).unwrap();

        h.clock.advance(100);

        let ea = h.pool.earned(&a).unwrap();
        let eb = h.pool.earned(&b).unwrap();
        assert_eq!(ea, 1_000 * SCALE);
        assert_eq!(eb, 2 * ea);
    }

    #[test]
    fn test_pool_wide_mode_splits_emission() {
        let mut h = harness_with(EmissionMode::PoolWide);
        let (a, b) = (id(1), id(2));
        h.fund(&a, 1_000 * SCALE);
        h.fund(&b, 3_000 * SCALE);
        h.pool.stake(&a, 1_000 * SCALE).unwrap();
        h.pool.stake(&b, 3_000 * SCALE).unwrap();

        h.clock.advance(100);

        // 100s * 0.01 CHIH/s = 1 CHIH for the whole pool, split 1:3.
        let ea = h.pool.earned(&a).unwrap();
        let eb = h.pool.earned(&b).unwrap();
        assert!(ea <= SCALE / 4 && SCALE / 4 - ea <= 2);
        assert!(eb <= 3 * SCALE / 4 && 3 * SCALE / 4 - eb <= 4);
        assert!(ea + eb <= SCALE);
    }

    #[test]
    fn test_late_staker_does_not_earn_past_accrual() {
        let mut h = harness();
        let (a, b) = (id(1), id(2));
        h.fund(&a, 1_000 * SCALE);
        h.fund(&b, 1_000 * SCALE);
        h.pool.stake(&a, 1_000 * SCALE).unwrap();
        h.clock.advance(100);
        h.pool.stake(&b, 1_000 * SCALE).unwrap();
        assert_eq!(h.pool.earned(&b).unwrap(), 0);
        h.clock.advance(10);
        assert_eq!(h.pool.earned(&b).unwrap(), 10 * RATE * 1_000);
        assert_eq!(h.pool.earned(&a).unwrap(), 110 * RATE * 1_000);
    }

    #[test]
    fn test_set_reward_rate_requires_owner() {
        let mut h = harness();
        let err = h.pool.set_reward_rate(&id(1), 2 * RATE).unwrap_err();
        assert!(matches!(err, ChihError::NotAuthorized(_)));
        assert_eq!(h.pool.reward_rate(), RATE);

        h.pool.set_reward_rate(&h.owner.clone(), 2 * RATE).unwrap();
        assert_eq!(h.pool.reward_rate(), 2 * RATE);
        assert_eq!(
            h.pool.take_events(),
            vec![PoolEvent::RewardRateChanged {
                old_rate: RATE,
                new_rate: 2 * RATE
            }]
        );
    }

    #[test]
    fn test_rate_change_settles_at_old_rate() {
        let mut h = harness();
        let alice = id(1);
        let owner = h.owner;
        h.fund(&alice, 1_000 * SCALE);
        h.pool.stake(&alice, 1_000 * SCALE).unwrap();

        h.clock.advance(100);
        h.pool.set_reward_rate(&owner, 3 * RATE).unwrap();
        h.clock.advance(50);

        let expected = 1_000 * (100 * RATE + 50 * 3 * RATE);
        assert_eq!(h.pool.earned(&alice).unwrap(), expected);
    }

    #[test]
    fn test_zero_stake_interval_accrues_nothing() {
        let mut h = harness();
        let alice = id(1);
        h.fund(&alice, 1_000 * SCALE);
        h.clock.advance(1_000);
        h.pool.stake(&alice, 1_000 * SCALE).unwrap();
        assert_eq!(h.pool.accumulator().reward_per_token_stored, 0);
        assert_eq!(h.pool.earned(&alice).unwrap(), 0);
    }

    #[test]
    fn test_exit_withdraws_and_claims() {
        let mut h = harness();
        let alice = id(1);
        h.fund(&alice, 1_000 * SCALE);
        h.pool.stake(&alice, 1_000 * SCALE).unwrap();
        h.pool.take_events();
        h.clock.advance(10);

        let (withdrawn, reward) = h.pool.exit(&alice).unwrap();
        assert_eq!(withdrawn, 1_000 * SCALE);
        assert_eq!(reward, 10 * RATE * 1_000);
        assert_eq!(h.pool.total_staked(), 0);
        assert_eq!(h.pool.take_events().len(), 2);

        assert_eq!(h.pool.exit(&alice), Err(ChihError::InvalidAmount));
    }

    #[test]
    fn test_transfer_ownership() {
        let mut h = harness();
        let owner = h.owner;
        let new_owner = id(5);
        assert!(h.pool.transfer_ownership(&id(1), new_owner).is_err());
        h.pool.transfer_ownership(&owner, new_owner).unwrap();
        assert_eq!(h.pool.owner(), &new_owner);
        assert!(h.pool.set_reward_rate(&owner, 0).is_err());
        h.pool.set_reward_rate(&new_owner, 0).unwrap();
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut h = harness();
        let alice = id(1);
        h.fund(&alice, 1_000 * SCALE);
        h.pool.stake(&alice, 700 * SCALE).unwrap();
        h.clock.advance(30);

        let snapshot = h.pool.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: PoolSnapshot = serde_json::from_str(&json).unwrap();
        let restored = StakingPool::restore(
            decoded,
            h.vault.clone(),
            h.vault.clone(),
            Arc::new(h.clock.clone()),
        )
        .unwrap();

        assert_eq!(restored.earned(&alice).unwrap(), h.pool.earned(&alice).unwrap());
        assert_eq!(restored.total_staked(), 700 * SCALE);
    }

    #[test]
    fn test_restore_rejects_inconsistent_snapshot() {
        let h = harness();
        let mut snapshot = h.pool.snapshot();
        snapshot.accumulator.total_staked = 5;
        assert!(matches!(
            StakingPool::restore(snapshot, h.vault.clone(), h.vault.clone(), Arc::new(h.clock.clone())),
            Err(ChihError::InvalidState(_))
        ));
    }

    #[test]
    fn test_pool_info() {
        let mut h = harness();
        let alice = id(1);
        h.fund(&alice, 1_000 * SCALE);
        h.pool.stake(&alice, 1_000 * SCALE).unwrap();
        h.clock.advance(5);

        let info = h.pool.pool_info().unwrap();
        assert_eq!(info.total_staked, 1_000 * SCALE);
        assert_eq!(info.reward_rate, RATE);
        assert_eq!(info.reward_per_token, 5 * RATE);
        assert_eq!(info.reward_per_token_stored, 0);
        assert_eq!(info.account_count, 1);
        assert_eq!(info.as_of, START + 5);
    }
}
