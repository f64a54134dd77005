// crates/chih-ledger/src/vault.rs
//
// In-memory fungible asset with ERC-20 style allowances.
//
// Stands in for the external asset layer: participants hold balances, grant
// the pool an allowance, and the pool pulls deposits into its custody
// balance and pays withdrawals and rewards out of it. The same vault may
// back both the staking and the reward asset.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use chih_core::{AccountId, Amount, AssetTransfer, ChihError};

#[derive(Debug, Default)]
struct VaultState {
    balances: HashMap<AccountId, Amount>,
    /// Allowance each holder has granted to the pool.
    allowances: HashMap<AccountId, Amount>,
    /// Balance held by the pool itself.
    custody: Amount,
}

/// Serializable image of a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSnapshot {
    pub symbol: String,
    pub balances: BTreeMap<AccountId, Amount>,
    pub allowances: BTreeMap<AccountId, Amount>,
    pub custody: Amount,
}

/// A single fungible asset held in memory.
#[derive(Debug)]
pub struct TokenVault {
    symbol: String,
    state: Mutex<VaultState>,
}

impl TokenVault {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            state: Mutex::new(VaultState::default()),
        }
    }

    /// Rebuild a vault from a snapshot.
    pub fn restore(snapshot: VaultSnapshot) -> Self {
        Self {
            symbol: snapshot.symbol,
            state: Mutex::new(VaultState {
                balances: snapshot.balances.into_iter().collect(),
                allowances: snapshot.allowances.into_iter().collect(),
                custody: snapshot.custody,
            }),
        }
    }

    pub fn snapshot(&self) -> Result<VaultSnapshot, ChihError> {
        let state = self.lock()?;
        Ok(VaultSnapshot {
            symbol: self.symbol.clone(),
            balances: state.balances.iter().map(|(k, v)| (*k, *v)).collect(),
            allowances: state.allowances.iter().map(|(k, v)| (*k, *v)).collect(),
            custody: state.custody,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    fn lock(&self) -> Result<MutexGuard<'_, VaultState>, ChihError> {
        self.state
            .lock()
            .map_err(|_| ChihError::TransferFailed(format!("{} vault lock poisoned", self.symbol)))
    }

    /// Credit newly issued tokens to `to`.
    pub fn mint(&self, to: &AccountId, amount: Amount) -> Result<(), ChihError> {
        let mut state = self.lock()?;
        let balance = state.balances.entry(*to).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| ChihError::ArithmeticOverflow(format!("{} balance", self.symbol)))?;
        Ok(())
    }

    /// Set the allowance `owner` grants to the pool.
    pub fn approve(&self, owner: &AccountId, amount: Amount) -> Result<(), ChihError> {
        self.lock()?.allowances.insert(*owner, amount);
        Ok(())
    }

    /// Tokens `owner` holds outside the pool.
    ///
    /// Fails only if the vault lock was poisoned.
    pub fn balance_of(&self, owner: &AccountId) -> Result<Amount, ChihError> {
        Ok(self.lock()?.balances.get(owner).copied().unwrap_or(0))
    }

    pub fn allowance(&self, owner: &AccountId) -> Result<Amount, ChihError> {
        Ok(self.lock()?.allowances.get(owner).copied().unwrap_or(0))
    }

    /// Tokens currently held by the pool.
    pub fn custody_balance(&self) -> Result<Amount, ChihError> {
        Ok(self.lock()?.custody)
    }
}

impl AssetTransfer for TokenVault {
    fn transfer_in(&self, from: &AccountId, amount: Amount) -> Result<(), ChihError> {
        let mut state = self.lock()?;
        let balance = state.balances.get(from).copied().unwrap_or(0);
        let allowance = state.allowances.get(from).copied().unwrap_or(0);

        if allowance < amount {
            return Err(ChihError::TransferFailed(format!(
                "{} allowance {} below {}",
                self.symbol, allowance, amount
            )));
        }
        if balance < amount {
            return Err(ChihError::TransferFailed(format!(
                "{} balance {} below {}",
                self.symbol, balance, amount
            )));
        }
        let custody = state.custody.checked_add(amount).ok_or_else(|| {
            ChihError::TransferFailed(format!("{} custody overflow", self.symbol))
        })?;

        state.balances.insert(*from, balance - amount);
        state.allowances.insert(*from, allowance - amount);
        state.custody = custody;
        Ok(())
    }

    fn transfer_out(&self, to: &AccountId, amount: Amount) -> Result<(), ChihError> {
        let mut state = self.lock()?;
        if state.custody < amount {
            return Err(ChihError::TransferFailed(format!(
                "{} pool custody {} below {}",
                self.symbol, state.custody, amount
            )));
        }
        let balance = state.balances.get(to).copied().unwrap_or(0);
        let credited = balance.checked_add(amount).ok_or_else(|| {
            ChihError::TransferFailed(format!("{} balance overflow", self.symbol))
        })?;

        state.custody -= amount;
        state.balances.insert(*to, credited);
        Ok(())
    }
}
