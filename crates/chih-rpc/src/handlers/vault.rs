// crates/chih-rpc/src/handlers/vault.rs
//
// Vault handlers: Approve, GetBalance, Faucet.
//
// The pool pulls stake with `transfer_in`, which spends the caller's
// allowance. Clients approve before staking.

use serde::{Deserialize, Serialize};

use chih_core::AccountId;

use crate::auth::authenticate;
use crate::handlers::pool::AccountQuery;
use crate::handlers::staking::{AmountRequest, SignedOnlyRequest};
use crate::handlers::{format_amount, parse_account, parse_amount};
use crate::state::LedgerSharedState;

pub const METHOD_APPROVE: &str = "vault/approve";
pub const METHOD_FAUCET: &str = "vault/faucet";

/// Wallet-side view of one account in the vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultBalanceResponse {
    pub account: String,
    pub symbol: String,
    /// Tokens held outside the pool.
    pub balance: String,
    /// Amount the pool may still pull from this account.
    pub allowance: String,
}

fn balance_response(
    state: &LedgerSharedState,
    account: &AccountId,
) -> Result<VaultBalanceResponse, String> {
    let balance = state.vault.balance_of(account).map_err(|e| e.to_string())?;
    let allowance = state.vault.allowance(account).map_err(|e| e.to_string())?;
    Ok(VaultBalanceResponse {
        account: account.to_hex(),
        symbol: state.vault.symbol().to_string(),
        balance: format_amount(balance),
        allowance: format_amount(allowance),
    })
}

/// Handle an Approve request. Sets (not adds to) the pool's allowance.
pub async fn handle_approve(
    state: &LedgerSharedState,
    request: AmountRequest,
) -> Result<VaultBalanceResponse, String> {
    let account = authenticate(state, METHOD_APPROVE, &request.amount, &request.auth).await?;
    let amount = parse_amount(&request.amount)?;
    state
        .vault
        .approve(&account, amount)
        .map_err(|e| e.to_string())?;
    tracing::info!("Allowance for {} set to {}", account.short(), amount);
    balance_response(state, &account)
}

/// Handle a GetBalance request.
pub async fn handle_get_balance(
    state: &LedgerSharedState,
    request: AccountQuery,
) -> Result<VaultBalanceResponse, String> {
    let account = parse_account(&request.account)?;
    balance_response(state, &account)
}

/// Handle a Faucet request: mint the configured development amount to the
/// caller, once per account.
pub async fn handle_faucet(
    state: &LedgerSharedState,
    request: SignedOnlyRequest,
) -> Result<VaultBalanceResponse, String> {
    let account = authenticate(state, METHOD_FAUCET, "", &request.auth).await?;
    if state.faucet_amount == 0 {
        return Err("Faucet is disabled on this daemon".to_string());
    }
    if !state.mark_faucet_claimed(&account).await {
        return Err(format!("Faucet already used by {}", account));
    }
    state
        .vault
        .mint(&account, state.faucet_amount)
        .map_err(|e| e.to_string())?;
    tracing::info!("Faucet minted {} to {}", state.faucet_amount, account.short());
    balance_response(state, &account)
}
