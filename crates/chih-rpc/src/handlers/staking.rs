// crates/chih-rpc/src/handlers/staking.rs
//
// Staking handlers: Stake, Withdraw, Claim, Exit.
//
// Each call authenticates the signer, then runs the ledger operation under
// the pool write lock and publishes the resulting events before releasing it.

use serde::{Deserialize, Serialize};

use chih_core::AccountId;
use chih_ledger::StakingPool;

use crate::auth::{authenticate, SignedCall};
use crate::handlers::{format_amount, parse_amount};
use crate::state::LedgerSharedState;

pub const METHOD_STAKE: &str = "staking/stake";
pub const METHOD_WITHDRAW: &str = "staking/withdraw";
pub const METHOD_CLAIM: &str = "staking/claim";
pub const METHOD_EXIT: &str = "staking/exit";

/// Balances reported back after a staking operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakePosition {
    /// Hex account id of the caller.
    pub account: String,
    /// Caller's staked balance after the operation.
    pub staked: String,
    /// Pool-wide staked total after the operation.
    pub total_staked: String,
    /// Rewards still claimable by the caller.
    pub earned: String,
}

fn position(pool: &StakingPool, account: &AccountId) -> Result<StakePosition, String> {
    Ok(StakePosition {
        account: account.to_hex(),
        staked: format_amount(pool.balance_of(account)),
        total_staked: format_amount(pool.total_staked()),
        earned: format_amount(pool.earned(account).map_err(|e| e.to_string())?),
    })
}

// ---------------------------------------------------------------------------
// Stake / Withdraw
// ---------------------------------------------------------------------------

/// Request carrying an amount. Signed payload: the `amount` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountRequest {
    /// Decimal CHIH amount, e.g. "1000" or "0.5".
    pub amount: String,
    pub auth: SignedCall,
}

/// Handle a Stake request.
pub async fn handle_stake(
    state: &LedgerSharedState,
    request: AmountRequest,
) -> Result<StakePosition, String> {
    let account = authenticate(state, METHOD_STAKE, &request.amount, &request.auth).await?;
    let amount = parse_amount(&request.amount)?;

    let mut pool = state.pool.write().await;
    pool.stake(&account, amount).map_err(|e| e.to_string())?;
    state.publish_events(&mut pool);
    position(&pool, &account)
}

/// Handle a Withdraw request.
pub async fn handle_withdraw(
    state: &LedgerSharedState,
    request: AmountRequest,
) -> Result<StakePosition, String> {
    let account = authenticate(state, METHOD_WITHDRAW, &request.amount, &request.auth).await?;
    let amount = parse_amount(&request.amount)?;

    let mut pool = state.pool.write().await;
    pool.withdraw(&account, amount).map_err(|e| e.to_string())?;
    state.publish_events(&mut pool);
    position(&pool, &account)
}

// ---------------------------------------------------------------------------
// Claim / Exit
// ---------------------------------------------------------------------------

/// Request with no arguments besides the signature. Signed payload: "".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedOnlyRequest {
    pub auth: SignedCall,
}

/// Response from a claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub account: String,
    /// Reward paid by this call ("0" when nothing was owed).
    pub reward_paid: String,
}

/// Handle a Claim request.
pub async fn handle_claim(
    state: &LedgerSharedState,
    request: SignedOnlyRequest,
) -> Result<ClaimResponse, String> {
    let account = authenticate(state, METHOD_CLAIM, "", &request.auth).await?;

    let mut pool = state.pool.write().await;
    let paid = pool.claim_rewards(&account).map_err(|e| e.to_string())?;
    state.publish_events(&mut pool);
    Ok(ClaimResponse {
        account: account.to_hex(),
        reward_paid: format_amount(paid),
    })
}

/// Response from an exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitResponse {
    pub account: String,
    pub withdrawn: String,
    pub reward_paid: String,
}

/// Handle an Exit request: withdraw everything, then claim.
pub async fn handle_exit(
    state: &LedgerSharedState,
    request: SignedOnlyRequest,
) -> Result<ExitResponse, String> {
    let account = authenticate(state, METHOD_EXIT, "", &request.auth).await?;

    let mut pool = state.pool.write().await;
    let result = pool.exit(&account);
    // A failed claim step still leaves a committed withdrawal to publish.
    state.publish_events(&mut pool);
    let (withdrawn, paid) = result.map_err(|e| e.to_string())?;
    Ok(ExitResponse {
        account: account.to_hex(),
        withdrawn: format_amount(withdrawn),
        reward_paid: format_amount(paid),
    })
}
