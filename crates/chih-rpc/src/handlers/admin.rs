// crates/chih-rpc/src/handlers/admin.rs
//
// Admin handlers: SetRewardRate, TransferOwnership, FundRewards.
//
// The ledger itself enforces the owner check; these handlers only establish
// who the caller is.

use serde::{Deserialize, Serialize};

use crate::auth::{authenticate, SignedCall};
use crate::handlers::{format_amount, parse_account, parse_amount};
use crate::state::LedgerSharedState;

pub const METHOD_SET_REWARD_RATE: &str = "admin/set_reward_rate";
pub const METHOD_TRANSFER_OWNERSHIP: &str = "admin/transfer_ownership";
pub const METHOD_FUND_REWARDS: &str = "admin/fund_rewards";

// ---------------------------------------------------------------------------
// SetRewardRate
// ---------------------------------------------------------------------------

/// Signed payload: the `rate` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRewardRateRequest {
    /// New rate as a decimal CHIH amount per second.
    pub rate: String,
    pub auth: SignedCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRewardRateResponse {
    pub old_rate: String,
    pub new_rate: String,
}

/// Handle a SetRewardRate request.
pub async fn handle_set_reward_rate(
    state: &LedgerSharedState,
    request: SetRewardRateRequest,
) -> Result<SetRewardRateResponse, String> {
    let caller = authenticate(state, METHOD_SET_REWARD_RATE, &request.rate, &request.auth).await?;
    let new_rate = parse_amount(&request.rate)?;

    let mut pool = state.pool.write().await;
    let old_rate = pool.reward_rate();
    pool.set_reward_rate(&caller, new_rate)
        .map_err(|e| e.to_string())?;
    state.publish_events(&mut pool);

    Ok(SetRewardRateResponse {
        old_rate: format_amount(old_rate),
        new_rate: format_amount(new_rate),
    })
}

// ---------------------------------------------------------------------------
// TransferOwnership
// ---------------------------------------------------------------------------

/// Signed payload: the `new_owner` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOwnershipRequest {
    /// Hex account id of the new owner.
    pub new_owner: String,
    pub auth: SignedCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOwnershipResponse {
    pub previous_owner: String,
    pub new_owner: String,
}

/// Handle a TransferOwnership request.
pub async fn handle_transfer_ownership(
    state: &LedgerSharedState,
    request: TransferOwnershipRequest,
) -> Result<TransferOwnershipResponse, String> {
    let caller = authenticate(
        state,
        METHOD_TRANSFER_OWNERSHIP,
        &request.new_owner,
        &request.auth,
    )
    .await?;
    let new_owner = parse_account(&request.new_owner)?;

    let mut pool = state.pool.write().await;
    pool.transfer_ownership(&caller, new_owner)
        .map_err(|e| e.to_string())?;
    state.publish_events(&mut pool);

    Ok(TransferOwnershipResponse {
        previous_owner: caller.to_hex(),
        new_owner: new_owner.to_hex(),
    })
}

// ---------------------------------------------------------------------------
// FundRewards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundRewardsResponse {
    pub funder: String,
    pub amount: String,
}

/// Handle a FundRewards request. Anyone may fund; the funder's allowance
/// must cover the amount. Signed payload: the `amount` string.
pub async fn handle_fund_rewards(
    state: &LedgerSharedState,
    request: super::staking::AmountRequest,
) -> Result<FundRewardsResponse, String> {
    let funder = authenticate(state, METHOD_FUND_REWARDS, &request.amount, &request.auth).await?;
    let amount = parse_amount(&request.amount)?;

    let mut pool = state.pool.write().await;
    pool.fund_rewards(&funder, amount)
        .map_err(|e| e.to_string())?;
    state.publish_events(&mut pool);

    Ok(FundRewardsResponse {
        funder: funder.to_hex(),
        amount: format_amount(amount),
    })
}
