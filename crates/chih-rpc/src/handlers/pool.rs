// crates/chih-rpc/src/handlers/pool.rs
//
// Read-only pool handlers: GetPoolInfo, GetEarned, GetAccount.
// All take the pool read lock only.

use serde::{Deserialize, Serialize};

use chih_ledger::{EmissionMode, SCALE};

use crate::handlers::{format_amount, parse_account};
use crate::state::LedgerSharedState;

// ---------------------------------------------------------------------------
// GetPoolInfo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetPoolInfoRequest {}

/// Pool summary with amounts as decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetPoolInfoResponse {
    pub staking_asset: String,
    pub reward_asset: String,
    pub owner: String,
    pub emission: EmissionMode,
    /// Reward per second (per staked token in per_staked_unit mode).
    pub reward_rate: String,
    pub total_staked: String,
    /// Accumulator projected to `as_of`, in reward tokens per staked token.
    pub reward_per_token: String,
    pub last_update_time: u64,
    pub as_of: u64,
    pub account_count: usize,
    /// Reward per staked token over a year at current settings.
    pub annual_reward_per_token: String,
    /// `annual_reward_per_token` as a percentage, for same-asset pools.
    pub apr_percent: String,
}

/// Handle a GetPoolInfo request.
pub async fn handle_get_pool_info(
    state: &LedgerSharedState,
    _request: GetPoolInfoRequest,
) -> Result<GetPoolInfoResponse, String> {
    let pool = state.pool.read().await;
    let info = pool.pool_info().map_err(|e| e.to_string())?;

    Ok(GetPoolInfoResponse {
        staking_asset: info.staking_asset_id,
        reward_asset: info.reward_asset_id,
        owner: info.owner.to_hex(),
        emission: info.emission,
        reward_rate: format_amount(info.reward_rate),
        total_staked: format_amount(info.total_staked),
        reward_per_token: format_amount(info.reward_per_token),
        last_update_time: info.last_update_time,
        as_of: info.as_of,
        account_count: info.account_count,
        annual_reward_per_token: format_amount(info.annual_reward_per_token),
        apr_percent: format_amount(info.annual_reward_per_token.saturating_mul(100)),
    })
}

// ---------------------------------------------------------------------------
// GetEarned
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountQuery {
    /// Hex account id.
    pub account: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetEarnedResponse {
    pub account: String,
    pub earned: String,
}

/// Handle a GetEarned request: what a claim would pay right now.
pub async fn handle_get_earned(
    state: &LedgerSharedState,
    request: AccountQuery,
) -> Result<GetEarnedResponse, String> {
    let account = parse_account(&request.account)?;
    let pool = state.pool.read().await;
    let earned = pool.earned(&account).map_err(|e| e.to_string())?;
    Ok(GetEarnedResponse {
        account: account.to_hex(),
        earned: format_amount(earned),
    })
}

// ---------------------------------------------------------------------------
// GetAccount
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAccountResponse {
    pub account: String,
    /// False if the account has never staked.
    pub exists: bool,
    pub staked: String,
    /// Rewards settled at the last checkpoint.
    pub rewards_settled: String,
    /// Settled plus accrued since the last checkpoint.
    pub earned: String,
    /// Share of the pool, in percent.
    pub pool_share_percent: String,
}

/// Handle a GetAccount request.
pub async fn handle_get_account(
    state: &LedgerSharedState,
    request: AccountQuery,
) -> Result<GetAccountResponse, String> {
    let account = parse_account(&request.account)?;
    let pool = state.pool.read().await;
    let earned = pool.earned(&account).map_err(|e| e.to_string())?;
    let record = pool.account(&account).cloned().unwrap_or_default();

    let total = pool.total_staked();
    let share = if total == 0 {
        0
    } else {
        chih_ledger::fixed::mul_div_floor(record.staked, 100 * SCALE, total)
            .map_err(|e| e.to_string())?
    };

    Ok(GetAccountResponse {
        account: account.to_hex(),
        exists: pool.account(&account).is_some(),
        staked: format_amount(record.staked),
        rewards_settled: format_amount(record.rewards),
        earned: format_amount(earned),
        pool_share_percent: format_amount(share),
    })
}
