// crates/chih-rpc/src/handlers/node.rs
//
// Node health handler: GetHealth.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::handlers::format_amount;
use crate::state::LedgerSharedState;

/// Request for node health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHealthRequest {}

/// Response containing node health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHealthResponse {
    /// Overall health: "healthy" or "degraded".
    pub status: String,
    /// Software version.
    pub version: String,
    /// Uptime in seconds (0 if the start time was not provided).
    pub uptime_seconds: u64,
    /// Number of accounts the ledger has seen.
    pub account_count: usize,
    pub total_staked: String,
    /// Tokens in pool custody (stake plus unpaid reward reserve).
    pub custody_balance: String,
    /// Active event subscribers.
    pub event_subscribers: usize,
    /// Human-readable details.
    pub details: Option<String>,
}

/// Handle a GetHealth request.
///
/// Reports "degraded" when the stake ledger no longer balances.
pub async fn handle_get_health(
    state: &LedgerSharedState,
    _request: GetHealthRequest,
    start_time: Option<Instant>,
) -> Result<GetHealthResponse, String> {
    let pool = state.pool.read().await;
    let (status, details) = match pool.check_conservation() {
        Ok(()) => ("healthy", None),
        Err(e) => ("degraded", Some(e.to_string())),
    };
    let custody = state.vault.custody_balance().map_err(|e| e.to_string())?;

    Ok(GetHealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0),
        account_count: pool.account_count(),
        total_staked: format_amount(pool.total_staked()),
        custody_balance: format_amount(custody),
        event_subscribers: state.events.receiver_count(),
        details,
    })
}
