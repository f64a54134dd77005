// crates/chih-rpc/src/handlers/mod.rs
//
// Handler modules for all RPC endpoints.
// Each module defines request/response types and handler functions
// for a specific API group.
//
// Amounts travel as exact decimal CHIH strings ("1000", "0.5"). JSON numbers
// cannot carry u128 values without loss.

pub mod admin;
pub mod node;
pub mod pool;
pub mod staking;
pub mod vault;

use chih_core::{AccountId, Amount};
use chih_ledger::Chih;

/// Parse a decimal CHIH string into base units.
pub fn parse_amount(s: &str) -> Result<Amount, String> {
    Chih::parse(s).map(|c| c.wei).map_err(|e| e.to_string())
}

/// Render base units as an exact decimal CHIH string.
pub fn format_amount(wei: Amount) -> String {
    Chih::from_wei(wei).to_decimal_string()
}

/// Parse a hex account id.
pub fn parse_account(s: &str) -> Result<AccountId, String> {
    s.parse::<AccountId>()
        .map_err(|e| format!("Invalid account {:?}: {}", s, e))
}
