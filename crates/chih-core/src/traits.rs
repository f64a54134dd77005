// crates/chih-core/src/traits.rs

use crate::error::ChihError;
use crate::identity::AccountId;
use crate::Amount;

/// Synchronous capability over one fungible asset, as seen from the pool.
///
/// `transfer_in` pulls `amount` from `from` into pool custody;
/// `transfer_out` pays `amount` from pool custody to `to`. Both either
/// complete fully or fail with `ChihError::TransferFailed` and move nothing.
///
/// Implemented by chih-ledger (`TokenVault`) and by any external asset layer.
pub trait AssetTransfer: Send + Sync {
    /// Move `amount` from `from` into pool custody.
    fn transfer_in(&self, from: &AccountId, amount: Amount) -> Result<(), ChihError>;

    /// Move `amount` from pool custody to `to`.
    fn transfer_out(&self, to: &AccountId, amount: Amount) -> Result<(), ChihError>;
}

/// Source of the current time in whole unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}
