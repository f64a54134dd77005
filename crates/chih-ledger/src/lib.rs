// crates/chih-ledger/src/lib.rs
//
// chih-ledger: Reward-accrual ledger for the Chih staking pool.
//
// Participants stake CHIH and accrue rewards at a configurable emission rate.
// Accrual is tracked with a global reward-per-token accumulator plus a
// per-account checkpoint, so every operation is O(1) regardless of how many
// accounts exist. All arithmetic is 18-decimal fixed point on u128 with a
// 256-bit intermediate for products, rounding down.

pub mod account;
pub mod accumulator;
pub mod clock;
pub mod events;
pub mod fixed;
pub mod pool;
pub mod token;
pub mod vault;

pub use account::StakerAccount;
pub use accumulator::{EmissionMode, RewardAccumulator};
pub use clock::{ManualClock, SystemClock};
pub use events::PoolEvent;
pub use fixed::SCALE;
pub use pool::{PoolConfig, PoolInfo, PoolSnapshot, StakingPool};
pub use token::Chih;
pub use vault::{TokenVault, VaultSnapshot};
