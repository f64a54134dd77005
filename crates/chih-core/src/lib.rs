// crates/chih-core/src/lib.rs
//
// chih-core: Core types, traits, and crypto primitives for the Chih staking pool.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines participant identities, the protocol-wide error type, ed25519
// helpers for signed calls, and the collaborator traits the ledger consumes
// (asset movement and time).

pub mod crypto;
pub mod error;
pub mod identity;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use chih_core::AccountId;`

pub use error::ChihError;
pub use identity::AccountId;
pub use traits::{AssetTransfer, Clock};

/// Amount of an asset in base units (18 decimals for CHIH).
pub type Amount = u128;
