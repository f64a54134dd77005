use thiserror::Error;

use crate::Amount;

/// Protocol-wide error types for the Chih staking pool.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChihError {
    /// A zero (or otherwise non-positive) amount was supplied.
    #[error("Invalid amount: amount must be greater than zero")]
    InvalidAmount,

    /// Withdrawal requested exceeds the caller's staked balance.
    #[error("Insufficient stake: requested {requested}, staked {staked}")]
    InsufficientStake { requested: Amount, staked: Amount },

    /// The underlying asset movement could not complete.
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// A privileged operation was attempted by a non-owner identity.
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Fixed-point arithmetic overflowed or divided by zero.
    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Cryptographic error (key parsing, signature verification).
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Snapshot persistence error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid state transition.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for ChihError {
    fn from(e: serde_json::Error) -> Self {
        ChihError::Serialization(e.to_string())
    }
}

impl From<ed25519_dalek::SignatureError> for ChihError {
    fn from(e: ed25519_dalek::SignatureError) -> Self {
        ChihError::Crypto(e.to_string())
    }
}

impl From<hex::FromHexError> for ChihError {
    fn from(e: hex::FromHexError) -> Self {
        ChihError::Serialization(format!("invalid hex: {}", e))
    }
}
