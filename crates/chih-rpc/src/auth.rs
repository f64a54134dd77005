// crates/chih-rpc/src/auth.rs
//
// Signed-call authentication for mutating RPC methods.
//
// A caller proves control of an account by signing
// "{method}|{payload}|{nonce}" with the account's ed25519 key. The account id
// is the SHA-256 of the public key, so the server never needs a key registry.
// Nonces must strictly increase per account; a replayed or reordered call is
// rejected before it reaches the pool.

use serde::{Deserialize, Serialize};

use chih_core::crypto::{verify_signature, Keypair};
use chih_core::{AccountId, ChihError};

use crate::state::LedgerSharedState;

/// Authentication block attached to every mutating request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCall {
    /// Hex-encoded ed25519 public key (32 bytes).
    pub public_key: String,
    /// Strictly increasing per account. Clients use unix milliseconds.
    pub nonce: u64,
    /// Hex-encoded ed25519 signature (64 bytes) over the signing message.
    pub signature: String,
}

/// The exact bytes a caller signs.
pub fn signing_message(method: &str, payload: &str, nonce: u64) -> String {
    format!("{}|{}|{}", method, payload, nonce)
}

impl SignedCall {
    /// Sign a call to `method` carrying `payload`.
    pub fn sign(keypair: &Keypair, method: &str, payload: &str, nonce: u64) -> Self {
        let message = signing_message(method, payload, nonce);
        Self {
            public_key: hex::encode(keypair.public_key_bytes()),
            nonce,
            signature: hex::encode(keypair.sign(message.as_bytes())),
        }
    }

    /// Check the signature and return the account it authorizes.
    ///
    /// Does not check the nonce; see `authenticate`.
    pub fn verify(&self, method: &str, payload: &str) -> Result<AccountId, ChihError> {
        let pk_bytes = hex::decode(self.public_key.trim_start_matches("0x"))?;
        let public_key: [u8; 32] = pk_bytes
            .try_into()
            .map_err(|_| ChihError::Crypto("Public key must be exactly 32 bytes".to_string()))?;
        let signature = hex::decode(self.signature.trim_start_matches("0x"))?;

        let message = signing_message(method, payload, self.nonce);
        if !verify_signature(&public_key, message.as_bytes(), &signature)? {
            return Err(ChihError::Crypto(format!("Invalid signature for {}", method)));
        }
        Ok(AccountId::from_public_key(&public_key))
    }
}

/// Verify `call` and consume its nonce.
///
/// Returns the caller's account on success. The nonce is consumed even if the
/// ledger operation that follows fails.
pub async fn authenticate(
    state: &LedgerSharedState,
    method: &str,
    payload: &str,
    call: &SignedCall,
) -> Result<AccountId, String> {
    let account = call.verify(method, payload).map_err(|e| {
        tracing::warn!("Rejected {} call: {}", method, e);
        e.to_string()
    })?;

    let mut nonces = state.nonces.write().await;
    let last = nonces.get(&account).copied();
    if let Some(last) = last {
        if call.nonce <= last {
            tracing::warn!(
                "Rejected {} call from {}: nonce {} not above {}",
                method,
                account.short(),
                call.nonce,
                last
            );
            return Err(format!(
                "Stale nonce {} for {} (last accepted {})",
                call.nonce, account, last
            ));
        }
    }
    nonces.insert(account, call.nonce);
    Ok(account)
}
