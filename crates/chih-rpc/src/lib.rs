// crates/chih-rpc/src/lib.rs
//
// chih-rpc: JSON-RPC server and handlers for the Chih staking pool.
//
// Exposes every ledger operation and view over a single tonic service that
// carries JSON envelopes. Mutating methods require an ed25519-signed call.

pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod state;

// Re-export the main server types for ergonomic access.
pub use auth::SignedCall;
pub use server::{ChihRpcServer, JsonRpcRequest, JsonRpcResponse, RpcConfig, CALL_PATH};
pub use state::{AuthSnapshot, LedgerSharedState};
