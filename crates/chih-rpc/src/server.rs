// crates/chih-rpc/src/server.rs
//
// RPC server setup: ChihRpcServer and RpcConfig.
//
// A single tonic service accepts JSON-encoded `{method, params}` envelopes,
// dispatches them to the handler for that method, and answers with
// `{success, result, error}`. No proto codegen is involved; tonic provides
// the transport and interceptor plumbing.

use std::time::Instant;

use http::header::{HeaderValue, CONTENT_TYPE};
use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tonic::transport::Server;
use tonic::Status;

use crate::handlers;
use crate::handlers::{admin, staking, vault};
use crate::middleware;
use crate::state::LedgerSharedState;

/// gRPC service name the JSON envelope is mounted under.
pub const SERVICE_NAME: &str = "chih.rpc.StakingPool";

/// Request path clients POST envelopes to.
pub const CALL_PATH: &str = "/chih.rpc.StakingPool/Call";

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50061,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC Envelope
// ---------------------------------------------------------------------------

/// A JSON-RPC-style request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// The RPC method to invoke (e.g., "staking/stake", "pool/info").
    pub method: String,
    /// JSON-encoded parameters for the method.
    pub params: serde_json::Value,
}

/// A JSON-RPC-style response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The result data (if success).
    pub result: Option<serde_json::Value>,
    /// Error message (if not success).
    pub error: Option<String>,
}

impl JsonRpcResponse {
    fn from_result(result: Result<serde_json::Value, String>) -> Self {
        match result {
            Ok(value) => Self {
                success: true,
                result: Some(value),
                error: None,
            },
            Err(err) => Self {
                success: false,
                result: None,
                error: Some(err),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// ChihRpcServer
// ---------------------------------------------------------------------------

/// The RPC server for the staking pool.
#[derive(Clone)]
pub struct ChihRpcServer {
    config: RpcConfig,
    service: ChihServiceImpl,
}

impl std::fmt::Debug for ChihRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChihRpcServer")
            .field("config", &self.config)
            .finish()
    }
}

impl ChihRpcServer {
    pub fn new(config: RpcConfig, state: LedgerSharedState) -> Self {
        Self {
            config,
            service: ChihServiceImpl {
                state,
                start_time: None,
            },
        }
    }

    /// Set the daemon start time for uptime calculation.
    pub fn with_start_time(mut self, st: Instant) -> Self {
        self.service.start_time = Some(st);
        self
    }

    /// Dispatch a single request without going through the transport.
    pub async fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        self.service.dispatch(request).await
    }

    /// Start the RPC server and serve until the process is terminated.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!("Chih RPC server starting on {}", addr);

        Server::builder()
            .accept_http1(true)
            .add_service(tonic::service::interceptor::InterceptedService::new(
                ChihJsonRpcServer::new(self.service.clone()),
                middleware::logging_interceptor,
            ))
            .serve(addr)
            .await?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct ChihServiceImpl {
    state: LedgerSharedState,
    start_time: Option<Instant>,
}

impl ChihServiceImpl {
    /// Dispatch a JSON-RPC request to the handler for its method.
    async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let started = Instant::now();
        let state = &self.state;
        let params = request.params;

        let result = match request.method.as_str() {
            // Pool views
            "pool/info" => {
                dispatch_handler(params, |r| handlers::pool::handle_get_pool_info(state, r)).await
            }
            "pool/earned" => {
                dispatch_handler(params, |r| handlers::pool::handle_get_earned(state, r)).await
            }
            "pool/account" => {
                dispatch_handler(params, |r| handlers::pool::handle_get_account(state, r)).await
            }

            // Staking
            staking::METHOD_STAKE => {
                dispatch_handler(params, |r| staking::handle_stake(state, r)).await
            }
            staking::METHOD_WITHDRAW => {
                dispatch_handler(params, |r| staking::handle_withdraw(state, r)).await
            }
            staking::METHOD_CLAIM => {
                dispatch_handler(params, |r| staking::handle_claim(state, r)).await
            }
            staking::METHOD_EXIT => {
                dispatch_handler(params, |r| staking::handle_exit(state, r)).await
            }

            // Admin
            admin::METHOD_SET_REWARD_RATE => {
                dispatch_handler(params, |r| admin::handle_set_reward_rate(state, r)).await
            }
            admin::METHOD_TRANSFER_OWNERSHIP => {
                dispatch_handler(params, |r| admin::handle_transfer_ownership(state, r)).await
            }
            admin::METHOD_FUND_REWARDS => {
                dispatch_handler(params, |r| admin::handle_fund_rewards(state, r)).await
            }

            // Vault
            vault::METHOD_APPROVE => {
                dispatch_handler(params, |r| vault::handle_approve(state, r)).await
            }
            "vault/balance" => {
                dispatch_handler(params, |r| vault::handle_get_balance(state, r)).await
            }
            vault::METHOD_FAUCET => {
                dispatch_handler(params, |r| vault::handle_faucet(state, r)).await
            }

            // Node
            "node/health" => {
                let start_time = self.start_time;
                dispatch_handler(params, |r| {
                    handlers::node::handle_get_health(state, r, start_time)
                })
                .await
            }

            _ => Err(format!("Unknown method: {}", request.method)),
        };

        middleware::log_outcome(&request.method, &result, started.elapsed());
        JsonRpcResponse::from_result(result)
    }
}

/// Generic dispatch helper: deserialize params into a request type,
/// call the handler, and serialize the result to JSON.
async fn dispatch_handler<Req, Resp, F, Fut>(
    params: serde_json::Value,
    handler: F,
) -> Result<serde_json::Value, String>
where
    Req: serde::de::DeserializeOwned,
    Resp: serde::Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: std::future::Future<Output = Result<Resp, String>>,
{
    let request: Req = serde_json::from_value(params)
        .map_err(|e| format!("Failed to deserialize request: {}", e))?;
    let response = handler(request).await?;
    serde_json::to_value(response).map_err(|e| format!("Failed to serialize response: {}", e))
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------

/// The tonic service wrapper: reads the body as a JSON envelope and
/// dispatches it.
#[derive(Clone)]
pub struct ChihJsonRpcServer {
    inner: ChihServiceImpl,
}

impl std::fmt::Debug for ChihJsonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChihJsonRpcServer").finish()
    }
}

impl ChihJsonRpcServer {
    fn new(inner: ChihServiceImpl) -> Self {
        Self { inner }
    }
}

impl tonic::server::NamedService for ChihJsonRpcServer {
    const NAME: &'static str = SERVICE_NAME;
}

impl<B> tower_service::Service<http::Request<B>> for ChihJsonRpcServer
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    B::Data: Send,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let body_bytes = match collect_body(req.into_body()).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Failed to read request body: {}", e);
                    return Ok(error_response(format!("Failed to read request body: {}", e)));
                }
            };

            let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => return Ok(error_response(format!("Invalid JSON-RPC request: {}", e))),
            };

            let rpc_response = inner.dispatch(rpc_request).await;
            let json = serde_json::to_vec(&rpc_response).unwrap_or_default();
            Ok(build_response(json))
        })
    }
}

/// Collect the body of an HTTP request into bytes.
async fn collect_body<B>(body: B) -> Result<Vec<u8>, String>
where
    B: HttpBody + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    B::Data: Send,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    loop {
        match std::future::poll_fn(|cx| HttpBody::poll_frame(body.as_mut(), cx)).await {
            Some(Ok(frame)) => {
                if let Ok(mut data) = frame.into_data() {
                    use bytes::Buf;
                    while data.has_remaining() {
                        let chunk = data.chunk();
                        let len = chunk.len();
                        collected.extend_from_slice(chunk);
                        data.advance(len);
                    }
                }
            }
            Some(Err(e)) => return Err(e.into().to_string()),
            None => break,
        }
    }

    Ok(collected)
}

fn error_response(message: String) -> http::Response<tonic::body::BoxBody> {
    let resp = JsonRpcResponse::from_result(Err(message));
    build_response(serde_json::to_vec(&resp).unwrap_or_default())
}

/// Build an HTTP 200 response with the given JSON body.
fn build_response(json: Vec<u8>) -> http::Response<tonic::body::BoxBody> {
    let body = tonic::body::BoxBody::new(
        http_body_util::Full::new(bytes::Bytes::from(json))
            .map_err(|e| Status::internal(format!("body error: {}", e))),
    );

    let mut response = http::Response::new(body);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chih_core::crypto::Keypair;
    use chih_ledger::{EmissionMode, ManualClock, PoolConfig, StakingPool, TokenVault, SCALE};
    use serde_json::json;

    use crate::auth::SignedCall;

    fn server(owner: &Keypair) -> (ChihRpcServer, Arc<TokenVault>, ManualClock) {
        let vault = Arc::new(TokenVault::new("CHIH"));
        let clock = ManualClock::new(1_000);
        let pool = StakingPool::new(
            PoolConfig {
                staking_asset_id: "CHIH".to_string(),
                reward_asset_id: "CHIH".to_string(),
                owner: owner.account_id(),
                reward_rate: SCALE / 100,
                emission: EmissionMode::PerStakedUnit,
            },
            vault.clone(),
            vault.clone(),
            Arc::new(clock.clone()),
        );
        let state = LedgerSharedState::new(pool, vault.clone());
        (ChihRpcServer::new(RpcConfig::default(), state), vault, clock)
    }

    fn call(method: &str, params: serde_json::Value) -> JsonRpcRequest {
        JsonRpcRequest {
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let (server, _, _) = server(&Keypair::generate());
        let resp = server.handle(call("pool/nope", json!({}))).await;
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("Unknown method"));
    }

    #[tokio::test]
    async fn test_bad_params_rejected() {
        let (server, _, _) = server(&Keypair::generate());
        let resp = server.handle(call("pool/earned", json!({"acct": 1}))).await;
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("Failed to deserialize"));
    }

    #[tokio::test]
    async fn test_signed_stake_then_earned() {
        let owner = Keypair::generate();
        let (server, vault, clock) = server(&owner);
        let alice = Keypair::generate();
        vault.mint(&alice.account_id(), 5_000 * SCALE).unwrap();

        let approve = SignedCall::sign(&alice, "vault/approve", "1000", 1);
        let resp = server
            .handle(call("vault/approve", json!({"amount": "1000", "auth": approve})))
            .await;
        assert!(resp.success, "{:?}", resp.error);

        let stake = SignedCall::sign(&alice, "staking/stake", "1000", 2);
        let resp = server
            .handle(call("staking/stake", json!({"amount": "1000", "auth": stake})))
            .await;
        assert!(resp.success, "{:?}", resp.error);
        assert_eq!(resp.result.unwrap()["staked"], "1000");

        clock.advance(100);
        let resp = server
            .handle(call(
                "pool/earned",
                json!({"account": alice.account_id().to_hex()}),
            ))
            .await;
        assert_eq!(resp.result.unwrap()["earned"], "1000");
    }

    #[tokio::test]
    async fn test_signature_for_other_amount_rejected() {
        let (server, vault, _) = server(&Keypair::generate());
        let alice = Keypair::generate();
        vault.mint(&alice.account_id(), 5_000 * SCALE).unwrap();
        vault.approve(&alice.account_id(), 5_000 * SCALE).unwrap();

        let signed_for_one = SignedCall::sign(&alice, "staking/stake", "1", 1);
        let resp = server
            .handle(call(
                "staking/stake",
                json!({"amount": "5000", "auth": signed_for_one}),
            ))
            .await;
        assert!(!resp.success);
        assert_eq!(vault.balance_of(&alice.account_id()).unwrap(), 5_000 * SCALE);
    }

    #[tokio::test]
    async fn test_set_rate_by_non_owner_rejected() {
        let owner = Keypair::generate();
        let (server, _, _) = server(&owner);
        let mallory = Keypair::generate();

        let auth = SignedCall::sign(&mallory, "admin/set_reward_rate", "5", 1);
        let resp = server
            .handle(call("admin/set_reward_rate", json!({"rate": "5", "auth": auth})))
            .await;
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("Not authorized"));

        let auth = SignedCall::sign(&owner, "admin/set_reward_rate", "5", 1);
        let resp = server
            .handle(call("admin/set_reward_rate", json!({"rate": "5", "auth": auth})))
            .await;
        assert!(resp.success);
        assert_eq!(resp.result.unwrap()["new_rate"], "5");
    }
}
