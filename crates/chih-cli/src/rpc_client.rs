// crates/chih-cli/src/rpc_client.rs
//
// JSON-RPC client that POSTs envelopes to the chih-daemon endpoint, signing
// mutating calls with the local wallet key.

use serde_json::json;

use chih_core::crypto::Keypair;
use chih_rpc::{JsonRpcRequest, JsonRpcResponse, SignedCall, CALL_PATH};

/// A connection to one daemon.
#[derive(Debug, Clone)]
pub struct RpcClient {
    url: String,
    http: reqwest::Client,
}

impl RpcClient {
    /// `endpoint` is the daemon base URL, e.g. "http://localhost:50061".
    pub fn new(endpoint: &str) -> Self {
        Self {
            url: format!("{}{}", endpoint.trim_end_matches('/'), CALL_PATH),
            http: reqwest::Client::new(),
        }
    }

    /// Send a call and return its result, turning `success: false` into an error.
    pub async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let request = JsonRpcRequest {
            method: method.to_string(),
            params,
        };

        let resp = self.http.post(&self.url).json(&request).send().await?;
        let rpc_response: JsonRpcResponse = resp.json().await?;

        if rpc_response.success {
            Ok(rpc_response.result.unwrap_or(serde_json::Value::Null))
        } else {
            let err = rpc_response
                .error
                .unwrap_or_else(|| "unknown error".to_string());
            Err(format!("{} failed: {}", method, err).into())
        }
    }

    /// Send a signed call. `field` is the single named argument, which is
    /// also the signed payload.
    pub async fn signed_call(
        &self,
        keypair: &Keypair,
        method: &str,
        field: Option<(&str, &str)>,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let payload = field.map(|(_, value)| value).unwrap_or("");
        let auth = SignedCall::sign(keypair, method, payload, next_nonce());

        let mut params = json!({ "auth": auth });
        if let Some((name, value)) = field {
            params[name] = json!(value);
        }
        self.call(method, params).await
    }

    /// Unsigned query about one account.
    pub async fn account_query(
        &self,
        method: &str,
        account: &str,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        self.call(method, json!({ "account": account })).await
    }
}

/// Millisecond wall-clock nonce; strictly increasing across CLI invocations.
fn next_nonce() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
