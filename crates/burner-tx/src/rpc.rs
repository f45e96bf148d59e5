//! Minimal JSON-RPC 2.0 client over HTTP, shared by the node, bundler and
//! paymaster connections.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use burner_types::{Result, WalletError, U256};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

/// Empty positional parameter list.
pub const NO_PARAMS: [(); 0] = [];

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC client bound to one endpoint.
pub struct JsonRpcClient {
    url: Url,
    client: reqwest::Client,
    timeout: Duration,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: Url, timeout_ms: Option<u64>) -> Self {
        let timeout = Duration::from_millis(timeout_ms.unwrap_or(30_000));
        Self {
            url,
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            timeout,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Call `method` and deserialize its result. A JSON `null` result is handed to
    /// `R` as-is, so `Option<T>` results work.
    pub async fn request<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let result = self.request_value(method, params).await?;
        serde_json::from_value(result)
            .map_err(|e| WalletError::InvalidResponse(format!("{method}: {e}")))
    }

    /// Call a method whose result is a numeric quantity.
    pub async fn request_quantity<P: Serialize>(&self, method: &str, params: P) -> Result<U256> {
        let result = self.request_value(method, params).await?;
        parse_quantity(&result).map_err(|e| WalletError::InvalidResponse(format!("{method}: {e}")))
    }

    async fn request_value<P: Serialize>(&self, method: &str, params: P) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        tracing::trace!(url = %self.url, method, id, "rpc request");

        let resp = self
            .client
            .post(self.url.clone())
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| WalletError::Transport(format!("{method} request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(WalletError::Transport(format!(
                "{method} returned status {status}: {body}"
            )));
        }

        let body: RpcResponse = resp
            .json()
            .await
            .map_err(|e| WalletError::InvalidResponse(format!("{method}: {e}")))?;

        if let Some(err) = body.error {
            return Err(WalletError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(body.result.unwrap_or(Value::Null))
    }
}

/// Parse a JSON quantity: a `0x` hex string, a decimal string, or a number.
pub fn parse_quantity(value: &Value) -> std::result::Result<U256, String> {
    match value {
        Value::String(s) => {
            U256::from_str(s.trim()).map_err(|e| format!("bad quantity {s:?}: {e}"))
        }
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| format!("bad quantity {n}")),
        other => Err(format!("expected quantity, got {other}")),
    }
}

/// Serde adapter for quantity fields in bundler responses.
pub fn deserialize_quantity<'de, D>(deserializer: D) -> std::result::Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_quantity(&value).map_err(serde::de::Error::custom)
}
