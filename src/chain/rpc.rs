//! JSON-RPC implementation of `ChainStateGateway`.
//!
//! Speaks the NEAR-style wire protocol:
//! - `status` → `sync_info.latest_block_hash` (base58)
//! - `query {request_type: "view_access_key"}` → access-key nonce
//! - `query {request_type: "call_function"}` → view-call result bytes
//!
//! Every call carries an explicit timeout and gets at most one retry
//! for transient failures (see `retry`). Nothing is cached: nonce and
//! block hash are always fetched live so composed transactions stay
//! replay-protected against current chain state.

use async_trait::async_trait;
use base64::Engine as _;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;

use super::retry::retry_transient;
use super::traits::{AccountId, BlockHash, ChainError, ChainResult, ChainStateGateway, PublicKey};

/// JSON-RPC gateway to a chain endpoint.
#[derive(Clone)]
pub struct JsonRpcGateway {
    http: reqwest::Client,
    url: String,
    request_timeout: Duration,
}

impl JsonRpcGateway {
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            request_timeout,
        }
    }

    /// One JSON-RPC 2.0 round trip, returning the `result` value.
    async fn call(&self, method: &str, params: Value) -> ChainResult<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": "daotx",
            "method": method,
            "params": params,
        });

        tracing::debug!(%method, url = %self.url, "chain rpc call");

        let response = timeout(self.request_timeout, self.http.post(&self.url).json(&body).send())
            .await
            .map_err(|_| ChainError::Timeout(self.request_timeout))?
            .map_err(classify_reqwest_error)?;

        let envelope: Value = timeout(self.request_timeout, response.json())
            .await
            .map_err(|_| ChainError::Timeout(self.request_timeout))?
            .map_err(classify_reqwest_error)?;

        if let Some(err) = envelope.get("error") {
            let code = err.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown rpc error")
                .to_string();
            return Err(ChainError::Rpc { code, message });
        }

        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| ChainError::Protocol("rpc response missing result".into()))
    }

    async fn call_with_retry(&self, method: &str, params: Value) -> ChainResult<Value> {
        retry_transient(
            || self.call(method, params.clone()),
            ChainError::is_transient,
        )
        .await
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> ChainError {
    if e.is_timeout() {
        ChainError::Timeout(Duration::ZERO)
    } else if e.is_decode() {
        ChainError::Protocol(format!("undecodable rpc response: {e}"))
    } else {
        ChainError::Network(e.to_string())
    }
}

#[async_trait]
impl ChainStateGateway for JsonRpcGateway {
    async fn latest_block_hash(&self) -> ChainResult<BlockHash> {
        let result = self.call_with_retry("status", json!([])).await?;
        let hash = result
            .pointer("/sync_info/latest_block_hash")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ChainError::Protocol("status response missing sync_info.latest_block_hash".into())
            })?;
        BlockHash::from_base58(hash)
    }

    async fn access_key_nonce(
        &self,
        account: &AccountId,
        public_key: &PublicKey,
    ) -> ChainResult<u64> {
        let params = json!({
            "request_type": "view_access_key",
            "finality": "final",
            "account_id": account,
            "public_key": public_key,
        });
        let result = self.call_with_retry("query", params).await?;

        // A missing key is reported inside the result body, not as an
        // rpc error object.
        if let Some(err) = result.get("error").and_then(Value::as_str) {
            return Err(ChainError::Protocol(format!("view_access_key failed: {err}")));
        }

        result
            .get("nonce")
            .and_then(Value::as_u64)
            .ok_or_else(|| ChainError::Protocol("view_access_key response missing nonce".into()))
    }

    async fn view_contract(
        &self,
        contract: &AccountId,
        method: &str,
        args: &Value,
    ) -> ChainResult<Vec<u8>> {
        let args_base64 =
            base64::engine::general_purpose::STANDARD.encode(serde_json::to_vec(args).map_err(
                |e| ChainError::Protocol(format!("unencodable view-call args: {e}")),
            )?);

        let params = json!({
            "request_type": "call_function",
            "finality": "final",
            "account_id": contract,
            "method_name": method,
            "args_base64": args_base64,
        });
        let result = self.call_with_retry("query", params).await?;

        if let Some(err) = result.get("error").and_then(Value::as_str) {
            return Err(ChainError::Protocol(format!(
                "call_function {method} on {contract} failed: {err}"
            )));
        }

        let bytes = result
            .get("result")
            .and_then(Value::as_array)
            .ok_or_else(|| ChainError::Protocol("call_function response missing result".into()))?;

        bytes
            .iter()
            .map(|v| {
                v.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| ChainError::Protocol("non-byte value in call result".into()))
            })
            .collect()
    }
}
