use crate::error::ToolError;
use crate::ports::ChainRpc;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use tracing::debug;
use url::Url;

/// JSON-RPC client for a Solana node. Balance reads, blockhash fetch and
/// transaction broadcast/confirmation, nothing else.
#[derive(Clone)]
pub struct SolanaRpcClient {
    http: reqwest::Client,
    url: Url,
}

impl SolanaRpcClient {
    pub fn new(rpc_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            url: Url::parse(rpc_url)?,
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, ToolError> {
        debug!(method, "rpc call");
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response: Value = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = response.get("error") {
            let message = err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown RPC error");
            return Err(ToolError::Upstream(format!("{}: {}", method, message)));
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| ToolError::Upstream(format!("{}: empty response", method)))
    }
}

#[async_trait::async_trait]
impl ChainRpc for SolanaRpcClient {
    async fn lamport_balance(&self, owner: &Pubkey) -> Result<u64, ToolError> {
        let result = self
            .call("getBalance", json!([owner.to_string()]))
            .await?;
        result
            .get("value")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ToolError::Upstream("getBalance: malformed response".into()))
    }

    async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<Decimal, ToolError> {
        let result = self
            .call(
                "getTokenAccountsByOwner",
                json!([
                    owner.to_string(),
                    { "mint": mint.to_string() },
                    { "encoding": "jsonParsed" }
                ]),
            )
            .await?;

        let accounts = result
            .get("value")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                ToolError::Upstream("getTokenAccountsByOwner: malformed response".into())
            })?;

        // An owner can hold several accounts for the same mint; sum them.
        let mut total = Decimal::ZERO;
        for account in accounts {
            let amount = account
                .pointer("/account/data/parsed/info/tokenAmount/uiAmountString")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    ToolError::Upstream("getTokenAccountsByOwner: missing token amount".into())
                })?;
            total += Decimal::from_str(amount)
                .map_err(|e| ToolError::Upstream(format!("bad token amount: {}", e)))?;
        }
        Ok(total)
    }

    async fn latest_blockhash(&self) -> Result<Hash, ToolError> {
        let result = self
            .call("getLatestBlockhash", json!([{ "commitment": "finalized" }]))
            .await?;
        let blockhash = result
            .pointer("/value/blockhash")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::Upstream("getLatestBlockhash: malformed response".into()))?;
        Hash::from_str(blockhash)
            .map_err(|e| ToolError::Upstream(format!("bad blockhash: {}", e)))
    }

    async fn send_transaction(
        &self,
        tx_base64: &str,
        skip_preflight: bool,
    ) -> Result<String, ToolError> {
        let result = self
            .call(
                "sendTransaction",
                json!([tx_base64, { "encoding": "base64", "skipPreflight": skip_preflight }]),
            )
            .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ToolError::Upstream("sendTransaction: malformed response".into()))
    }

    async fn signature_confirmed(&self, signature: &str) -> Result<bool, ToolError> {
        let result = self
            .call("getSignatureStatuses", json!([[signature]]))
            .await?;
        let status = result.pointer("/value/0").cloned().unwrap_or(Value::Null);
        if status.is_null() {
            return Ok(false);
        }
        if let Some(err) = status.get("err") {
            if !err.is_null() {
                return Err(ToolError::Upstream(format!(
                    "transaction {} failed on chain: {}",
                    signature, err
                )));
            }
        }
        let confirmation = status
            .get("confirmationStatus")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        Ok(confirmation == "confirmed" || confirmation == "finalized")
    }
}
