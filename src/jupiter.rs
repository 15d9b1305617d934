use crate::error::ToolError;
use crate::ports::{SwapAggregator, SwapTransaction};
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

/// Client for a Jupiter-style swap aggregator.
///
/// The quote object is treated as an opaque blob: fetched by `quote`, handed
/// back verbatim to `swap_transaction`. Only the dispatcher's swap operation
/// reads individual fields out of it.
pub struct JupiterClient {
    http: reqwest::Client,
    base_url: String,
}

impl JupiterClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl SwapAggregator for JupiterClient {
    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u32,
    ) -> Result<Value, ToolError> {
        let url = format!(
            "{}/quote?inputMint={}&outputMint={}&amount={}&slippageBps={}",
            self.base_url, input_mint, output_mint, amount, slippage_bps
        );
        debug!(input_mint, output_mint, amount, "requesting swap quote");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::Upstream(format!(
                "quote request failed: HTTP {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    async fn swap_transaction(
        &self,
        quote: &Value,
        user_public_key: &Pubkey,
    ) -> Result<SwapTransaction, ToolError> {
        let url = format!("{}/swap", self.base_url);
        let body = json!({
            "quoteResponse": quote,
            "userPublicKey": user_public_key.to_string(),
        });

        let response = self.http.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::Upstream(format!(
                "swap build failed: HTTP {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }
}
