//! Capability traits for every external system a tool operation touches.
//!
//! Operations only ever see these traits, injected through [`ToolContext`],
//! so the dispatcher can be exercised end to end with fakes: no RPC node,
//! no aggregator, no browser wallet.

use crate::error::ToolError;
use crate::market::PriceCache;
use crate::tracker::PriceTracker;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use std::sync::Arc;
use std::time::Duration;

/// Read and broadcast access to the chain, JSON-RPC under the hood.
#[async_trait::async_trait]
pub trait ChainRpc: Send + Sync {
    async fn lamport_balance(&self, owner: &Pubkey) -> Result<u64, ToolError>;

    /// Summed balance across the owner's token accounts for one mint,
    /// already scaled to a human amount.
    async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<Decimal, ToolError>;

    async fn latest_blockhash(&self) -> Result<Hash, ToolError>;

    /// Broadcast a base64-encoded signed transaction, returning its signature.
    async fn send_transaction(
        &self,
        tx_base64: &str,
        skip_preflight: bool,
    ) -> Result<String, ToolError>;

    /// One confirmation poll. `Ok(true)` once the signature is confirmed.
    async fn signature_confirmed(&self, signature: &str) -> Result<bool, ToolError>;
}

/// Market-data lookup. Implementations must map upstream HTTP 429 to
/// [`ToolError::RateLimitExceeded`].
#[async_trait::async_trait]
pub trait PriceFeed: Send + Sync {
    async fn price_usd(&self, symbol: &str) -> Result<Decimal, ToolError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
    pub swap_transaction: String,
    pub last_valid_block_height: u64,
}

/// Swap aggregator: quote retrieval and swap-transaction building.
/// The quote is opaque, it is passed back to `swap_transaction` unmodified.
#[async_trait::async_trait]
pub trait SwapAggregator: Send + Sync {
    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u32,
    ) -> Result<Value, ToolError>;

    async fn swap_transaction(
        &self,
        quote: &Value,
        user_public_key: &Pubkey,
    ) -> Result<SwapTransaction, ToolError>;
}

/// The user's wallet as an injected capability. Operations never hold key
/// material; they hand a constructed transaction to this trait and wait.
/// A declined prompt surfaces as [`ToolError::UserDeclined`].
#[async_trait::async_trait]
pub trait WalletSigner: Send + Sync {
    async fn connect(&self) -> Result<Pubkey, ToolError>;
    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction, ToolError>;
    async fn sign_versioned_transaction(
        &self,
        tx: VersionedTransaction,
    ) -> Result<VersionedTransaction, ToolError>;
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, ToolError>;
}

/// Secondary LLM used only by the response formatter.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, ToolError>;
}

/// Broadcast/confirmation bounds for transaction execution.
#[derive(Debug, Clone)]
pub struct ConfirmPolicy {
    pub broadcast_attempts: u32,
    pub poll_attempts: u32,
    pub poll_interval: Duration,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            broadcast_attempts: 3,
            poll_attempts: 30,
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Everything a tool operation may reach, assembled once at startup and
/// shared read-only across requests (the tracker owns its own interior
/// mutability).
#[derive(Clone)]
pub struct ToolContext {
    pub rpc: Arc<dyn ChainRpc>,
    pub prices: Arc<dyn PriceFeed>,
    pub aggregator: Arc<dyn SwapAggregator>,
    pub wallet: Arc<dyn WalletSigner>,
    pub tracker: Arc<PriceTracker>,
    pub price_cache: Arc<PriceCache>,
    pub network: String,
    pub confirm: ConfirmPolicy,
}
