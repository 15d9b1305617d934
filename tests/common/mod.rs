//! Counting fakes for every external capability, so dispatch semantics can
//! be asserted without a node, an aggregator or a wallet prompt.

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use solmate_wallet_mcp::error::ToolError;
use solmate_wallet_mcp::market::PriceCache;
use solmate_wallet_mcp::ports::{
    ChainRpc, ConfirmPolicy, LanguageModel, PriceFeed, SwapAggregator, SwapTransaction,
    ToolContext, WalletSigner,
};
use solmate_wallet_mcp::tracker::PriceTracker;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use solmate_wallet_mcp::tracker::PriceAlert;

pub struct FakeRpc {
    pub lamports: u64,
    pub token_balance: Decimal,
    pub read_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub fail_sends: AtomicUsize,
    pub confirm_immediately: bool,
}

impl Default for FakeRpc {
    fn default() -> Self {
        Self {
            lamports: 0,
            token_balance: Decimal::ZERO,
            read_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            fail_sends: AtomicUsize::new(0),
            confirm_immediately: true,
        }
    }
}

#[async_trait::async_trait]
impl ChainRpc for FakeRpc {
    async fn lamport_balance(&self, _owner: &Pubkey) -> Result<u64, ToolError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.lamports)
    }

    async fn token_balance(&self, _owner: &Pubkey, _mint: &Pubkey) -> Result<Decimal, ToolError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.token_balance)
    }

    async fn latest_blockhash(&self) -> Result<Hash, ToolError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Hash::default())
    }

    async fn send_transaction(
        &self,
        _tx_base64: &str,
        _skip_preflight: bool,
    ) -> Result<String, ToolError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.fail_sends.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_sends.store(remaining - 1, Ordering::SeqCst);
            return Err(ToolError::Upstream("node dropped the transaction".into()));
        }
        Ok("FakeSignature1111".into())
    }

    async fn signature_confirmed(&self, _signature: &str) -> Result<bool, ToolError> {
        Ok(self.confirm_immediately)
    }
}

/// Feed with fixed per-symbol prices, an optional scripted sequence, an
/// optional artificial delay per symbol and a global rate-limit switch.
pub struct FakeFeed {
    pub calls: AtomicUsize,
    prices: HashMap<String, Decimal>,
    sequence: Mutex<Vec<Decimal>>,
    delays: HashMap<String, Duration>,
    pub rate_limited: bool,
}

impl FakeFeed {
    pub fn with_prices(prices: &[(&str, Decimal)]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            prices: prices
                .iter()
                .map(|(s, p)| (s.to_string(), *p))
                .collect(),
            sequence: Mutex::new(Vec::new()),
            delays: HashMap::new(),
            rate_limited: false,
        }
    }

    /// Successive calls (any symbol) walk this sequence, repeating the last
    /// entry once exhausted.
    pub fn scripted(sequence: &[Decimal]) -> Self {
        let mut feed = Self::with_prices(&[]);
        *feed.sequence.lock().unwrap() = sequence.to_vec();
        feed
    }

    pub fn rate_limited() -> Self {
        let mut feed = Self::with_prices(&[]);
        feed.rate_limited = true;
        feed
    }

    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_string(), delay);
        self
    }
}

#[async_trait::async_trait]
impl PriceFeed for FakeFeed {
    async fn price_usd(&self, symbol: &str) -> Result<Decimal, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.rate_limited {
            return Err(ToolError::RateLimitExceeded(symbol.to_string()));
        }
        if let Some(delay) = self.delays.get(symbol) {
            tokio::time::sleep(*delay).await;
        }
        {
            let mut sequence = self.sequence.lock().unwrap();
            if !sequence.is_empty() {
                let price = sequence[0];
                if sequence.len() > 1 {
                    sequence.remove(0);
                }
                return Ok(price);
            }
        }
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| ToolError::Upstream(format!("no USD price for {}", symbol)))
    }
}

pub struct FakeAggregator {
    pub quote_calls: AtomicUsize,
    pub swap_calls: AtomicUsize,
    pub out_amount: u64,
}

impl FakeAggregator {
    pub fn quoting(out_amount: u64) -> Self {
        Self {
            quote_calls: AtomicUsize::new(0),
            swap_calls: AtomicUsize::new(0),
            out_amount,
        }
    }
}

#[async_trait::async_trait]
impl SwapAggregator for FakeAggregator {
    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u32,
    ) -> Result<Value, ToolError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({
            "inputMint": input_mint,
            "outputMint": output_mint,
            "inAmount": amount.to_string(),
            "outAmount": self.out_amount.to_string(),
            "slippageBps": slippage_bps,
            "routePlan": [],
        }))
    }

    async fn swap_transaction(
        &self,
        _quote: &Value,
        _user_public_key: &Pubkey,
    ) -> Result<SwapTransaction, ToolError> {
        self.swap_calls.fetch_add(1, Ordering::SeqCst);
        let tx = VersionedTransaction::default();
        Ok(SwapTransaction {
            swap_transaction: BASE64.encode(bincode::serialize(&tx).unwrap()),
            last_valid_block_height: 12345,
        })
    }
}

pub struct FakeWallet {
    pub pubkey: Pubkey,
    pub sign_calls: AtomicUsize,
    pub declines: bool,
}

impl Default for FakeWallet {
    fn default() -> Self {
        Self {
            pubkey: Pubkey::new_unique(),
            sign_calls: AtomicUsize::new(0),
            declines: false,
        }
    }
}

impl FakeWallet {
    pub fn declining() -> Self {
        Self {
            declines: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), ToolError> {
        if self.declines {
            Err(ToolError::UserDeclined("user rejected the request".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl WalletSigner for FakeWallet {
    async fn connect(&self) -> Result<Pubkey, ToolError> {
        Ok(self.pubkey)
    }

    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction, ToolError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(tx)
    }

    async fn sign_versioned_transaction(
        &self,
        tx: VersionedTransaction,
    ) -> Result<VersionedTransaction, ToolError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(tx)
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, ToolError> {
        self.check()?;
        Ok(message.to_vec())
    }
}

pub struct FakeLlm {
    pub calls: AtomicUsize,
    pub reply: String,
    pub last_system_prompt: Mutex<String>,
    pub fails: bool,
}

impl FakeLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: reply.to_string(),
            last_system_prompt: Mutex::new(String::new()),
            fails: false,
        }
    }

    pub fn failing() -> Self {
        let mut llm = Self::replying("");
        llm.fails = true;
        llm
    }
}

#[async_trait::async_trait]
impl LanguageModel for FakeLlm {
    async fn complete(
        &self,
        system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system_prompt.lock().unwrap() = system_prompt.to_string();
        if self.fails {
            return Err(ToolError::Llm("completion unavailable".into()));
        }
        Ok(self.reply.clone())
    }
}

pub struct TestHarness {
    pub rpc: Arc<FakeRpc>,
    pub feed: Arc<FakeFeed>,
    pub aggregator: Arc<FakeAggregator>,
    pub wallet: Arc<FakeWallet>,
    pub alerts: UnboundedReceiver<PriceAlert>,
    pub ctx: ToolContext,
}

/// Fast poll/confirm settings so tests never sit in real-time sleeps.
pub fn fast_confirm() -> ConfirmPolicy {
    ConfirmPolicy {
        broadcast_attempts: 3,
        poll_attempts: 3,
        poll_interval: Duration::from_millis(5),
    }
}

pub fn harness(
    rpc: FakeRpc,
    feed: FakeFeed,
    aggregator: FakeAggregator,
    wallet: FakeWallet,
) -> TestHarness {
    let rpc = Arc::new(rpc);
    let feed = Arc::new(feed);
    let aggregator = Arc::new(aggregator);
    let wallet = Arc::new(wallet);
    let (tracker, alerts) = PriceTracker::new(feed.clone(), Duration::from_millis(10));

    let ctx = ToolContext {
        rpc: rpc.clone(),
        prices: feed.clone(),
        aggregator: aggregator.clone(),
        wallet: wallet.clone(),
        tracker: Arc::new(tracker),
        price_cache: Arc::new(PriceCache::default()),
        network: "mainnet-beta".into(),
        confirm: fast_confirm(),
    };

    TestHarness {
        rpc,
        feed,
        aggregator,
        wallet,
        alerts,
        ctx,
    }
}

pub fn default_harness() -> TestHarness {
    harness(
        FakeRpc::default(),
        FakeFeed::with_prices(&[]),
        FakeAggregator::quoting(0),
        FakeWallet::default(),
    )
}
