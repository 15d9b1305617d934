use crate::error::ToolError;
use crate::ports::PriceFeed;
use reqwest::StatusCode;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Market-data client against a CoinGecko-style HTTP API.
///
/// A 429 from upstream is surfaced as `RateLimitExceeded` so the user gets a
/// "try again shortly" message instead of a generic failure.
pub struct CoinGeckoFeed {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoFeed {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn coin_id(symbol: &str) -> String {
        match symbol {
            "SOL" => "solana".into(),
            "BTC" => "bitcoin".into(),
            "ETH" => "ethereum".into(),
            "USDC" => "usd-coin".into(),
            other => other.to_lowercase(),
        }
    }
}

#[async_trait::async_trait]
impl PriceFeed for CoinGeckoFeed {
    async fn price_usd(&self, symbol: &str) -> Result<Decimal, ToolError> {
        let symbol = symbol.to_uppercase();
        let id = Self::coin_id(&symbol);
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url, id
        );

        let response = self.http.get(&url).send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ToolError::RateLimitExceeded(symbol));
        }
        if !response.status().is_success() {
            return Err(ToolError::Upstream(format!(
                "price API returned HTTP {} for {}",
                response.status(),
                symbol
            )));
        }

        let body: Value = response.json().await?;
        let price = body
            .pointer(&format!("/{}/usd", id))
            .and_then(|v| v.as_f64())
            .and_then(Decimal::from_f64)
            .ok_or_else(|| ToolError::Upstream(format!("no USD price for {}", symbol)))?;
        Ok(price)
    }
}

/// Short-TTL cache in front of the price feed, used only by the
/// `checkCryptoPrice` tool to absorb bursts of repeated lookups.
/// Balance lookups always read live.
pub struct PriceCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Decimal, Instant)>>,
}

pub const PRICE_CACHE_TTL: Duration = Duration::from_secs(60);

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, symbol: &str) -> Option<Decimal> {
        let entries = self.entries.lock().await;
        match entries.get(symbol) {
            Some((price, at)) if at.elapsed() < self.ttl => {
                debug!(symbol, "price cache hit");
                Some(*price)
            }
            _ => None,
        }
    }

    pub async fn put(&self, symbol: &str, price: Decimal) {
        let mut entries = self.entries.lock().await;
        entries.insert(symbol.to_string(), (price, Instant::now()));
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new(PRICE_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn cache_expires_after_ttl() {
        let cache = PriceCache::new(Duration::from_millis(20));
        cache.put("SOL", dec!(150)).await;
        assert_eq!(cache.get("SOL").await, Some(dec!(150)));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("SOL").await, None);
    }

    #[test]
    fn known_symbols_map_to_coin_ids() {
        assert_eq!(CoinGeckoFeed::coin_id("SOL"), "solana");
        assert_eq!(CoinGeckoFeed::coin_id("BTC"), "bitcoin");
        assert_eq!(CoinGeckoFeed::coin_id("PEPE"), "pepe");
    }
}
