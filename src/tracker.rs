//! Standing price watches.
//!
//! One poller task per distinct symbol, however many targets are registered
//! for it. Targets are one-shot: a hit emits a single alert and removes the
//! target. Removing the last target for a symbol stops its poller, so no
//! timer outlives the watches that need it.

use crate::error::ToolError;
use crate::ports::PriceFeed;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Above,
    Below,
}

impl Condition {
    pub fn parse(s: &str) -> Result<Self, ToolError> {
        match s.to_lowercase().as_str() {
            "above" => Ok(Condition::Above),
            "below" => Ok(Condition::Below),
            other => Err(ToolError::InvalidCondition(other.to_string())),
        }
    }

    fn met(&self, price: Decimal, target: Decimal) -> bool {
        match self {
            Condition::Above => price >= target,
            Condition::Below => price <= target,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceTarget {
    pub id: u64,
    pub price: Decimal,
    pub condition: Condition,
    pub volatility_threshold: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceAlert {
    TargetHit {
        symbol: String,
        target_id: u64,
        target_price: Decimal,
        price: Decimal,
        condition: Condition,
    },
    Volatility {
        symbol: String,
        target_id: u64,
        change_percent: Decimal,
        price: Decimal,
    },
}

struct SymbolWatch {
    targets: Vec<PriceTarget>,
    last_price: Option<Decimal>,
    poller: JoinHandle<()>,
}

struct Inner {
    feed: Arc<dyn PriceFeed>,
    poll_interval: Duration,
    alerts: mpsc::UnboundedSender<PriceAlert>,
    watches: Mutex<HashMap<String, SymbolWatch>>,
    next_id: AtomicU64,
}

/// Service object owning the symbol → watch map and its poller tasks.
/// Injected into the tool context; the hosting process calls [`shutdown`]
/// (or drops the tracker) when it exits.
///
/// [`shutdown`]: PriceTracker::shutdown
pub struct PriceTracker {
    inner: Arc<Inner>,
}

impl PriceTracker {
    pub fn new(
        feed: Arc<dyn PriceFeed>,
        poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<PriceAlert>) {
        let (alerts, receiver) = mpsc::unbounded_channel();
        let tracker = Self {
            inner: Arc::new(Inner {
                feed,
                poll_interval,
                alerts,
                watches: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        };
        (tracker, receiver)
    }

    /// Register a target, spawning the symbol's poller if it is the first.
    /// Returns the target id used for removal.
    pub async fn add_target(
        &self,
        symbol: &str,
        price: Decimal,
        condition: Condition,
        volatility_threshold: Option<Decimal>,
    ) -> u64 {
        let symbol = symbol.to_uppercase();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let target = PriceTarget {
            id,
            price,
            condition,
            volatility_threshold,
        };

        let mut watches = self.inner.watches.lock().await;
        match watches.entry(symbol.clone()) {
            Entry::Occupied(mut entry) => entry.get_mut().targets.push(target),
            Entry::Vacant(entry) => {
                info!(%symbol, "starting price poller");
                let poller = tokio::spawn(poll_symbol(self.inner.clone(), symbol.clone()));
                entry.insert(SymbolWatch {
                    targets: vec![target],
                    last_price: None,
                    poller,
                });
            }
        }
        id
    }

    /// Remove one target. Stops the symbol's poller when it was the last.
    pub async fn remove_target(&self, symbol: &str, id: u64) -> bool {
        let symbol = symbol.to_uppercase();
        let mut watches = self.inner.watches.lock().await;
        let Some(watch) = watches.get_mut(&symbol) else {
            return false;
        };
        let before = watch.targets.len();
        watch.targets.retain(|t| t.id != id);
        let removed = watch.targets.len() < before;
        if watch.targets.is_empty() {
            if let Some(watch) = watches.remove(&symbol) {
                info!(%symbol, "stopping price poller");
                watch.poller.abort();
            }
        }
        removed
    }

    pub async fn is_polling(&self, symbol: &str) -> bool {
        self.inner
            .watches
            .lock()
            .await
            .contains_key(&symbol.to_uppercase())
    }

    pub async fn target_count(&self, symbol: &str) -> usize {
        self.inner
            .watches
            .lock()
            .await
            .get(&symbol.to_uppercase())
            .map(|w| w.targets.len())
            .unwrap_or(0)
    }

    /// Abort every poller and drop all watches.
    pub async fn shutdown(&self) {
        let mut watches = self.inner.watches.lock().await;
        for (symbol, watch) in watches.drain() {
            info!(%symbol, "stopping price poller");
            watch.poller.abort();
        }
    }
}

async fn poll_symbol(inner: Arc<Inner>, symbol: String) {
    let mut ticker = tokio::time::interval(inner.poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let price = match inner.feed.price_usd(&symbol).await {
            Ok(price) => price,
            Err(e) => {
                warn!(%symbol, error = %e, "price poll failed");
                continue;
            }
        };
        if !evaluate(&inner, &symbol, price).await {
            break;
        }
    }
}

/// Check one fresh sample against the symbol's targets. Returns `false`
/// when no targets remain and the poller should exit.
async fn evaluate(inner: &Inner, symbol: &str, price: Decimal) -> bool {
    let mut watches = inner.watches.lock().await;
    let Some(watch) = watches.get_mut(symbol) else {
        // Removed concurrently; nothing left to poll for.
        return false;
    };

    if let Some(last) = watch.last_price {
        if last > Decimal::ZERO {
            let change = ((price - last) / last * Decimal::ONE_HUNDRED).abs();
            for target in &watch.targets {
                if let Some(threshold) = target.volatility_threshold {
                    if change >= threshold {
                        let _ = inner.alerts.send(PriceAlert::Volatility {
                            symbol: symbol.to_string(),
                            target_id: target.id,
                            change_percent: change,
                            price,
                        });
                    }
                }
            }
        }
    }

    let (hit, remaining): (Vec<_>, Vec<_>) = watch
        .targets
        .drain(..)
        .partition(|t| t.condition.met(price, t.price));
    for target in hit {
        info!(%symbol, target_id = target.id, %price, "price target hit");
        let _ = inner.alerts.send(PriceAlert::TargetHit {
            symbol: symbol.to_string(),
            target_id: target.id,
            target_price: target.price,
            price,
            condition: target.condition,
        });
    }
    watch.targets = remaining;
    watch.last_price = Some(price);

    if watch.targets.is_empty() {
        watches.remove(symbol);
        false
    } else {
        true
    }
}
