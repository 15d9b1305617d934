mod common;

use common::*;
use rust_decimal_macros::dec;
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use solmate_wallet_mcp::dispatch::{BatchOutcome, Dispatcher};
use solmate_wallet_mcp::tools::ToolCall;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        name: name.into(),
        arguments,
    }
}

fn batch(outcome: BatchOutcome) -> Vec<solmate_wallet_mcp::tools::ToolCallResult> {
    match outcome {
        BatchOutcome::Batch(results) => results,
        other => panic!("expected structured batch, got {:?}", other),
    }
}

// P1: no malformed input ever reaches an external system.
#[tokio::test]
async fn validation_failures_make_no_external_calls() {
    let h = default_harness();
    let dispatcher = Dispatcher::new();

    let bad_calls = vec![
        call("transferSol", json!({ "recipient": "not-an-address", "amount": 1 })),
        call("transferSol", json!({ "recipient": Pubkey::new_unique().to_string(), "amount": -1 })),
        call("swapTokens", json!({ "inputToken": "SOL", "outputToken": "SOL", "amount": 1 })),
        call("swapTokens", json!({ "inputToken": "SOL", "outputToken": "DOGE", "amount": 1 })),
        call("checkBalance", json!({ "address": "zzz" })),
        call("trackCryptoPrice", json!({ "symbol": "BTC", "targetPrice": 0, "condition": "above" })),
    ];

    let results = batch(dispatcher.execute_batch(&h.ctx, &bad_calls).await);
    assert!(results.iter().all(|r| r.error.is_some()));

    assert_eq!(h.rpc.read_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.aggregator.quote_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.feed.calls.load(Ordering::SeqCst), 0);
    assert!(!h.ctx.tracker.is_polling("BTC").await);
}

// P2: positional join, not completion order.
#[tokio::test]
async fn batch_results_preserve_input_order() {
    let feed = FakeFeed::with_prices(&[("SLOW", dec!(1)), ("FAST", dec!(2))])
        .with_delay("SLOW", Duration::from_millis(50));
    let h = harness(
        FakeRpc::default(),
        feed,
        FakeAggregator::quoting(0),
        FakeWallet::default(),
    );
    let dispatcher = Dispatcher::new();

    let calls = vec![
        call("checkCryptoPrice", json!({ "symbol": "SLOW" })),
        call("checkCryptoPrice", json!({ "symbol": "FAST" })),
    ];
    let results = batch(dispatcher.execute_batch(&h.ctx, &calls).await);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].result.as_ref().unwrap()["symbol"], "SLOW");
    assert_eq!(results[1].result.as_ref().unwrap()["symbol"], "FAST");
}

// P3: only a lone successful call is unwrapped.
#[tokio::test]
async fn single_success_unwraps_to_raw_result() {
    let h = harness(
        FakeRpc::default(),
        FakeFeed::with_prices(&[("SOL", dec!(150))]),
        FakeAggregator::quoting(0),
        FakeWallet::default(),
    );
    let dispatcher = Dispatcher::new();

    let calls = vec![call("checkCryptoPrice", json!({ "symbol": "SOL" }))];
    match dispatcher.execute_batch(&h.ctx, &calls).await {
        BatchOutcome::Single { tool, result } => {
            assert_eq!(tool, "checkCryptoPrice");
            assert_eq!(result["symbol"], "SOL");
        }
        other => panic!("expected unwrapped single result, got {:?}", other),
    }
}

#[tokio::test]
async fn single_failure_stays_structured() {
    let h = default_harness();
    let dispatcher = Dispatcher::new();

    let calls = vec![call("checkBalance", json!({ "address": "bogus" }))];
    let results = batch(dispatcher.execute_batch(&h.ctx, &calls).await);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].tool, "checkBalance");
    assert!(results[0].error.as_ref().unwrap().contains("Invalid address"));
}

#[tokio::test]
async fn multi_call_batch_stays_structured_even_when_all_succeed() {
    let h = harness(
        FakeRpc::default(),
        FakeFeed::with_prices(&[("SOL", dec!(150)), ("BTC", dec!(60000))]),
        FakeAggregator::quoting(0),
        FakeWallet::default(),
    );
    let dispatcher = Dispatcher::new();

    let calls = vec![
        call("checkCryptoPrice", json!({ "symbol": "SOL" })),
        call("checkCryptoPrice", json!({ "symbol": "BTC" })),
    ];
    let results = batch(dispatcher.execute_batch(&h.ctx, &calls).await);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.result.is_some()));
}

// P6: one failing call leaves its siblings untouched.
#[tokio::test]
async fn failed_call_is_isolated_within_its_batch() {
    let h = harness(
        FakeRpc {
            lamports: 2_000_000_000,
            token_balance: dec!(10),
            ..FakeRpc::default()
        },
        FakeFeed::with_prices(&[("SOL", dec!(100)), ("BTC", dec!(60000))]),
        FakeAggregator::quoting(0),
        FakeWallet::default(),
    );
    let dispatcher = Dispatcher::new();

    let calls = vec![
        call("checkCryptoPrice", json!({ "symbol": "BTC" })),
        call("swapTokens", json!({ "inputToken": "SOL", "outputToken": "SOL", "amount": 1 })),
        call("checkBalance", json!({ "address": Pubkey::new_unique().to_string() })),
    ];
    let results = batch(dispatcher.execute_batch(&h.ctx, &calls).await);

    assert_eq!(results.len(), 3);
    assert!(results[0].result.is_some());
    assert!(results[1].error.as_ref().unwrap().contains("Cannot swap same tokens"));
    assert!(results[2].result.is_some());
}

#[tokio::test]
async fn unknown_tool_fails_without_execution() {
    let h = default_harness();
    let dispatcher = Dispatcher::new();

    let calls = vec![call("mintNft", json!({ "anything": 1 }))];
    let results = batch(dispatcher.execute_batch(&h.ctx, &calls).await);
    assert!(results[0].error.as_ref().unwrap().contains("Unknown tool"));
    assert_eq!(h.rpc.read_calls.load(Ordering::SeqCst), 0);
}

// Scenario A: balance composition with mocked reads.
#[tokio::test]
async fn balance_summary_composes_usd_values() {
    let h = harness(
        FakeRpc {
            lamports: 1_500_000_000,
            token_balance: dec!(50),
            ..FakeRpc::default()
        },
        FakeFeed::with_prices(&[("SOL", dec!(100))]),
        FakeAggregator::quoting(0),
        FakeWallet::default(),
    );
    let dispatcher = Dispatcher::new();

    let calls = vec![call(
        "checkBalance",
        json!({ "address": Pubkey::new_unique().to_string() }),
    )];
    let result = match dispatcher.execute_batch(&h.ctx, &calls).await {
        BatchOutcome::Single { result, .. } => result,
        other => panic!("expected success, got {:?}", other),
    };

    let summary = result["summary"].as_str().unwrap();
    assert!(summary.contains("1.50"), "summary: {}", summary);
    assert!(summary.contains("50.00"), "summary: {}", summary);
    assert!(summary.contains("200.00"), "summary: {}", summary);
}

// Scenario B is covered by validation tests above; this checks the pending
// swap marker for a valid request.
#[tokio::test]
async fn valid_swap_returns_pending_marker_with_opaque_quote() {
    let h = harness(
        FakeRpc::default(),
        FakeFeed::with_prices(&[]),
        // 1 SOL in, 150 USDC out (6 decimals).
        FakeAggregator::quoting(150_000_000),
        FakeWallet::default(),
    );
    let dispatcher = Dispatcher::new();

    let calls = vec![call(
        "swapTokens",
        json!({ "inputToken": "SOL", "outputToken": "USDC", "amount": 1 }),
    )];
    let result = match dispatcher.execute_batch(&h.ctx, &calls).await {
        BatchOutcome::Single { result, .. } => result,
        other => panic!("expected success, got {:?}", other),
    };

    assert_eq!(result["type"], "PENDING_SWAP");
    assert_eq!(result["estimated_out"], "150");
    // The quote rides along untouched for the execution step.
    assert_eq!(result["quote"]["inAmount"], "1000000000");
    assert_eq!(h.aggregator.quote_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transfer_returns_pending_marker_without_touching_rpc() {
    let h = default_harness();
    let dispatcher = Dispatcher::new();

    let recipient = Pubkey::new_unique().to_string();
    let calls = vec![call(
        "transferSol",
        json!({ "recipient": recipient, "amount": 0.25 }),
    )];
    let result = match dispatcher.execute_batch(&h.ctx, &calls).await {
        BatchOutcome::Single { result, .. } => result,
        other => panic!("expected success, got {:?}", other),
    };

    assert_eq!(result["type"], "PENDING_TRANSACTION");
    assert_eq!(result["lamports"], 250_000_000u64);
    assert_eq!(result["recipient"], recipient.as_str());
    assert_eq!(h.rpc.read_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.rpc.send_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.wallet.sign_calls.load(Ordering::SeqCst), 0);
}

// P4: repeated lookups within the TTL hit upstream once.
#[tokio::test]
async fn price_lookups_within_ttl_hit_upstream_once() {
    let h = harness(
        FakeRpc::default(),
        FakeFeed::with_prices(&[("BTC", dec!(60000))]),
        FakeAggregator::quoting(0),
        FakeWallet::default(),
    );
    let dispatcher = Dispatcher::new();

    for _ in 0..2 {
        let calls = vec![call("checkCryptoPrice", json!({ "symbol": "BTC" }))];
        match dispatcher.execute_batch(&h.ctx, &calls).await {
            BatchOutcome::Single { result, .. } => assert_eq!(result["symbol"], "BTC"),
            other => panic!("expected success, got {:?}", other),
        }
    }
    assert_eq!(h.feed.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn upstream_rate_limit_is_a_distinct_error() {
    let h = harness(
        FakeRpc::default(),
        FakeFeed::rate_limited(),
        FakeAggregator::quoting(0),
        FakeWallet::default(),
    );
    let dispatcher = Dispatcher::new();

    let calls = vec![call("checkCryptoPrice", json!({ "symbol": "BTC" }))];
    let results = batch(dispatcher.execute_batch(&h.ctx, &calls).await);
    let error = results[0].error.as_ref().unwrap();
    assert!(error.contains("Rate limit exceeded"), "error: {}", error);
}
