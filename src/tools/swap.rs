use super::broadcast::{await_confirmation, broadcast_with_retry};
use super::SwapTokensArgs;
use crate::error::ToolError;
use crate::ports::ToolContext;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};
use solana_sdk::transaction::VersionedTransaction;

pub const DEFAULT_SLIPPAGE_BPS: u32 = 50;

/// Stage a token swap: normalize the human amount into base units, fetch a
/// quote from the aggregator and return a pending marker carrying the quote
/// opaquely plus human-readable amounts. Execution happens after wallet
/// approval in `execute_swap`.
pub async fn swap_tokens(ctx: &ToolContext, args: &SwapTokensArgs) -> Result<Value, ToolError> {
    let amount_in = args.input_token.to_base_units(args.amount)?;
    let quote = ctx
        .aggregator
        .quote(
            args.input_token.mint,
            args.output_token.mint,
            amount_in,
            DEFAULT_SLIPPAGE_BPS,
        )
        .await?;

    let out_amount = quote
        .get("outAmount")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| ToolError::Upstream("quote is missing outAmount".into()))?;
    let estimated_out = args.output_token.from_base_units(out_amount);

    Ok(json!({
        "type": "PENDING_SWAP",
        "input_token": args.input_token.symbol,
        "output_token": args.output_token.symbol,
        "amount_in": args.amount.normalize().to_string(),
        "estimated_out": estimated_out.normalize().to_string(),
        "quote": quote,
        "message": format!(
            "Swapping {} {} for an estimated {} {}. Approve in your wallet to continue.",
            args.amount.normalize(),
            args.input_token.symbol,
            estimated_out.normalize(),
            args.output_token.symbol
        ),
    }))
}

/// The approval step: hand the stored quote to the aggregator's swap-build
/// endpoint, decode the returned transaction, wallet-sign it and broadcast
/// with preflight skipped, then poll for confirmation.
pub async fn execute_swap(ctx: &ToolContext, quote: &Value) -> Result<Value, ToolError> {
    let user = ctx.wallet.connect().await?;
    let built = ctx.aggregator.swap_transaction(quote, &user).await?;

    let raw = BASE64
        .decode(&built.swap_transaction)
        .map_err(|e| ToolError::Upstream(format!("swap transaction is not base64: {}", e)))?;
    let tx: VersionedTransaction = bincode::deserialize(&raw)
        .map_err(|e| ToolError::Upstream(format!("swap transaction decode failed: {}", e)))?;

    let signed = ctx.wallet.sign_versioned_transaction(tx).await?;
    let encoded = BASE64.encode(
        bincode::serialize(&signed)
            .map_err(|e| ToolError::Upstream(format!("transaction encoding failed: {}", e)))?,
    );

    let signature = broadcast_with_retry(ctx, &encoded, true).await?;
    await_confirmation(ctx, &signature).await?;

    Ok(json!({
        "status": "confirmed",
        "signature": signature,
        "last_valid_block_height": built.last_valid_block_height,
        "message": "Swap confirmed.",
    }))
}
