use super::CheckBalanceArgs;
use crate::error::ToolError;
use crate::ports::ToolContext;
use crate::tokens;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Live portfolio read: SOL and USDC balances plus USD values. No caching,
/// every call hits the RPC node and the price feed.
pub async fn check_balance(ctx: &ToolContext, args: &CheckBalanceArgs) -> Result<Value, ToolError> {
    let usdc_mint = Pubkey::from_str(tokens::USDC.mint)
        .map_err(|e| ToolError::Upstream(format!("bad USDC mint constant: {}", e)))?;

    let lamports = ctx.rpc.lamport_balance(&args.address).await?;
    let usdc = ctx.rpc.token_balance(&args.address, &usdc_mint).await?;
    let sol_price = ctx.prices.price_usd("SOL").await?;

    let sol = Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL);
    let sol_value = sol * sol_price;
    let total = sol_value + usdc;

    let summary = format!(
        "Wallet {} holds {:.2} SOL (${:.2}) and {:.2} USDC, worth ${:.2} in total.",
        args.address, sol, sol_value, usdc, total
    );

    Ok(json!({
        "address": args.address.to_string(),
        "sol_balance": format!("{:.2}", sol),
        "sol_price_usd": sol_price,
        "sol_value_usd": format!("{:.2}", sol_value),
        "usdc_balance": format!("{:.2}", usdc),
        "total_value_usd": format!("{:.2}", total),
        "summary": summary,
    }))
}
