use super::CheckCryptoPriceArgs;
use crate::error::ToolError;
use crate::ports::ToolContext;
use serde_json::{json, Value};

/// Current USD price for a symbol, served from the short-TTL cache when a
/// fresh sample exists. Rate limiting upstream surfaces as its own error so
/// the user is told to retry rather than shown a generic failure.
pub async fn check_crypto_price(
    ctx: &ToolContext,
    args: &CheckCryptoPriceArgs,
) -> Result<Value, ToolError> {
    let symbol = args.symbol.clone();

    if let Some(price) = ctx.price_cache.get(&symbol).await {
        return Ok(render(&symbol, price, true));
    }

    let price = ctx.prices.price_usd(&symbol).await?;
    ctx.price_cache.put(&symbol, price).await;
    Ok(render(&symbol, price, false))
}

fn render(symbol: &str, price: rust_decimal::Decimal, cached: bool) -> Value {
    json!({
        "symbol": symbol,
        "price_usd": price,
        "cached": cached,
        "message": format!("{} is trading at ${:.2}.", symbol, price),
    })
}
