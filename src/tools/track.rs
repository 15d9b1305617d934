use super::TrackCryptoPriceArgs;
use crate::error::ToolError;
use crate::ports::ToolContext;
use crate::tracker::Condition;
use serde_json::{json, Value};

/// Register a standing price watch with the tracker service. The returned
/// target id can be used to cancel the watch later.
pub async fn track_crypto_price(
    ctx: &ToolContext,
    args: &TrackCryptoPriceArgs,
) -> Result<Value, ToolError> {
    let target_id = ctx
        .tracker
        .add_target(
            &args.symbol,
            args.target_price,
            args.condition,
            args.volatility_threshold,
        )
        .await;

    let direction = match args.condition {
        Condition::Above => "rises to",
        Condition::Below => "falls to",
    };
    Ok(json!({
        "status": "tracking",
        "symbol": args.symbol,
        "target_id": target_id,
        "target_price": args.target_price,
        "condition": args.condition,
        "message": format!(
            "Watching {}. You'll be alerted when the price {} ${}.",
            args.symbol, direction, args.target_price.normalize()
        ),
    }))
}
