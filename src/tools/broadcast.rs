use crate::error::ToolError;
use crate::ports::ToolContext;
use tracing::{info, warn};

/// Broadcast a signed, base64-encoded transaction with a bounded number of
/// resend attempts on transient failure.
pub async fn broadcast_with_retry(
    ctx: &ToolContext,
    tx_base64: &str,
    skip_preflight: bool,
) -> Result<String, ToolError> {
    let attempts = ctx.confirm.broadcast_attempts.max(1);
    let mut last_error = None;
    for attempt in 1..=attempts {
        match ctx.rpc.send_transaction(tx_base64, skip_preflight).await {
            Ok(signature) => {
                info!(%signature, attempt, "transaction broadcast");
                return Ok(signature);
            }
            Err(e) => {
                warn!(attempt, error = %e, "broadcast attempt failed");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| ToolError::Upstream("broadcast failed".into())))
}

/// Poll for confirmation of a broadcast signature until the policy's
/// attempts run out.
pub async fn await_confirmation(ctx: &ToolContext, signature: &str) -> Result<(), ToolError> {
    for _ in 0..ctx.confirm.poll_attempts.max(1) {
        if ctx.rpc.signature_confirmed(signature).await? {
            info!(%signature, "transaction confirmed");
            return Ok(());
        }
        tokio::time::sleep(ctx.confirm.poll_interval).await;
    }
    Err(ToolError::ConfirmationTimeout(signature.to_string()))
}
