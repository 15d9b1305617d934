use crate::catalog::ToolCatalog;
use crate::error::ToolError;
use crate::ports::ToolContext;
use crate::tools::{
    balance, price, swap, track, transfer, ToolCall, ToolCallResult, ToolRequest,
};
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

/// What a batch resolves to. A batch of exactly one successful call is
/// unwrapped to its raw result so single-tool conversational replies stay
/// simple; anything else keeps the structured per-call array.
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    Single { tool: String, result: Value },
    Batch(Vec<ToolCallResult>),
}

impl BatchOutcome {
    /// Wire shape: the unwrapped value, or the result array.
    pub fn to_wire(&self) -> Value {
        match self {
            BatchOutcome::Single { result, .. } => result.clone(),
            BatchOutcome::Batch(results) => {
                serde_json::to_value(results).unwrap_or(Value::Null)
            }
        }
    }
}

/// Routes validated tool calls to their operations. Each call runs inside
/// its own error boundary: a failing call becomes an error entry in the
/// batch, never a crashed sibling or request handler.
pub struct Dispatcher {
    catalog: ToolCatalog,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            catalog: ToolCatalog::new(),
        }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Execute a batch concurrently. Results are joined positionally, so
    /// output order always matches input order regardless of which call
    /// finishes first.
    pub async fn execute_batch(&self, ctx: &ToolContext, calls: &[ToolCall]) -> BatchOutcome {
        let results = join_all(calls.iter().map(|call| self.execute_one(ctx, call))).await;

        if results.len() == 1 && results[0].error.is_none() {
            let only = results.into_iter().next().expect("len checked");
            return BatchOutcome::Single {
                tool: only.tool,
                result: only.result.expect("success has a result"),
            };
        }
        BatchOutcome::Batch(results)
    }

    async fn execute_one(&self, ctx: &ToolContext, call: &ToolCall) -> ToolCallResult {
        debug!(tool = %call.name, "resolving tool call");
        match self.resolve(ctx, call).await {
            Ok(result) => ToolCallResult::ok(&call.name, result),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool call failed");
                ToolCallResult::err(&call.name, e.to_string())
            }
        }
    }

    async fn resolve(&self, ctx: &ToolContext, call: &ToolCall) -> Result<Value, ToolError> {
        // Catalog membership first: an unknown name is never parsed further.
        if !self.catalog.contains(&call.name) {
            return Err(ToolError::UnknownTool(call.name.clone()));
        }

        // Validation happens entirely inside `parse`; no operation runs,
        // and no external call is made, until it succeeds.
        let request = ToolRequest::parse(call)?;
        match request {
            ToolRequest::CheckBalance(args) => balance::check_balance(ctx, &args).await,
            ToolRequest::TransferSol(args) => transfer::transfer_sol(ctx, &args).await,
            ToolRequest::SwapTokens(args) => swap::swap_tokens(ctx, &args).await,
            ToolRequest::CheckCryptoPrice(args) => price::check_crypto_price(ctx, &args).await,
            ToolRequest::TrackCryptoPrice(args) => track::track_crypto_price(ctx, &args).await,
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
