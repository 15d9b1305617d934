use crate::dispatch::{BatchOutcome, Dispatcher};
use crate::format::ResponseFormatter;
use crate::ports::ToolContext;
use crate::tools::{swap, transfer, ToolCall};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{self, BufRead};
use tracing::{debug, error, info};

#[derive(Serialize, Deserialize, Debug)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Option<Value>,
    id: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug)]
struct JsonRpcResponse {
    jsonrpc: String,
    result: Option<Value>,
    error: Option<JsonRpcError>,
    id: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug)]
struct JsonRpcError {
    code: i32,
    message: String,
    data: Option<Value>,
}

impl JsonRpcResponse {
    fn ok(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            result: Some(result),
            error: None,
            id,
        }
    }

    fn err(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
            id,
        }
    }
}

pub async fn run(ctx: ToolContext, formatter: ResponseFormatter) -> Result<()> {
    let dispatcher = Dispatcher::new();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    info!("SolMate wallet server ready. Waiting for JSON-RPC requests on stdin...");

    while let Some(Ok(line)) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }

        debug!("Received request: {}", line);

        let req: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                continue;
            }
        };

        let response = handle_request(&req, &dispatcher, &formatter, &ctx).await;

        let response_str = serde_json::to_string(&response)?;
        println!("{}", response_str);
    }

    ctx.tracker.shutdown().await;
    Ok(())
}

async fn handle_request(
    req: &JsonRpcRequest,
    dispatcher: &Dispatcher,
    formatter: &ResponseFormatter,
    ctx: &ToolContext,
) -> JsonRpcResponse {
    match req.method.as_str() {
        "tools/list" => {
            let tool_list: Vec<Value> = dispatcher
                .catalog()
                .definitions()
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "inputSchema": t.parameters,
                    })
                })
                .collect();
            JsonRpcResponse::ok(req.id.clone(), json!({ "tools": tool_list }))
        }
        "tools/call" => {
            let Some(params) = &req.params else {
                return JsonRpcResponse::err(req.id.clone(), -32602, "Missing params".into());
            };
            let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
                return JsonRpcResponse::err(
                    req.id.clone(),
                    -32602,
                    "Missing 'name' parameter".into(),
                );
            };
            let call = ToolCall {
                name: name.to_string(),
                arguments: params.get("arguments").cloned().unwrap_or(json!({})),
            };
            respond(req, dispatcher, formatter, ctx, vec![call]).await
        }
        "tools/call_batch" => {
            let calls: Vec<ToolCall> = match req
                .params
                .as_ref()
                .and_then(|p| p.get("calls"))
                .map(|c| serde_json::from_value(c.clone()))
            {
                Some(Ok(calls)) => calls,
                _ => {
                    return JsonRpcResponse::err(
                        req.id.clone(),
                        -32602,
                        "Missing or malformed 'calls' parameter".into(),
                    )
                }
            };
            respond(req, dispatcher, formatter, ctx, calls).await
        }
        "wallet/execute" => handle_wallet_execute(req, ctx).await,
        _ => JsonRpcResponse::err(req.id.clone(), -32601, "Method not found".into()),
    }
}

async fn respond(
    req: &JsonRpcRequest,
    dispatcher: &Dispatcher,
    formatter: &ResponseFormatter,
    ctx: &ToolContext,
    calls: Vec<ToolCall>,
) -> JsonRpcResponse {
    let outcome = dispatcher.execute_batch(ctx, &calls).await;

    // A lone failed call maps to a plain JSON-RPC error so thin clients
    // need not inspect the result array.
    if calls.len() == 1 {
        if let BatchOutcome::Batch(results) = &outcome {
            if let Some(message) = results.first().and_then(|r| r.error.clone()) {
                return JsonRpcResponse::err(
                    req.id.clone(),
                    -32603,
                    format!("Tool execution failed: {}", message),
                );
            }
        }
    }

    match formatter.format(&outcome).await {
        // Hybrid shape: conversational 'content' plus raw 'data' for agents.
        Ok(reply) => JsonRpcResponse::ok(
            req.id.clone(),
            json!({
                "content": [{ "type": "text", "text": reply.content }],
                "role": reply.role,
                "data": outcome.to_wire(),
            }),
        ),
        Err(e) => {
            JsonRpcResponse::err(req.id.clone(), -32603, format!("Formatting failed: {}", e))
        }
    }
}

async fn handle_wallet_execute(req: &JsonRpcRequest, ctx: &ToolContext) -> JsonRpcResponse {
    let Some(params) = &req.params else {
        return JsonRpcResponse::err(req.id.clone(), -32602, "Missing params".into());
    };

    let outcome = match params.get("type").and_then(|v| v.as_str()) {
        Some("PENDING_TRANSACTION") => {
            let recipient = params.get("recipient").and_then(|v| v.as_str());
            let lamports = params.get("lamports").and_then(|v| v.as_u64());
            match (recipient, lamports) {
                (Some(recipient), Some(lamports)) => {
                    transfer::execute_transfer(ctx, recipient, lamports).await
                }
                _ => {
                    return JsonRpcResponse::err(
                        req.id.clone(),
                        -32602,
                        "Pending transfer needs 'recipient' and 'lamports'".into(),
                    )
                }
            }
        }
        Some("PENDING_SWAP") => match params.get("quote") {
            Some(quote) => swap::execute_swap(ctx, quote).await,
            None => {
                return JsonRpcResponse::err(
                    req.id.clone(),
                    -32602,
                    "Pending swap needs 'quote'".into(),
                )
            }
        },
        _ => {
            return JsonRpcResponse::err(
                req.id.clone(),
                -32602,
                "Unknown pending transaction type".into(),
            )
        }
    };

    match outcome {
        Ok(result) => JsonRpcResponse::ok(req.id.clone(), result),
        Err(e) => JsonRpcResponse::err(req.id.clone(), -32603, e.to_string()),
    }
}
