use serde::Serialize;
use serde_json::{json, Value};

/// Declarative descriptor of one tool, serialized into the LLM request as a
/// function-calling schema. No runtime behavior lives here.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// The closed set of operations the assistant can perform. Built once at
/// startup and shared read-only.
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self {
            tools: vec![
                check_balance(),
                transfer_sol(),
                swap_tokens(),
                check_crypto_price(),
                track_crypto_price(),
            ],
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// OpenAI-style function schemas for the LLM request.
    pub fn function_schemas(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn check_balance() -> ToolDefinition {
    ToolDefinition {
        name: "checkBalance",
        description: "Check the SOL and USDC balance of a Solana wallet, with USD values",
        parameters: json!({
            "type": "object",
            "properties": {
                "address": {
                    "type": "string",
                    "description": "The Solana wallet address to check"
                }
            },
            "required": ["address"]
        }),
    }
}

fn transfer_sol() -> ToolDefinition {
    ToolDefinition {
        name: "transferSol",
        description: "Prepare a SOL transfer for the user to approve in their wallet",
        parameters: json!({
            "type": "object",
            "properties": {
                "recipient": {
                    "type": "string",
                    "description": "The recipient's Solana wallet address"
                },
                "amount": {
                    "type": "number",
                    "description": "Amount of SOL to send"
                }
            },
            "required": ["recipient", "amount"]
        }),
    }
}

fn swap_tokens() -> ToolDefinition {
    ToolDefinition {
        name: "swapTokens",
        description: "Get a swap quote between two supported tokens and prepare the swap",
        parameters: json!({
            "type": "object",
            "properties": {
                "inputToken": {
                    "type": "string",
                    "description": "Token to swap from",
                    "enum": ["SOL", "USDC"]
                },
                "outputToken": {
                    "type": "string",
                    "description": "Token to swap to",
                    "enum": ["SOL", "USDC"]
                },
                "amount": {
                    "type": "number",
                    "description": "Amount of the input token to swap"
                }
            },
            "required": ["inputToken", "outputToken", "amount"]
        }),
    }
}

fn check_crypto_price() -> ToolDefinition {
    ToolDefinition {
        name: "checkCryptoPrice",
        description: "Look up the current USD price of a cryptocurrency",
        parameters: json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Ticker symbol, e.g. SOL or BTC"
                }
            },
            "required": ["symbol"]
        }),
    }
}

fn track_crypto_price() -> ToolDefinition {
    ToolDefinition {
        name: "trackCryptoPrice",
        description: "Watch a cryptocurrency price and alert when it crosses a target",
        parameters: json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Ticker symbol to watch"
                },
                "targetPrice": {
                    "type": "number",
                    "description": "Price level to alert at, in USD"
                },
                "condition": {
                    "type": "string",
                    "description": "Alert when the price is at or above/below the target",
                    "enum": ["above", "below"]
                },
                "volatilityThreshold": {
                    "type": "number",
                    "description": "Optional percent move between samples that also triggers an alert"
                }
            },
            "required": ["symbol", "targetPrice", "condition"]
        }),
    }
}
