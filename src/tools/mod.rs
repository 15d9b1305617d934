pub mod balance;
pub mod broadcast;
pub mod price;
pub mod swap;
pub mod track;
pub mod transfer;

use crate::error::ToolError;
use crate::tokens::{self, Token};
use crate::tracker::Condition;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// One structured operation request produced by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Outcome of one resolved call. Exactly one of `result`/`error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolCallResult {
    pub fn ok(tool: &str, result: Value) -> Self {
        Self {
            tool: tool.to_string(),
            result: Some(result),
            error: None,
        }
    }

    pub fn err(tool: &str, error: String) -> Self {
        Self {
            tool: tool.to_string(),
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckBalanceArgs {
    pub address: Pubkey,
}

#[derive(Debug, Clone)]
pub struct TransferSolArgs {
    pub recipient: Pubkey,
    pub amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct SwapTokensArgs {
    pub input_token: Token,
    pub output_token: Token,
    pub amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct CheckCryptoPriceArgs {
    pub symbol: String,
}

#[derive(Debug, Clone)]
pub struct TrackCryptoPriceArgs {
    pub symbol: String,
    pub target_price: Decimal,
    pub condition: Condition,
    pub volatility_threshold: Option<Decimal>,
}

/// A tool call parsed into its strongly typed arguments. The enum is closed:
/// adding a tool means adding a variant, and the dispatcher's `match` keeps
/// the set exhaustive at compile time.
#[derive(Debug, Clone)]
pub enum ToolRequest {
    CheckBalance(CheckBalanceArgs),
    TransferSol(TransferSolArgs),
    SwapTokens(SwapTokensArgs),
    CheckCryptoPrice(CheckCryptoPriceArgs),
    TrackCryptoPrice(TrackCryptoPriceArgs),
}

impl ToolRequest {
    /// Parse and validate a raw call. Required-field presence is checked
    /// before any type or format rule, so the cheapest failure wins. No
    /// external call happens until this returns `Ok`.
    pub fn parse(call: &ToolCall) -> Result<Self, ToolError> {
        let args = &call.arguments;
        match call.name.as_str() {
            "checkBalance" => Ok(ToolRequest::CheckBalance(CheckBalanceArgs {
                address: parse_address(args, "address")?,
            })),
            "transferSol" => Ok(ToolRequest::TransferSol(TransferSolArgs {
                recipient: parse_address(args, "recipient")?,
                amount: parse_amount(args, "amount")?,
            })),
            "swapTokens" => {
                let input_token = parse_token(args, "inputToken")?;
                let output_token = parse_token(args, "outputToken")?;
                let amount = parse_amount(args, "amount")?;
                if input_token == output_token {
                    return Err(ToolError::InvalidTokenSelection(
                        "Cannot swap same tokens".into(),
                    ));
                }
                Ok(ToolRequest::SwapTokens(SwapTokensArgs {
                    input_token,
                    output_token,
                    amount,
                }))
            }
            "checkCryptoPrice" => Ok(ToolRequest::CheckCryptoPrice(CheckCryptoPriceArgs {
                symbol: parse_symbol(args, "symbol")?,
            })),
            "trackCryptoPrice" => {
                let symbol = parse_symbol(args, "symbol")?;
                let target_price = parse_amount(args, "targetPrice")?;
                let condition_str = require(args, "condition")?
                    .as_str()
                    .ok_or_else(|| ToolError::InvalidCondition(String::new()))?
                    .to_string();
                let condition = Condition::parse(&condition_str)?;
                let volatility_threshold = match args.get("volatilityThreshold") {
                    None | Some(Value::Null) => None,
                    Some(_) => Some(parse_amount(args, "volatilityThreshold")?),
                };
                Ok(ToolRequest::TrackCryptoPrice(TrackCryptoPriceArgs {
                    symbol,
                    target_price,
                    condition,
                    volatility_threshold,
                }))
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

fn require<'a>(args: &'a Value, field: &'static str) -> Result<&'a Value, ToolError> {
    match args.get(field) {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(ToolError::MissingField(field)),
    }
}

fn parse_address(args: &Value, field: &'static str) -> Result<Pubkey, ToolError> {
    let value = require(args, field)?;
    let s = value
        .as_str()
        .ok_or_else(|| ToolError::InvalidAddress(value.to_string()))?;
    Pubkey::from_str(s).map_err(|_| ToolError::InvalidAddress(s.to_string()))
}

/// Amounts arrive as JSON numbers or strings depending on the model; either
/// way they must coerce to a positive decimal.
fn parse_amount(args: &Value, field: &'static str) -> Result<Decimal, ToolError> {
    let value = require(args, field)?;
    let amount = match value {
        Value::Number(n) => n.as_f64().and_then(Decimal::from_f64),
        Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
    .ok_or_else(|| ToolError::InvalidAmount(value.to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(ToolError::InvalidAmount(amount.to_string()));
    }
    Ok(amount)
}

fn parse_symbol(args: &Value, field: &'static str) -> Result<String, ToolError> {
    let value = require(args, field)?;
    let s = value
        .as_str()
        .ok_or_else(|| ToolError::InvalidTokenSelection(value.to_string()))?;
    if s.trim().is_empty() {
        return Err(ToolError::MissingField(field));
    }
    Ok(s.trim().to_uppercase())
}

fn parse_token(args: &Value, field: &'static str) -> Result<Token, ToolError> {
    let symbol = parse_symbol(args, field)?;
    tokens::lookup(&symbol).ok_or(ToolError::InvalidTokenSelection(symbol))
}
