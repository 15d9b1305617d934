use crate::error::ToolError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// A swappable token known to the assistant. The registry is fixed: swaps are
/// only offered between tokens listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub symbol: &'static str,
    pub mint: &'static str,
    pub decimals: u32,
}

pub const SOL: Token = Token {
    symbol: "SOL",
    mint: "So11111111111111111111111111111111111111112",
    decimals: 9,
};

pub const USDC: Token = Token {
    symbol: "USDC",
    mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
    decimals: 6,
};

pub const REGISTRY: [Token; 2] = [SOL, USDC];

pub fn lookup(symbol: &str) -> Option<Token> {
    let upper = symbol.to_uppercase();
    REGISTRY.iter().copied().find(|t| t.symbol == upper)
}

impl Token {
    /// Convert a human amount (e.g. 1.5 SOL) into the token's base units.
    pub fn to_base_units(&self, amount: Decimal) -> Result<u64, ToolError> {
        let scale = Decimal::from(10u64.pow(self.decimals));
        (amount * scale)
            .trunc()
            .to_u64()
            .ok_or_else(|| ToolError::InvalidAmount(amount.to_string()))
    }

    /// Convert base units back into a human amount.
    pub fn from_base_units(&self, raw: u64) -> Decimal {
        Decimal::from(raw) / Decimal::from(10u64.pow(self.decimals))
    }
}
