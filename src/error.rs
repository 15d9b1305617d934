use thiserror::Error;

/// Everything that can go wrong while resolving or executing a tool call.
///
/// Validation variants are raised before any network or wallet interaction;
/// the dispatcher converts all of these into a `ToolCallResult.error` string
/// so one bad call never takes down its batch.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid token selection: {0}")]
    InvalidTokenSelection(String),

    #[error("Invalid condition '{0}': expected 'above' or 'below'")]
    InvalidCondition(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Rate limit exceeded for {0}, try again shortly")]
    RateLimitExceeded(String),

    #[error("Wallet request declined: {0}")]
    UserDeclined(String),

    #[error("Transaction {0} was broadcast but not confirmed in time")]
    ConfirmationTimeout(String),

    #[error("Language model error: {0}")]
    Llm(String),
}

impl ToolError {
    /// True for errors raised before any external call was made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ToolError::MissingField(_)
                | ToolError::InvalidAddress(_)
                | ToolError::InvalidAmount(_)
                | ToolError::InvalidTokenSelection(_)
                | ToolError::InvalidCondition(_)
        )
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        ToolError::Upstream(e.to_string())
    }
}
