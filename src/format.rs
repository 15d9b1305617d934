use crate::dispatch::BatchOutcome;
use crate::error::ToolError;
use crate::ports::LanguageModel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PERSONA_PROMPT: &str = "You are SolMate, a friendly and concise Solana wallet assistant. \
Given raw wallet balance data as JSON, reply to the user in one or two plain \
sentences summarizing their holdings and total value. Keep every number from \
the data exactly as given. Do not add financial advice.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// The chat message a resolved batch turns into, ready for persistence.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub role: Role,
    pub content: String,
}

/// Presentation layer over batch outcomes. Never re-validates or mutates a
/// result, and never drops an error: failed calls are serialized verbatim
/// into the reply.
pub struct ResponseFormatter {
    llm: Arc<dyn LanguageModel>,
}

impl ResponseFormatter {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub async fn format(&self, outcome: &BatchOutcome) -> Result<ChatReply, ToolError> {
        let content = match outcome {
            // Balance data reads poorly as raw JSON, so it gets the one
            // secondary LLM call with the fixed persona prompt.
            BatchOutcome::Single { tool, result } if tool == "checkBalance" => {
                self.llm
                    .complete(PERSONA_PROMPT, &result.to_string())
                    .await?
            }
            // Other tools already phrase their own result message.
            BatchOutcome::Single { result, .. } => result
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| result.to_string()),
            BatchOutcome::Batch(results) => serde_json::to_string(results)
                .map_err(|e| ToolError::Upstream(format!("result serialization failed: {}", e)))?,
        };

        Ok(ChatReply {
            role: Role::Assistant,
            content,
        })
    }
}
