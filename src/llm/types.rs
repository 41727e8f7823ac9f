//! Completion request types
//!
//! These types model what the core needs from a generative provider. The
//! conversation stays a structured turn sequence all the way to the client;
//! providers serialize it to their own wire format.

use tracing::debug;

use crate::domain::ConversationTurn;

/// A completion request - everything needed for one provider call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System/instruction prompt
    pub system_prompt: String,

    /// Ordered conversation turns, oldest first
    pub turns: Vec<ConversationTurn>,

    /// Max tokens for the response (from config)
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Single-turn request with just one user utterance
    pub fn single(system_prompt: impl Into<String>, utterance: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            turns: vec![ConversationTurn::user(utterance)],
            max_tokens,
        }
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Other,
}

impl FinishReason {
    /// Parse from the Gemini API finishReason string
    pub fn from_gemini(s: &str) -> Self {
        debug!(%s, "FinishReason::from_gemini: called");
        match s {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::MaxTokens,
            "SAFETY" => FinishReason::Safety,
            _ => FinishReason::Other,
        }
    }
}

/// Token usage for cost tracking
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Calculate cost in USD based on model pricing
    pub fn cost_usd(&self, model: &str) -> f64 {
        let (input_price, output_price) = match model {
            m if m.contains("flash-lite") => (0.10, 0.40),
            m if m.contains("flash") => (0.30, 2.50),
            m if m.contains("pro") => (1.25, 10.0),
            _ => (0.30, 2.50),
        };

        let input_cost = (self.input_tokens as f64 / 1_000_000.0) * input_price;
        let output_cost = (self.output_tokens as f64 / 1_000_000.0) * output_price;

        input_cost + output_cost
    }
}
