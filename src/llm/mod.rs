//! Completion capability module for flowsmith
//!
//! The CompletionClient trait is the contract the wizard core consumes;
//! GeminiClient is the one concrete provider.

use std::sync::Arc;

use tracing::debug;

mod client;
mod error;
mod gemini;
mod types;

pub use client::CompletionClient;
#[cfg(test)]
pub use client::mock;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use types::{CompletionRequest, FinishReason, TokenUsage};

use crate::config::LlmConfig;

/// Create a completion client based on the provider specified in config
///
/// Supports the "gemini" provider.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn CompletionClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "gemini" => {
            debug!("create_client: creating Gemini client");
            Ok(Arc::new(GeminiClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::Decode(format!(
                "Unknown completion provider: '{}'. Supported: gemini",
                other
            )))
        }
    }
}
