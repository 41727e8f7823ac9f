//! Gemini API client implementation
//!
//! Implements the CompletionClient trait over the Generative Language REST
//! API: schema-constrained JSON output for elicitation verdicts, plain text
//! for synthesis, and inline-audio transcription.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CompletionClient, CompletionRequest, FinishReason, LlmError, TokenUsage};
use crate::config::LlmConfig;
use crate::domain::{ConversationTurn, Role};

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Max tokens for a transcription response
const TRANSCRIBE_MAX_TOKENS: u32 = 2048;

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504 | 529)
}

/// Gemini API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, "from_config: called");
        let api_key = config.get_api_key().map_err(|e| LlmError::Decode(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
        })
    }

    /// Build the request body for a generateContent call
    fn build_generation_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_generation_body: called");
        serde_json::json!({
            "systemInstruction": {
                "parts": [{ "text": request.system_prompt }]
            },
            "contents": convert_turns(&request.turns),
            "generationConfig": {
                "maxOutputTokens": request.max_tokens.min(self.max_tokens),
            },
        })
    }

    /// Send a generateContent request with retry on transient errors
    async fn generate(&self, body: serde_json::Value) -> Result<GeminiResponse, LlmError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(attempt, backoff_ms = backoff, "generate: retrying after transient error");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let response = match self
                .http
                .post(url.clone())
                .header("x-goog-api-key", self.api_key.clone())
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "generate: network error");
                    let err = LlmError::Network(e);
                    if !err.is_retryable() {
                        return Err(err);
                    }
                    last_error = Some(err);
                    continue;
                }
            };

            let status = response.status().as_u16();

            if status == 429 {
                debug!("generate: rate limited (429)");
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);

                return Err(LlmError::RateLimited {
                    retry_after: Duration::from_secs(retry_after),
                });
            }

            if is_retryable_status(status) && attempt < MAX_RETRIES {
                let text = response.text().await.unwrap_or_default();
                debug!(attempt, status, "generate: retryable error");
                last_error = Some(LlmError::Api { status, message: text });
                continue;
            }

            if !response.status().is_success() {
                debug!(%status, "generate: API error");
                let text = response.text().await.unwrap_or_default();
                return Err(LlmError::Api { status, message: text });
            }

            debug!("generate: success");
            let api_response: GeminiResponse = response.json().await?;
            return Ok(api_response);
        }

        Err(last_error.unwrap_or_else(|| LlmError::Decode("max retries exceeded".to_string())))
    }

    /// Pull the text out of the first candidate
    fn extract_text(&self, response: GeminiResponse) -> Result<String, LlmError> {
        if let Some(usage) = &response.usage_metadata {
            let usage = TokenUsage {
                input_tokens: usage.prompt_token_count.unwrap_or(0),
                output_tokens: usage.candidates_token_count.unwrap_or(0),
            };
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                cost_usd = usage.cost_usd(&self.model),
                "extract_text: usage"
            );
        }

        let candidate = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Decode("response has no candidates".to_string()))?;

        if let Some(reason) = candidate.finish_reason.as_deref() {
            match FinishReason::from_gemini(reason) {
                FinishReason::Safety => {
                    return Err(LlmError::Decode(format!("completion blocked: {}", reason)));
                }
                FinishReason::MaxTokens => {
                    warn!("extract_text: completion truncated at max tokens");
                }
                _ => {}
            }
        }

        let text = candidate
            .content
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(text)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete_structured(
        &self,
        request: CompletionRequest,
        schema: serde_json::Value,
    ) -> Result<serde_json::Value, LlmError> {
        debug!(%self.model, "complete_structured: called");
        let mut body = self.build_generation_body(&request);
        body["generationConfig"]["responseMimeType"] = serde_json::json!("application/json");
        body["generationConfig"]["responseSchema"] = schema;

        let response = self.generate(body).await?;
        let text = self.extract_text(response)?;

        let value: serde_json::Value = serde_json::from_str(&text)?;
        Ok(value)
    }

    async fn complete_text(&self, request: CompletionRequest) -> Result<String, LlmError> {
        debug!(%self.model, "complete_text: called");
        let body = self.build_generation_body(&request);
        let response = self.generate(body).await?;
        self.extract_text(response)
    }

    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, LlmError> {
        debug!(%mime_type, audio_len = audio.len(), "transcribe: called");
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": mime_type,
                            "data": BASE64.encode(audio),
                        }
                    },
                    { "text": "Transcribe this audio verbatim. Output only the transcript text." }
                ]
            }],
            "generationConfig": {
                "maxOutputTokens": TRANSCRIBE_MAX_TOKENS.min(self.max_tokens),
            },
        });

        let response = self.generate(body).await?;
        let text = self.extract_text(response)?;
        Ok(text.trim().to_string())
    }
}

/// Convert conversation turns to Gemini contents format
fn convert_turns(turns: &[ConversationTurn]) -> Vec<serde_json::Value> {
    debug!(turn_count = %turns.len(), "convert_turns: called");
    turns
        .iter()
        .map(|turn| {
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            serde_json::json!({
                "role": role,
                "parts": [{ "text": turn.text }],
            })
        })
        .collect()
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GeminiClient {
        GeminiClient {
            model: "gemini-2.5-flash".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            http: Client::new(),
            max_tokens: 8192,
        }
    }

    #[test]
    fn test_build_generation_body() {
        let client = test_client();
        let request = CompletionRequest {
            system_prompt: "You are helpful".to_string(),
            turns: vec![ConversationTurn::user("Hello"), ConversationTurn::assistant("Hi")],
            max_tokens: 1000,
        };

        let body = client.build_generation_body(&request);

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are helpful");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
    }

    #[test]
    fn test_max_tokens_capped() {
        let client = test_client();
        let request = CompletionRequest::single("sys", "hi", 50_000);

        let body = client.build_generation_body(&request);

        // Should be capped to client max
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn test_convert_turns_maps_assistant_to_model() {
        let turns = vec![ConversationTurn::user("a"), ConversationTurn::assistant("b")];
        let contents = convert_turns(&turns);

        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "b");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let client = test_client();
        let response: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": { "parts": [{"text": "Hello "}, {"text": "world"}] },
                    "finishReason": "STOP"
                }],
                "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 5 }
            }"#,
        )
        .unwrap();

        assert_eq!(client.extract_text(response).unwrap(), "Hello world");
    }

    #[test]
    fn test_extract_text_no_candidates_is_decode_error() {
        let client = test_client();
        let response: GeminiResponse = serde_json::from_str(r#"{ "candidates": [] }"#).unwrap();

        let err = client.extract_text(response).unwrap_err();
        assert!(matches!(err, LlmError::Decode(_)));
    }

    #[test]
    fn test_extract_text_safety_block_is_decode_error() {
        let client = test_client();
        let response: GeminiResponse = serde_json::from_str(
            r#"{ "candidates": [{ "finishReason": "SAFETY" }] }"#,
        )
        .unwrap();

        let err = client.extract_text(response).unwrap_err();
        assert!(matches!(err, LlmError::Decode(_)));
    }

    #[test]
    fn test_is_retryable_status() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(503));
        assert!(is_retryable_status(529));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(401));
    }
}
