//! CompletionClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, LlmError};

/// Stateless generative completion capability
///
/// This is the boundary between the wizard core and the external service.
/// Each call is independent - conversation state lives in the session, not
/// the client, so a single client can serve many wizard sessions.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Completion constrained to a fixed JSON shape
    ///
    /// The provider must enforce `schema` on its output; callers decode the
    /// returned value into their own types and treat any mismatch as an
    /// undecodable response.
    async fn complete_structured(
        &self,
        request: CompletionRequest,
        schema: serde_json::Value,
    ) -> Result<serde_json::Value, LlmError>;

    /// Free-text completion
    async fn complete_text(&self, request: CompletionRequest) -> Result<String, LlmError>;

    /// Transcribe audio to text
    ///
    /// Best-effort: callers treat failure as an empty transcript and must
    /// never let it propagate past the UI boundary.
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    /// A scripted reply for the mock client
    #[derive(Debug, Clone)]
    pub enum MockReply {
        /// Serve this JSON value
        Value(serde_json::Value),
        /// Simulate a transport failure
        Unavailable,
    }

    /// Mock completion client for unit tests
    #[derive(Default)]
    pub struct MockClient {
        structured: Mutex<VecDeque<MockReply>>,
        text: Mutex<VecDeque<String>>,
        transcript: Mutex<Option<String>>,
        structured_calls: AtomicUsize,
        text_calls: AtomicUsize,
    }

    impl MockClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_structured(&self, reply: MockReply) {
            self.structured.lock().unwrap().push_back(reply);
        }

        pub fn push_text(&self, text: impl Into<String>) {
            self.text.lock().unwrap().push_back(text.into());
        }

        pub fn set_transcript(&self, text: impl Into<String>) {
            *self.transcript.lock().unwrap() = Some(text.into());
        }

        pub fn structured_calls(&self) -> usize {
            self.structured_calls.load(Ordering::SeqCst)
        }

        pub fn text_calls(&self) -> usize {
            self.text_calls.load(Ordering::SeqCst)
        }

        pub fn total_calls(&self) -> usize {
            self.structured_calls() + self.text_calls()
        }
    }

    #[async_trait]
    impl CompletionClient for MockClient {
        async fn complete_structured(
            &self,
            _request: CompletionRequest,
            _schema: serde_json::Value,
        ) -> Result<serde_json::Value, LlmError> {
            self.structured_calls.fetch_add(1, Ordering::SeqCst);
            match self.structured.lock().unwrap().pop_front() {
                Some(MockReply::Value(v)) => Ok(v),
                Some(MockReply::Unavailable) => Err(LlmError::Timeout(Duration::from_secs(30))),
                None => Err(LlmError::Decode("no more mock responses".to_string())),
            }
        }

        async fn complete_text(&self, _request: CompletionRequest) -> Result<String, LlmError> {
            self.text_calls.fetch_add(1, Ordering::SeqCst);
            self.text
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LlmError::Decode("no more mock responses".to_string()))
        }

        async fn transcribe(&self, _audio: &[u8], _mime_type: &str) -> Result<String, LlmError> {
            self.transcript
                .lock()
                .unwrap()
                .clone()
                .ok_or(LlmError::Timeout(Duration::from_secs(30)))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_serves_structured_replies_in_order() {
            let client = MockClient::new();
            client.push_structured(MockReply::Value(serde_json::json!({"isValid": false})));
            client.push_structured(MockReply::Value(serde_json::json!({"isValid": true})));

            let req = CompletionRequest::single("sys", "hi", 100);
            let first = client
                .complete_structured(req.clone(), serde_json::json!({}))
                .await
                .unwrap();
            assert_eq!(first["isValid"], false);

            let second = client.complete_structured(req, serde_json::json!({})).await.unwrap();
            assert_eq!(second["isValid"], true);
            assert_eq!(client.structured_calls(), 2);
        }

        #[tokio::test]
        async fn test_mock_unavailable_is_transport_error() {
            let client = MockClient::new();
            client.push_structured(MockReply::Unavailable);

            let req = CompletionRequest::single("sys", "hi", 100);
            let err = client
                .complete_structured(req, serde_json::json!({}))
                .await
                .unwrap_err();
            assert!(err.is_transport());
        }

        #[tokio::test]
        async fn test_mock_errors_when_exhausted() {
            let client = MockClient::new();
            let req = CompletionRequest::single("sys", "hi", 100);
            assert!(client.complete_text(req).await.is_err());
        }
    }
}
