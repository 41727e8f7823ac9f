//! Completion capability error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the completion capability
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Undecodable response: {0}")]
    Decode(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Transport-level failures: the service was unreachable, slow, or
    /// refused us. Decode failures are not transport failures - the service
    /// answered, just not in the expected shape.
    pub fn is_transport(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::Api { .. } => true,
            LlmError::Network(_) => true,
            LlmError::Timeout(_) => true,
            LlmError::Decode(_) => false,
            LlmError::Json(_) => false,
        }
    }

    /// Check if a retry could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::Api { status, .. } => *status >= 500,
            LlmError::Network(_) => true,
            LlmError::Timeout(_) => true,
            LlmError::Decode(_) => false,
            LlmError::Json(_) => false,
        }
    }

    /// Get the retry duration if this is a rate limit error
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_transport() {
        assert!(
            LlmError::RateLimited {
                retry_after: Duration::from_secs(60)
            }
            .is_transport()
        );
        assert!(
            LlmError::Api {
                status: 401,
                message: "bad key".to_string()
            }
            .is_transport()
        );
        assert!(LlmError::Timeout(Duration::from_secs(30)).is_transport());

        assert!(!LlmError::Decode("missing field".to_string()).is_transport());
    }

    #[test]
    fn test_is_retryable() {
        assert!(
            LlmError::RateLimited {
                retry_after: Duration::from_secs(60)
            }
            .is_retryable()
        );

        assert!(
            LlmError::Api {
                status: 503,
                message: "overloaded".to_string()
            }
            .is_retryable()
        );

        assert!(
            !LlmError::Api {
                status: 400,
                message: "bad request".to_string()
            }
            .is_retryable()
        );

        assert!(!LlmError::Decode("bad shape".to_string()).is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(42),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(42)));

        let err = LlmError::Api {
            status: 500,
            message: "server error".to_string(),
        };
        assert_eq!(err.retry_after(), None);
    }
}
