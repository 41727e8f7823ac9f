//! Wizard error taxonomy
//!
//! Every core operation is result-or-error; none of these leave the
//! workflow or the conversation buffer partially updated.

use thiserror::Error;

use crate::llm::LlmError;

/// Errors surfaced by wizard operations
#[derive(Debug, Error)]
pub enum WizardError {
    /// Utterance or request issued with no content; rejected before any
    /// external call.
    #[error("input is empty")]
    EmptyInput,

    /// The capability answered, but not in the expected shape. Retryable;
    /// conversation and plan state are unchanged.
    #[error("capability returned an undecodable response: {0}")]
    MalformedResponse(String),

    /// Code generation failed or produced nothing. The wizard stays on
    /// review; no partial script is stored.
    #[error("script synthesis failed: {0}")]
    SynthesisFailure(String),

    /// Transport-level failure: timeout, auth, rate limit. Same state rules
    /// as MalformedResponse, distinct user-facing message.
    #[error("completion service unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Synthesis requested before a plan was accepted.
    #[error("no accepted plan to synthesize from")]
    PlanMissing,

    /// Another elicitation or synthesis call is still in flight.
    #[error("a request is already in flight for this session")]
    SessionBusy,
}

impl From<LlmError> for WizardError {
    fn from(err: LlmError) -> Self {
        if err.is_transport() {
            WizardError::CapabilityUnavailable(err.to_string())
        } else {
            WizardError::MalformedResponse(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_transport_errors_map_to_unavailable() {
        let err: WizardError = LlmError::Timeout(Duration::from_secs(30)).into();
        assert!(matches!(err, WizardError::CapabilityUnavailable(_)));

        let err: WizardError = LlmError::RateLimited {
            retry_after: Duration::from_secs(60),
        }
        .into();
        assert!(matches!(err, WizardError::CapabilityUnavailable(_)));

        let err: WizardError = LlmError::Api {
            status: 401,
            message: "bad key".to_string(),
        }
        .into();
        assert!(matches!(err, WizardError::CapabilityUnavailable(_)));
    }

    #[test]
    fn test_decode_errors_map_to_malformed() {
        let err: WizardError = LlmError::Decode("missing field".to_string()).into();
        assert!(matches!(err, WizardError::MalformedResponse(_)));
    }
}
