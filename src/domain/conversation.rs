//! Conversation history for plan elicitation
//!
//! The elicitation dialogue is kept as a structured, ordered sequence of
//! turns. Turns are append-only; history is only rendered to text at the
//! wire boundary or when a plan is accepted and the prompt is persisted.

use serde::{Deserialize, Serialize};

/// Turn role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in the elicitation dialogue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Create an assistant turn
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// The session conversation buffer
///
/// Holds the ordered turn history plus at most one outstanding clarification
/// question. A new user utterance always answers the most recent question.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
    pending_question: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered turn history
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The outstanding clarification question, if any
    pub fn pending_question(&self) -> Option<&str> {
        self.pending_question.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Seed an empty buffer with previously accumulated context as an
    /// opening user turn. Used when a wizard re-enters elicitation after
    /// refine: the persisted prompt comes back as structured context instead
    /// of being re-parsed out of joined text.
    pub fn seed(&mut self, context: impl Into<String>) {
        self.turns.push(ConversationTurn::user(context));
    }

    /// Record a clarification exchange: the user's utterance followed by the
    /// question it provoked. The question becomes the pending one.
    pub fn record_clarification(&mut self, utterance: impl Into<String>, question: impl Into<String>) {
        let question = question.into();
        self.turns.push(ConversationTurn::user(utterance));
        self.turns.push(ConversationTurn::assistant(question.clone()));
        self.pending_question = Some(question);
    }

    /// Record the accepting utterance. Clears any pending question, since an
    /// accepted plan means nothing is outstanding.
    pub fn record_acceptance(&mut self, utterance: impl Into<String>) {
        self.turns.push(ConversationTurn::user(utterance));
        self.pending_question = None;
    }

    /// Flatten every user utterance, in order, into the persisted prompt
    pub fn flatten_prompt(&self) -> String {
        self.turns
            .iter()
            .filter(|t| t.role == Role::User)
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
