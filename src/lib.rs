//! flowsmith - conversational automation workflow builder
//!
//! flowsmith turns a plain-language description of an automation into a
//! structured, named, multi-step plan and a generated script implementing it.
//! The interesting part is the conversational wizard: when a description is
//! too vague to build, the tool asks a single targeted follow-up question,
//! accumulates the answers across turns, and freezes a plan only once the
//! description is specific enough.
//!
//! # Core Concepts
//!
//! - **Derived, not stored**: the wizard position (Describe, Review, Deploy)
//!   is computed from the workflow record, so step and data cannot diverge
//! - **Whole-value updates**: transitions return updated Workflow copies;
//!   failures never leave a record half-changed
//! - **Structured turns**: conversation history is `{role, text}` data until
//!   the moment it hits the wire
//!
//! # Modules
//!
//! - [`domain`] - Workflow, WorkflowPlan, and conversation types
//! - [`llm`] - completion capability trait and the Gemini client
//! - [`planning`] - plan elicitation and script synthesis
//! - [`wizard`] - the three-state wizard controller
//! - [`store`] - JSON-file workflow persistence
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod llm;
pub mod planning;
pub mod store;
pub mod wizard;

// Re-export commonly used types
pub use config::{Config, LlmConfig, StorageConfig};
pub use domain::{
    Conversation, ConversationTurn, Role, WizardStep, Workflow, WorkflowPlan, WorkflowStatus, WorkflowStep,
};
pub use error::WizardError;
pub use llm::{CompletionClient, CompletionRequest, GeminiClient, LlmError, create_client};
pub use planning::{ElicitationOutcome, ElicitationSession, ScriptSynthesizer, SessionConfig, SynthesizerConfig};
pub use store::WorkflowStore;
pub use wizard::{SubmitOutcome, WizardConfig, WizardSession};
