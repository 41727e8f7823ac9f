//! Planning module - conversational plan elicitation and code synthesis
//!
//! This module is the input pipeline for flowsmith:
//! 1. ElicitationSession - multi-turn conversation that freezes a WorkflowPlan
//! 2. ScriptSynthesizer - code generation from an accepted plan
//!
//! # Architecture
//!
//! ```text
//! User utterance → ElicitationSession → WorkflowPlan → ScriptSynthesizer → script
//!                        ↑                                    ↑
//!                 capability (verdict)              capability (text)
//! ```
//!
//! The session keeps the conversation as structured turns and makes exactly
//! one capability call per utterance. The synthesizer takes the frozen plan
//! value - never an optional - so premature synthesis is unrepresentable.

mod session;
mod synthesis;

pub use session::{ElicitationOutcome, ElicitationSession, SessionConfig};
pub use synthesis::{ScriptSynthesizer, SynthesizerConfig};
