//! Wizard module - the Describe → Review → Deploy controller
//!
//! WizardSession mediates every UI-facing input and output for one workflow:
//! utterances go in, clarification questions or updated Workflow copies come
//! out. The wizard position is derived from the record (see
//! `Workflow::current_step`), so stored state and displayed step cannot
//! disagree.

mod machine;

pub use machine::{SubmitOutcome, WizardConfig, WizardSession};
