//! WizardSession - the three-state wizard controller
//!
//! Sequences elicitation, plan review, and code synthesis over a Workflow
//! record. The wizard position (Describe, Review, Deploy) is derived from the
//! record's data, never stored. Every transition takes the caller's workflow
//! by reference and returns an updated copy; on error the caller's value is
//! untouched.
//!
//! One capability request is ever in flight per session. The session state
//! sits behind a mutex taken with try_lock, so an overlapping submit, refine,
//! or synthesize is rejected with SessionBusy instead of answering a stale
//! question twice or accepting a plan mid-flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::{Workflow, WorkflowPlan};
use crate::error::WizardError;
use crate::llm::CompletionClient;
use crate::planning::{
    ElicitationOutcome, ElicitationSession, ScriptSynthesizer, SessionConfig, SynthesizerConfig,
};

/// Configuration for a wizard session
#[derive(Debug, Clone, Default)]
pub struct WizardConfig {
    /// Elicitation settings
    pub session: SessionConfig,

    /// Synthesis settings
    pub synthesizer: SynthesizerConfig,
}

/// Result of submitting an utterance
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Still in Describe: the question is recorded, the input buffer should
    /// be cleared for the reply. The workflow is unchanged.
    Clarification { question: String },

    /// Moved to Review: the updated workflow carries the plan, the replaced
    /// name/description, and the flattened prompt.
    PlanAccepted { workflow: Workflow },
}

struct WizardInner {
    elicitation: ElicitationSession,
    synthesizer: ScriptSynthesizer,
}

/// WizardSession drives one workflow through Describe → Review → Deploy
pub struct WizardSession {
    inner: Mutex<WizardInner>,

    /// Set by refine; cleared when a new plan is accepted. While set, the
    /// retained plan is reported as hidden.
    refining: AtomicBool,
}

impl WizardSession {
    /// Create a wizard session over a completion client
    pub fn new(llm: Arc<dyn CompletionClient>, config: WizardConfig) -> Self {
        Self {
            inner: Mutex::new(WizardInner {
                elicitation: ElicitationSession::new(llm.clone(), config.session),
                synthesizer: ScriptSynthesizer::new(llm, config.synthesizer),
            }),
            refining: AtomicBool::new(false),
        }
    }

    /// Submit a user utterance while in Describe
    ///
    /// Stays in Describe on a clarification (the session records the
    /// question); moves to Review when a plan is accepted, at which point the
    /// conversation buffer is folded into the workflow's prompt and
    /// discarded.
    pub async fn submit_utterance(&self, workflow: &Workflow, utterance: &str) -> Result<SubmitOutcome, WizardError> {
        let mut inner = self.inner.try_lock().map_err(|_| WizardError::SessionBusy)?;

        match inner.elicitation.elicit(utterance).await? {
            ElicitationOutcome::NeedsClarification { question } => {
                debug!(workflow_id = %workflow.id, "clarification requested");
                Ok(SubmitOutcome::Clarification { question })
            }
            ElicitationOutcome::Accepted { plan } => {
                let prompt = inner.elicitation.flatten_prompt();
                inner.elicitation.restart("");
                self.refining.store(false, Ordering::SeqCst);

                let updated = workflow.clone().with_accepted_plan(plan, prompt);
                info!(workflow_id = %updated.id, name = %updated.name, "plan accepted, moving to review");
                Ok(SubmitOutcome::PlanAccepted { workflow: updated })
            }
        }
    }

    /// Synthesize a script for the accepted plan
    ///
    /// Rejected at the boundary when no plan is present; the synthesizer
    /// itself only ever sees a plan value. On failure the workflow is
    /// unchanged and the wizard stays on Review.
    pub async fn request_synthesis(&self, workflow: &Workflow) -> Result<Workflow, WizardError> {
        let inner = self.inner.try_lock().map_err(|_| WizardError::SessionBusy)?;

        let plan: &WorkflowPlan = workflow.plan.as_ref().ok_or(WizardError::PlanMissing)?;

        let script = inner.synthesizer.synthesize(plan, &workflow.prompt).await?;
        let updated = workflow.clone().with_script(script);
        info!(workflow_id = %updated.id, "script stored, moving to deploy");
        Ok(updated)
    }

    /// Return from Review to Describe for another elicitation round
    ///
    /// Discards the script; the retained plan and prompt stay on the record
    /// as context but the plan is hidden until a new acceptance.
    pub fn refine(&self, workflow: &Workflow) -> Result<Workflow, WizardError> {
        let mut inner = self.inner.try_lock().map_err(|_| WizardError::SessionBusy)?;

        inner.elicitation.restart(&workflow.prompt);
        self.refining.store(true, Ordering::SeqCst);

        debug!(workflow_id = %workflow.id, "refining: back to describe");
        Ok(workflow.clone().without_script())
    }

    /// The plan a UI may display
    ///
    /// After refine, the record still carries the previous plan as context;
    /// it stays hidden here until a new acceptance replaces it.
    pub fn visible_plan<'a>(&self, workflow: &'a Workflow) -> Option<&'a WorkflowPlan> {
        if self.refining.load(Ordering::SeqCst) {
            None
        } else {
            workflow.plan.as_ref()
        }
    }
}
