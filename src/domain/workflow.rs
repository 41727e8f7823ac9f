//! Workflow envelope record
//!
//! A Workflow is the persisted unit the wizard operates on. The store owns
//! the record; the wizard never mutates one in place - every transition
//! consumes the workflow and returns an updated copy, so the store's
//! change-detection sees whole-value replacement only.

use serde::{Deserialize, Serialize};

use super::id::generate_id;
use super::plan::WorkflowPlan;

/// Current time in Unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Workflow status
///
/// `Generated` iff a script is present; `Draft` while it is absent, whether
/// or not a plan has been accepted. `Deployed` is recorded only by the
/// explicit close acknowledgement, never by a wizard transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Draft,
    Generated,
    Deployed,
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Generated => write!(f, "generated"),
            Self::Deployed => write!(f, "deployed"),
        }
    }
}

/// Wizard position, derived from the workflow's data
///
/// Never stored: deriving it from `(plan, script)` means the displayed step
/// cannot disagree with the record after a refine-and-reaccept cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Describe = 0,
    Review = 1,
    Deploy = 2,
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Describe => write!(f, "describe"),
            Self::Review => write!(f, "review"),
            Self::Deploy => write!(f, "deploy"),
        }
    }
}

/// The persisted workflow record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique identifier (e.g. "019430-wf-invoice-notifier")
    pub id: String,

    /// Display name; replaced by the accepted plan's name
    pub name: String,

    /// One-paragraph description; replaced by the accepted plan's description
    pub description: String,

    /// Flattened conversational context, persisted at plan acceptance
    pub prompt: String,

    /// Accepted plan, absent until elicitation succeeds
    pub plan: Option<WorkflowPlan>,

    /// Generated script, absent until synthesis succeeds
    pub script: Option<String>,

    /// Current status
    pub status: WorkflowStatus,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Workflow {
    /// Create a fresh draft workflow
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let now = now_ms();
        Self {
            id: generate_id(&name),
            name,
            description: String::new(),
            prompt: String::new(),
            plan: None,
            script: None,
            status: WorkflowStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive the wizard step from the record's data
    pub fn current_step(&self) -> WizardStep {
        if self.script.is_some() {
            WizardStep::Deploy
        } else if self.plan.is_some() {
            WizardStep::Review
        } else {
            WizardStep::Describe
        }
    }

    /// Fold an accepted plan into the record: name, description, and plan are
    /// replaced wholesale and the flattened conversation becomes the prompt.
    pub fn with_accepted_plan(mut self, plan: WorkflowPlan, prompt: impl Into<String>) -> Self {
        self.name = plan.name.clone();
        self.description = plan.description.clone();
        self.prompt = prompt.into();
        self.plan = Some(plan);
        self.updated_at = now_ms();
        self
    }

    /// Store a generated script; status follows the script invariant.
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self.status = WorkflowStatus::Generated;
        self.updated_at = now_ms();
        self
    }

    /// Discard the script for a fresh elicitation round; status reverts to
    /// Draft per the script invariant. Plan and prompt are retained as
    /// context.
    pub fn without_script(mut self) -> Self {
        self.script = None;
        self.status = WorkflowStatus::Draft;
        self.updated_at = now_ms();
        self
    }

    /// Record the close acknowledgement. Requires a generated script.
    pub fn mark_deployed(mut self) -> Self {
        debug_assert!(self.script.is_some());
        self.status = WorkflowStatus::Deployed;
        self.updated_at = now_ms();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::WorkflowStep;

    fn sample_plan() -> WorkflowPlan {
        WorkflowPlan::new(
            "Invoice Notifier",
            "Watches Gmail for invoices",
            vec![WorkflowStep::new("1", "Poll Gmail for label Invoices", "Gmail")],
        )
        .unwrap()
    }

    #[test]
    fn test_workflow_new() {
        let wf = Workflow::new("Untitled Workflow");
        assert!(wf.id.contains("-wf-"));
        assert_eq!(wf.status, WorkflowStatus::Draft);
        assert!(wf.plan.is_none());
        assert!(wf.script.is_none());
        assert_eq!(wf.current_step(), WizardStep::Describe);
    }

    #[test]
    fn test_current_step_derivation() {
        let wf = Workflow::new("Test");
        assert_eq!(wf.current_step(), WizardStep::Describe);

        let wf = wf.with_accepted_plan(sample_plan(), "notify me about invoices");
        assert_eq!(wf.current_step(), WizardStep::Review);

        let wf = wf.with_script("print('hi')");
        assert_eq!(wf.current_step(), WizardStep::Deploy);

        // Refine drops the script and the derived step follows
        let wf = wf.without_script();
        assert_eq!(wf.current_step(), WizardStep::Review);
    }

    #[test]
    fn test_wizard_step_ordering() {
        assert!(WizardStep::Describe < WizardStep::Review);
        assert!(WizardStep::Review < WizardStep::Deploy);
    }

    #[test]
    fn test_accept_plan_replaces_identity_fields() {
        let wf = Workflow::new("Untitled Workflow");
        let id = wf.id.clone();
        let wf = wf.with_accepted_plan(sample_plan(), "notify me\nGmail");

        assert_eq!(wf.name, "Invoice Notifier");
        assert_eq!(wf.description, "Watches Gmail for invoices");
        assert_eq!(wf.prompt, "notify me\nGmail");
        // Store identity is stable across acceptance
        assert_eq!(wf.id, id);
    }

    #[test]
    fn test_script_status_invariant() {
        let wf = Workflow::new("Test").with_accepted_plan(sample_plan(), "p");
        assert_eq!(wf.status, WorkflowStatus::Draft);

        let wf = wf.with_script("code");
        assert_eq!(wf.status, WorkflowStatus::Generated);

        let wf = wf.without_script();
        assert_eq!(wf.status, WorkflowStatus::Draft);
        assert!(wf.plan.is_some());
    }

    #[test]
    fn test_mark_deployed() {
        let wf = Workflow::new("Test")
            .with_accepted_plan(sample_plan(), "p")
            .with_script("code")
            .mark_deployed();
        assert_eq!(wf.status, WorkflowStatus::Deployed);
    }

    #[test]
    fn test_workflow_serde() {
        let wf = Workflow::new("Test").with_accepted_plan(sample_plan(), "prompt text");
        let json = serde_json::to_string(&wf).unwrap();
        let back: Workflow = serde_json::from_str(&json).unwrap();

        assert_eq!(wf.id, back.id);
        assert_eq!(wf.prompt, back.prompt);
        assert_eq!(wf.plan, back.plan);
        assert_eq!(wf.status, back.status);
    }
}
