//! WorkflowPlan domain type
//!
//! A plan is the frozen outcome of elicitation: a named, ordered sequence of
//! steps describing the automation's trigger/action flow. Plans are immutable
//! once accepted; a later elicitation replaces them wholesale.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// A single step within a plan
///
/// `id` is unique within the plan; step order is execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Step identifier, unique within the plan
    pub id: String,

    /// Technical description of what the step does
    pub action: String,

    /// Service the step runs against (e.g. "Gmail", "Slack")
    pub service: String,
}

impl WorkflowStep {
    pub fn new(id: impl Into<String>, action: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: action.into(),
            service: service.into(),
        }
    }
}

/// Structural defects that make a decoded plan unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("plan name is empty")]
    EmptyName,

    #[error("plan has no steps")]
    NoSteps,

    #[error("duplicate step id '{0}'")]
    DuplicateStepId(String),

    #[error("step '{0}' is missing an action or service")]
    IncompleteStep(String),
}

/// A named, ordered, multi-step automation plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPlan {
    /// Short display name for the automation
    pub name: String,

    /// One-paragraph description of what the automation does
    pub description: String,

    /// Ordered steps; order is semantically meaningful
    pub steps: Vec<WorkflowStep>,
}

impl WorkflowPlan {
    /// Build a plan, enforcing the structural invariants
    ///
    /// Content-level validity (concrete trigger, named services, explicit
    /// data flow) is judged by the completion capability, not here.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        steps: Vec<WorkflowStep>,
    ) -> Result<Self, PlanError> {
        let plan = Self {
            name: name.into(),
            description: description.into(),
            steps,
        };
        plan.validate()?;
        Ok(plan)
    }

    /// Check the structural invariants: non-empty name, at least one step,
    /// unique step ids, no blank actions or services.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.name.trim().is_empty() {
            return Err(PlanError::EmptyName);
        }

        if self.steps.is_empty() {
            return Err(PlanError::NoSteps);
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                return Err(PlanError::DuplicateStepId(step.id.clone()));
            }
            if step.action.trim().is_empty() || step.service.trim().is_empty() {
                return Err(PlanError::IncompleteStep(step.id.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str) -> WorkflowStep {
        WorkflowStep::new(id, "Poll Gmail for label Invoices", "Gmail")
    }

    #[test]
    fn test_plan_new_valid() {
        let plan = WorkflowPlan::new("Invoice Notifier", "Watches for invoices", vec![step("1"), step("2")]);
        assert!(plan.is_ok());
        let plan = plan.unwrap();
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].service, "Gmail");
    }

    #[test]
    fn test_plan_empty_name_rejected() {
        let err = WorkflowPlan::new("   ", "desc", vec![step("1")]).unwrap_err();
        assert_eq!(err, PlanError::EmptyName);
    }

    #[test]
    fn test_plan_no_steps_rejected() {
        let err = WorkflowPlan::new("Notifier", "desc", vec![]).unwrap_err();
        assert_eq!(err, PlanError::NoSteps);
    }

    #[test]
    fn test_plan_duplicate_step_id_rejected() {
        let err = WorkflowPlan::new("Notifier", "desc", vec![step("1"), step("1")]).unwrap_err();
        assert_eq!(err, PlanError::DuplicateStepId("1".to_string()));
    }

    #[test]
    fn test_plan_incomplete_step_rejected() {
        let bad = WorkflowStep::new("2", "", "Gmail");
        let err = WorkflowPlan::new("Notifier", "desc", vec![step("1"), bad]).unwrap_err();
        assert_eq!(err, PlanError::IncompleteStep("2".to_string()));
    }

    #[test]
    fn test_plan_serde() {
        let plan = WorkflowPlan::new("Invoice Notifier", "desc", vec![step("1")]).unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        let back: WorkflowPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(plan, back);
    }
}
