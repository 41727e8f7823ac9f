//! ElicitationSession - multi-turn conversation for plan elicitation
//!
//! The session turns a vague automation description into a concrete
//! WorkflowPlan. Each user utterance produces exactly one structured
//! completion call; the verdict either accepts a plan or asks a single
//! targeted follow-up question. Whether the description is specific enough
//! is the capability's call - the session only enforces the shape of the
//! answer and the bookkeeping of the conversation.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::{Conversation, ConversationTurn, WorkflowPlan, WorkflowStep};
use crate::error::WizardError;
use crate::llm::{CompletionClient, CompletionRequest};

/// Configuration for an elicitation session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// System prompt carrying the validation rubric
    pub system_prompt: String,

    /// Max tokens per verdict
    pub max_tokens: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_ELICITATION_PROMPT.to_string(),
            max_tokens: 4096,
        }
    }
}

/// Result of one elicitation turn
#[derive(Debug, Clone)]
pub enum ElicitationOutcome {
    /// The description is not specific enough yet; ask this and wait
    NeedsClarification { question: String },

    /// The plan is frozen; the conversation is over
    Accepted { plan: WorkflowPlan },
}

/// Verdict shape the capability is constrained to
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElicitationVerdict {
    is_valid: bool,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    plan: Option<PlanPayload>,
}

#[derive(Debug, Deserialize)]
struct PlanPayload {
    name: String,
    description: String,
    steps: Vec<StepPayload>,
}

#[derive(Debug, Deserialize)]
struct StepPayload {
    id: String,
    action: String,
    service: String,
}

/// ElicitationSession accumulates conversation turns until a plan is accepted
pub struct ElicitationSession {
    /// Completion client for verdicts
    llm: Arc<dyn CompletionClient>,

    /// Conversation history plus pending-question state
    conversation: Conversation,

    /// Configuration
    config: SessionConfig,
}

impl ElicitationSession {
    /// Create a new elicitation session
    pub fn new(llm: Arc<dyn CompletionClient>, config: SessionConfig) -> Self {
        Self {
            llm,
            conversation: Conversation::new(),
            config,
        }
    }

    /// Run one elicitation turn
    ///
    /// Sends the full prior conversation plus `utterance` to the capability
    /// and decodes the verdict. The conversation buffer is only touched after
    /// a successful decode, so a failed attempt leaves the session exactly as
    /// it was and the user may retry.
    pub async fn elicit(&mut self, utterance: &str) -> Result<ElicitationOutcome, WizardError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(WizardError::EmptyInput);
        }

        let mut turns = self.conversation.turns().to_vec();
        turns.push(ConversationTurn::user(utterance));

        let request = CompletionRequest {
            system_prompt: self.config.system_prompt.clone(),
            turns,
            max_tokens: self.config.max_tokens,
        };

        let value = self.llm.complete_structured(request, verdict_schema()).await?;
        let verdict: ElicitationVerdict = serde_json::from_value(value)
            .map_err(|e| WizardError::MalformedResponse(format!("verdict does not match schema: {}", e)))?;

        if verdict.is_valid {
            let payload = verdict
                .plan
                .ok_or_else(|| WizardError::MalformedResponse("accepting verdict carries no plan".to_string()))?;
            let plan = build_plan(payload)?;

            self.conversation.record_acceptance(utterance);
            info!(plan_name = %plan.name, steps = plan.steps.len(), "elicitation accepted a plan");
            Ok(ElicitationOutcome::Accepted { plan })
        } else {
            let question = verdict
                .question
                .filter(|q| !q.trim().is_empty())
                .ok_or_else(|| WizardError::MalformedResponse("clarifying verdict carries no question".to_string()))?;

            self.conversation.record_clarification(utterance, question.clone());
            debug!(turns = self.conversation.turns().len(), "elicitation needs clarification");
            Ok(ElicitationOutcome::NeedsClarification { question })
        }
    }

    /// The conversation so far
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Discard the buffer and start a fresh elicitation round
    ///
    /// `context` is previously accumulated prompt text (possibly empty); it
    /// is seeded back in as an opening user turn so refinement rounds keep
    /// what the user already said.
    pub fn restart(&mut self, context: &str) {
        self.conversation = Conversation::new();
        if !context.trim().is_empty() {
            self.conversation.seed(context);
        }
    }

    /// Flatten every user utterance into the persisted prompt
    pub fn flatten_prompt(&self) -> String {
        self.conversation.flatten_prompt()
    }
}

/// Convert the wire payload into a validated domain plan
///
/// Structural defects here mean the capability violated its contract, so
/// they surface as MalformedResponse, not as a distinct plan error.
fn build_plan(payload: PlanPayload) -> Result<WorkflowPlan, WizardError> {
    let steps = payload
        .steps
        .into_iter()
        .map(|s| WorkflowStep::new(s.id, s.action, s.service))
        .collect();

    WorkflowPlan::new(payload.name, payload.description, steps)
        .map_err(|e| WizardError::MalformedResponse(format!("plan fails structural checks: {}", e)))
}

/// Response schema the capability is constrained to
fn verdict_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "isValid": {
                "type": "boolean",
                "description": "Whether the description is specific enough to build"
            },
            "question": {
                "type": "string",
                "description": "The single follow-up question to ask when isValid is false"
            },
            "plan": {
                "type": "object",
                "description": "The frozen plan when isValid is true",
                "properties": {
                    "name": { "type": "string" },
                    "description": { "type": "string" },
                    "steps": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": { "type": "string" },
                                "action": { "type": "string" },
                                "service": { "type": "string" }
                            },
                            "required": ["id", "action", "service"]
                        }
                    }
                },
                "required": ["name", "description", "steps"]
            }
        },
        "required": ["isValid"]
    })
}

/// Default system prompt for elicitation
const DEFAULT_ELICITATION_PROMPT: &str = r#"You are a workflow planning assistant turning a plain-language automation request into a concrete, buildable plan.

A description is buildable only when:
1. The trigger is concrete - a named event, schedule, or condition, never just "automatically"
2. Every service is named concretely (e.g. "Gmail", "Slack") - never a generic category like "my email"
3. The data flow between steps is explicit - what each step reads and what it passes on

If the description meets the bar, return isValid true with the full plan: a short name, a one-paragraph description, and the ordered steps. Each step gets a unique id, a technical action description, and the service it runs against.

If it does not, return isValid false with ONE focused question targeting the most important gap. Never ask about things the user already said. Never ask more than one question.
"#;
