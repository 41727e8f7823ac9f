//! ScriptSynthesizer - code generation from an accepted plan
//!
//! Takes a frozen WorkflowPlan plus the flattened conversational prompt and
//! asks the capability for a single implementing script. Output is stored
//! verbatim after fence stripping; the tool never validates or executes it.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::WorkflowPlan;
use crate::error::WizardError;
use crate::llm::{CompletionClient, CompletionRequest, LlmError};

/// Configuration for synthesis
#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    /// System prompt for the code generator
    pub system_prompt: String,

    /// Target language injected into the prompt
    pub language: String,

    /// Max tokens for the generated script
    pub max_tokens: u32,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYNTHESIS_PROMPT.to_string(),
            language: "python".to_string(),
            max_tokens: 8192,
        }
    }
}

/// ScriptSynthesizer generates implementation code for accepted plans
pub struct ScriptSynthesizer {
    llm: Arc<dyn CompletionClient>,
    config: SynthesizerConfig,
}

impl ScriptSynthesizer {
    /// Create a new synthesizer
    pub fn new(llm: Arc<dyn CompletionClient>, config: SynthesizerConfig) -> Self {
        Self { llm, config }
    }

    /// Generate a script for the plan
    ///
    /// The input is the plan value itself - callers resolve the optional
    /// before getting here, so "synthesize without a plan" is not
    /// representable.
    pub async fn synthesize(&self, plan: &WorkflowPlan, prompt: &str) -> Result<String, WizardError> {
        debug!(plan_name = %plan.name, "synthesize: called");

        let request = CompletionRequest::single(
            self.build_system_prompt(),
            render_synthesis_input(plan, prompt),
            self.config.max_tokens,
        );

        let raw = self.llm.complete_text(request).await.map_err(|e| match e {
            e if e.is_transport() => WizardError::CapabilityUnavailable(e.to_string()),
            LlmError::Decode(msg) => WizardError::SynthesisFailure(msg),
            e => WizardError::SynthesisFailure(e.to_string()),
        })?;

        let script = strip_code_fences(&raw);
        if script.is_empty() {
            return Err(WizardError::SynthesisFailure("generator returned no code".to_string()));
        }

        info!(plan_name = %plan.name, script_len = script.len(), "script synthesized");
        Ok(script)
    }

    /// Build the system prompt with the target language
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();
        prompt.push_str(&format!("\n\nTarget language: {}\n", self.config.language));
        prompt
    }
}

/// Render the plan and original request into the generation input
fn render_synthesis_input(plan: &WorkflowPlan, prompt: &str) -> String {
    let mut text = String::new();

    text.push_str(&format!("# {}\n\n", plan.name));
    text.push_str(&format!("{}\n\n", plan.description));

    text.push_str("## Steps\n\n");
    for step in &plan.steps {
        text.push_str(&format!("{}. [{}] {}\n", step.id, step.service, step.action));
    }
    text.push('\n');

    if !prompt.is_empty() {
        text.push_str("## Original request\n\n");
        text.push_str(prompt);
        text.push('\n');
    }

    text
}

/// Strip a surrounding markdown code fence from generated output
fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the opening fence line (with any language tag)
    let body = match rest.split_once('\n') {
        Some((_lang, body)) => body,
        None => return String::new(),
    };

    let body = body.trim_end();
    let body = body.strip_suffix("```").map(str::trim_end).unwrap_or(body);
    body.to_string()
}

/// Default system prompt for synthesis
const DEFAULT_SYNTHESIS_PROMPT: &str = r#"You are a code generator implementing an automation workflow.

You receive a plan: a name, a description, and ordered steps, each naming the service it runs against and the action it performs. Write one self-contained script that implements the plan end to end.

Guidelines:
- Implement the steps in order; pass data between them the way the plan describes
- Read credentials and endpoints from environment variables, never hardcode them
- Fail loudly: surface errors, don't swallow them
- Output ONLY the code. No prose before or after, no markdown fences.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkflowStep;
    use crate::llm::mock::MockClient;

    fn sample_plan() -> WorkflowPlan {
        WorkflowPlan::new(
            "Invoice Notifier",
            "Watches Gmail for invoices",
            vec![
                WorkflowStep::new("1", "Poll Gmail for label Invoices", "Gmail"),
                WorkflowStep::new("2", "Post a summary to #finance", "Slack"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_strip_code_fences_with_language_tag() {
        let out = strip_code_fences("```python\nprint('hi')\n```");
        assert_eq!(out, "print('hi')");
    }

    #[test]
    fn test_strip_code_fences_without_language_tag() {
        let out = strip_code_fences("```\nx = 1\n```");
        assert_eq!(out, "x = 1");
    }

    #[test]
    fn test_strip_code_fences_plain_text_untouched() {
        let out = strip_code_fences("  print('hi')\n");
        assert_eq!(out, "print('hi')");
    }

    #[test]
    fn test_strip_code_fences_unterminated() {
        let out = strip_code_fences("```python\nprint('hi')");
        assert_eq!(out, "print('hi')");
    }

    #[test]
    fn test_render_synthesis_input_contains_steps_and_prompt() {
        let input = render_synthesis_input(&sample_plan(), "notify me about invoices");
        assert!(input.contains("# Invoice Notifier"));
        assert!(input.contains("1. [Gmail] Poll Gmail for label Invoices"));
        assert!(input.contains("2. [Slack]"));
        assert!(input.contains("notify me about invoices"));
    }

    #[tokio::test]
    async fn test_synthesize_strips_fences() {
        let client = Arc::new(MockClient::new());
        client.push_text("```python\nimport os\nprint('ok')\n```");
        let synth = ScriptSynthesizer::new(client, SynthesizerConfig::default());

        let script = synth.synthesize(&sample_plan(), "prompt").await.unwrap();
        assert_eq!(script, "import os\nprint('ok')");
    }

    #[tokio::test]
    async fn test_synthesize_empty_output_is_failure() {
        let client = Arc::new(MockClient::new());
        client.push_text("```python\n```");
        let synth = ScriptSynthesizer::new(client, SynthesizerConfig::default());

        let err = synth.synthesize(&sample_plan(), "prompt").await.unwrap_err();
        assert!(matches!(err, WizardError::SynthesisFailure(_)));
    }

    #[tokio::test]
    async fn test_synthesize_failed_call_is_failure() {
        let client = Arc::new(MockClient::new());
        let synth = ScriptSynthesizer::new(client, SynthesizerConfig::default());

        let err = synth.synthesize(&sample_plan(), "prompt").await.unwrap_err();
        assert!(matches!(err, WizardError::SynthesisFailure(_)));
    }
}
