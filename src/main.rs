//! flowsmith - conversational automation workflow builder
//!
//! CLI entry point: wizard loop, workflow list management.

use std::fs;
use std::io::{self, BufRead, Write as IoWrite};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{info, warn};

use flowsmith::cli::{Cli, Command, guess_audio_mime};
use flowsmith::config::Config;
use flowsmith::domain::{WizardStep, Workflow};
use flowsmith::error::WizardError;
use flowsmith::llm::{CompletionClient, create_client};
use flowsmith::store::WorkflowStore;
use flowsmith::wizard::{SubmitOutcome, WizardConfig, WizardSession};

fn setup_logging(verbose: bool) -> Result<()> {
    // Write to a log file, not stdout/stderr - the terminal belongs to the wizard
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flowsmith")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("flowsmith.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref())?;

    let mut store = WorkflowStore::open(config.storage.resolve_workflows_file())?;

    match cli.command {
        Command::New { description, audio } => {
            config.validate()?;
            let llm = create_client(&config.llm)?;

            let opening = match (description, audio) {
                (Some(text), _) => Some(text),
                (None, Some(path)) => transcribe_file(&llm, &path).await,
                (None, None) => None,
            };

            let workflow = Workflow::new("Untitled Workflow");
            store.upsert(workflow.clone())?;

            run_wizard(&llm, &mut store, workflow, opening).await?;
        }

        Command::Resume { reference } => {
            config.validate()?;
            let llm = create_client(&config.llm)?;

            let workflow = resolve_workflow(&store, &reference)?.clone();
            run_wizard(&llm, &mut store, workflow, None).await?;
        }

        Command::List => {
            if store.list().is_empty() {
                println!("No workflows yet. Start one with: flow new");
            }
            for wf in store.list() {
                println!("{}  [{}]  {}", wf.id, wf.status, wf.name);
            }
        }

        Command::Show { reference } => {
            let workflow = resolve_workflow(&store, &reference)?;
            print_workflow(workflow);
        }

        Command::Remove { reference } => {
            let id = resolve_workflow(&store, &reference)?.id.clone();
            store.remove(&id)?;
            println!("Removed {}", id);
        }
    }

    Ok(())
}

/// Resolve a partial reference against the store, with friendly errors
fn resolve_workflow<'a>(store: &'a WorkflowStore, reference: &str) -> Result<&'a Workflow> {
    match store.resolve(reference) {
        Ok(Some(workflow)) => Ok(workflow),
        Ok(None) => Err(eyre::eyre!("No workflow matches '{}'", reference)),
        Err(candidates) => Err(eyre::eyre!(
            "'{}' is ambiguous, candidates:\n  {}",
            reference,
            candidates.join("\n  ")
        )),
    }
}

/// Transcribe an audio file into an opening description
///
/// Best-effort: on failure the wizard just starts with an empty input.
async fn transcribe_file(llm: &Arc<dyn CompletionClient>, path: &std::path::Path) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read audio file");
            eprintln!("Could not read {}; starting with an empty description.", path.display());
            return None;
        }
    };

    match llm.transcribe(&bytes, guess_audio_mime(path)).await {
        Ok(text) if !text.trim().is_empty() => {
            println!("Transcribed: {}", text);
            Some(text)
        }
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "Transcription failed");
            eprintln!("Transcription failed; starting with an empty description.");
            None
        }
    }
}

/// Run the interactive wizard loop for one workflow
///
/// Reads from stdin, writes to stdout. Every accepted transition is
/// persisted immediately, so quitting mid-wizard loses nothing.
async fn run_wizard(
    llm: &Arc<dyn CompletionClient>,
    store: &mut WorkflowStore,
    mut workflow: Workflow,
    opening: Option<String>,
) -> Result<()> {
    let wizard = WizardSession::new(llm.clone(), WizardConfig::default());

    println!("Workflow: {}", workflow.id);
    show_step_banner(&workflow);

    let mut pending_input = opening;

    loop {
        let input = match pending_input.take() {
            Some(text) => text,
            None => match read_line()? {
                Some(line) => line,
                None => {
                    println!("\nSession closed.");
                    return Ok(());
                }
            },
        };
        let input = input.trim().to_string();

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "/quit" | "/exit" | "q" => {
                println!("Session closed.");
                return Ok(());
            }
            "/help" => {
                show_help();
                continue;
            }
            "/plan" => {
                match wizard.visible_plan(&workflow) {
                    Some(plan) => {
                        println!("\n--- {} ---", plan.name);
                        println!("{}", plan.description);
                        for step in &plan.steps {
                            println!("  {}. [{}] {}", step.id, step.service, step.action);
                        }
                        println!();
                    }
                    None => println!("No plan yet."),
                }
                continue;
            }
            "" => continue,
            _ => {}
        }

        match workflow.current_step() {
            WizardStep::Describe => match wizard.submit_utterance(&workflow, &input).await {
                Ok(SubmitOutcome::Clarification { question }) => {
                    println!("\n{}\n", question);
                }
                Ok(SubmitOutcome::PlanAccepted { workflow: updated }) => {
                    workflow = updated;
                    store.upsert(workflow.clone())?;
                    println!("\nPlan accepted: {}", workflow.name);
                    show_step_banner(&workflow);
                }
                Err(e) => report_wizard_error(&e),
            },

            WizardStep::Review => match input.as_str() {
                "/generate" => match wizard.request_synthesis(&workflow).await {
                    Ok(updated) => {
                        workflow = updated;
                        store.upsert(workflow.clone())?;
                        println!("\nScript generated ({} bytes).", workflow.script.as_deref().unwrap_or("").len());
                        show_step_banner(&workflow);
                    }
                    Err(e) => report_wizard_error(&e),
                },
                "/refine" => match wizard.refine(&workflow) {
                    Ok(updated) => {
                        workflow = updated;
                        store.upsert(workflow.clone())?;
                        println!("\nBack to describing. What should change?");
                    }
                    Err(e) => report_wizard_error(&e),
                },
                _ => {
                    println!("On review: /plan to inspect, /generate to synthesize, /refine to go back.");
                }
            },

            WizardStep::Deploy => match input.as_str() {
                "/script" => {
                    println!("\n{}\n", workflow.script.as_deref().unwrap_or(""));
                }
                "/refine" => match wizard.refine(&workflow) {
                    Ok(updated) => {
                        workflow = updated;
                        store.upsert(workflow.clone())?;
                        println!("\nBack to describing. What should change?");
                    }
                    Err(e) => report_wizard_error(&e),
                },
                "/done" => {
                    workflow = workflow.mark_deployed();
                    store.upsert(workflow.clone())?;
                    println!("Workflow {} closed as deployed.", workflow.id);
                    return Ok(());
                }
                _ => {
                    println!("On deploy: /script to print the code, /done to close, /refine to go back.");
                }
            },
        }
    }
}

/// Read one line from stdin; None on EOF
fn read_line() -> Result<Option<String>> {
    print!("> ");
    io::stdout().flush()?;

    let stdin = io::stdin();
    match stdin.lock().lines().next() {
        Some(Ok(line)) => Ok(Some(line)),
        Some(Err(e)) => Err(e.into()),
        None => Ok(None),
    }
}

fn show_step_banner(workflow: &Workflow) {
    match workflow.current_step() {
        WizardStep::Describe => {
            println!("[describe] Tell me what to automate. Be concrete about triggers and services.");
        }
        WizardStep::Review => {
            println!("[review] /plan to inspect, /generate to synthesize, /refine to go back.");
        }
        WizardStep::Deploy => {
            println!("[deploy] /script to print the code, /done to close, /refine to go back.");
        }
    }
}

fn show_help() {
    println!("\n--- Wizard Commands ---");
    println!("  /plan      - Show the accepted plan");
    println!("  /generate  - Generate the script (review step)");
    println!("  /script    - Print the generated script (deploy step)");
    println!("  /refine    - Go back and change the description");
    println!("  /done      - Close the workflow as deployed");
    println!("  quit       - Leave the wizard (progress is saved)");
    println!("-----------------------\n");
}

/// Print a wizard error with a message matched to its class
fn report_wizard_error(err: &WizardError) {
    match err {
        WizardError::EmptyInput => println!("Say something first."),
        WizardError::MalformedResponse(_) => {
            println!("The service gave an unusable answer. Nothing was changed - try again.");
        }
        WizardError::CapabilityUnavailable(_) => {
            println!("The completion service is unreachable right now. Nothing was changed - try again shortly.");
        }
        WizardError::SynthesisFailure(_) => {
            println!("Code generation failed; the plan is untouched. Try /generate again.");
        }
        WizardError::PlanMissing => println!("There is no accepted plan yet."),
        WizardError::SessionBusy => println!("Still working on the previous request."),
    }
    warn!(error = %err, "wizard operation failed");
}

fn print_workflow(workflow: &Workflow) {
    println!("{}  [{}]  {}", workflow.id, workflow.status, workflow.name);
    if !workflow.description.is_empty() {
        println!("\n{}", workflow.description);
    }
    if !workflow.prompt.is_empty() {
        println!("\nPrompt:\n{}", workflow.prompt);
    }
    if let Some(plan) = &workflow.plan {
        println!("\nPlan:");
        for step in &plan.steps {
            println!("  {}. [{}] {}", step.id, step.service, step.action);
        }
    }
    if let Some(script) = &workflow.script {
        println!("\nScript:\n{}", script);
    }
}
