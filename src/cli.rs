//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// flowsmith - conversational automation workflow builder
#[derive(Parser)]
#[command(
    name = "flow",
    about = "Describe an automation in plain language; get a plan and a script",
    version,
    after_help = "Logs are written to: ~/.local/share/flowsmith/logs/flowsmith.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Start the wizard for a new workflow
    New {
        /// Opening description; prompted for interactively when omitted
        description: Option<String>,

        /// Seed the description by transcribing an audio file
        #[arg(long, value_name = "FILE", conflicts_with = "description")]
        audio: Option<PathBuf>,
    },

    /// Reopen the wizard for an existing workflow
    Resume {
        /// Workflow ID, hex prefix, or slug fragment
        reference: String,
    },

    /// List stored workflows
    List,

    /// Show one workflow, including its plan and script
    Show {
        /// Workflow ID, hex prefix, or slug fragment
        reference: String,
    },

    /// Delete a workflow
    Remove {
        /// Workflow ID, hex prefix, or slug fragment
        reference: String,
    },
}

/// Guess an audio MIME type from a file extension
pub fn guess_audio_mime(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mp3") => "audio/mp3",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("m4a") | Some("aac") => "audio/aac",
        _ => "application/octet-stream",
    }
}
