//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - create/list/status: manage artifacts in the local store
//! - steps: print the step table
//! - run/resume/tool: drive the pipeline

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Artifact pipeline - drives content artifacts through AI tool steps
#[derive(Parser, Debug)]
#[command(name = "artifact-pipeline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new draft artifact
    Create {
        /// Working title
        #[arg(long)]
        title: String,

        /// Artifact type (blog, social_post, showcase)
        #[arg(short = 't', long = "type")]
        artifact_type: String,

        /// Tone of voice
        #[arg(long)]
        tone: Option<String>,

        /// Initial content or brief
        #[arg(long)]
        content: Option<String>,
    },

    /// List artifacts
    List {
        /// Filter by status (draft, research, ..., ready)
        #[arg(short, long)]
        status: Option<String>,

        /// Only artifacts whose title contains this text
        #[arg(long)]
        title: Option<String>,

        /// Hide artifacts that are already ready
        #[arg(long)]
        pending: bool,
    },

    /// Show one artifact
    Status {
        /// Artifact ID
        id: String,
    },

    /// Print the pipeline step table
    Steps,

    /// Run the full pipeline on an artifact
    Run {
        /// Artifact ID
        id: String,
    },

    /// Resume a pipeline paused for approval
    Resume {
        /// Artifact ID
        id: String,
    },

    /// Run a single tool on an artifact
    Tool {
        /// Tool name, e.g. research or identify-visual-needs
        name: String,

        /// Artifact ID
        id: String,
    },
}
