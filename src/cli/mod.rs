// src/cli/mod.rs - CLI definition (clap derive)

pub mod progress;
pub mod project;
pub mod run;
pub mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::types::ManualStatus;
use crate::infra::config::Config;
use crate::store::{ProjectRegistry, ResultStore};

#[derive(Parser)]
#[command(
    name = "promptqa",
    about = "Batch prompt testing against a local model, with manual and LLM-judged validation",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create, list, inspect or delete projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Manage a project's prompts
    Prompt {
        #[command(subcommand)]
        action: PromptAction,
    },
    /// Register context files with a project
    Source {
        #[command(subcommand)]
        action: SourceAction,
    },
    /// Run a prompt over every context of a data source
    Run {
        #[arg(long)]
        project: String,
        /// Prompt id (e.g. prompt_1)
        #[arg(long)]
        prompt: String,
        /// JSON or spreadsheet file with the contexts
        #[arg(long)]
        source: PathBuf,
    },
    /// List a project's test runs with statistics
    Runs { project: String },
    /// Show every result of a test run
    Show { project: String, run_id: String },
    /// Record a manual verdict on one result (0-based index)
    Mark {
        project: String,
        run_id: String,
        index: usize,
        #[arg(value_parser = parse_status)]
        status: ManualStatus,
    },
    /// Judge unvalidated results with the configured judge model
    Validate {
        project: String,
        run_id: String,
        /// Number of results to judge (default: all remaining)
        #[arg(long)]
        count: Option<usize>,
        /// First result index to consider
        #[arg(long, default_value = "0")]
        start: usize,
    },
}

#[derive(Subcommand, Clone)]
pub enum ProjectAction {
    Create { name: String },
    List,
    Show { name: String },
    /// Delete the project and all its test runs
    Delete { name: String },
}

#[derive(Subcommand, Clone)]
pub enum PromptAction {
    Add { project: String, text: String },
    Edit { project: String, id: String, text: String },
    Delete { project: String, id: String },
}

#[derive(Subcommand, Clone)]
pub enum SourceAction {
    Add { project: String, path: PathBuf },
}

/// Registry and result store rooted at the configured data directory.
pub fn open_stores(config: &Config) -> (ProjectRegistry, ResultStore) {
    let data_dir = config.storage.resolve_data_dir();
    tracing::debug!("Data directory: {}", data_dir.display());
    (
        ProjectRegistry::in_data_dir(&data_dir),
        ResultStore::in_data_dir(&data_dir),
    )
}

fn parse_status(s: &str) -> Result<ManualStatus, String> {
    s.parse::<ManualStatus>().map_err(|e| e.to_string())
}
