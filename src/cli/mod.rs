pub mod init;
pub mod resume;
pub mod review;
pub mod run;
pub mod schema;

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "lexflow")]
#[command(
    author,
    version,
    about = "Legal intake workflow orchestrator with specialist consensus and human review"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a new intake through the workflow
    Run(RunArgs),

    /// Resume a suspended thread from its latest checkpoint
    Resume(ResumeArgs),

    /// List and resolve pending human review requests
    Review(ReviewArgs),

    /// Write a starter config file
    Init(InitArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Path to config file
    #[arg(short, long, default_value = "lexflow.yaml")]
    pub config: PathBuf,

    /// The intake question, verbatim
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Read the intake question from a file instead
    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Opaque user identifier attached to the intake
    #[arg(long)]
    pub user: Option<String>,

    /// Extra metadata entries (key=value, repeatable)
    #[arg(long, value_name = "KEY=VALUE")]
    pub meta: Vec<String>,

    /// Override max specialists running at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Override the revision cap
    #[arg(long)]
    pub max_revisions: Option<u32>,

    /// Override the data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct ResumeArgs {
    /// Path to config file
    #[arg(short, long, default_value = "lexflow.yaml")]
    pub config: PathBuf,

    /// Thread to re-hydrate
    #[arg(value_name = "THREAD_ID")]
    pub thread_id: String,

    /// Override the data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct ReviewArgs {
    /// Path to config file
    #[arg(short, long, default_value = "lexflow.yaml")]
    pub config: PathBuf,

    /// Override the data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub action: ReviewAction,
}

#[derive(Subcommand, Clone)]
pub enum ReviewAction {
    /// List pending review requests, oldest first
    List,

    /// Approve a pending request; the suspended run proceeds unchanged
    Approve {
        request_id: String,

        /// Optional note recorded on the request
        #[arg(long)]
        feedback: Option<String>,
    },

    /// Reject a pending request; the suspended run terminates
    Reject {
        request_id: String,

        /// Optional note recorded on the request
        #[arg(long)]
        feedback: Option<String>,
    },

    /// Approve with modifications applied to the run before it proceeds
    Modify {
        request_id: String,

        /// State patch as JSON, e.g. '{"case_type": "family"}'
        #[arg(long)]
        patch: String,

        /// Optional note recorded on the request
        #[arg(long)]
        feedback: Option<String>,
    },
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    /// Where to write the config file
    #[arg(short, long, default_value = "lexflow.yaml")]
    pub config: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Load and validate config, falling back to defaults when no file exists so
/// `run` works out of the box.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = if path.exists() {
        info!("Loading config from {:?}", path);
        Config::load(path)?
    } else {
        info!("No config at {:?}, using defaults", path);
        Config::default()
    };
    config.validate()?;
    Ok(config)
}
