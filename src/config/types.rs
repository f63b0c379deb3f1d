use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use super::defaults::*;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory holding checkpoints, review requests and intake records
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Which CLI backs completion calls
    #[serde(default)]
    pub provider: Provider,

    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Max specialists running at once inside the dispatcher
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_launch_delay_ms")]
    pub launch_delay_ms: u64,

    /// Per completion call timeout
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,

    /// Shared deadline for one dispatcher fan-out
    #[serde(default = "default_dispatch_timeout_sec")]
    pub dispatch_timeout_sec: u64,

    /// Critic -> reviser cycles permitted before forcing the explainer
    #[serde(default = "default_max_revisions")]
    pub max_revisions: u32,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub human_review: HumanReviewConfig,

    #[serde(default = "default_specialists")]
    pub specialists: Vec<Specialist>,

    /// case_type -> specialist ids consulted for it
    #[serde(default = "default_routes")]
    pub routes: HashMap<String, Vec<String>>,

    /// Specialist consulted when a fan-out yields zero successes
    #[serde(default = "default_fallback_specialist")]
    pub fallback_specialist: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub claude_cli: ClaudeCliConfig,

    #[serde(default)]
    pub codex_cli: CodexCliConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            claude_cli: ClaudeCliConfig::default(),
            codex_cli: CodexCliConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ClaudeCliConfig {
    #[serde(default = "default_claude_binary")]
    pub binary: PathBuf,

    #[serde(default = "default_claude_model")]
    pub model: String,

    #[serde(default = "default_permission_mode")]
    pub permission_mode: String,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        Self {
            binary: default_claude_binary(),
            model: default_claude_model(),
            permission_mode: default_permission_mode(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct CodexCliConfig {
    #[serde(default = "default_codex_binary")]
    pub binary: PathBuf,

    #[serde(default = "default_codex_model")]
    pub model: String,
}

impl Default for CodexCliConfig {
    fn default() -> Self {
        Self {
            binary: default_codex_binary(),
            model: default_codex_model(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct HumanReviewConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Step names a reviewer must clear before they run
    #[serde(default = "default_gates")]
    pub gates: Vec<String>,

    /// How long the published request itself stays valid
    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,

    /// Poll interval while a run is suspended on a gate
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Poll budget; exhausting it terminates the run with status=timeout
    #[serde(default = "default_wait_timeout_sec")]
    pub wait_timeout_sec: u64,
}

impl Default for HumanReviewConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            gates: default_gates(),
            request_timeout_sec: default_request_timeout_sec(),
            poll_interval_ms: default_poll_interval_ms(),
            wait_timeout_sec: default_wait_timeout_sec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Specialist {
    pub id: String,

    pub name: String,

    /// One-line description of the specialist's domain, substituted into the
    /// role prompt template
    pub focus: String,

    /// Optional prompt override; falls back to the embedded template
    #[serde(default)]
    pub prompt_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    #[default]
    ClaudeCli,
    CodexCli,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::ClaudeCli => write!(f, "claude_cli"),
            Provider::CodexCli => write!(f, "codex_cli"),
        }
    }
}
