mod claude;
mod codex;

#[cfg(test)]
pub mod mock;

pub use claude::ClaudeCliProvider;
pub use codex::CodexCliProvider;

use crate::config::{Config, Provider};
use crate::error::ProviderError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Opaque "produce text given a prompt" collaborator. Every workflow step
/// goes through this seam, which is what makes runs independently testable.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        timeout: Duration,
    ) -> Result<String, ProviderError>;
}

/// Create a provider based on the configured backend
pub fn create_provider(config: &Config) -> Arc<dyn CompletionProvider> {
    match config.provider {
        Provider::ClaudeCli => Arc::new(ClaudeCliProvider {
            binary: config.providers.claude_cli.binary.clone(),
            model: config.providers.claude_cli.model.clone(),
            permission_mode: config.providers.claude_cli.permission_mode.clone(),
        }),
        Provider::CodexCli => Arc::new(CodexCliProvider {
            binary: config.providers.codex_cli.binary.clone(),
            model: config.providers.codex_cli.model.clone(),
        }),
    }
}
