use super::CompletionProvider;
use crate::error::ProviderError;
use crate::parser::unwrap_result_envelope;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout as tokio_timeout;

pub struct ClaudeCliProvider {
    pub binary: PathBuf,
    pub model: String,
    pub permission_mode: String,
}

#[async_trait]
impl CompletionProvider for ClaudeCliProvider {
    fn name(&self) -> &'static str {
        "claude_cli"
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        timeout: Duration,
    ) -> Result<String, ProviderError> {
        // Build command - use string for PATH lookup if not an absolute/relative path
        let binary_str = self.binary.to_string_lossy();
        let mut cmd = if binary_str.contains('/') || binary_str.contains('\\') {
            Command::new(&self.binary)
        } else {
            // Plain command name - let shell find it in PATH
            Command::new(binary_str.as_ref())
        };

        // Ensure subscription auth is used (not API key)
        cmd.env_remove("ANTHROPIC_API_KEY");

        cmd.arg("-p")
            .arg(user_prompt)
            .arg("--append-system-prompt")
            .arg(system_prompt)
            .arg("--model")
            .arg(&self.model)
            .arg("--output-format")
            .arg("json")
            .arg("--permission-mode")
            .arg(&self.permission_mode);

        let output = tokio_timeout(timeout, cmd.output())
            .await
            .map_err(|_| ProviderError::Timeout(timeout))?
            .map_err(ProviderError::Io)?;

        if !output.status.success() {
            return Err(ProviderError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let text = unwrap_result_envelope(&stdout);
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }

        Ok(text)
    }
}
