use super::CompletionProvider;
use crate::error::ProviderError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout as tokio_timeout;

pub struct CodexCliProvider {
    pub binary: PathBuf,
    pub model: String,
}

#[async_trait]
impl CompletionProvider for CodexCliProvider {
    fn name(&self) -> &'static str {
        "codex_cli"
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        timeout: Duration,
    ) -> Result<String, ProviderError> {
        let full_prompt = format!("{}\n\n---\n\n{}", system_prompt, user_prompt);

        // Use string for PATH lookup if not an absolute/relative path
        let binary_str = self.binary.to_string_lossy();
        let mut cmd = if binary_str.contains('/') || binary_str.contains('\\') {
            Command::new(&self.binary)
        } else {
            Command::new(binary_str.as_ref())
        };

        cmd.arg("exec");
        cmd.arg("--model").arg(&self.model);

        // Capture the final assistant message to a temp file for easy parsing
        let out_file = NamedTempFile::new().map_err(ProviderError::Io)?;
        cmd.arg("--output-last-message").arg(out_file.path());

        // Read prompt from stdin
        cmd.arg("-");

        cmd.stdin(std::process::Stdio::piped());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let mut child = cmd.spawn().map_err(ProviderError::Io)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(full_prompt.as_bytes())
                .await
                .map_err(ProviderError::Io)?;
            stdin.shutdown().await.map_err(ProviderError::Io)?;
        }

        let output = tokio_timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| ProviderError::Timeout(timeout))?
            .map_err(ProviderError::Io)?;

        if !output.status.success() {
            return Err(ProviderError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let last_message =
            std::fs::read_to_string(out_file.path()).unwrap_or_else(|_| String::new());
        let text = if last_message.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).to_string()
        } else {
            last_message
        };

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }

        Ok(text)
    }
}
