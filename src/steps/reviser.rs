use crate::config::RetryConfig;
use crate::engine::retry::retry_with_backoff;
use crate::error::ProviderError;
use crate::provider::CompletionProvider;
use std::time::Duration;

const REVISE_PROMPT: &str = include_str!("../../prompts/revise.md");

/// Rewrite a draft analysis using the critic's feedback. The caller owns the
/// revision-count bookkeeping; this is just the text transformation.
pub async fn revise(
    provider: &dyn CompletionProvider,
    retry: &RetryConfig,
    timeout: Duration,
    raw_text: &str,
    analysis: &str,
    feedback: &str,
) -> Result<String, ProviderError> {
    let user_prompt = format!(
        "## Client question\n\n{}\n\n## Draft analysis\n\n{}\n\n## Critic feedback\n\n{}",
        raw_text, analysis, feedback
    );

    retry_with_backoff(retry, || {
        let user_prompt = user_prompt.clone();
        async move {
            provider
                .complete(REVISE_PROMPT, &user_prompt, timeout)
                .await
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::{StubProvider, StubReply};

    fn retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 2,
            backoff_base_ms: 1,
        }
    }

    #[tokio::test]
    async fn test_revise_returns_new_analysis() {
        let provider = StubProvider::new().text("You are revising", "the improved draft");
        let revised = revise(
            &provider,
            &retry(),
            Duration::from_secs(5),
            "q",
            "old draft",
            "be specific",
        )
        .await
        .unwrap();
        assert_eq!(revised, "the improved draft");
    }

    #[tokio::test]
    async fn test_revise_surfaces_exhausted_failure() {
        let provider = StubProvider::new().on("You are revising", StubReply::Fail);
        let result = revise(
            &provider,
            &retry(),
            Duration::from_secs(5),
            "q",
            "old draft",
            "be specific",
        )
        .await;
        assert!(result.is_err());
        assert_eq!(provider.calls_matching("You are revising"), 2);
    }
}
