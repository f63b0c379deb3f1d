use crate::config::RetryConfig;
use crate::engine::retry::retry_with_backoff;
use crate::provider::CompletionProvider;
use std::time::Duration;
use tracing::warn;

const EXPLAIN_PROMPT: &str = include_str!("../../prompts/explain.md");

/// Turn the approved analysis into a plain-language answer. The normal
/// terminal step; if the provider stays down even the degraded path must
/// produce an answer, so the analysis itself is the fallback.
pub async fn explain(
    provider: &dyn CompletionProvider,
    retry: &RetryConfig,
    timeout: Duration,
    raw_text: &str,
    analysis: &str,
) -> String {
    let user_prompt = format!(
        "## Client question\n\n{}\n\n## Analysis\n\n{}",
        raw_text, analysis
    );

    let result = retry_with_backoff(retry, || {
        let user_prompt = user_prompt.clone();
        async move {
            provider
                .complete(EXPLAIN_PROMPT, &user_prompt, timeout)
                .await
        }
    })
    .await;

    match result {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "Explainer failed after retries, returning the analysis verbatim: {}",
                e
            );
            analysis.to_string()
        }
    }
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
    async fn test_explain_produces_answer() {
        let provider =
            StubProvider::new().text("plain language", "You can do three things today.");
        let answer = explain(&provider, &retry(), Duration::from_secs(5), "q", "analysis").await;
        assert_eq!(answer, "You can do three things today.");
    }

    #[tokio::test]
    async fn test_explain_falls_back_to_analysis() {
        let provider = StubProvider::new().on("plain language", StubReply::Fail);
        let answer =
            explain(&provider, &retry(), Duration::from_secs(5), "q", "the raw analysis").await;
        assert_eq!(answer, "the raw analysis");
    }
}
