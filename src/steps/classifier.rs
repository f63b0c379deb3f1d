use crate::config::RetryConfig;
use crate::engine::retry::retry_with_backoff;
use crate::engine::state::CaseType;
use crate::parser::first_label;
use crate::provider::CompletionProvider;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

const CLASSIFY_PROMPT: &str = include_str!("../../prompts/classify.md");

/// Label the intake with a practice area. Provider failures and unusable
/// labels are both retried through the backoff helper; anything still
/// unusable afterwards degrades to `other` so the run can always reach a
/// specialist.
pub async fn classify(
    provider: &dyn CompletionProvider,
    retry: &RetryConfig,
    timeout: Duration,
    raw_text: &str,
) -> CaseType {
    let labels = CaseType::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let system_prompt = CLASSIFY_PROMPT.replace("{{LABELS}}", &labels);

    let result = retry_with_backoff(retry, || {
        let system_prompt = system_prompt.clone();
        let raw_text = raw_text.to_string();
        async move {
            let text = provider
                .complete(&system_prompt, &raw_text, timeout)
                .await
                .map_err(|e| e.to_string())?;
            match first_label(&text).map(|l| CaseType::from_str(&l)) {
                Some(Ok(case_type)) => Ok(case_type),
                _ => Err(format!(
                    "unusable label '{}'",
                    text.lines().next().unwrap_or("(empty)")
                )),
            }
        }
    })
    .await;

    match result {
        Ok(case_type) => {
            debug!("Classified intake as {}", case_type);
            case_type
        }
        Err(e) => {
            warn!("Classifier failed after retries, defaulting to other: {}", e);
            CaseType::Other
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
    async fn test_clean_label() {
        let provider = StubProvider::new().text("intake classifier", "Housing.");
        let case_type = classify(&provider, &retry(), Duration::from_secs(5), "evicted").await;
        assert_eq!(case_type, CaseType::Housing);
    }

    #[tokio::test]
    async fn test_out_of_set_label_retried_then_defaults_to_other() {
        let provider = StubProvider::new().text("intake classifier", "maritime salvage law");
        let case_type = classify(&provider, &retry(), Duration::from_secs(5), "shipwreck").await;
        assert_eq!(case_type, CaseType::Other);
        // An unusable label burns an attempt like a provider error does
        assert_eq!(provider.calls_matching("intake classifier"), 2);
    }

    #[tokio::test]
    async fn test_unusable_label_then_clean_label() {
        let provider = StubProvider::new().on_seq(
            "intake classifier",
            vec![
                StubReply::Text("maritime salvage law".to_string()),
                StubReply::Text("housing".to_string()),
            ],
        );
        let case_type = classify(&provider, &retry(), Duration::from_secs(5), "evicted").await;
        assert_eq!(case_type, CaseType::Housing);
        assert_eq!(provider.calls_matching("intake classifier"), 2);
    }

    #[tokio::test]
    async fn test_retries_once_then_succeeds() {
        let provider = StubProvider::new().on_seq(
            "intake classifier",
            vec![
                StubReply::Fail,
                StubReply::Text("employment".to_string()),
            ],
        );
        let case_type = classify(&provider, &retry(), Duration::from_secs(5), "fired").await;
        assert_eq!(case_type, CaseType::Employment);
        assert_eq!(provider.calls_matching("intake classifier"), 2);
    }

    #[tokio::test]
    async fn test_persistent_failure_defaults_to_other() {
        let provider = StubProvider::new().on("intake classifier", StubReply::Fail);
        let case_type = classify(&provider, &retry(), Duration::from_secs(5), "help").await;
        assert_eq!(case_type, CaseType::Other);
        assert_eq!(provider.calls_matching("intake classifier"), 2);
    }
}
