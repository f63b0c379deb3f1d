use crate::parser::extract_json;
use crate::provider::CompletionProvider;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const CRITIC_PROMPT: &str = include_str!("../../prompts/critic.md");

/// The critic's decision on a draft analysis
#[derive(Debug, Clone)]
pub struct Review {
    pub approve: bool,
    pub feedback: Option<String>,
}

#[derive(Deserialize)]
struct Verdict {
    verdict: String,
    #[serde(default)]
    feedback: Option<String>,
}

/// Evaluate a specialist's draft against the original question.
///
/// Fails open: a provider error or unparseable verdict counts as approval, so
/// a glitch here can never trap the workflow in the revision loop.
pub async fn review(
    provider: &dyn CompletionProvider,
    timeout: Duration,
    raw_text: &str,
    analysis: &str,
) -> Review {
    let user_prompt = format!(
        "## Client question\n\n{}\n\n## Draft analysis\n\n{}",
        raw_text, analysis
    );

    let raw = match provider.complete(CRITIC_PROMPT, &user_prompt, timeout).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Critic call failed, approving draft as-is: {}", e);
            return Review {
                approve: true,
                feedback: None,
            };
        }
    };

    match parse_verdict(&raw) {
        Some(review) => review,
        None => {
            warn!(
                "Critic verdict unparseable, approving draft as-is: {}",
                raw.lines().next().unwrap_or("(empty)")
            );
            Review {
                approve: true,
                feedback: None,
            }
        }
    }
}

fn parse_verdict(raw: &str) -> Option<Review> {
    let json = extract_json(raw)?;
    let verdict: Verdict = serde_json::from_str(&json).ok()?;

    match verdict.verdict.to_lowercase().as_str() {
        "approve" => Some(Review {
            approve: true,
            feedback: verdict.feedback,
        }),
        "revise" => Some(Review {
            approve: false,
            feedback: verdict.feedback,
        }),
        other => {
            debug!("Unknown critic verdict '{}'", other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::{StubProvider, StubReply};

    #[tokio::test]
    async fn test_approve_verdict() {
        let provider = StubProvider::new().text("quality critic", r#"{"verdict": "approve"}"#);
        let review = review(&provider, Duration::from_secs(5), "q", "draft").await;
        assert!(review.approve);
        assert!(review.feedback.is_none());
    }

    #[tokio::test]
    async fn test_revise_verdict_carries_feedback() {
        let provider = StubProvider::new().text(
            "quality critic",
            "```json\n{\"verdict\": \"revise\", \"feedback\": \"mention the notice period\"}\n```",
        );
        let review = review(&provider, Duration::from_secs(5), "q", "draft").await;
        assert!(!review.approve);
        assert_eq!(review.feedback.as_deref(), Some("mention the notice period"));
    }

    #[tokio::test]
    async fn test_unparseable_verdict_fails_open() {
        let provider =
            StubProvider::new().text("quality critic", "Looks fine to me, ship it.");
        let review = review(&provider, Duration::from_secs(5), "q", "draft").await;
        assert!(review.approve);
    }

    #[tokio::test]
    async fn test_provider_error_fails_open() {
        let provider = StubProvider::new().on("quality critic", StubReply::Fail);
        let review = review(&provider, Duration::from_secs(5), "q", "draft").await;
        assert!(review.approve);
    }

    #[test]
    fn test_unknown_verdict_rejected() {
        assert!(parse_verdict(r#"{"verdict": "maybe"}"#).is_none());
    }
}
