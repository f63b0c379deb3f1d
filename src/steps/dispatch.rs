//! Parallel specialist dispatch and consensus synthesis.
//!
//! One task per routed specialist, all sharing a single deadline; whatever
//! has not finished by the deadline is recorded as an error and abandoned.
//! The survivors are reduced to one aggregate analysis by the consensus
//! rules below. The longest-response rule is a deliberate, documented proxy
//! for "most complete answer", not a placeholder.

use crate::config::{Config, Specialist};
use crate::engine::retry::retry_with_backoff;
use crate::error::EngineError;
use crate::provider::CompletionProvider;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{info, warn};

const SPECIALIST_PROMPT: &str = include_str!("../../prompts/specialist.md");

/// Analysis produced when every specialist, including the fallback, failed.
/// Kept as the analysis text so the run can still reach a terminal state.
pub const ALL_FAILED_NOTICE: &str =
    "No specialist analysis could be produced for this intake. A human reviewer should look at \
     the original question directly.";

/// One specialist's contribution, ephemeral; consumed by consensus synthesis
#[derive(Debug, Clone)]
pub struct SpecialistResult {
    pub specialist: String,
    pub output: Result<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

#[derive(Debug)]
pub struct DispatchOutcome {
    /// `None` means every specialist failed; the caller must fall back, not abort
    pub aggregate: Option<String>,
    pub confidence: Confidence,
    pub agreement: String,
    pub results: Vec<SpecialistResult>,
}

fn role_prompt(specialist: &Specialist) -> String {
    super::prompt_or_embedded(specialist.prompt_file.as_deref(), SPECIALIST_PROMPT)
        .replace("{{NAME}}", &specialist.name)
        .replace("{{FOCUS}}", &specialist.focus)
}

/// Fan out to the routed specialists and synthesize a consensus
pub async fn dispatch(
    provider: Arc<dyn CompletionProvider>,
    config: &Config,
    specialists: &[&Specialist],
    raw_text: &str,
) -> Result<DispatchOutcome, EngineError> {
    let deadline = Instant::now() + Duration::from_secs(config.dispatch_timeout_sec);
    let call_timeout = Duration::from_secs(config.timeout_sec);
    let semaphore = Arc::new(Semaphore::new(config.concurrency));
    let launch_delay = Duration::from_millis(config.launch_delay_ms);

    info!(
        "Dispatching {} specialists with concurrency {}",
        specialists.len(),
        config.concurrency
    );

    let mut futures = FuturesUnordered::new();
    for (idx, specialist) in specialists.iter().enumerate() {
        // Small delay between launches to avoid burst rate limits
        if idx > 0 && launch_delay > Duration::ZERO {
            sleep(launch_delay).await;
        }

        let permit = semaphore.clone().acquire_owned().await?;
        let provider = provider.clone();
        let system_prompt = role_prompt(specialist);
        let user_prompt = raw_text.to_string();
        let id = specialist.id.clone();

        futures.push(tokio::spawn(async move {
            let _permit = permit; // hold until done
            let output = match timeout_at(
                deadline,
                provider.complete(&system_prompt, &user_prompt, call_timeout),
            )
            .await
            {
                Ok(Ok(text)) => Ok(text),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err("specialist missed the dispatch deadline".to_string()),
            };
            (idx, SpecialistResult {
                specialist: id,
                output,
            })
        }));
    }

    // Restore routing-table order: the tie-break below depends on it
    let mut slots: Vec<Option<SpecialistResult>> = vec![None; specialists.len()];
    while let Some(joined) = futures.next().await {
        match joined {
            Ok((idx, result)) => {
                match &result.output {
                    Ok(_) => info!("Specialist {} completed", result.specialist),
                    Err(e) => warn!("Specialist {} failed: {}", result.specialist, e),
                }
                slots[idx] = Some(result);
            }
            Err(e) => {
                warn!("Specialist task panicked: {}", e);
            }
        }
    }
    let results: Vec<SpecialistResult> = slots.into_iter().flatten().collect();

    let (aggregate, confidence, agreement) = synthesize(&results);
    info!(
        "Consensus: confidence={} agreement={}",
        confidence, agreement
    );

    Ok(DispatchOutcome {
        aggregate,
        confidence,
        agreement,
        results,
    })
}

/// Reduce per-specialist results to one aggregate plus confidence/agreement.
///
/// Rules, in order: zero successes -> recoverable failure marker; one
/// success -> that text at low confidence; all successes byte-identical ->
/// that text at high confidence, unanimous; otherwise the longest response
/// wins (tie-break: routing-table order) at medium confidence with
/// `<n_matching>/<n_total>` agreement.
fn synthesize(results: &[SpecialistResult]) -> (Option<String>, Confidence, String) {
    let total = results.len();
    let successes: Vec<&str> = results
        .iter()
        .filter_map(|r| r.output.as_deref().ok())
        .collect();

    match successes.len() {
        0 => (None, Confidence::Low, format!("0/{}", total)),
        1 => (
            Some(successes[0].to_string()),
            Confidence::Low,
            format!("1/{}", total),
        ),
        n if successes.iter().all(|s| *s == successes[0]) => (
            Some(successes[0].to_string()),
            Confidence::High,
            "unanimous".to_string(),
        ),
        _ => {
            // Longest response wins; first in routing order on equal length,
            // so a strictly-greater comparison keeps the earliest candidate
            let mut longest = successes[0];
            for s in &successes[1..] {
                if s.len() > longest.len() {
                    longest = s;
                }
            }
            let matching = successes.iter().filter(|s| **s == longest).count();
            (
                Some(longest.to_string()),
                Confidence::Medium,
                format!("{}/{}", matching, total),
            )
        }
    }
}

/// Consult the fallback specialist after an all-failed fan-out. Retried
/// through backoff; if even this fails the all-failed notice becomes the
/// analysis so the run still reaches a terminal state.
pub async fn consult_fallback(
    provider: Arc<dyn CompletionProvider>,
    config: &Config,
    specialist: &Specialist,
    raw_text: &str,
) -> String {
    let system_prompt = role_prompt(specialist);
    let call_timeout = Duration::from_secs(config.timeout_sec);

    let result = retry_with_backoff(&config.retry, || {
        let provider = provider.clone();
        let system_prompt = system_prompt.clone();
        let raw_text = raw_text.to_string();
        async move {
            provider
                .complete(&system_prompt, &raw_text, call_timeout)
                .await
        }
    })
    .await;

    match result {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "Fallback specialist {} failed as well: {}",
                specialist.id, e
            );
            ALL_FAILED_NOTICE.to_string()
        }
    }
}
