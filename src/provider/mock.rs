//! Scripted provider for tests. Rules are keyed on a substring of the system
//! prompt, so each workflow step can be scripted independently.

use super::CompletionProvider;
use crate::error::ProviderError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum StubReply {
    Text(String),
    Fail,
    /// Never completes within any realistic deadline
    Hang,
}

struct Rule {
    marker: String,
    replies: VecDeque<StubReply>,
    repeat: StubReply,
}

#[derive(Default)]
pub struct StubProvider {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer prompts matching `marker` with `reply`
    pub fn on(self, marker: &str, reply: StubReply) -> Self {
        self.on_seq(marker, vec![reply])
    }

    pub fn text(self, marker: &str, reply: &str) -> Self {
        self.on(marker, StubReply::Text(reply.to_string()))
    }

    /// Answer prompts matching `marker` with `replies` in order, repeating the
    /// final entry once the sequence is exhausted
    pub fn on_seq(self, marker: &str, replies: Vec<StubReply>) -> Self {
        let repeat = replies
            .last()
            .cloned()
            .expect("on_seq requires at least one reply");
        self.rules.lock().unwrap().push(Rule {
            marker: marker.to_string(),
            replies: replies.into(),
            repeat,
        });
        self
    }

    /// Number of completions whose system prompt contained `marker`
    pub fn calls_matching(&self, marker: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.contains(marker))
            .count()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn complete(
        &self,
        system_prompt: &str,
        _user_prompt: &str,
        _timeout: Duration,
    ) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(system_prompt.to_string());

        let reply = {
            let mut rules = self.rules.lock().unwrap();
            match rules.iter_mut().find(|r| system_prompt.contains(&r.marker)) {
                Some(rule) => rule.replies.pop_front().unwrap_or_else(|| rule.repeat.clone()),
                None => {
                    return Err(ProviderError::NonZeroExit {
                        code: -1,
                        stderr: format!("no stub rule matches prompt: {}", system_prompt),
                    })
                }
            }
        };

        match reply {
            StubReply::Text(text) => Ok(text),
            StubReply::Fail => Err(ProviderError::NonZeroExit {
                code: 1,
                stderr: "scripted failure".to_string(),
            }),
            StubReply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ProviderError::Timeout(Duration::from_secs(3600)))
            }
        }
    }
}
