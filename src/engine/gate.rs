//! Human review gate: an explicit wrapper the engine runs before a gated
//! step. It publishes a review request, suspends the run on a cancellable
//! poll loop, and turns the reviewer's action into a step outcome.

use crate::config::HumanReviewConfig;
use crate::engine::state::WorkflowState;
use crate::store::{HumanReviewRequest, ReviewStatus, ReviewStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

const REVIEW_TYPE_APPROVAL: &str = "approval";

#[derive(Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// Run the wrapped step (reviewer approved, or modified and the patch is
    /// already applied to the state)
    Proceed,
    /// Reviewer rejected; the wrapped step must not run
    Rejected { feedback: Option<String> },
    /// Poll budget exhausted with the request still pending
    TimedOut,
    /// External shutdown; suspend without a terminal status
    Shutdown,
}

pub struct HumanGate {
    config: HumanReviewConfig,
    store: Arc<dyn ReviewStore>,
    shutdown: watch::Receiver<bool>,
}

impl HumanGate {
    pub fn new(
        config: HumanReviewConfig,
        store: Arc<dyn ReviewStore>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            store,
            shutdown,
        }
    }

    /// Whether this step name requires reviewer clearance
    pub fn wraps(&self, step_name: &str) -> bool {
        self.config.enabled && self.config.gates.iter().any(|g| g == step_name)
    }

    /// Publish a review request for `node_name` and block until it resolves,
    /// the poll budget runs out, or shutdown is signalled. A `modified`
    /// resolution patches `state` in place before returning `Proceed`.
    pub async fn clear(
        &self,
        thread_id: &str,
        node_name: &str,
        state: &mut WorkflowState,
    ) -> GateOutcome {
        let request = HumanReviewRequest::pending(
            thread_id,
            node_name,
            state,
            REVIEW_TYPE_APPROVAL,
            chrono::Duration::seconds(self.config.request_timeout_sec as i64),
        );

        if let Err(e) = self.store.create(&request) {
            // Nobody could ever resolve an unpublished request; waiting would
            // only convert a persistence outage into a guaranteed timeout
            warn!(
                "Failed to publish review request for {}, passing gate through: {}",
                node_name, e
            );
            return GateOutcome::Proceed;
        }

        info!(
            "Suspended thread {} on review request {} ({})",
            thread_id, request.request_id, node_name
        );

        let poll_interval = Duration::from_millis(self.config.poll_interval_ms.max(1));
        let budget = Duration::from_secs(self.config.wait_timeout_sec);
        let started = Instant::now();
        let mut shutdown = self.shutdown.clone();

        loop {
            let elapsed = started.elapsed();
            if elapsed >= budget {
                info!(
                    "Review request {} still pending after {:?}, timing out",
                    request.request_id, budget
                );
                return GateOutcome::TimedOut;
            }

            let wait = poll_interval.min(budget - elapsed);
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return GateOutcome::Shutdown;
                    }
                }
                _ = sleep(wait) => {}
            }

            match self.store.get(&request.request_id) {
                Ok(current) => match current.status {
                    ReviewStatus::Pending => continue,
                    ReviewStatus::Approved => {
                        info!("Review request {} approved", request.request_id);
                        return GateOutcome::Proceed;
                    }
                    ReviewStatus::Modified => {
                        if let Some(patch) = &current.modified_state {
                            state.apply_patch(patch);
                        }
                        info!(
                            "Review request {} resolved with modifications",
                            request.request_id
                        );
                        return GateOutcome::Proceed;
                    }
                    ReviewStatus::Rejected => {
                        info!("Review request {} rejected", request.request_id);
                        return GateOutcome::Rejected {
                            feedback: current.human_feedback,
                        };
                    }
                },
                Err(e) => {
                    // Transient store trouble keeps the run suspended, not dead
                    warn!(
                        "Failed to poll review request {}: {}",
                        request.request_id, e
                    );
                }
            }
        }
    }
}
