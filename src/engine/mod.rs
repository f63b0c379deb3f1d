//! The workflow engine: a small state machine that sequences
//! classify -> dispatch -> critic_review -> (rewrite <-> critic_review)* ->
//! explain, checkpoints after every transition, and optionally suspends on a
//! human review gate before any named step.

pub mod gate;
pub mod retry;
pub mod state;

use crate::config::Config;
use crate::error::EngineError;
use crate::provider::CompletionProvider;
use crate::steps::{classifier, critic, dispatch, explainer, reviser};
use crate::store::{CheckpointStore, ReviewStore};
use gate::{GateOutcome, HumanGate};
use state::{Status, WorkflowState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// The named steps of the pipeline, in state-machine order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Classify,
    Dispatch,
    CriticReview,
    Rewrite,
    Explain,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Classify,
        Step::Dispatch,
        Step::CriticReview,
        Step::Rewrite,
        Step::Explain,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::Classify => "classify",
            Step::Dispatch => "dispatch",
            Step::CriticReview => "critic_review",
            Step::Rewrite => "rewrite",
            Step::Explain => "explain",
        }
    }
}

pub struct WorkflowEngine {
    config: Config,
    provider: Arc<dyn CompletionProvider>,
    checkpoints: Arc<dyn CheckpointStore>,
    gate: HumanGate,
    shutdown: watch::Receiver<bool>,
}

impl WorkflowEngine {
    pub fn new(
        config: Config,
        provider: Arc<dyn CompletionProvider>,
        checkpoints: Arc<dyn CheckpointStore>,
        reviews: Arc<dyn ReviewStore>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let gate = HumanGate::new(config.human_review.clone(), reviews, shutdown.clone());
        Self {
            config,
            provider,
            checkpoints,
            gate,
            shutdown,
        }
    }

    /// Start a fresh run from a just-created state. Returns the terminal
    /// state, or a non-terminal state if shutdown suspended the run partway.
    pub async fn run(&self, state: WorkflowState) -> Result<WorkflowState, EngineError> {
        info!("Starting workflow thread {}", state.intake_id);
        self.checkpoint(&state);
        self.drive(state, Step::Classify).await
    }

    /// Re-hydrate a suspended thread from its latest checkpoint and continue
    /// from the step its status implies; classification is never re-run.
    pub async fn resume(&self, thread_id: &str) -> Result<WorkflowState, EngineError> {
        let checkpoint = self
            .checkpoints
            .latest(thread_id)?
            .ok_or_else(|| EngineError::NoCheckpoint(thread_id.to_string()))?;

        let state = checkpoint.state;
        if state.is_terminal() {
            info!(
                "Thread {} is already terminal ({}), nothing to resume",
                thread_id, state.status
            );
            return Ok(state);
        }

        let step = Self::step_after(&state);
        info!(
            "Resuming thread {} from checkpoint {} at step {}",
            thread_id,
            checkpoint.checkpoint_id,
            step.name()
        );
        self.drive(state, step).await
    }

    /// The step a (non-terminal) state should execute next, derived from
    /// `status` alone; `current_step` is advisory and never consulted.
    fn step_after(state: &WorkflowState) -> Step {
        match state.status {
            Status::Started => Step::Classify,
            Status::Classified => Step::Dispatch,
            Status::SpecialistAnalysis => Step::CriticReview,
            Status::CriticReview => {
                if state.needs_revision && state.revision_count < state.max_revisions {
                    Step::Rewrite
                } else {
                    Step::Explain
                }
            }
            Status::Rewritten => {
                if state.revision_count >= state.max_revisions {
                    Step::Explain
                } else {
                    Step::CriticReview
                }
            }
            // Unreachable for terminal statuses; resume() returns early
            Status::Rejected | Status::Timeout | Status::Completed => Step::Explain,
        }
    }

    async fn drive(
        &self,
        mut state: WorkflowState,
        mut step: Step,
    ) -> Result<WorkflowState, EngineError> {
        loop {
            if *self.shutdown.borrow() {
                info!("Shutdown observed, suspending thread {}", state.intake_id);
                self.checkpoint(&state);
                return Ok(state);
            }

            if self.gate.wraps(step.name()) {
                let thread_id = state.intake_id.clone();
                match self.gate.clear(&thread_id, step.name(), &mut state).await {
                    GateOutcome::Proceed => {}
                    GateOutcome::Rejected { feedback } => {
                        if let Some(feedback) = feedback {
                            info!("Reviewer feedback: {}", feedback);
                        }
                        state.status = Status::Rejected;
                        self.checkpoint(&state);
                        return Ok(state);
                    }
                    GateOutcome::TimedOut => {
                        state.status = Status::Timeout;
                        self.checkpoint(&state);
                        return Ok(state);
                    }
                    GateOutcome::Shutdown => {
                        info!("Shutdown during review gate, suspending thread {}", state.intake_id);
                        self.checkpoint(&state);
                        return Ok(state);
                    }
                }
            }

            let next = self.apply(step, &mut state).await?;
            self.checkpoint(&state);

            match next {
                Some(next_step) => step = next_step,
                None => {
                    info!(
                        "Thread {} finished with status {}",
                        state.intake_id, state.status
                    );
                    return Ok(state);
                }
            }
        }
    }

    /// Apply one step to the state and name the step that follows
    async fn apply(
        &self,
        step: Step,
        state: &mut WorkflowState,
    ) -> Result<Option<Step>, EngineError> {
        state.current_step = step.name().to_string();
        let call_timeout = Duration::from_secs(self.config.timeout_sec);

        match step {
            Step::Classify => {
                let case_type = classifier::classify(
                    self.provider.as_ref(),
                    &self.config.retry,
                    call_timeout,
                    &state.raw_text,
                )
                .await;
                state.case_type = Some(case_type);
                state.status = Status::Classified;
                Ok(Some(Step::Dispatch))
            }

            Step::Dispatch => {
                let case_type = state.case_type.unwrap_or_default();
                let specialists = self
                    .config
                    .route(case_type)
                    .ok_or_else(|| EngineError::UnknownCaseType(case_type.to_string()))?;

                let outcome = dispatch::dispatch(
                    self.provider.clone(),
                    &self.config,
                    &specialists,
                    &state.raw_text,
                )
                .await?;

                match outcome.aggregate {
                    Some(analysis) => {
                        state.specialist_analysis = Some(analysis);
                    }
                    None => {
                        warn!(
                            "All specialists failed for thread {}, consulting fallback {}",
                            state.intake_id, self.config.fallback_specialist
                        );
                        let fallback = self
                            .config
                            .specialist(&self.config.fallback_specialist)
                            .ok_or_else(|| {
                                EngineError::MissingFallback(
                                    self.config.fallback_specialist.clone(),
                                )
                            })?;
                        let analysis = dispatch::consult_fallback(
                            self.provider.clone(),
                            &self.config,
                            fallback,
                            &state.raw_text,
                        )
                        .await;
                        state.specialist_analysis = Some(analysis);
                    }
                }
                state.status = Status::SpecialistAnalysis;
                Ok(Some(Step::CriticReview))
            }

            Step::CriticReview => {
                let analysis = state.specialist_analysis.clone().unwrap_or_default();
                let review = critic::review(
                    self.provider.as_ref(),
                    call_timeout,
                    &state.raw_text,
                    &analysis,
                )
                .await;

                state.needs_revision = !review.approve;
                state.critic_feedback = review.feedback;
                state.status = Status::CriticReview;

                // One edge covers both "approved" and "revisions exhausted"
                if state.needs_revision && state.revision_count < state.max_revisions {
                    Ok(Some(Step::Rewrite))
                } else {
                    Ok(Some(Step::Explain))
                }
            }

            Step::Rewrite => {
                let analysis = state.specialist_analysis.clone().unwrap_or_default();
                let feedback = state.critic_feedback.clone().unwrap_or_default();

                match reviser::revise(
                    self.provider.as_ref(),
                    &self.config.retry,
                    call_timeout,
                    &state.raw_text,
                    &analysis,
                    &feedback,
                )
                .await
                {
                    Ok(revised) => {
                        // Count and text move together; a checkpoint can
                        // never see one without the other
                        state.specialist_analysis = Some(revised);
                        state.revision_count += 1;
                        state.needs_revision = false;
                        state.status = Status::Rewritten;

                        if state.revision_count >= state.max_revisions {
                            Ok(Some(Step::Explain))
                        } else {
                            Ok(Some(Step::CriticReview))
                        }
                    }
                    Err(e) => {
                        warn!(
                            "Revision failed for thread {}, keeping current draft: {}",
                            state.intake_id, e
                        );
                        state.needs_revision = false;
                        Ok(Some(Step::Explain))
                    }
                }
            }

            Step::Explain => {
                let analysis = state.specialist_analysis.clone().unwrap_or_default();
                let answer = explainer::explain(
                    self.provider.as_ref(),
                    &self.config.retry,
                    call_timeout,
                    &state.raw_text,
                    &analysis,
                )
                .await;

                state.plain_english_answer = Some(answer);
                state.status = Status::Completed;
                Ok(None)
            }
        }
    }

    /// Persistence trouble degrades resumability; it never aborts the run
    fn checkpoint(&self, state: &WorkflowState) {
        if let Err(e) = self.checkpoints.save(&state.intake_id, state) {
            warn!(
                "Failed to checkpoint thread {}: {}",
                state.intake_id, e
            );
        }
    }
}
