use crate::cli::ResumeArgs;
use crate::engine::state::{Status, WorkflowState};
use crate::engine::WorkflowEngine;
use crate::error::StoreError;
use crate::provider::create_provider;
use crate::store::{FileCheckpointStore, FileIntakeStore, FileReviewStore};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

pub async fn execute(args: ResumeArgs, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
    let mut config = super::load_config(&args.config)?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    let provider = create_provider(&config);
    let checkpoints = Arc::new(FileCheckpointStore::new(&config.data_dir));
    let reviews = Arc::new(FileReviewStore::new(&config.data_dir));
    let intakes = FileIntakeStore::new(&config.data_dir);

    let engine = WorkflowEngine::new(config, provider, checkpoints, reviews, shutdown);
    let state = engine.resume(&args.thread_id).await?;

    match intakes.update(&state) {
        Ok(()) | Err(StoreError::NotFound(_)) => {}
        Err(e) => warn!("Failed to record intake {}: {}", state.intake_id, e),
    }

    print_outcome(&state);
    Ok(())
}

pub fn print_outcome(state: &WorkflowState) {
    println!("{}", outcome_text(state));
}

fn outcome_text(state: &WorkflowState) -> String {
    let mut out = format!("\nThread: {}\n", state.intake_id);
    if let Some(case_type) = state.case_type {
        out.push_str(&format!("Case type: {}\n", case_type));
    }
    out.push_str(&format!("Status: {}\n", state.status));

    match state.status {
        Status::Completed => {
            if let Some(ref answer) = state.plain_english_answer {
                out.push_str(&format!("\n{}\n", answer));
            }
        }
        Status::Rejected => {
            out.push_str("A reviewer rejected this intake; no answer was produced.\n");
        }
        Status::Timeout => {
            // Terminal: the recorded review request is an audit trail, not a
            // recovery path
            out.push_str(
                "No reviewer acted in time; the run ended without an answer. The review \
                 request stays on file (`lexflow review list`).\n",
            );
        }
        _ => {
            out.push_str(&format!(
                "Run suspended before completion. Continue with:\n  lexflow resume {}\n",
                state.intake_id
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::CaseType;
    use std::collections::HashMap;

    fn state(status: Status) -> WorkflowState {
        let mut s = WorkflowState::new(None, "q".to_string(), HashMap::new(), 2);
        s.case_type = Some(CaseType::Housing);
        s.status = status;
        s
    }

    #[test]
    fn test_timeout_outcome_does_not_advertise_resume() {
        let text = outcome_text(&state(Status::Timeout));
        assert!(text.contains("without an answer"));
        assert!(!text.contains("lexflow resume"));
    }

    #[test]
    fn test_suspended_outcome_points_at_resume() {
        let s = state(Status::CriticReview);
        let text = outcome_text(&s);
        assert!(text.contains(&format!("lexflow resume {}", s.intake_id)));
    }

    #[test]
    fn test_completed_outcome_carries_answer() {
        let mut s = state(Status::Completed);
        s.plain_english_answer = Some("Fix the heat notice first.".to_string());
        let text = outcome_text(&s);
        assert!(text.contains("Fix the heat notice first."));
    }
}
