use crate::cli::{ReviewAction, ReviewArgs};
use crate::engine::state::StatePatch;
use crate::store::{FileReviewStore, ReviewResolution, ReviewStore};
use anyhow::Context;

pub fn execute(args: ReviewArgs) -> anyhow::Result<()> {
    let mut config = super::load_config(&args.config)?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    let store = FileReviewStore::new(&config.data_dir);

    match args.action {
        ReviewAction::List => {
            let pending = store.list_pending()?;
            if pending.is_empty() {
                println!("No pending review requests.");
                return Ok(());
            }
            for request in pending {
                println!(
                    "{}  thread={}  step={}  created={}  expires={}",
                    request.request_id,
                    request.thread_id,
                    request.node_name,
                    request.created_at.format("%Y-%m-%d %H:%M:%S"),
                    request.timeout_at.format("%Y-%m-%d %H:%M:%S"),
                );
            }
        }

        ReviewAction::Approve {
            request_id,
            feedback,
        } => {
            let resolved = store.resolve(&request_id, ReviewResolution::Approve { feedback })?;
            println!(
                "Approved {}. Resume the run with:\n  lexflow resume {}",
                resolved.request_id, resolved.thread_id
            );
        }

        ReviewAction::Reject {
            request_id,
            feedback,
        } => {
            let resolved = store.resolve(&request_id, ReviewResolution::Reject { feedback })?;
            println!(
                "Rejected {}. The thread terminates on its next poll or resume.",
                resolved.request_id
            );
        }

        ReviewAction::Modify {
            request_id,
            patch,
            feedback,
        } => {
            let patch: StatePatch =
                serde_json::from_str(&patch).context("Invalid --patch JSON")?;
            let resolved = store.resolve(
                &request_id,
                ReviewResolution::Modify { patch, feedback },
            )?;
            println!(
                "Recorded modifications on {}. Resume the run with:\n  lexflow resume {}",
                resolved.request_id, resolved.thread_id
            );
        }
    }

    Ok(())
}
