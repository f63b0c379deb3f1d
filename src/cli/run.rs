use crate::cli::RunArgs;
use crate::engine::state::WorkflowState;
use crate::engine::WorkflowEngine;
use crate::provider::{create_provider, CompletionProvider};
use crate::store::{FileCheckpointStore, FileIntakeStore, FileReviewStore};
use anyhow::{bail, Context};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub async fn execute(args: RunArgs, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
    let mut config = super::load_config(&args.config)?;

    // Apply CLI overrides
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(max_revisions) = args.max_revisions {
        config.max_revisions = max_revisions;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    let raw_text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read intake text from {:?}", path))?,
        (None, None) => bail!("Provide the intake text as an argument or via --file"),
    };
    if raw_text.trim().is_empty() {
        bail!("Intake text is empty");
    }

    let mut meta = HashMap::new();
    for entry in &args.meta {
        match entry.split_once('=') {
            Some((key, value)) => {
                meta.insert(key.to_string(), value.to_string());
            }
            None => bail!("Invalid --meta entry '{}', expected key=value", entry),
        }
    }

    let provider = create_provider(&config);
    info!("Using provider {}", provider.name());
    let checkpoints = Arc::new(FileCheckpointStore::new(&config.data_dir));
    let reviews = Arc::new(FileReviewStore::new(&config.data_dir));
    let intakes = FileIntakeStore::new(&config.data_dir);

    let state = WorkflowState::new(args.user, raw_text, meta, config.max_revisions);

    // The record is a convenience view; losing it does not lose the run
    if let Err(e) = intakes.create(&state) {
        warn!("Failed to record intake {}: {}", state.intake_id, e);
    }

    let engine = WorkflowEngine::new(config, provider, checkpoints, reviews, shutdown);
    let state = engine.run(state).await?;

    if let Err(e) = intakes.update(&state) {
        warn!("Failed to record intake {}: {}", state.intake_id, e);
    }

    super::resume::print_outcome(&state);
    Ok(())
}
