//! The step functions the workflow engine sequences. Each takes the
//! completion provider plus whatever slice of state it reads, and degrades
//! rather than fails wherever the pipeline has to keep moving.

pub mod classifier;
pub mod critic;
pub mod dispatch;
pub mod explainer;
pub mod reviser;

use std::path::Path;
use tracing::warn;

/// Load a prompt override, falling back to the embedded template
pub(crate) fn prompt_or_embedded(path: Option<&Path>, embedded: &'static str) -> String {
    match path {
        None => embedded.to_string(),
        Some(p) => match std::fs::read_to_string(p) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Failed to read prompt override '{}', using embedded default: {}",
                    p.display(),
                    e
                );
                embedded.to_string()
            }
        },
    }
}
