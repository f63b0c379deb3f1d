use crate::engine::state::WorkflowState;
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const THREADS_DIR: &str = "threads";

/// One durable snapshot of a run. Append-only: a thread accumulates
/// checkpoints and "latest" is the one with the greatest `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub thread_id: String,
    pub checkpoint_id: String,
    pub state: WorkflowState,
    pub created_at: DateTime<Utc>,
}

pub trait CheckpointStore: Send + Sync {
    /// Persist a snapshot, returning the new checkpoint id
    fn save(&self, thread_id: &str, state: &WorkflowState) -> Result<String, StoreError>;

    /// Most recent snapshot for a thread, if any
    fn latest(&self, thread_id: &str) -> Result<Option<Checkpoint>, StoreError>;
}

/// JSON-file-per-checkpoint store under `<root>/threads/<thread_id>/`
pub struct FileCheckpointStore {
    root: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn thread_dir(&self, thread_id: &str) -> PathBuf {
        self.root.join(THREADS_DIR).join(thread_id)
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn save(&self, thread_id: &str, state: &WorkflowState) -> Result<String, StoreError> {
        let dir = self.thread_dir(thread_id);
        fs::create_dir_all(&dir)?;

        let checkpoint = Checkpoint {
            thread_id: thread_id.to_string(),
            checkpoint_id: Uuid::new_v4().to_string(),
            state: state.clone(),
            created_at: Utc::now(),
        };

        // Millis prefix keeps directory listings in write order
        let filename = format!(
            "{:020}_{}.json",
            checkpoint.created_at.timestamp_millis(),
            checkpoint.checkpoint_id
        );
        let json = serde_json::to_string_pretty(&checkpoint)?;
        fs::write(dir.join(filename), json)?;

        Ok(checkpoint.checkpoint_id)
    }

    fn latest(&self, thread_id: &str) -> Result<Option<Checkpoint>, StoreError> {
        let dir = self.thread_dir(thread_id);
        if !dir.exists() {
            return Ok(None);
        }

        let mut latest: Option<Checkpoint> = None;
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let checkpoint: Checkpoint = serde_json::from_str(&content)?;

            let newer = match &latest {
                None => true,
                Some(current) => {
                    (checkpoint.created_at, &checkpoint.checkpoint_id)
                        > (current.created_at, &current.checkpoint_id)
                }
            };
            if newer {
                latest = Some(checkpoint);
            }
        }

        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::Status;
    use std::collections::HashMap;

    fn state(step: &str) -> WorkflowState {
        let mut s = WorkflowState::new(None, "question".to_string(), HashMap::new(), 2);
        s.current_step = step.to_string();
        s
    }

    #[test]
    fn test_latest_none_for_unknown_thread() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path());
        assert!(store.latest("missing").unwrap().is_none());
    }

    #[test]
    fn test_latest_returns_most_recent_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path());

        store.save("t1", &state("classify")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second_id = store.save("t1", &state("critic_review")).unwrap();

        let latest = store.latest("t1").unwrap().unwrap();
        assert_eq!(latest.checkpoint_id, second_id);
        assert_eq!(latest.state.current_step, "critic_review");
    }

    #[test]
    fn test_saves_are_append_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path());

        store.save("t1", &state("classify")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.save("t1", &state("dispatch")).unwrap();

        let files = std::fs::read_dir(dir.path().join("threads/t1"))
            .unwrap()
            .count();
        assert_eq!(files, 2);
    }

    #[test]
    fn test_threads_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path());

        store.save("t1", &state("classify")).unwrap();
        let mut terminal = state("explain");
        terminal.status = Status::Completed;
        store.save("t2", &terminal).unwrap();

        let latest = store.latest("t1").unwrap().unwrap();
        assert_eq!(latest.state.status, Status::Started);
    }
}
