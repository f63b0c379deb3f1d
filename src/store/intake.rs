//! Caller-side intake persistence. The engine never touches this; `cli::run`
//! creates a record before starting a run and patches it once afterwards.

use crate::engine::state::WorkflowState;
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const INTAKES_DIR: &str = "intakes";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub intake_id: String,
    pub user_id: Option<String>,
    pub raw_text: String,
    pub meta: HashMap<String, String>,
    pub status: String,
    pub answer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct FileIntakeStore {
    root: PathBuf,
}

impl FileIntakeStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn record_path(&self, intake_id: &str) -> PathBuf {
        self.root.join(INTAKES_DIR).join(format!("{}.json", intake_id))
    }

    fn write(&self, record: &IntakeRecord) -> Result<(), StoreError> {
        fs::create_dir_all(self.root.join(INTAKES_DIR))?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.record_path(&record.intake_id), json)?;
        Ok(())
    }

    pub fn create(&self, state: &WorkflowState) -> Result<IntakeRecord, StoreError> {
        let now = Utc::now();
        let record = IntakeRecord {
            intake_id: state.intake_id.clone(),
            user_id: state.user_id.clone(),
            raw_text: state.raw_text.clone(),
            meta: state.meta.clone(),
            status: state.status.to_string(),
            answer: None,
            created_at: now,
            updated_at: now,
        };
        self.write(&record)?;
        Ok(record)
    }

    pub fn update(&self, state: &WorkflowState) -> Result<(), StoreError> {
        let path = self.record_path(&state.intake_id);
        if !path.exists() {
            return Err(StoreError::NotFound(state.intake_id.clone()));
        }
        let mut record: IntakeRecord = serde_json::from_str(&fs::read_to_string(&path)?)?;
        record.status = state.status.to_string();
        record.answer = state.plain_english_answer.clone();
        record.updated_at = Utc::now();
        self.write(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::Status;

    #[test]
    fn test_create_then_update() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileIntakeStore::new(dir.path());

        let mut state =
            WorkflowState::new(Some("u1".to_string()), "q".to_string(), HashMap::new(), 2);
        let record = store.create(&state).unwrap();
        assert_eq!(record.status, "started");
        assert!(record.answer.is_none());

        state.status = Status::Completed;
        state.plain_english_answer = Some("answer".to_string());
        store.update(&state).unwrap();

        let content =
            fs::read_to_string(store.record_path(&state.intake_id)).unwrap();
        let loaded: IntakeRecord = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.status, "completed");
        assert_eq!(loaded.answer.as_deref(), Some("answer"));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileIntakeStore::new(dir.path());
        let state = WorkflowState::new(None, "q".to_string(), HashMap::new(), 2);
        assert!(matches!(store.update(&state), Err(StoreError::NotFound(_))));
    }
}
