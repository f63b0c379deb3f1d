use crate::engine::state::{StatePatch, WorkflowState};
use crate::error::StoreError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const REVIEWS_DIR: &str = "reviews";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
    Modified,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewStatus::Pending => write!(f, "pending"),
            ReviewStatus::Approved => write!(f, "approved"),
            ReviewStatus::Rejected => write!(f, "rejected"),
            ReviewStatus::Modified => write!(f, "modified"),
        }
    }
}

/// A suspended run waiting on an external reviewer. Created by the human
/// gate; mutated exactly once by the reviewer action; polled by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanReviewRequest {
    pub request_id: String,
    pub thread_id: String,
    pub node_name: String,
    pub state: WorkflowState,
    pub review_type: String,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub timeout_at: DateTime<Utc>,
    pub human_feedback: Option<String>,
    pub modified_state: Option<StatePatch>,
}

impl HumanReviewRequest {
    pub fn pending(
        thread_id: &str,
        node_name: &str,
        state: &WorkflowState,
        review_type: &str,
        timeout: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            request_id: Uuid::new_v4().to_string(),
            thread_id: thread_id.to_string(),
            node_name: node_name.to_string(),
            state: state.clone(),
            review_type: review_type.to_string(),
            status: ReviewStatus::Pending,
            created_at: now,
            timeout_at: now + timeout,
            human_feedback: None,
            modified_state: None,
        }
    }
}

/// What an external reviewer submitted for a pending request
#[derive(Debug, Clone)]
pub enum ReviewResolution {
    Approve { feedback: Option<String> },
    Reject { feedback: Option<String> },
    Modify { patch: StatePatch, feedback: Option<String> },
}

pub trait ReviewStore: Send + Sync {
    fn create(&self, request: &HumanReviewRequest) -> Result<(), StoreError>;

    fn get(&self, request_id: &str) -> Result<HumanReviewRequest, StoreError>;

    /// Apply the single permitted pending -> resolved transition. Fails with
    /// `AlreadyResolved` if the request left `pending` earlier.
    fn resolve(
        &self,
        request_id: &str,
        resolution: ReviewResolution,
    ) -> Result<HumanReviewRequest, StoreError>;

    fn list_pending(&self) -> Result<Vec<HumanReviewRequest>, StoreError>;
}

/// JSON-file-per-request store under `<root>/reviews/`
pub struct FileReviewStore {
    root: PathBuf,
}

impl FileReviewStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn reviews_dir(&self) -> PathBuf {
        self.root.join(REVIEWS_DIR)
    }

    fn request_path(&self, request_id: &str) -> PathBuf {
        self.reviews_dir().join(format!("{}.json", request_id))
    }

    fn write(&self, request: &HumanReviewRequest) -> Result<(), StoreError> {
        fs::create_dir_all(self.reviews_dir())?;
        let json = serde_json::to_string_pretty(request)?;
        fs::write(self.request_path(&request.request_id), json)?;
        Ok(())
    }
}

impl ReviewStore for FileReviewStore {
    fn create(&self, request: &HumanReviewRequest) -> Result<(), StoreError> {
        self.write(request)
    }

    fn get(&self, request_id: &str) -> Result<HumanReviewRequest, StoreError> {
        let path = self.request_path(request_id);
        if !path.exists() {
            return Err(StoreError::NotFound(request_id.to_string()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn resolve(
        &self,
        request_id: &str,
        resolution: ReviewResolution,
    ) -> Result<HumanReviewRequest, StoreError> {
        let mut request = self.get(request_id)?;
        if request.status != ReviewStatus::Pending {
            return Err(StoreError::AlreadyResolved(request_id.to_string()));
        }

        match resolution {
            ReviewResolution::Approve { feedback } => {
                request.status = ReviewStatus::Approved;
                request.human_feedback = feedback;
            }
            ReviewResolution::Reject { feedback } => {
                request.status = ReviewStatus::Rejected;
                request.human_feedback = feedback;
            }
            ReviewResolution::Modify { patch, feedback } => {
                request.status = ReviewStatus::Modified;
                request.modified_state = Some(patch);
                request.human_feedback = feedback;
            }
        }

        self.write(&request)?;
        Ok(request)
    }

    fn list_pending(&self) -> Result<Vec<HumanReviewRequest>, StoreError> {
        let dir = self.reviews_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut pending = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let request: HumanReviewRequest = serde_json::from_str(&content)?;
            if request.status == ReviewStatus::Pending {
                pending.push(request);
            }
        }
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(pending)
    }
}
