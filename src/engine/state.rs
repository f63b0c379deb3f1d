use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The single mutable record threaded through every workflow step.
///
/// `intake_id`, `user_id`, `raw_text` and `meta` are fixed at creation; the
/// remaining fields are written by individual steps as the run advances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub intake_id: String,

    pub user_id: Option<String>,

    pub raw_text: String,

    #[serde(default)]
    pub meta: HashMap<String, String>,

    /// Written once by the classifier
    pub case_type: Option<CaseType>,

    /// Written by the dispatcher, overwritten on each revision
    pub specialist_analysis: Option<String>,

    /// Carried between critic and reviser so a resumed run keeps the feedback
    pub critic_feedback: Option<String>,

    /// Written once by the explainer; presence implies terminal success
    pub plain_english_answer: Option<String>,

    #[serde(default)]
    pub needs_revision: bool,

    #[serde(default)]
    pub revision_count: u32,

    pub max_revisions: u32,

    pub status: Status,

    /// Advisory trace label, never read for control decisions
    #[serde(default)]
    pub current_step: String,
}

impl WorkflowState {
    pub fn new(
        user_id: Option<String>,
        raw_text: String,
        meta: HashMap<String, String>,
        max_revisions: u32,
    ) -> Self {
        Self {
            intake_id: Uuid::new_v4().to_string(),
            user_id,
            raw_text,
            meta,
            case_type: None,
            specialist_analysis: None,
            critic_feedback: None,
            plain_english_answer: None,
            needs_revision: false,
            revision_count: 0,
            max_revisions,
            status: Status::Started,
            current_step: String::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            Status::Completed | Status::Rejected | Status::Timeout
        )
    }

    /// Apply a reviewer-supplied patch. Only the mutable analysis fields are
    /// patchable; identity fields and input text are fixed by construction.
    pub fn apply_patch(&mut self, patch: &StatePatch) {
        if let Some(case_type) = patch.case_type {
            self.case_type = Some(case_type);
        }
        if let Some(ref analysis) = patch.specialist_analysis {
            self.specialist_analysis = Some(analysis.clone());
        }
        if let Some(ref answer) = patch.plain_english_answer {
            self.plain_english_answer = Some(answer.clone());
        }
    }
}

/// Reviewer modification merged into a gated run before the wrapped step runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatePatch {
    #[serde(default)]
    pub case_type: Option<CaseType>,

    #[serde(default)]
    pub specialist_analysis: Option<String>,

    #[serde(default)]
    pub plain_english_answer: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Started,
    Classified,
    SpecialistAnalysis,
    Rewritten,
    CriticReview,
    Rejected,
    Timeout,
    Completed,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Started => write!(f, "started"),
            Status::Classified => write!(f, "classified"),
            Status::SpecialistAnalysis => write!(f, "specialist_analysis"),
            Status::Rewritten => write!(f, "rewritten"),
            Status::CriticReview => write!(f, "critic_review"),
            Status::Rejected => write!(f, "rejected"),
            Status::Timeout => write!(f, "timeout"),
            Status::Completed => write!(f, "completed"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum CaseType {
    Criminal,
    Housing,
    Family,
    Employment,
    Immigration,
    #[default]
    Other,
}

impl CaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::Criminal => "criminal",
            CaseType::Housing => "housing",
            CaseType::Family => "family",
            CaseType::Employment => "employment",
            CaseType::Immigration => "immigration",
            CaseType::Other => "other",
        }
    }

    /// Labels the classifier is allowed to produce
    pub const ALL: [CaseType; 6] = [
        CaseType::Criminal,
        CaseType::Housing,
        CaseType::Family,
        CaseType::Employment,
        CaseType::Immigration,
        CaseType::Other,
    ];
}

impl std::fmt::Display for CaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "criminal" => Ok(CaseType::Criminal),
            "housing" => Ok(CaseType::Housing),
            "family" => Ok(CaseType::Family),
            "employment" => Ok(CaseType::Employment),
            "immigration" => Ok(CaseType::Immigration),
            "other" => Ok(CaseType::Other),
            _ => Err(format!("Unknown case type: {}", s)),
        }
    }
}
