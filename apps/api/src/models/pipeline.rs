use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Name of the stage whose confirmations are rendered with a warning tone.
pub const REJECTION_STAGE_NAME: &str = "Rejected";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Stage {
    pub id: Uuid,
    pub name: String,
    pub position: i32,
    pub color: String,
    pub auto_email_template: Option<String>,
    pub is_active: bool,
}

impl Stage {
    pub fn is_rejection(&self) -> bool {
        self.name.trim().eq_ignore_ascii_case(REJECTION_STAGE_NAME)
    }

    /// Template text, or `None` when the stage has no usable template.
    pub fn template_text(&self) -> Option<&str> {
        self.auto_email_template
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

/// The single active position of a candidate in one recruiter's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PipelinePosition {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub candidate_id: Uuid,
    pub current_stage_id: Uuid,
    pub previous_stage_id: Option<Uuid>,
    pub moved_at: DateTime<Utc>,
    pub moved_by: Option<Uuid>,
    pub notes: Option<String>,
}

/// Position row joined to the candidate's profile fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidatePositionRow {
    pub candidate_id: Uuid,
    pub current_stage_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub added_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub last_communication: Option<DateTime<Utc>>,
}

/// Audit row appended for every persisted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StageMoveRecord {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub candidate_id: Uuid,
    pub from_stage_id: Uuid,
    pub to_stage_id: Uuid,
    pub moved_at: DateTime<Utc>,
    pub notes: Option<String>,
}
