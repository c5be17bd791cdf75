//! Storage boundary for stages, candidate positions and move history.
//!
//! `PgPipelineStore` in `postgres.rs` is the production backend. Tests run the
//! orchestrator against the in-memory store in `memory.rs`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::pipeline::{PipelinePosition, StageMoveRecord};
use crate::models::profile::RecruiterProfile;
use crate::pipeline::domain::StageColumn;

/// Everything needed to persist one stage move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub recruiter_id: Uuid,
    pub candidate_id: Uuid,
    pub from_stage_id: Uuid,
    pub to_stage_id: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("pipeline data unavailable: {0}")]
    Unavailable(String),

    #[error("no pipeline position for candidate {candidate_id}")]
    NotFound { candidate_id: Uuid },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait PipelineStore: Send + Sync {
    /// Active stages in position order, each with the recruiter's candidates.
    async fn load_pipeline(&self, recruiter_id: Uuid) -> Result<Vec<StageColumn>, StoreError>;

    /// Rewrites the single active position for (recruiter, candidate) and appends
    /// a history row. Last write wins.
    async fn move_candidate(&self, request: &MoveRequest) -> Result<PipelinePosition, StoreError>;

    async fn recruiter_profile(
        &self,
        recruiter_id: Uuid,
    ) -> Result<Option<RecruiterProfile>, StoreError>;

    /// Newest first.
    async fn move_history(
        &self,
        recruiter_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Vec<StageMoveRecord>, StoreError>;
}
