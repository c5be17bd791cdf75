use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::pipeline::StageMoveRecord;
use crate::pipeline::domain::StageColumn;
use crate::pipeline::orchestrator::{load_board, DropOutcome, MoveOutcome, StageMoveOrchestrator};
use crate::pipeline::store::StoreError;
use crate::pipeline::summary::{compute_pipeline_summary, PipelineSummary};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RecruiterQuery {
    pub recruiter_id: Uuid,
}

#[derive(Serialize)]
pub struct PipelineResponse {
    pub stages: Vec<StageColumn>,
    pub summary: PipelineSummary,
    /// Set when the board could not be loaded and is shown empty.
    pub degraded: bool,
}

#[derive(Debug, Deserialize)]
pub struct MoveCandidateRequest {
    pub recruiter_id: Uuid,
    pub candidate_id: Uuid,
    pub from_stage_id: Uuid,
    pub to_stage_id: Uuid,
    pub confirmation_email: String,
    /// Replaces the target stage's template text when present.
    pub message: Option<String>,
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct MoveResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<MoveOutcome>,
}

/// GET /api/v1/pipeline
pub async fn handle_get_pipeline(
    State(state): State<AppState>,
    Query(params): Query<RecruiterQuery>,
) -> Json<PipelineResponse> {
    let loaded = load_board(state.store.as_ref(), params.recruiter_id).await;
    let summary = compute_pipeline_summary(&loaded.board);
    Json(PipelineResponse {
        stages: loaded.board.into_columns(),
        summary,
        degraded: loaded.degraded,
    })
}

/// POST /api/v1/pipeline/moves
pub async fn handle_move_candidate(
    State(state): State<AppState>,
    Json(req): Json<MoveCandidateRequest>,
) -> Result<Json<MoveResponse>, AppError> {
    let mut orchestrator = StageMoveOrchestrator::open(
        req.recruiter_id,
        state.store.clone(),
        state.notifier.clone(),
    )
    .await;
    if orchestrator.is_degraded() {
        return Err(AppError::DataUnavailable(StoreError::Unavailable(
            "pipeline could not be loaded".to_string(),
        )));
    }

    orchestrator.drag_start(req.candidate_id, req.from_stage_id)?;
    if orchestrator.drop_on(req.to_stage_id)? == DropOutcome::Unchanged {
        return Ok(Json(MoveResponse {
            status: "unchanged",
            outcome: None,
        }));
    }

    orchestrator.enter_email(req.confirmation_email)?;
    if let Some(message) = req.message {
        orchestrator.edit_message(message)?;
    }
    orchestrator.edit_notes(req.notes)?;

    let outcome = orchestrator.confirm().await?;
    Ok(Json(MoveResponse {
        status: "moved",
        outcome: Some(outcome),
    }))
}

/// GET /api/v1/pipeline/candidates/:candidate_id/history
pub async fn handle_move_history(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Query(params): Query<RecruiterQuery>,
) -> Result<Json<Vec<StageMoveRecord>>, AppError> {
    let history = state
        .store
        .move_history(params.recruiter_id, candidate_id)
        .await?;
    Ok(Json(history))
}
