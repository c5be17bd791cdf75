use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::pipeline::{CandidatePositionRow, PipelinePosition, Stage, StageMoveRecord};
use crate::models::profile::RecruiterProfile;
use crate::pipeline::domain::{group_into_columns, StageColumn};
use crate::pipeline::store::{MoveRequest, PipelineStore, StoreError};

/// Pipeline store backed by the platform's hosted Postgres.
#[derive(Clone)]
pub struct PgPipelineStore {
    pool: PgPool,
}

impl PgPipelineStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PipelineStore for PgPipelineStore {
    async fn load_pipeline(&self, recruiter_id: Uuid) -> Result<Vec<StageColumn>, StoreError> {
        let stages = sqlx::query_as::<_, Stage>(
            r#"
            SELECT id, name, position, color, auto_email_template, is_active
            FROM stages
            WHERE is_active = TRUE
            ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("stage query failed: {e}")))?;

        let rows = sqlx::query_as::<_, CandidatePositionRow>(
            r#"
            SELECT pp.candidate_id,
                   pp.current_stage_id,
                   p.full_name,
                   p.email,
                   pp.created_at AS added_at,
                   pp.notes,
                   pp.last_communication
            FROM pipeline_positions pp
            JOIN profiles p ON p.id = pp.candidate_id
            WHERE pp.recruiter_id = $1
            ORDER BY pp.moved_at ASC
            "#,
        )
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("candidate position query failed: {e}")))?;

        Ok(group_into_columns(stages, rows))
    }

    async fn move_candidate(&self, request: &MoveRequest) -> Result<PipelinePosition, StoreError> {
        let moved_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        let position = sqlx::query_as::<_, PipelinePosition>(
            r#"
            UPDATE pipeline_positions
            SET previous_stage_id = $3,
                current_stage_id = $4,
                moved_at = $5,
                moved_by = $1,
                notes = COALESCE($6, notes)
            WHERE recruiter_id = $1 AND candidate_id = $2
            RETURNING id, recruiter_id, candidate_id, current_stage_id,
                      previous_stage_id, moved_at, moved_by, notes
            "#,
        )
        .bind(request.recruiter_id)
        .bind(request.candidate_id)
        .bind(request.from_stage_id)
        .bind(request.to_stage_id)
        .bind(moved_at)
        .bind(request.notes.as_deref())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound {
            candidate_id: request.candidate_id,
        })?;

        sqlx::query(
            r#"
            INSERT INTO pipeline_history
                (id, recruiter_id, candidate_id, from_stage_id, to_stage_id, moved_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.recruiter_id)
        .bind(request.candidate_id)
        .bind(request.from_stage_id)
        .bind(request.to_stage_id)
        .bind(moved_at)
        .bind(request.notes.as_deref())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Moved candidate {} from stage {} to {} for recruiter {}",
            request.candidate_id, request.from_stage_id, request.to_stage_id, request.recruiter_id
        );
        Ok(position)
    }

    async fn recruiter_profile(
        &self,
        recruiter_id: Uuid,
    ) -> Result<Option<RecruiterProfile>, StoreError> {
        Ok(sqlx::query_as::<_, RecruiterProfile>(
            "SELECT id, full_name, company_name FROM profiles WHERE id = $1",
        )
        .bind(recruiter_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn move_history(
        &self,
        recruiter_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Vec<StageMoveRecord>, StoreError> {
        Ok(sqlx::query_as::<_, StageMoveRecord>(
            r#"
            SELECT id, recruiter_id, candidate_id, from_stage_id, to_stage_id, moved_at, notes
            FROM pipeline_history
            WHERE recruiter_id = $1 AND candidate_id = $2
            ORDER BY moved_at DESC
            "#,
        )
        .bind(recruiter_id)
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
