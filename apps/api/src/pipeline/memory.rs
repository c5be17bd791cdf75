//! In-memory pipeline store used by the orchestrator and router tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::pipeline::{CandidatePositionRow, PipelinePosition, Stage, StageMoveRecord};
use crate::models::profile::RecruiterProfile;
use crate::pipeline::domain::{group_into_columns, StageColumn};
use crate::pipeline::store::{MoveRequest, PipelineStore, StoreError};

#[derive(Debug, Clone)]
struct ProfileEntry {
    full_name: String,
    email: String,
    company_name: Option<String>,
}

#[derive(Debug, Clone)]
struct PositionEntry {
    position: PipelinePosition,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    stages: Vec<Stage>,
    positions: Vec<PositionEntry>,
    profiles: HashMap<Uuid, ProfileEntry>,
    history: Vec<StageMoveRecord>,
    fail_loads: bool,
    fail_moves: bool,
    move_calls: Vec<MoveRequest>,
}

#[derive(Default)]
pub struct InMemoryPipelineStore {
    inner: Mutex<Inner>,
}

impl InMemoryPipelineStore {
    pub fn add_stage(&self, name: &str, position: i32, template: Option<&str>) -> Stage {
        self.push_stage(name, position, template, true)
    }

    pub fn add_inactive_stage(&self, name: &str, position: i32) -> Stage {
        self.push_stage(name, position, None, false)
    }

    fn push_stage(&self, name: &str, position: i32, template: Option<&str>, active: bool) -> Stage {
        let stage = Stage {
            id: Uuid::new_v4(),
            name: name.to_string(),
            position,
            color: "gray".to_string(),
            auto_email_template: template.map(str::to_string),
            is_active: active,
        };
        self.lock().stages.push(stage.clone());
        stage
    }

    pub fn add_recruiter(&self, full_name: &str, company_name: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().profiles.insert(
            id,
            ProfileEntry {
                full_name: full_name.to_string(),
                email: String::new(),
                company_name: company_name.map(str::to_string),
            },
        );
        id
    }

    /// Registers a candidate profile and places them in `stage_id` for `recruiter_id`.
    pub fn place_candidate(
        &self,
        recruiter_id: Uuid,
        stage_id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Uuid {
        let candidate_id = Uuid::new_v4();
        let mut inner = self.lock();
        inner.profiles.insert(
            candidate_id,
            ProfileEntry {
                full_name: full_name.to_string(),
                email: email.to_string(),
                company_name: None,
            },
        );
        let now = Utc::now();
        inner.positions.push(PositionEntry {
            position: PipelinePosition {
                id: Uuid::new_v4(),
                recruiter_id,
                candidate_id,
                current_stage_id: stage_id,
                previous_stage_id: None,
                moved_at: now,
                moved_by: None,
                notes: None,
            },
            created_at: now,
        });
        candidate_id
    }

    pub fn fail_loads(&self, fail: bool) {
        self.lock().fail_loads = fail;
    }

    pub fn fail_moves(&self, fail: bool) {
        self.lock().fail_moves = fail;
    }

    pub fn move_calls(&self) -> Vec<MoveRequest> {
        self.lock().move_calls.clone()
    }

    pub fn position(&self, recruiter_id: Uuid, candidate_id: Uuid) -> Option<PipelinePosition> {
        self.lock()
            .positions
            .iter()
            .map(|e| &e.position)
            .find(|p| p.recruiter_id == recruiter_id && p.candidate_id == candidate_id)
            .cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("in-memory store mutex poisoned")
    }
}

#[async_trait]
impl PipelineStore for InMemoryPipelineStore {
    async fn load_pipeline(&self, recruiter_id: Uuid) -> Result<Vec<StageColumn>, StoreError> {
        let inner = self.lock();
        if inner.fail_loads {
            return Err(StoreError::Unavailable("stage query failed".to_string()));
        }

        let mut stages: Vec<Stage> = inner.stages.iter().filter(|s| s.is_active).cloned().collect();
        stages.sort_by_key(|s| s.position);

        let rows = inner
            .positions
            .iter()
            .filter(|e| e.position.recruiter_id == recruiter_id)
            .filter_map(|e| {
                let p = &e.position;
                let profile = inner.profiles.get(&p.candidate_id)?;
                Some(CandidatePositionRow {
                    candidate_id: p.candidate_id,
                    current_stage_id: p.current_stage_id,
                    full_name: profile.full_name.clone(),
                    email: profile.email.clone(),
                    added_at: e.created_at,
                    notes: p.notes.clone(),
                    last_communication: None,
                })
            })
            .collect();

        Ok(group_into_columns(stages, rows))
    }

    async fn move_candidate(&self, request: &MoveRequest) -> Result<PipelinePosition, StoreError> {
        let mut inner = self.lock();
        inner.move_calls.push(request.clone());
        if inner.fail_moves {
            return Err(StoreError::Unavailable("position update failed".to_string()));
        }

        let moved_at = Utc::now();
        let position = inner
            .positions
            .iter_mut()
            .map(|e| &mut e.position)
            .find(|p| {
                p.recruiter_id == request.recruiter_id && p.candidate_id == request.candidate_id
            })
            .ok_or(StoreError::NotFound {
                candidate_id: request.candidate_id,
            })?;

        position.previous_stage_id = Some(request.from_stage_id);
        position.current_stage_id = request.to_stage_id;
        position.moved_at = moved_at;
        position.moved_by = Some(request.recruiter_id);
        if let Some(notes) = &request.notes {
            position.notes = Some(notes.clone());
        }
        let updated = position.clone();

        inner.history.push(StageMoveRecord {
            id: Uuid::new_v4(),
            recruiter_id: request.recruiter_id,
            candidate_id: request.candidate_id,
            from_stage_id: request.from_stage_id,
            to_stage_id: request.to_stage_id,
            moved_at,
            notes: request.notes.clone(),
        });

        Ok(updated)
    }

    async fn recruiter_profile(
        &self,
        recruiter_id: Uuid,
    ) -> Result<Option<RecruiterProfile>, StoreError> {
        Ok(self
            .lock()
            .profiles
            .get(&recruiter_id)
            .map(|p| RecruiterProfile {
                id: recruiter_id,
                full_name: p.full_name.clone(),
                company_name: p.company_name.clone(),
            }))
    }

    async fn move_history(
        &self,
        recruiter_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Vec<StageMoveRecord>, StoreError> {
        let mut records: Vec<StageMoveRecord> = self
            .lock()
            .history
            .iter()
            .rev()
            .filter(|r| r.recruiter_id == recruiter_id && r.candidate_id == candidate_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.moved_at.cmp(&a.moved_at));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_move_unknown_candidate_is_not_found() {
        let store = InMemoryPipelineStore::default();
        let applied = store.add_stage("Applied", 1, None);
        let screening = store.add_stage("Screening", 2, None);
        let recruiter = store.add_recruiter("Dana Reyes", None);

        let result = store
            .move_candidate(&MoveRequest {
                recruiter_id: recruiter,
                candidate_id: Uuid::new_v4(),
                from_stage_id: applied.id,
                to_stage_id: screening.id,
                notes: None,
            })
            .await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_board_is_scoped_to_recruiter() {
        let store = InMemoryPipelineStore::default();
        let applied = store.add_stage("Applied", 1, None);
        let mine = store.add_recruiter("Dana Reyes", None);
        let theirs = store.add_recruiter("Sam Ortiz", None);
        let own = store.place_candidate(mine, applied.id, "Ada Lovelace", "ada@example.com");
        store.place_candidate(theirs, applied.id, "Alan Turing", "alan@example.com");

        let columns = store.load_pipeline(mine).await.expect("loads");
        let ids: Vec<Uuid> = columns[0].candidates.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![own]);
    }

    #[tokio::test]
    async fn test_inactive_stages_are_hidden_and_order_follows_position() {
        let store = InMemoryPipelineStore::default();
        store.add_stage("Offer", 3, None);
        store.add_stage("Applied", 1, None);
        store.add_inactive_stage("Archived", 2);
        let recruiter = store.add_recruiter("Dana Reyes", None);

        let columns = store.load_pipeline(recruiter).await.expect("loads");
        let names: Vec<&str> = columns.iter().map(|c| c.stage.name.as_str()).collect();
        assert_eq!(names, vec!["Applied", "Offer"]);
    }

    #[tokio::test]
    async fn test_move_appends_history_newest_first() {
        let store = InMemoryPipelineStore::default();
        let applied = store.add_stage("Applied", 1, None);
        let screening = store.add_stage("Screening", 2, None);
        let interview = store.add_stage("Interview", 3, None);
        let recruiter = store.add_recruiter("Dana Reyes", None);
        let candidate = store.place_candidate(recruiter, applied.id, "Ada", "ada@example.com");

        for (from, to) in [(applied.id, screening.id), (screening.id, interview.id)] {
            store
                .move_candidate(&MoveRequest {
                    recruiter_id: recruiter,
                    candidate_id: candidate,
                    from_stage_id: from,
                    to_stage_id: to,
                    notes: None,
                })
                .await
                .expect("move succeeds");
        }

        let history = store.move_history(recruiter, candidate).await.expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].to_stage_id, interview.id);

        let position = store.position(recruiter, candidate).expect("position");
        assert_eq!(position.current_stage_id, interview.id);
        assert_eq!(position.previous_stage_id, Some(screening.id));
        assert_eq!(position.moved_by, Some(recruiter));
    }
    #[tokio::test]
    async fn test_move_keeps_added_at_and_existing_notes() {
        let store = InMemoryPipelineStore::default();
        let applied = store.add_stage("Applied", 1, None);
        let screening = store.add_stage("Screening", 2, None);
        let interview = store.add_stage("Interview", 3, None);
        let recruiter = store.add_recruiter("Dana Reyes", None);
        let candidate = store.place_candidate(recruiter, applied.id, "Ada", "ada@example.com");
        let added_at = store.load_pipeline(recruiter).await.expect("loads")[0].candidates[0].added_at;

        for (from, to, notes) in [
            (applied.id, screening.id, Some("strong reel")),
            (screening.id, interview.id, None),
        ] {
            store
                .move_candidate(&MoveRequest {
                    recruiter_id: recruiter,
                    candidate_id: candidate,
                    from_stage_id: from,
                    to_stage_id: to,
                    notes: notes.map(str::to_string),
                })
                .await
                .expect("move succeeds");
        }

        let columns = store.load_pipeline(recruiter).await.expect("loads");
        let moved = &columns[2].candidates[0];
        assert_eq!(moved.added_at, added_at);
        assert_eq!(moved.notes.as_deref(), Some("strong reel"));

        let history = store.move_history(recruiter, candidate).await.expect("history");
        assert_eq!(history[0].notes, None);
        assert_eq!(history[1].notes.as_deref(), Some("strong reel"));
    }
}
