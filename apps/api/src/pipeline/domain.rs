use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::models::pipeline::{CandidatePositionRow, Stage};

/// A candidate as shown on the board. Borrowed from the profile store; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineCandidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub added_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub last_communication: Option<DateTime<Utc>>,
}

impl From<CandidatePositionRow> for PipelineCandidate {
    fn from(row: CandidatePositionRow) -> Self {
        Self {
            id: row.candidate_id,
            avatar: initials(&row.full_name),
            name: row.full_name,
            email: row.email,
            added_at: row.added_at,
            notes: row.notes,
            last_communication: row.last_communication,
        }
    }
}

/// Up to two uppercase initials taken from the first two words of a name.
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

/// One kanban column: a stage and the candidates currently in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageColumn {
    #[serde(flatten)]
    pub stage: Stage,
    pub candidates: Vec<PipelineCandidate>,
}

/// Groups joined position rows under their current stage.
///
/// `stages` must already be the active stages in display order. Every stage gets a
/// column, even when empty. Rows pointing at a stage not in `stages` are dropped.
pub fn group_into_columns(stages: Vec<Stage>, rows: Vec<CandidatePositionRow>) -> Vec<StageColumn> {
    let mut by_stage: HashMap<Uuid, Vec<PipelineCandidate>> = HashMap::new();
    let known: Vec<Uuid> = stages.iter().map(|s| s.id).collect();

    for row in rows {
        if !known.contains(&row.current_stage_id) {
            debug!(
                "Skipping candidate {} in inactive or unknown stage {}",
                row.candidate_id, row.current_stage_id
            );
            continue;
        }
        by_stage
            .entry(row.current_stage_id)
            .or_default()
            .push(PipelineCandidate::from(row));
    }

    stages
        .into_iter()
        .map(|stage| {
            let candidates = by_stage.remove(&stage.id).unwrap_or_default();
            StageColumn { stage, candidates }
        })
        .collect()
}

/// In-memory board owned by a single orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    columns: Vec<StageColumn>,
}

impl Board {
    pub fn new(columns: Vec<StageColumn>) -> Self {
        Self { columns }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[StageColumn] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<StageColumn> {
        self.columns
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn stage(&self, stage_id: Uuid) -> Option<&Stage> {
        self.column(stage_id).map(|c| &c.stage)
    }

    pub fn column(&self, stage_id: Uuid) -> Option<&StageColumn> {
        self.columns.iter().find(|c| c.stage.id == stage_id)
    }

    pub fn candidate_in(&self, stage_id: Uuid, candidate_id: Uuid) -> Option<&PipelineCandidate> {
        self.column(stage_id)?
            .candidates
            .iter()
            .find(|c| c.id == candidate_id)
    }

    /// Ids of every stage whose list contains the candidate.
    #[cfg(test)]
    pub fn stages_containing(&self, candidate_id: Uuid) -> Vec<Uuid> {
        self.columns
            .iter()
            .filter(|c| c.candidates.iter().any(|cand| cand.id == candidate_id))
            .map(|c| c.stage.id)
            .collect()
    }

    /// Moves a candidate between two columns, stamping `last_communication`, and
    /// returns the candidate in its new column.
    ///
    /// Nothing is mutated unless both columns exist and the candidate is in `from`.
    pub(crate) fn relocate(
        &mut self,
        candidate_id: Uuid,
        from: Uuid,
        to: Uuid,
        at: DateTime<Utc>,
    ) -> Option<&mut PipelineCandidate> {
        let from_idx = self.columns.iter().position(|c| c.stage.id == from)?;
        let to_idx = self.columns.iter().position(|c| c.stage.id == to)?;
        let cand_idx = self.columns[from_idx]
            .candidates
            .iter()
            .position(|c| c.id == candidate_id)?;

        let mut candidate = self.columns[from_idx].candidates.remove(cand_idx);
        candidate.last_communication = Some(at);
        let target = &mut self.columns[to_idx].candidates;
        target.push(candidate);
        target.last_mut()
    }
}
