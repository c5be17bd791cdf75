use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::domain::Board;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    pub stage_id: Uuid,
    pub name: String,
    pub count: usize,
}

/// Per-stage headcount shown above the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_candidates: usize,
    pub stages: Vec<StageCount>,
    pub empty_stages: Vec<String>,
}

pub fn compute_pipeline_summary(board: &Board) -> PipelineSummary {
    let stages: Vec<StageCount> = board
        .columns()
        .iter()
        .map(|column| StageCount {
            stage_id: column.stage.id,
            name: column.stage.name.clone(),
            count: column.candidates.len(),
        })
        .collect();

    PipelineSummary {
        total_candidates: stages.iter().map(|s| s.count).sum(),
        empty_stages: stages
            .iter()
            .filter(|s| s.count == 0)
            .map(|s| s.name.clone())
            .collect(),
        stages,
    }
}
