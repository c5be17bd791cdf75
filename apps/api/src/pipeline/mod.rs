// Candidate pipeline: stage board, stage-move workflow, and its HTTP handlers.
// Every move goes through orchestrator::StageMoveOrchestrator; handlers never
// call PipelineStore::move_candidate directly.

pub mod domain;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod orchestrator;
pub mod postgres;
pub mod store;
pub mod summary;
pub mod validation;
