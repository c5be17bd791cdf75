//! Moves one candidate between stages of a recruiter's board.
//!
//! Flow: drag_start → drop_on → (enter_email / edit_message) → confirm →
//!       validate → persist → notify → merge into the local board.
//!
//! The orchestrator is the only owner of its board and move state. `confirm`
//! borrows it mutably for the whole persist + notify sequence, so once a move is
//! persisting nothing can cancel it or start another one.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::pipeline::PipelinePosition;
use crate::models::profile::RecruiterProfile;
use crate::notifications::templates::stage_subject;
use crate::notifications::{NotificationDispatcher, StageNotification};
use crate::pipeline::domain::{Board, PipelineCandidate};
use crate::pipeline::store::{MoveRequest, PipelineStore, StoreError};
use crate::pipeline::validation::{validate_confirmation_email, ValidationError};

/// Inline message shown in the confirmation when persistence fails.
pub const PERSIST_FAILED_MESSAGE: &str = "Failed to move candidate. Please try again.";

// ────────────────────────────────────────────────────────────────────────────
// State
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmTone {
    Standard,
    /// Moves into the rejection stage render in a warning color. Same flow otherwise.
    Warning,
}

/// Transient confirmation data. Exists only between drop and confirm/cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveConfirmation {
    pub candidate: PipelineCandidate,
    pub source_stage_id: Uuid,
    pub source_stage_name: String,
    pub target_stage_id: Uuid,
    pub target_stage_name: String,
    pub message: String,
    pub entered_email: String,
    pub notes: Option<String>,
    pub error: Option<String>,
    pub tone: ConfirmTone,
}

impl MoveConfirmation {
    fn target(&self) -> MoveTarget {
        MoveTarget {
            candidate_id: self.candidate.id,
            from_stage_id: self.source_stage_id,
            to_stage_id: self.target_stage_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveTarget {
    pub candidate_id: Uuid,
    pub from_stage_id: Uuid,
    pub to_stage_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveState {
    Idle,
    Dragging {
        candidate_id: Uuid,
        source_stage_id: Uuid,
    },
    PendingConfirmation(MoveConfirmation),
    Validating(MoveTarget),
    Persisting(MoveTarget),
    Notifying(MoveTarget),
    Done(MoveTarget),
}

impl MoveState {
    pub const fn name(&self) -> &'static str {
        match self {
            MoveState::Idle => "idle",
            MoveState::Dragging { .. } => "dragging",
            MoveState::PendingConfirmation(_) => "pending_confirmation",
            MoveState::Validating(_) => "validating",
            MoveState::Persisting(_) => "persisting",
            MoveState::Notifying(_) => "notifying",
            MoveState::Done(_) => "done",
        }
    }

    /// Candidate the current attempt is about, if any.
    pub fn candidate_id(&self) -> Option<Uuid> {
        match self {
            MoveState::Idle => None,
            MoveState::Dragging { candidate_id, .. } => Some(*candidate_id),
            MoveState::PendingConfirmation(confirmation) => Some(confirmation.candidate.id),
            MoveState::Validating(target)
            | MoveState::Persisting(target)
            | MoveState::Notifying(target)
            | MoveState::Done(target) => Some(target.candidate_id),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outcomes and errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropOutcome {
    /// Dropped back onto the source stage. Nothing opened, nothing persisted.
    Unchanged,
    AwaitingConfirmation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Sent,
    /// No message text for the target stage.
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveOutcome {
    pub position: PipelinePosition,
    pub notification: NotificationOutcome,
    pub toasts: Vec<Toast>,
}

#[derive(Debug, Error)]
pub enum MoveError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("candidate {candidate_id} is not in stage {stage_id}")]
    UnknownCandidate { candidate_id: Uuid, stage_id: Uuid },

    #[error("stage {0} is not on the board")]
    UnknownStage(Uuid),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to move candidate: {0}")]
    DataUnavailable(#[source] StoreError),
}

// ────────────────────────────────────────────────────────────────────────────
// Board loading
// ────────────────────────────────────────────────────────────────────────────

/// Result of loading a board. `degraded` is set when the store failed and the
/// board fell back to empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BoardLoad {
    pub board: Board,
    pub degraded: bool,
}

/// Loads the recruiter's board, degrading to an empty board on store failure.
pub async fn load_board(store: &dyn PipelineStore, recruiter_id: Uuid) -> BoardLoad {
    match store.load_pipeline(recruiter_id).await {
        Ok(columns) => BoardLoad {
            board: Board::new(columns),
            degraded: false,
        },
        Err(e) => {
            warn!("Pipeline load failed for recruiter {recruiter_id}, showing empty board: {e}");
            BoardLoad {
                board: Board::empty(),
                degraded: true,
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct StageMoveOrchestrator {
    recruiter: RecruiterProfile,
    board: Board,
    degraded: bool,
    state: MoveState,
    store: Arc<dyn PipelineStore>,
    notifier: Arc<dyn NotificationDispatcher>,
}

impl StageMoveOrchestrator {
    pub fn new(
        recruiter: RecruiterProfile,
        board: Board,
        store: Arc<dyn PipelineStore>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            recruiter,
            board,
            degraded: false,
            state: MoveState::Idle,
            store,
            notifier,
        }
    }

    /// Loads the recruiter profile and board, then starts idle.
    pub async fn open(
        recruiter_id: Uuid,
        store: Arc<dyn PipelineStore>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let recruiter = match store.recruiter_profile(recruiter_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => RecruiterProfile::anonymous(recruiter_id),
            Err(e) => {
                warn!("Recruiter profile {recruiter_id} unavailable: {e}");
                RecruiterProfile::anonymous(recruiter_id)
            }
        };
        let loaded = load_board(store.as_ref(), recruiter_id).await;

        let mut orchestrator = Self::new(recruiter, loaded.board, store, notifier);
        orchestrator.degraded = loaded.degraded;
        orchestrator
    }

    #[cfg(test)]
    pub fn state(&self) -> &MoveState {
        &self.state
    }

    #[cfg(test)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub fn recruiter(&self) -> &RecruiterProfile {
        &self.recruiter
    }

    /// True when the last load fell back to an empty board.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    #[cfg(test)]
    pub fn confirmation(&self) -> Option<&MoveConfirmation> {
        match &self.state {
            MoveState::PendingConfirmation(confirmation) => Some(confirmation),
            _ => None,
        }
    }

    pub fn drag_start(&mut self, candidate_id: Uuid, source_stage_id: Uuid) -> Result<(), MoveError> {
        if !matches!(self.state, MoveState::Idle | MoveState::Dragging { .. }) {
            return Err(self.invalid("start dragging"));
        }
        if self.board.candidate_in(source_stage_id, candidate_id).is_none() {
            return Err(MoveError::UnknownCandidate {
                candidate_id,
                stage_id: source_stage_id,
            });
        }

        self.transition(MoveState::Dragging {
            candidate_id,
            source_stage_id,
        });
        Ok(())
    }

    pub fn drop_on(&mut self, target_stage_id: Uuid) -> Result<DropOutcome, MoveError> {
        let MoveState::Dragging {
            candidate_id,
            source_stage_id,
        } = self.state
        else {
            return Err(self.invalid("drop"));
        };

        if target_stage_id == source_stage_id {
            self.transition(MoveState::Idle);
            return Ok(DropOutcome::Unchanged);
        }

        let Some(source) = self.board.stage(source_stage_id) else {
            self.transition(MoveState::Idle);
            return Err(MoveError::UnknownStage(source_stage_id));
        };
        let Some(target) = self.board.stage(target_stage_id) else {
            self.transition(MoveState::Idle);
            return Err(MoveError::UnknownStage(target_stage_id));
        };
        let Some(candidate) = self.board.candidate_in(source_stage_id, candidate_id) else {
            self.transition(MoveState::Idle);
            return Err(MoveError::UnknownCandidate {
                candidate_id,
                stage_id: source_stage_id,
            });
        };

        let confirmation = MoveConfirmation {
            entered_email: candidate.email.clone(),
            candidate: candidate.clone(),
            source_stage_id,
            source_stage_name: source.name.clone(),
            target_stage_id,
            target_stage_name: target.name.clone(),
            message: target.template_text().unwrap_or_default().to_string(),
            notes: None,
            error: None,
            tone: if target.is_rejection() {
                ConfirmTone::Warning
            } else {
                ConfirmTone::Standard
            },
        };

        self.transition(MoveState::PendingConfirmation(confirmation));
        Ok(DropOutcome::AwaitingConfirmation)
    }

    pub fn enter_email(&mut self, email: impl Into<String>) -> Result<(), MoveError> {
        let confirmation = self.pending_mut("edit the email")?;
        confirmation.entered_email = email.into();
        confirmation.error = None;
        Ok(())
    }

    pub fn edit_message(&mut self, message: impl Into<String>) -> Result<(), MoveError> {
        self.pending_mut("edit the message")?.message = message.into();
        Ok(())
    }

    pub fn edit_notes(&mut self, notes: Option<String>) -> Result<(), MoveError> {
        self.pending_mut("edit the notes")?.notes = notes;
        Ok(())
    }

    /// Abandons the current move attempt. No store or notification calls are made.
    pub fn cancel(&mut self) -> Result<(), MoveError> {
        match self.state {
            MoveState::Idle => Ok(()),
            MoveState::Dragging { .. }
            | MoveState::PendingConfirmation(_)
            | MoveState::Validating(_) => {
                self.transition(MoveState::Idle);
                Ok(())
            }
            MoveState::Persisting(_) | MoveState::Notifying(_) | MoveState::Done(_) => {
                Err(self.invalid("cancel"))
            }
        }
    }

    /// Validates, persists, notifies, and merges the move into the board.
    ///
    /// Validation and persistence failures return to `PendingConfirmation` with an
    /// inline error and leave the board untouched. A notification failure does not
    /// undo the persisted move; it only adds a warning toast.
    pub async fn confirm(&mut self) -> Result<MoveOutcome, MoveError> {
        let mut confirmation = match std::mem::replace(&mut self.state, MoveState::Idle) {
            MoveState::PendingConfirmation(confirmation) => confirmation,
            other => {
                self.state = other;
                return Err(self.invalid("confirm"));
            }
        };
        let target = confirmation.target();

        self.transition(MoveState::Validating(target));
        if let Err(e) =
            validate_confirmation_email(&confirmation.entered_email, &confirmation.candidate.email)
        {
            confirmation.error = Some(e.to_string());
            self.transition(MoveState::PendingConfirmation(confirmation));
            return Err(MoveError::Validation(e));
        }
        confirmation.error = None;

        self.transition(MoveState::Persisting(target));
        let request = MoveRequest {
            recruiter_id: self.recruiter.id,
            candidate_id: target.candidate_id,
            from_stage_id: target.from_stage_id,
            to_stage_id: target.to_stage_id,
            notes: confirmation.notes.clone(),
        };
        let position = match self.store.move_candidate(&request).await {
            Ok(position) => position,
            Err(e) => {
                warn!(
                    "Persisting move of candidate {} failed: {e}",
                    target.candidate_id
                );
                confirmation.error = Some(PERSIST_FAILED_MESSAGE.to_string());
                self.transition(MoveState::PendingConfirmation(confirmation));
                return Err(MoveError::DataUnavailable(e));
            }
        };

        self.transition(MoveState::Notifying(target));
        let notification = self.notify(&confirmation).await;

        self.transition(MoveState::Done(target));
        match self.board.relocate(
            target.candidate_id,
            target.from_stage_id,
            target.to_stage_id,
            Utc::now(),
        ) {
            Some(moved) => moved.notes = position.notes.clone(),
            // The board cannot lose the candidate while a move is in flight.
            None => warn!(
                "Candidate {} missing from local board after move",
                target.candidate_id
            ),
        }

        let mut toasts = vec![Toast {
            level: ToastLevel::Success,
            message: format!(
                "{} moved to {}",
                confirmation.candidate.name, confirmation.target_stage_name
            ),
        }];
        if let NotificationOutcome::Failed { .. } = notification {
            toasts.push(Toast {
                level: ToastLevel::Warning,
                message: format!(
                    "Email to {} could not be sent",
                    confirmation.candidate.name
                ),
            });
        }

        info!(
            "Candidate {} moved {} -> {} by recruiter {}",
            target.candidate_id,
            confirmation.source_stage_name,
            confirmation.target_stage_name,
            self.recruiter.id
        );
        self.transition(MoveState::Idle);

        Ok(MoveOutcome {
            position,
            notification,
            toasts,
        })
    }

    async fn notify(&self, confirmation: &MoveConfirmation) -> NotificationOutcome {
        if confirmation.message.trim().is_empty() {
            return NotificationOutcome::Skipped;
        }

        let notification = StageNotification {
            recipient_email: confirmation.candidate.email.clone(),
            candidate_name: confirmation.candidate.name.clone(),
            stage_name: confirmation.target_stage_name.clone(),
            subject: stage_subject(&confirmation.target_stage_name),
            message: confirmation.message.clone(),
            recruiter_name: self.recruiter.display_name().to_string(),
            company_name: self.recruiter.company_name.clone().unwrap_or_default(),
        };

        match self.notifier.send(&notification).await {
            Ok(()) => NotificationOutcome::Sent,
            Err(e) => {
                warn!(
                    "Stage email to candidate {} failed: {e}",
                    confirmation.candidate.id
                );
                NotificationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn pending_mut(&mut self, action: &'static str) -> Result<&mut MoveConfirmation, MoveError> {
        let state = self.state.name();
        match &mut self.state {
            MoveState::PendingConfirmation(confirmation) => Ok(confirmation),
            _ => Err(MoveError::InvalidTransition { action, state }),
        }
    }

    fn transition(&mut self, next: MoveState) {
        debug!(
            "Stage move: {} -> {} (candidate {:?})",
            self.state.name(),
            next.name(),
            next.candidate_id().or_else(|| self.state.candidate_id())
        );
        self.state = next;
    }

    fn invalid(&self, action: &'static str) -> MoveError {
        MoveError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }
}
