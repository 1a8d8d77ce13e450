//! Client-local optimistic view of a submission list.
//!
//! A moderation action is applied to the local rows before the remote store
//! confirms it. Each in-flight action is recorded as an [`InFlightAction`]
//! holding the row it displaced, so a failed action restores exactly what was
//! there before. At most one action per submission may be in flight; the
//! in-flight map doubles as the per-submission busy flag.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;

use crate::submission::{Submission, SubmissionStatus};
use crate::types::DbId;

/// An action whose effect is applied optimistically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Reject,
    Delete,
}

impl ModerationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ModerationAction::Approve => "approve",
            ModerationAction::Reject => "reject",
            ModerationAction::Delete => "delete",
        }
    }

    fn optimistic_status(self) -> Option<SubmissionStatus> {
        match self {
            ModerationAction::Approve => Some(SubmissionStatus::Approved),
            ModerationAction::Reject => Some(SubmissionStatus::Rejected),
            ModerationAction::Delete => None,
        }
    }
}

/// Which rows the view displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewScope {
    /// The moderation queue: decided rows leave the view.
    PendingOnly,
    /// Every status: decided rows stay, showing their new status.
    AllStatuses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionState {
    Pending,
    Committed,
    Reverting,
}

/// The row an action displaced and where it sat.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub index: usize,
    pub submission: Submission,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InFlightAction {
    pub submission_id: DbId,
    pub action: ModerationAction,
    pub previous: Snapshot,
    pub state: ActionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Failure,
}

/// A user-visible outcome message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub submission_id: DbId,
    pub action: ModerationAction,
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("An action on submission {0} is already in flight")]
    Busy(DbId),

    #[error("Submission {0} is not in the local view")]
    UnknownSubmission(DbId),

    #[error("Submission {id} is already {status}")]
    NotPending { id: DbId, status: SubmissionStatus },

    #[error("No action on submission {0} is in flight")]
    NoActionInFlight(DbId),
}

/// Local rows plus in-flight bookkeeping for one client.
#[derive(Debug, Clone)]
pub struct SubmissionView {
    scope: ViewScope,
    rows: Vec<Submission>,
    in_flight: HashMap<DbId, InFlightAction>,
    notices: Vec<Notice>,
}

impl SubmissionView {
    pub fn new(scope: ViewScope) -> Self {
        Self {
            scope,
            rows: Vec::new(),
            in_flight: HashMap::new(),
            notices: Vec::new(),
        }
    }

    pub fn scope(&self) -> ViewScope {
        self.scope
    }

    pub fn rows(&self) -> &[Submission] {
        &self.rows
    }

    pub fn contains(&self, id: DbId) -> bool {
        self.position(id).is_some()
    }

    /// Whether decision controls for `id` must be disabled.
    pub fn is_busy(&self, id: DbId) -> bool {
        self.in_flight.contains_key(&id)
    }

    pub fn in_flight(&self, id: DbId) -> Option<&InFlightAction> {
        self.in_flight.get(&id)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Start `action` on `id`, applying its effect to the local rows.
    pub fn begin(&mut self, id: DbId, action: ModerationAction) -> Result<(), ReconcileError> {
        if self.is_busy(id) {
            return Err(ReconcileError::Busy(id));
        }
        let index = self
            .position(id)
            .ok_or(ReconcileError::UnknownSubmission(id))?;
        let row = &self.rows[index];
        if action != ModerationAction::Delete && row.status.is_terminal() {
            return Err(ReconcileError::NotPending {
                id,
                status: row.status,
            });
        }

        let record = InFlightAction {
            submission_id: id,
            action,
            previous: Snapshot {
                index,
                submission: row.clone(),
            },
            state: ActionState::Pending,
        };
        self.apply_optimistic(&record);
        self.in_flight.insert(id, record);
        Ok(())
    }

    /// Confirm the in-flight action on `id` and clear its busy flag.
    pub fn commit(&mut self, id: DbId) -> Result<InFlightAction, ReconcileError> {
        let mut record = self
            .in_flight
            .remove(&id)
            .ok_or(ReconcileError::NoActionInFlight(id))?;
        record.state = ActionState::Committed;
        self.notices.push(Notice {
            submission_id: id,
            action: record.action,
            level: NoticeLevel::Success,
            message: format!("{} succeeded", record.action.as_str()),
        });
        Ok(record)
    }

    /// Undo the in-flight action on `id`, restoring the displaced row.
    pub fn revert(
        &mut self,
        id: DbId,
        message: impl Into<String>,
    ) -> Result<InFlightAction, ReconcileError> {
        let mut record = self
            .in_flight
            .remove(&id)
            .ok_or(ReconcileError::NoActionInFlight(id))?;
        record.state = ActionState::Reverting;

        let previous = record.previous.submission.clone();
        match self.position(id) {
            Some(current) => self.rows[current] = previous,
            None => {
                let index = record.previous.index.min(self.rows.len());
                self.rows.insert(index, previous);
            }
        }

        let message = message.into();
        tracing::warn!(
            submission_id = id,
            action = record.action.as_str(),
            error = %message,
            "Optimistic action reverted"
        );
        self.notices.push(Notice {
            submission_id: id,
            action: record.action,
            level: NoticeLevel::Failure,
            message,
        });
        Ok(record)
    }

    /// Replace the rows with the canonical list (last full reload wins).
    ///
    /// Rows with an action still in flight keep their optimistic effect.
    pub fn replace_all(&mut self, canonical: Vec<Submission>) {
        self.rows = match self.scope {
            ViewScope::PendingOnly => canonical.into_iter().filter(|s| s.is_pending()).collect(),
            ViewScope::AllStatuses => canonical,
        };
        let pending: Vec<InFlightAction> = self.in_flight.values().cloned().collect();
        for record in &pending {
            self.apply_optimistic(record);
        }
    }

    fn position(&self, id: DbId) -> Option<usize> {
        self.rows.iter().position(|s| s.id == id)
    }

    fn apply_optimistic(&mut self, record: &InFlightAction) {
        let Some(index) = self.position(record.submission_id) else {
            return;
        };
        match (record.action.optimistic_status(), self.scope) {
            (Some(status), ViewScope::AllStatuses) => {
                let row = &mut self.rows[index];
                row.status = status;
                row.decided_at = Some(Utc::now());
            }
            _ => {
                self.rows.remove(index);
            }
        }
    }
}
