//! Submission row model.

use kiraa_core::error::CoreError;
use kiraa_core::submission::{Submission, SubmissionKind, SubmissionPayload};
use kiraa_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `submissions` table.
///
/// `payload` holds the tagged [`SubmissionPayload`] JSON; `kind` and
/// `target_product_id` are denormalized copies used for filtering and
/// constraint checks.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    pub id: DbId,
    pub requester_id: Option<DbId>,
    pub kind: String,
    pub target_product_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub status: String,
    pub moderation_note: Option<String>,
    pub submitted_at: Timestamp,
    pub decided_at: Option<Timestamp>,
    pub decided_by: Option<DbId>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = CoreError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let payload: SubmissionPayload = serde_json::from_value(row.payload).map_err(|e| {
            CoreError::Internal(format!("Submission {} has a malformed payload: {e}", row.id))
        })?;
        let kind: SubmissionKind = row
            .kind
            .parse()
            .map_err(|_| CoreError::Internal(format!("Submission {} has kind '{}'", row.id, row.kind)))?;
        if kind != payload.kind() || row.target_product_id != payload.target_product_id() {
            return Err(CoreError::Internal(format!(
                "Submission {} payload disagrees with its kind/target columns",
                row.id
            )));
        }
        let status = row
            .status
            .parse()
            .map_err(|_| CoreError::Internal(format!("Submission {} has status '{}'", row.id, row.status)))?;

        Ok(Submission {
            id: row.id,
            requester: row.requester_id,
            payload,
            status,
            moderation_note: row.moderation_note,
            submitted_at: row.submitted_at,
            decided_at: row.decided_at,
            decided_by: row.decided_by,
        })
    }
}
