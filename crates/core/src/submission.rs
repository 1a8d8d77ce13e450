//! Submission records: proposed additions, modifications and deletions of
//! catalogue products awaiting moderation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::product::{NewProduct, ProductFields, ProductPatch, ProductUpdate};
use crate::types::{DbId, Timestamp};

/// Maximum length of a delete reason or moderation note, in characters.
pub const MAX_NOTE_CHARS: usize = 2000;

/// What a submission asks the catalogue to do. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Add,
    Modify,
    Delete,
}

impl SubmissionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionKind::Add => "add",
            SubmissionKind::Modify => "modify",
            SubmissionKind::Delete => "delete",
        }
    }
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(SubmissionKind::Add),
            "modify" => Ok(SubmissionKind::Modify),
            "delete" => Ok(SubmissionKind::Delete),
            other => Err(CoreError::Validation(format!(
                "Invalid submission kind '{other}'. Must be one of: add, modify, delete"
            ))),
        }
    }
}

/// Moderation status. `Pending` is initial; `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, SubmissionStatus::Pending)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubmissionStatus::Pending),
            "approved" => Ok(SubmissionStatus::Approved),
            "rejected" => Ok(SubmissionStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid submission status '{other}'. Must be one of: pending, approved, rejected"
            ))),
        }
    }
}

/// The proposed change, one shape per kind.
///
/// Serialized with an inline `kind` tag so the stored JSON matches the
/// listing form, e.g. `{"kind":"modify","targetProductId":7,"dailyPrice":"150"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SubmissionPayload {
    Add(ProductFields),
    #[serde(rename_all = "camelCase")]
    Modify {
        target_product_id: DbId,
        #[serde(flatten)]
        changes: ProductPatch,
    },
    #[serde(rename_all = "camelCase")]
    Delete {
        target_product_id: DbId,
        #[serde(default)]
        reason: String,
    },
}

impl SubmissionPayload {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            SubmissionPayload::Add(_) => SubmissionKind::Add,
            SubmissionPayload::Modify { .. } => SubmissionKind::Modify,
            SubmissionPayload::Delete { .. } => SubmissionKind::Delete,
        }
    }

    /// The existing product a modify/delete request targets.
    pub fn target_product_id(&self) -> Option<DbId> {
        match self {
            SubmissionPayload::Add(_) => None,
            SubmissionPayload::Modify {
                target_product_id, ..
            }
            | SubmissionPayload::Delete {
                target_product_id, ..
            } => Some(*target_product_id),
        }
    }

    /// Normalize and validate the payload shape for its kind.
    pub fn validated(self) -> Result<Self, CoreError> {
        match self {
            SubmissionPayload::Add(fields) => {
                let fields = fields.normalized();
                fields
                    .validate()
                    .map_err(|e| CoreError::Validation(e.to_string()))?;
                NewProduct::from_fields(&fields)?;
                Ok(SubmissionPayload::Add(fields))
            }
            SubmissionPayload::Modify {
                target_product_id,
                changes,
            } => {
                validate_target(target_product_id)?;
                let changes = changes.normalized();
                ProductUpdate::from_patch(&changes)?;
                Ok(SubmissionPayload::Modify {
                    target_product_id,
                    changes,
                })
            }
            SubmissionPayload::Delete {
                target_product_id,
                reason,
            } => {
                validate_target(target_product_id)?;
                let reason = reason.trim().to_string();
                validate_note_length("reason", &reason)?;
                Ok(SubmissionPayload::Delete {
                    target_product_id,
                    reason,
                })
            }
        }
    }
}

/// A submission row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: DbId,
    /// Absent for legacy or anonymous submissions.
    pub requester: Option<DbId>,
    pub payload: SubmissionPayload,
    pub status: SubmissionStatus,
    pub moderation_note: Option<String>,
    pub submitted_at: Timestamp,
    pub decided_at: Option<Timestamp>,
    pub decided_by: Option<DbId>,
}

impl Submission {
    pub fn kind(&self) -> SubmissionKind {
        self.payload.kind()
    }

    pub fn target_product_id(&self) -> Option<DbId> {
        self.payload.target_product_id()
    }

    pub fn is_pending(&self) -> bool {
        self.status == SubmissionStatus::Pending
    }
}

/// Input for creating a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub requester: Option<DbId>,
    pub payload: SubmissionPayload,
}

impl NewSubmission {
    /// Normalize and validate before any store call is made.
    pub fn validated(self) -> Result<Self, CoreError> {
        Ok(Self {
            requester: self.requester,
            payload: self.payload.validated()?,
        })
    }
}

/// Reject notes and reasons longer than [`MAX_NOTE_CHARS`].
pub fn validate_note_length(field: &str, note: &str) -> Result<(), CoreError> {
    if note.chars().count() > MAX_NOTE_CHARS {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NOTE_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_target(target_product_id: DbId) -> Result<(), CoreError> {
    if target_product_id <= 0 {
        return Err(CoreError::Validation(format!(
            "targetProductId must be a positive id, got {target_product_id}"
        )));
    }
    Ok(())
}
