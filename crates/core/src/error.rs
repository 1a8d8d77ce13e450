use crate::submission::SubmissionStatus;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A decision was attempted on a submission that is no longer pending.
    #[error("Submission {id} is already {status} and cannot be decided again")]
    InvalidTransition { id: DbId, status: SubmissionStatus },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The persistence collaborator failed to complete the request.
    #[error("Remote store failure: {0}")]
    Remote(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
