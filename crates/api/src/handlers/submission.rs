//! Handlers for requester-facing submission endpoints.
//!
//! Any authenticated user may propose a catalogue change. Reading or
//! withdrawing a submission is limited to its requester and moderators.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use kiraa_core::moderation::ensure_can_manage;
use kiraa_core::store::SubmissionFilter;
use kiraa_core::submission::{NewSubmission, SubmissionPayload};
use kiraa_core::types::DbId;
use kiraa_events::bus::event_types;
use kiraa_events::MarketEvent;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::SubmissionListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/submissions
///
/// Create a pending submission owned by the caller. Nothing reaches the
/// catalogue until a moderator approves it.
pub async fn create_submission(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<SubmissionPayload>,
) -> AppResult<impl IntoResponse> {
    let submission = state
        .store
        .create_submission(NewSubmission {
            requester: Some(auth.user_id),
            payload,
        })
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        submission_id = submission.id,
        kind = %submission.kind(),
        "Submission created"
    );
    state.event_bus.publish(
        MarketEvent::for_submission(event_types::SUBMISSION_CREATED, &submission)
            .with_actor(auth.user_id),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: submission })))
}

/// GET /api/v1/submissions/mine
pub async fn list_my_submissions(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SubmissionListParams>,
) -> AppResult<impl IntoResponse> {
    let filter = SubmissionFilter {
        status: params.status,
        requester: Some(auth.user_id),
    };
    let submissions = state
        .store
        .list_submissions(&filter, params.pagination())
        .await?;
    Ok(Json(DataResponse { data: submissions }))
}

/// GET /api/v1/submissions/{id}
pub async fn get_submission(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let submission = state.store.get_submission(id).await?;
    ensure_can_manage(&submission, auth.user_id, &auth.role)?;
    Ok(Json(DataResponse { data: submission }))
}

/// DELETE /api/v1/submissions/{id}
///
/// Permanently remove a submission in any status. Has no catalogue effect.
pub async fn delete_submission(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let submission = state.store.get_submission(id).await?;
    ensure_can_manage(&submission, auth.user_id, &auth.role)?;
    state.store.delete_submission(id).await?;

    tracing::info!(user_id = auth.user_id, submission_id = id, "Submission deleted");
    state.event_bus.publish(
        MarketEvent::for_submission(event_types::SUBMISSION_DELETED, &submission)
            .with_actor(auth.user_id),
    );

    Ok(StatusCode::NO_CONTENT)
}
