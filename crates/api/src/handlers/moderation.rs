//! Handlers for the moderator queue and decisions.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use kiraa_core::error::CoreError;
use kiraa_core::moderation::Decision;
use kiraa_core::product::{field_changes, FieldChange, Product};
use kiraa_core::store::SubmissionFilter;
use kiraa_core::submission::{Submission, SubmissionPayload};
use kiraa_core::types::DbId;
use kiraa_events::bus::event_types;
use kiraa_events::MarketEvent;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::rbac::RequireModerator;
use crate::query::SubmissionListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for approve and reject.
#[derive(Debug, Default, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub note: Option<String>,
}

/// A submission side by side with the product it targets.
#[derive(Debug, Serialize)]
pub struct SubmissionComparison {
    pub submission: Submission,
    /// Current catalogue entry, absent for add requests or hidden targets.
    pub product: Option<Product>,
    /// Fields a modify request would change.
    pub changes: Vec<FieldChange>,
}

/// GET /api/v1/admin/submissions
///
/// Defaults to every status; pass `?status=pending` for the review queue.
pub async fn list_submissions(
    RequireModerator(_moderator): RequireModerator,
    State(state): State<AppState>,
    Query(params): Query<SubmissionListParams>,
) -> AppResult<impl IntoResponse> {
    let filter = SubmissionFilter {
        status: params.status,
        requester: None,
    };
    let submissions = state
        .store
        .list_submissions(&filter, params.pagination())
        .await?;
    Ok(Json(DataResponse { data: submissions }))
}

/// GET /api/v1/admin/submissions/{id}/comparison
pub async fn get_comparison(
    RequireModerator(_moderator): RequireModerator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let submission = state.store.get_submission(id).await?;

    let product = match submission.target_product_id() {
        Some(target) => match state.store.get_product(target).await {
            Ok(product) => Some(product),
            Err(CoreError::NotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        },
        None => None,
    };

    let changes = match (&submission.payload, &product) {
        (SubmissionPayload::Modify { changes, .. }, Some(product)) => {
            field_changes(product, changes)
        }
        _ => Vec::new(),
    };

    Ok(Json(DataResponse {
        data: SubmissionComparison {
            submission,
            product,
            changes,
        },
    }))
}

/// POST /api/v1/admin/submissions/{id}/approve
///
/// Apply the submission's catalogue effect and mark it approved. The body is
/// optional.
pub async fn approve_submission(
    RequireModerator(moderator): RequireModerator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<DecisionRequest>>,
) -> AppResult<impl IntoResponse> {
    let input = body.map(|Json(input)| input).unwrap_or_default();
    let approval = state
        .store
        .approve_submission(id, &moderator, input.note)
        .await?;
    log_decision(&approval.submission, Decision::Approve, moderator.user_id());
    state.event_bus.publish(
        MarketEvent::for_submission(event_types::SUBMISSION_APPROVED, &approval.submission)
            .with_product(approval.product_id)
            .with_actor(moderator.user_id()),
    );
    Ok(Json(DataResponse {
        data: approval.submission,
    }))
}

/// POST /api/v1/admin/submissions/{id}/reject
pub async fn reject_submission(
    RequireModerator(moderator): RequireModerator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<DecisionRequest>>,
) -> AppResult<impl IntoResponse> {
    let input = body.map(|Json(input)| input).unwrap_or_default();
    let submission = state
        .store
        .reject_submission(id, &moderator, input.note)
        .await?;
    log_decision(&submission, Decision::Reject, moderator.user_id());
    state.event_bus.publish(
        MarketEvent::for_submission(event_types::SUBMISSION_REJECTED, &submission)
            .with_actor(moderator.user_id()),
    );
    Ok(Json(DataResponse { data: submission }))
}

fn log_decision(submission: &Submission, decision: Decision, user_id: DbId) {
    tracing::info!(
        user_id,
        submission_id = submission.id,
        kind = %submission.kind(),
        decision = ?decision,
        "Submission decided"
    );
}
