//! Route definitions for the moderation queue.

use axum::middleware::from_extractor_with_state;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::moderation;
use crate::middleware::rbac::RequireModerator;
use crate::state::AppState;

/// Routes mounted at `/admin/submissions`.
///
/// The whole subtree sits behind [`RequireModerator`], so callers without the
/// admin role are turned away (401 or 403) before any handler or body
/// extractor runs.
///
/// ```text
/// GET    /                    list_submissions
/// GET    /{id}/comparison     get_comparison
/// POST   /{id}/approve        approve_submission
/// POST   /{id}/reject         reject_submission
/// ```
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(moderation::list_submissions))
        .route("/{id}/comparison", get(moderation::get_comparison))
        .route("/{id}/approve", post(moderation::approve_submission))
        .route("/{id}/reject", post(moderation::reject_submission))
        .route_layer(from_extractor_with_state::<RequireModerator, _>(state))
}
