//! Route definitions for requester-facing submissions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::submission;
use crate::state::AppState;

/// Routes mounted at `/submissions`.
///
/// ```text
/// POST   /            create_submission
/// GET    /mine        list_my_submissions
/// GET    /{id}        get_submission
/// DELETE /{id}        delete_submission
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submission::create_submission))
        .route("/mine", get(submission::list_my_submissions))
        .route(
            "/{id}",
            get(submission::get_submission).delete(submission::delete_submission),
        )
}
