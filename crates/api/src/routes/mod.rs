pub mod health;
pub mod moderation;
pub mod product;
pub mod submission;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /submissions                        create
/// /submissions/mine                   caller's submissions
/// /submissions/{id}                   get, delete
///
/// /admin/submissions                  list (moderators only, whole subtree)
/// /admin/submissions/{id}/comparison  side-by-side view
/// /admin/submissions/{id}/approve     approve
/// /admin/submissions/{id}/reject      reject
///
/// /products                           public catalogue
/// /products/{id}                      product detail
/// ```
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/submissions", submission::router())
        .nest("/admin/submissions", moderation::router(state))
        .nest("/products", product::router())
}
