//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use kiraa_core::moderation::Moderator;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Grants the [`Moderator`] capability to admin callers. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn approve(RequireModerator(moderator): RequireModerator) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireModerator(pub Moderator);

impl FromRequestParts<AppState> for RequireModerator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireModerator(user.moderator()?))
    }
}
