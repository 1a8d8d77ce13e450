//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`]: the caller identified by a Bearer token.
//! - [`rbac::RequireModerator`]: the caller's [`kiraa_core::moderation::Moderator`]
//!   capability; rejects non-admins with 403.

pub mod auth;
pub mod rbac;
