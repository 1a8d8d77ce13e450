//! Kiraa API server library.
//!
//! Exposes config, state, error handling, auth extractors and routes so the
//! binary entrypoint and integration tests share one router.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
