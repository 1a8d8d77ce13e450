//! Kiraa domain core.
//!
//! Submission lifecycle for the tool-rental marketplace: payload types and
//! their validation, the moderation state machine, the persistence
//! collaborator contract ([`store::MarketStore`]), and the client-side
//! optimistic reconciliation of moderation actions.

pub mod client;
pub mod error;
pub mod memory;
pub mod moderation;
pub mod product;
pub mod reconcile;
pub mod roles;
pub mod store;
pub mod submission;
pub mod types;
