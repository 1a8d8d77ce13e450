//! Repository layer: one zero-sized struct per table with async query methods.

pub mod event_repo;
pub mod product_repo;
pub mod submission_repo;

pub use event_repo::{EventRepo, InsertMarketEvent};
pub use product_repo::ProductRepo;
pub use submission_repo::{InsertSubmission, SubmissionRepo};
