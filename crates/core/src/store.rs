//! The persistence collaborator contract.
//!
//! [`MarketStore`] is the remote transactional store that owns submissions
//! and catalogue products. [`crate::memory::InMemoryStore`] implements it for
//! tests and local development; `kiraa_db::PgMarketStore` implements it
//! against PostgreSQL.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::CoreError;
use crate::moderation::{Approval, Moderator};
use crate::product::{NewProduct, Product, ProductUpdate};
use crate::submission::{NewSubmission, Submission, SubmissionStatus};
use crate::types::DbId;

/// Default page size when none is requested.
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 100;

/// Clamped `limit`/`offset` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    /// Clamp limit to `1..=MAX_LIMIT` and offset to `>= 0`.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }

    /// First page of a walk over the whole list in `MAX_LIMIT` steps.
    pub fn full() -> Self {
        Self::new(Some(MAX_LIMIT), None)
    }

    /// The page immediately after this one.
    pub fn next(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset + self.limit,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Filter for submission listings. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmissionFilter {
    pub status: Option<SubmissionStatus>,
    pub requester: Option<DbId>,
}

impl SubmissionFilter {
    pub fn pending() -> Self {
        Self {
            status: Some(SubmissionStatus::Pending),
            requester: None,
        }
    }

    pub fn matches(&self, submission: &Submission) -> bool {
        self.status.map_or(true, |s| s == submission.status)
            && self
                .requester
                .map_or(true, |r| submission.requester == Some(r))
    }
}

/// Filter for the public catalogue listing. Only available products are listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub city: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        self.category
            .as_deref()
            .map_or(true, |c| product.category == c)
            && self
                .city
                .as_deref()
                .map_or(true, |c| product.city.as_deref() == Some(c))
    }
}

/// Remote store for submissions and the product catalogue.
///
/// ## Approval atomicity
///
/// `approve_submission` must apply the catalogue effect of the submission
/// (see [`crate::moderation::catalogue_effect`]) and mark it approved as one
/// unit. The effect is applied first; the submission is marked terminal only
/// once the effect is confirmed. Any failure leaves the submission pending
/// and the catalogue unchanged.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to live in axum
/// application state.
#[async_trait]
pub trait MarketStore: Send + Sync + 'static {
    /// Verify the store is reachable.
    async fn health_check(&self) -> Result<(), CoreError>;

    // ── Submissions ──────────────────────────────────────────────────────────

    /// Validate and insert a new pending submission.
    ///
    /// Modify/delete requests must target an available product.
    async fn create_submission(&self, input: NewSubmission) -> Result<Submission, CoreError>;

    /// List submissions newest first.
    async fn list_submissions(
        &self,
        filter: &SubmissionFilter,
        page: Pagination,
    ) -> Result<Vec<Submission>, CoreError>;

    async fn get_submission(&self, id: DbId) -> Result<Submission, CoreError>;

    /// Permanently remove a submission regardless of status.
    async fn delete_submission(&self, id: DbId) -> Result<(), CoreError>;

    /// Apply the catalogue effect and mark the submission approved.
    async fn approve_submission(
        &self,
        id: DbId,
        moderator: &Moderator,
        note: Option<String>,
    ) -> Result<Approval, CoreError>;

    /// Mark the submission rejected. No catalogue effect.
    async fn reject_submission(
        &self,
        id: DbId,
        moderator: &Moderator,
        note: Option<String>,
    ) -> Result<Submission, CoreError>;

    // ── Catalogue ────────────────────────────────────────────────────────────

    async fn create_product(&self, input: NewProduct) -> Result<Product, CoreError>;

    /// Partially update an available product.
    async fn update_product(&self, id: DbId, update: &ProductUpdate) -> Result<Product, CoreError>;

    /// Remove a product from listings.
    async fn hide_product(&self, id: DbId) -> Result<(), CoreError>;

    /// Fetch an available product. Hidden products are reported as not found.
    async fn get_product(&self, id: DbId) -> Result<Product, CoreError>;

    /// List available products newest first.
    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: Pagination,
    ) -> Result<Vec<Product>, CoreError>;
}
