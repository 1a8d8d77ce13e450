//! In-process [`MarketStore`] backed by ordered maps behind a `tokio` lock.
//!
//! Every mutating call runs inside a single write-lock critical section, so
//! an approval's catalogue effect and terminal mark are observed together or
//! not at all.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::moderation::{
    catalogue_effect, ensure_pending, Approval, CatalogueEffect, Decision, Moderator,
};
use crate::product::{NewProduct, Product, ProductStatus, ProductUpdate};
use crate::store::{MarketStore, Pagination, ProductFilter, SubmissionFilter};
use crate::submission::{NewSubmission, Submission, SubmissionPayload, SubmissionStatus};
use crate::types::DbId;

#[derive(Default)]
struct Tables {
    submissions: BTreeMap<DbId, Submission>,
    products: BTreeMap<DbId, Product>,
    last_submission_id: DbId,
    last_product_id: DbId,
}

impl Tables {
    fn available_product(&self, id: DbId) -> Result<&Product, CoreError> {
        self.products
            .get(&id)
            .filter(|p| p.status == ProductStatus::Available)
            .ok_or(CoreError::NotFound {
                entity: "Product",
                id,
            })
    }

    fn insert_product(&mut self, input: NewProduct) -> Product {
        self.last_product_id += 1;
        let now = Utc::now();
        let product = Product {
            id: self.last_product_id,
            name: input.name,
            category: input.category,
            description: input.description,
            daily_price: input.daily_price,
            weekly_price: input.weekly_price,
            monthly_price: input.monthly_price,
            city: input.city,
            phone: input.phone,
            image_url: input.image_url,
            rating: input.rating,
            reviews_count: input.reviews_count,
            status: input.status,
            created_at: now,
            updated_at: now,
        };
        self.products.insert(product.id, product.clone());
        product
    }

    fn update_product(&mut self, id: DbId, update: &ProductUpdate) -> Result<Product, CoreError> {
        self.available_product(id)?;
        let product = self
            .products
            .get_mut(&id)
            .ok_or(CoreError::NotFound {
                entity: "Product",
                id,
            })?;
        update.apply_to(product);
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    fn hide_product(&mut self, id: DbId) -> Result<(), CoreError> {
        self.available_product(id)?;
        if let Some(product) = self.products.get_mut(&id) {
            product.status = ProductStatus::Hidden;
            product.updated_at = Utc::now();
        }
        Ok(())
    }

    fn submission(&self, id: DbId) -> Result<&Submission, CoreError> {
        self.submissions.get(&id).ok_or(CoreError::NotFound {
            entity: "Submission",
            id,
        })
    }

    /// A copy of submission `id` with `decision` applied. Nothing is stored.
    fn decided(
        &self,
        id: DbId,
        decision: Decision,
        moderator: &Moderator,
        note: Option<String>,
    ) -> Result<Submission, CoreError> {
        let mut decided = self.submission(id)?.clone();
        ensure_pending(&decided)?;
        decided.decide(decision, moderator, note, Utc::now())?;
        Ok(decided)
    }

    /// Apply the approval effect of `payload`, returning the product touched.
    ///
    /// Every check runs before the mutation, so an error leaves the
    /// catalogue as it was.
    fn apply_effect(&mut self, payload: &SubmissionPayload) -> Result<DbId, CoreError> {
        match catalogue_effect(payload)? {
            CatalogueEffect::Create(new_product) => Ok(self.insert_product(new_product).id),
            CatalogueEffect::Update { product_id, update } => {
                Ok(self.update_product(product_id, &update)?.id)
            }
            CatalogueEffect::Hide { product_id } => {
                self.hide_product(product_id)?;
                Ok(product_id)
            }
        }
    }
}

/// In-memory store for tests and local development.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a product directly into the catalogue.
    pub async fn seed_product(&self, input: NewProduct) -> Product {
        self.tables.write().await.insert_product(input)
    }

    /// Every product, hidden ones included, in id order.
    pub async fn all_products(&self) -> Vec<Product> {
        self.tables.read().await.products.values().cloned().collect()
    }
}

#[async_trait]
impl MarketStore for InMemoryStore {
    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }

    async fn create_submission(&self, input: NewSubmission) -> Result<Submission, CoreError> {
        let input = input.validated()?;
        let mut tables = self.tables.write().await;

        if let Some(target) = input.payload.target_product_id() {
            tables.available_product(target)?;
        }

        tables.last_submission_id += 1;
        let submission = Submission {
            id: tables.last_submission_id,
            requester: input.requester,
            payload: input.payload,
            status: SubmissionStatus::Pending,
            moderation_note: None,
            submitted_at: Utc::now(),
            decided_at: None,
            decided_by: None,
        };
        tables.submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn list_submissions(
        &self,
        filter: &SubmissionFilter,
        page: Pagination,
    ) -> Result<Vec<Submission>, CoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .submissions
            .values()
            .rev()
            .filter(|s| filter.matches(s))
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn get_submission(&self, id: DbId) -> Result<Submission, CoreError> {
        self.tables.read().await.submission(id).cloned()
    }

    async fn delete_submission(&self, id: DbId) -> Result<(), CoreError> {
        self.tables
            .write()
            .await
            .submissions
            .remove(&id)
            .map(|_| ())
            .ok_or(CoreError::NotFound {
                entity: "Submission",
                id,
            })
    }

    async fn approve_submission(
        &self,
        id: DbId,
        moderator: &Moderator,
        note: Option<String>,
    ) -> Result<Approval, CoreError> {
        let mut tables = self.tables.write().await;
        let submission = tables.decided(id, Decision::Approve, moderator, note)?;
        let product_id = tables.apply_effect(&submission.payload)?;
        tables.submissions.insert(id, submission.clone());
        Ok(Approval {
            submission,
            product_id,
        })
    }

    async fn reject_submission(
        &self,
        id: DbId,
        moderator: &Moderator,
        note: Option<String>,
    ) -> Result<Submission, CoreError> {
        let mut tables = self.tables.write().await;
        let submission = tables.decided(id, Decision::Reject, moderator, note)?;
        tables.submissions.insert(id, submission.clone());
        Ok(submission)
    }

    async fn create_product(&self, input: NewProduct) -> Result<Product, CoreError> {
        Ok(self.tables.write().await.insert_product(input))
    }

    async fn update_product(&self, id: DbId, update: &ProductUpdate) -> Result<Product, CoreError> {
        self.tables.write().await.update_product(id, update)
    }

    async fn hide_product(&self, id: DbId) -> Result<(), CoreError> {
        self.tables.write().await.hide_product(id)
    }

    async fn get_product(&self, id: DbId) -> Result<Product, CoreError> {
        self.tables.read().await.available_product(id).cloned()
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: Pagination,
    ) -> Result<Vec<Product>, CoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .rev()
            .filter(|p| p.status == ProductStatus::Available && filter.matches(p))
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }
}
