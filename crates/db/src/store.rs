//! [`MarketStore`] implementation over a PostgreSQL pool.

use async_trait::async_trait;
use chrono::Utc;
use kiraa_core::error::CoreError;
use kiraa_core::moderation::{
    catalogue_effect, ensure_pending, Approval, CatalogueEffect, Decision, Moderator,
};
use kiraa_core::product::{NewProduct, Product, ProductUpdate};
use kiraa_core::store::{MarketStore, Pagination, ProductFilter, SubmissionFilter};
use kiraa_core::submission::{NewSubmission, Submission};
use kiraa_core::types::DbId;
use sqlx::PgConnection;

use crate::repositories::{InsertSubmission, ProductRepo, SubmissionRepo};
use crate::{map_db_error, DbPool};

fn submission_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Submission",
        id,
    }
}

fn product_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Product",
        id,
    }
}

/// PostgreSQL-backed store. Cheap to clone.
#[derive(Clone)]
pub struct PgMarketStore {
    pool: DbPool,
}

impl PgMarketStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Lock submission `id` and return a copy with `decision` applied.
///
/// The row stays locked until the transaction ends, so two moderators racing
/// on the same id serialize here and the loser observes the terminal status.
async fn lock_and_decide(
    conn: &mut PgConnection,
    id: DbId,
    decision: Decision,
    moderator: &Moderator,
    note: Option<String>,
) -> Result<Submission, CoreError> {
    let row = SubmissionRepo::find_for_update(&mut *conn, id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| submission_not_found(id))?;
    let mut decided = Submission::try_from(row)?;
    ensure_pending(&decided)?;
    decided.decide(decision, moderator, note, Utc::now())?;
    Ok(decided)
}

/// Apply the approval effect of `submission`, returning the product touched.
async fn apply_effect(conn: &mut PgConnection, submission: &Submission) -> Result<DbId, CoreError> {
    match catalogue_effect(&submission.payload)? {
        CatalogueEffect::Create(new_product) => {
            let row = ProductRepo::create(&mut *conn, &new_product)
                .await
                .map_err(map_db_error)?;
            Ok(row.id)
        }
        CatalogueEffect::Update { product_id, update } => {
            ProductRepo::update(&mut *conn, product_id, &update)
                .await
                .map_err(map_db_error)?
                .ok_or_else(|| product_not_found(product_id))?;
            Ok(product_id)
        }
        CatalogueEffect::Hide { product_id } => {
            let hidden = ProductRepo::hide(&mut *conn, product_id)
                .await
                .map_err(map_db_error)?;
            if !hidden {
                return Err(product_not_found(product_id));
            }
            Ok(product_id)
        }
    }
}

/// Write the terminal status of `decided`. Only a pending row is updated.
async fn persist_decision(
    conn: &mut PgConnection,
    decided: &Submission,
    moderator: &Moderator,
) -> Result<Submission, CoreError> {
    let id = decided.id;
    let row = SubmissionRepo::mark_decided(
        &mut *conn,
        id,
        decided.status,
        moderator.user_id(),
        decided.moderation_note.as_deref(),
    )
    .await
    .map_err(map_db_error)?
    .ok_or_else(|| CoreError::Conflict(format!("Submission {id} was decided concurrently")))?;

    tracing::info!(
        submission_id = id,
        decided_by = moderator.user_id(),
        status = %decided.status,
        "Submission decided",
    );
    Submission::try_from(row)
}

#[async_trait]
impl MarketStore for PgMarketStore {
    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(map_db_error)
    }

    async fn create_submission(&self, input: NewSubmission) -> Result<Submission, CoreError> {
        let input = input.validated()?;
        let target = input.payload.target_product_id();

        if let Some(product_id) = target {
            ProductRepo::find_available(&self.pool, product_id)
                .await
                .map_err(map_db_error)?
                .ok_or_else(|| product_not_found(product_id))?;
        }

        let payload = serde_json::to_value(&input.payload)
            .map_err(|e| CoreError::Internal(format!("Failed to encode submission payload: {e}")))?;
        let row = SubmissionRepo::create(
            &self.pool,
            &InsertSubmission {
                requester_id: input.requester,
                kind: input.payload.kind().as_str(),
                target_product_id: target,
                payload: &payload,
            },
        )
        .await
        .map_err(map_db_error)?;
        Submission::try_from(row)
    }

    async fn list_submissions(
        &self,
        filter: &SubmissionFilter,
        page: Pagination,
    ) -> Result<Vec<Submission>, CoreError> {
        SubmissionRepo::list(&self.pool, filter, page)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(Submission::try_from)
            .collect()
    }

    async fn get_submission(&self, id: DbId) -> Result<Submission, CoreError> {
        let row = SubmissionRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| submission_not_found(id))?;
        Submission::try_from(row)
    }

    async fn delete_submission(&self, id: DbId) -> Result<(), CoreError> {
        let deleted = SubmissionRepo::hard_delete(&self.pool, id)
            .await
            .map_err(map_db_error)?;
        if !deleted {
            return Err(submission_not_found(id));
        }
        Ok(())
    }

    async fn approve_submission(
        &self,
        id: DbId,
        moderator: &Moderator,
        note: Option<String>,
    ) -> Result<Approval, CoreError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let decided = lock_and_decide(&mut *tx, id, Decision::Approve, moderator, note).await?;
        let product_id = apply_effect(&mut *tx, &decided).await?;
        let submission = persist_decision(&mut *tx, &decided, moderator).await?;
        tx.commit().await.map_err(map_db_error)?;
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
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let decided = lock_and_decide(&mut *tx, id, Decision::Reject, moderator, note).await?;
        let submission = persist_decision(&mut *tx, &decided, moderator).await?;
        tx.commit().await.map_err(map_db_error)?;
        Ok(submission)
    }

    async fn create_product(&self, input: NewProduct) -> Result<Product, CoreError> {
        let row = ProductRepo::create(&self.pool, &input)
            .await
            .map_err(map_db_error)?;
        Product::try_from(row)
    }

    async fn update_product(&self, id: DbId, update: &ProductUpdate) -> Result<Product, CoreError> {
        let row = ProductRepo::update(&self.pool, id, update)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| product_not_found(id))?;
        Product::try_from(row)
    }

    async fn hide_product(&self, id: DbId) -> Result<(), CoreError> {
        let hidden = ProductRepo::hide(&self.pool, id)
            .await
            .map_err(map_db_error)?;
        if !hidden {
            return Err(product_not_found(id));
        }
        Ok(())
    }

    async fn get_product(&self, id: DbId) -> Result<Product, CoreError> {
        let row = ProductRepo::find_available(&self.pool, id)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| product_not_found(id))?;
        Product::try_from(row)
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: Pagination,
    ) -> Result<Vec<Product>, CoreError> {
        ProductRepo::list_available(&self.pool, filter, page)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }
}
