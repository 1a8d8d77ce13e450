//! Integration tests for `PgMarketStore` against a real database.
//!
//! Covers the decision transaction end to end:
//! - Approval effects for add, modify and delete requests
//! - Rollback when the catalogue effect or the terminal mark fails
//! - Double decisions, concurrent and sequential
//! - The submission guard trigger and the decided/pending check constraint

use std::sync::Arc;

use assert_matches::assert_matches;
use kiraa_core::error::CoreError;
use kiraa_core::moderation::Moderator;
use kiraa_core::product::{NewProduct, ProductFields, ProductPatch, ProductStatus};
use kiraa_core::roles::ROLE_ADMIN;
use kiraa_core::store::{MarketStore, Pagination, SubmissionFilter};
use kiraa_core::submission::{NewSubmission, SubmissionKind, SubmissionPayload, SubmissionStatus};
use kiraa_core::types::DbId;
use kiraa_db::repositories::SubmissionRepo;
use kiraa_db::PgMarketStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn moderator(user_id: DbId) -> Moderator {
    Moderator::from_role(user_id, ROLE_ADMIN).unwrap()
}

fn drill() -> ProductFields {
    ProductFields {
        tool_name: "مثقاب".to_string(),
        category: "أدوات".to_string(),
        daily_price: "٥٠".to_string(),
        description: None,
        weekly_price: Some("300".to_string()),
        monthly_price: None,
        city: Some("الرباط".to_string()),
        phone: None,
        image_url: None,
    }
}

fn listed_product() -> NewProduct {
    NewProduct {
        name: "خلاطة إسمنت".to_string(),
        category: "بناء".to_string(),
        description: None,
        daily_price: 200.0,
        weekly_price: None,
        monthly_price: None,
        city: Some("سلا".to_string()),
        phone: None,
        image_url: None,
        rating: 4.0,
        reviews_count: 2,
        status: ProductStatus::Available,
    }
}

async fn submit(store: &PgMarketStore, payload: SubmissionPayload) -> DbId {
    store
        .create_submission(NewSubmission {
            requester: Some(5),
            payload,
        })
        .await
        .unwrap()
        .id
}

async fn product_count(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

fn sqlstate(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|e| e.code())
        .map(|code| code.into_owned())
}

// ---------------------------------------------------------------------------
// Test: approval effects by kind
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approve_add_creates_product_in_same_commit(pool: PgPool) {
    let store = PgMarketStore::new(pool.clone());
    let id = submit(&store, SubmissionPayload::Add(drill())).await;
    assert_eq!(product_count(&pool).await, 0);

    let approval = store.approve_submission(id, &moderator(1), None).await.unwrap();
    assert_eq!(approval.submission.status, SubmissionStatus::Approved);
    assert_eq!(approval.submission.decided_by, Some(1));
    assert!(approval.submission.decided_at.is_some());
    assert!(approval.submission.moderation_note.is_none());

    let product = store.get_product(approval.product_id).await.unwrap();
    assert_eq!(product.name, "مثقاب");
    assert_eq!(product.daily_price, 50.0);
    assert_eq!(product.weekly_price, Some(300.0));
    assert_eq!(product.rating, 0.0);
    assert_eq!(product.reviews_count, 0);
    assert_eq!(product_count(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approve_modify_updates_only_proposed_fields(pool: PgPool) {
    let store = PgMarketStore::new(pool);
    let product = store.create_product(listed_product()).await.unwrap();
    let id = submit(
        &store,
        SubmissionPayload::Modify {
            target_product_id: product.id,
            changes: ProductPatch {
                daily_price: Some("250".to_string()),
                ..Default::default()
            },
        },
    )
    .await;

    let approval = store.approve_submission(id, &moderator(1), None).await.unwrap();
    assert_eq!(approval.product_id, product.id);

    let updated = store.get_product(product.id).await.unwrap();
    assert_eq!(updated.daily_price, 250.0);
    assert_eq!(updated.name, product.name);
    assert_eq!(updated.city, product.city);
    assert_eq!(updated.rating, 4.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approve_delete_hides_product(pool: PgPool) {
    let store = PgMarketStore::new(pool.clone());
    let product = store.create_product(listed_product()).await.unwrap();
    let id = submit(
        &store,
        SubmissionPayload::Delete {
            target_product_id: product.id,
            reason: "تم بيعه".to_string(),
        },
    )
    .await;

    store.approve_submission(id, &moderator(1), None).await.unwrap();

    assert_matches!(store.get_product(product.id).await, Err(CoreError::NotFound { .. }));
    let (status,): (String,) = sqlx::query_as("SELECT status FROM products WHERE id = $1")
        .bind(product.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "hidden");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reject_records_empty_note_and_leaves_catalogue(pool: PgPool) {
    let store = PgMarketStore::new(pool.clone());
    let id = submit(&store, SubmissionPayload::Add(drill())).await;

    let rejected = store.reject_submission(id, &moderator(2), None).await.unwrap();
    assert_eq!(rejected.status, SubmissionStatus::Rejected);
    assert_eq!(rejected.moderation_note.as_deref(), Some(""));
    assert_eq!(product_count(&pool).await, 0);
}

// ---------------------------------------------------------------------------
// Test: rollback
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hidden_target_rolls_back_and_keeps_pending(pool: PgPool) {
    let store = PgMarketStore::new(pool);
    let product = store.create_product(listed_product()).await.unwrap();
    let id = submit(
        &store,
        SubmissionPayload::Modify {
            target_product_id: product.id,
            changes: ProductPatch {
                city: Some("طنجة".to_string()),
                ..Default::default()
            },
        },
    )
    .await;
    store.hide_product(product.id).await.unwrap();

    let result = store.approve_submission(id, &moderator(1), None).await;
    assert_matches!(result, Err(CoreError::NotFound { entity: "Product", .. }));

    let still = store.get_submission(id).await.unwrap();
    assert_eq!(still.status, SubmissionStatus::Pending);
    assert!(still.decided_at.is_none());
    assert!(still.decided_by.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_terminal_mark_rolls_back_created_product(pool: PgPool) {
    let store = PgMarketStore::new(pool.clone());
    let id = submit(&store, SubmissionPayload::Add(drill())).await;

    // Make every decision write fail after the product insert has run.
    sqlx::query(
        "CREATE FUNCTION fail_decision() RETURNS TRIGGER AS $$
         BEGIN
             RAISE EXCEPTION 'decision write refused';
         END;
         $$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER trg_fail_decision BEFORE UPDATE ON submissions
         FOR EACH ROW EXECUTE FUNCTION fail_decision()",
    )
    .execute(&pool)
    .await
    .unwrap();

    let result = store.approve_submission(id, &moderator(1), None).await;
    assert_matches!(result, Err(CoreError::Remote(_)));

    assert_eq!(product_count(&pool).await, 0);
    assert!(store.get_submission(id).await.unwrap().is_pending());
}

// ---------------------------------------------------------------------------
// Test: double decisions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_decision_is_invalid_transition(pool: PgPool) {
    let store = PgMarketStore::new(pool.clone());
    let id = submit(&store, SubmissionPayload::Add(drill())).await;
    let approved = store.approve_submission(id, &moderator(1), None).await.unwrap();

    let again = store.reject_submission(id, &moderator(2), Some("متأخر".into())).await;
    assert_matches!(
        again,
        Err(CoreError::InvalidTransition { status: SubmissionStatus::Approved, .. })
    );

    assert_eq!(store.get_submission(id).await.unwrap(), approved.submission);
    assert_eq!(product_count(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_approvals_apply_effect_once(pool: PgPool) {
    let store = Arc::new(PgMarketStore::new(pool.clone()));
    let id = submit(&store, SubmissionPayload::Add(drill())).await;
    let (alice, bob) = (moderator(1), moderator(2));

    let (first, second) = tokio::join!(
        store.approve_submission(id, &alice, None),
        store.approve_submission(id, &bob, None),
    );

    let outcomes = [first.is_ok(), second.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    let loser = if first.is_ok() { second } else { first };
    assert_matches!(loser, Err(CoreError::InvalidTransition { .. }));
    assert_eq!(product_count(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_decided_skips_terminal_rows(pool: PgPool) {
    let store = PgMarketStore::new(pool.clone());
    let id = submit(&store, SubmissionPayload::Add(drill())).await;
    store.reject_submission(id, &moderator(1), None).await.unwrap();

    let row = SubmissionRepo::mark_decided(&pool, id, SubmissionStatus::Approved, 2, None)
        .await
        .unwrap();
    assert!(row.is_none());
    assert_eq!(store.get_submission(id).await.unwrap().status, SubmissionStatus::Rejected);
}

// ---------------------------------------------------------------------------
// Test: schema guards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_kind_and_target_are_immutable(pool: PgPool) {
    let store = PgMarketStore::new(pool.clone());
    let product = store.create_product(listed_product()).await.unwrap();
    let other = store.create_product(listed_product()).await.unwrap();
    let id = submit(
        &store,
        SubmissionPayload::Delete {
            target_product_id: product.id,
            reason: String::new(),
        },
    )
    .await;

    let retarget = sqlx::query("UPDATE submissions SET target_product_id = $2 WHERE id = $1")
        .bind(id)
        .bind(other.id)
        .execute(&pool)
        .await
        .unwrap_err();
    assert_eq!(sqlstate(&retarget).as_deref(), Some("23514"));

    let rekind = sqlx::query("UPDATE submissions SET kind = 'modify' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap_err();
    assert_eq!(sqlstate(&rekind).as_deref(), Some("23514"));

    store.approve_submission(id, &moderator(1), None).await.unwrap();
    let after = store.get_submission(id).await.unwrap();
    assert_eq!(after.kind(), SubmissionKind::Delete);
    assert_eq!(after.target_product_id(), Some(product.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_terminal_rows_cannot_be_reopened(pool: PgPool) {
    let store = PgMarketStore::new(pool.clone());
    let id = submit(&store, SubmissionPayload::Add(drill())).await;
    store.approve_submission(id, &moderator(1), None).await.unwrap();

    let reopen = sqlx::query(
        "UPDATE submissions SET status = 'pending', decided_at = NULL, decided_by = NULL
         WHERE id = $1",
    )
    .bind(id)
    .execute(&pool)
    .await
    .unwrap_err();
    assert_eq!(sqlstate(&reopen).as_deref(), Some("23514"));
    assert_eq!(store.get_submission(id).await.unwrap().status, SubmissionStatus::Approved);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_decided_status_requires_decided_at(pool: PgPool) {
    let store = PgMarketStore::new(pool.clone());
    let id = submit(&store, SubmissionPayload::Add(drill())).await;

    let err = sqlx::query("UPDATE submissions SET status = 'approved' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap_err();
    assert_eq!(sqlstate(&err).as_deref(), Some("23514"));

    let pending = store
        .list_submissions(&SubmissionFilter::pending(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, id);
}
