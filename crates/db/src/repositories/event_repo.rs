//! Repository for the `market_events` audit table.

use kiraa_core::types::{DbId, Timestamp};
use sqlx::PgPool;

/// Fields for appending one event.
pub struct InsertMarketEvent<'a> {
    pub event_type: &'a str,
    pub submission_id: Option<DbId>,
    pub product_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: &'a serde_json::Value,
    pub occurred_at: Timestamp,
}

/// Append-only access to market events.
pub struct EventRepo;

impl EventRepo {
    /// Append an event, returning its ID.
    pub async fn insert(pool: &PgPool, input: &InsertMarketEvent<'_>) -> Result<DbId, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO market_events
                (event_type, submission_id, product_id, actor_user_id, payload, occurred_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(input.event_type)
        .bind(input.submission_id)
        .bind(input.product_id)
        .bind(input.actor_user_id)
        .bind(input.payload)
        .bind(input.occurred_at)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }
}
