//! Durable event persistence.
//!
//! [`EventPersistence`] drains an [`EventBus`](crate::bus::EventBus)
//! receiver into the `market_events` table until the bus is dropped.

use kiraa_core::types::DbId;
use kiraa_db::repositories::{EventRepo, InsertMarketEvent};
use kiraa_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::MarketEvent;

/// Background service that appends market events to the audit table.
pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop. Exits when the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<MarketEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    async fn persist(pool: &DbPool, event: &MarketEvent) -> Result<DbId, sqlx::Error> {
        EventRepo::insert(
            pool,
            &InsertMarketEvent {
                event_type: &event.event_type,
                submission_id: event.submission_id,
                product_id: event.product_id,
                actor_user_id: event.actor_user_id,
                payload: &event.payload,
                occurred_at: event.timestamp,
            },
        )
        .await
    }
}
