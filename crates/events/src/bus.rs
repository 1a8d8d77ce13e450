//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Handlers publish a [`MarketEvent`] after each successful submission
//! lifecycle change. Share the bus as `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use kiraa_core::submission::Submission;
use kiraa_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Well-known event type names.
pub mod event_types {
    pub const SUBMISSION_CREATED: &str = "submission.created";
    pub const SUBMISSION_APPROVED: &str = "submission.approved";
    pub const SUBMISSION_REJECTED: &str = "submission.rejected";
    pub const SUBMISSION_DELETED: &str = "submission.deleted";
}

// ---------------------------------------------------------------------------
// MarketEvent
// ---------------------------------------------------------------------------

/// Something that happened to a submission or the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Dot-separated event name, e.g. `"submission.approved"`.
    pub event_type: String,
    pub submission_id: Option<DbId>,
    /// The catalogue product the event concerns, when known.
    pub product_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl MarketEvent {
    /// Create an event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            submission_id: None,
            product_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Event for a submission, carrying its kind, status and target product.
    pub fn for_submission(event_type: &str, submission: &Submission) -> Self {
        let mut event = Self::new(event_type)
            .with_submission(submission.id)
            .with_payload(serde_json::json!({
                "kind": submission.kind(),
                "status": submission.status,
            }));
        if let Some(target) = submission.target_product_id() {
            event = event.with_product(target);
        }
        event
    }

    pub fn with_submission(mut self, submission_id: DbId) -> Self {
        self.submission_id = Some(submission_id);
        self
    }

    pub fn with_product(mut self, product_id: DbId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use kiraa_events::bus::{event_types, EventBus, MarketEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(MarketEvent::new(event_types::SUBMISSION_CREATED));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<MarketEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// Slow receivers observe `RecvError::Lagged` once the buffer overflows.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped if nobody is listening.
    pub fn publish(&self, event: MarketEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
