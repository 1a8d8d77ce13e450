//! Kiraa marketplace events.
//!
//! - [`EventBus`]: in-process fan-out of [`MarketEvent`]s over
//!   `tokio::sync::broadcast`.
//! - [`EventPersistence`]: background task appending every event to the
//!   `market_events` audit table.

pub mod bus;
pub mod persistence;

pub use bus::{EventBus, MarketEvent};
pub use persistence::EventPersistence;
