use async_trait::async_trait;
use std::time::Duration;

use crate::models::{Booking, Flight, NewBooking, NewFlight};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(#[source] BoxError),
    #[error("row decode failed: {0}")]
    Decode(#[source] BoxError),
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(#[source] BoxError),
    #[error("cache call exceeded {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("event delivery failed: {0}")]
    Delivery(#[source] BoxError),
    #[error("event payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("event delivery exceeded {0:?}")]
    Timeout(Duration),
}

/// Relational storage for the flight catalog.
///
/// `fetch_all` makes no ordering promise. Callers must treat the result as
/// a set.
#[async_trait]
pub trait FlightStore: Send + Sync {
    /// Inserts the flight and returns the store-assigned id.
    async fn insert(&self, flight: &NewFlight) -> Result<i64, StoreError>;

    async fn fetch_all(&self) -> Result<Vec<Flight>, StoreError>;
}

/// Relational storage for bookings. Same ordering contract as [`FlightStore`].
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, booking: &NewBooking) -> Result<i64, StoreError>;

    async fn fetch_all(&self) -> Result<Vec<Booking>, StoreError>;
}

/// Key-value cache with per-key expiry.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Atomically sets `key` only when it is absent. Returns `true` when
    /// this call created the entry.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, CacheError>;
}

/// Synchronous delivery of a keyed payload to a topic.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), PublishError>;
}
