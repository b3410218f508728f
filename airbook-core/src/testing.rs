//! In-memory collaborators for exercising the access components.
//!
//! The store fakes hand rows back newest-first so tests never come to rely
//! on insertion order.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::models::{Booking, Flight, NewBooking, NewFlight};
use crate::repository::{
    BookingStore, Cache, CacheError, EventPublisher, FlightStore, PublishError, StoreError,
};

pub struct MemoryStore<T> {
    rows: Mutex<Vec<T>>,
    next_id: AtomicI64,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    inserts: AtomicUsize,
    fetches: AtomicUsize,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            failing: AtomicBool::new(false),
            delay: Mutex::new(None),
            inserts: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every call sleeps this long before answering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn rows(&self) -> Vec<T> {
        self.rows.lock().unwrap().clone()
    }

    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), StoreError> {
        stall(&self.delay).await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Query("connection refused".into()));
        }
        Ok(())
    }

    async fn push(&self, build: impl FnOnce(i64) -> T) -> Result<i64, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.rows.lock().unwrap().push(build(id));
        Ok(id)
    }

    async fn scan(&self) -> Result<Vec<T>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        let mut rows = self.rows.lock().unwrap().clone();
        rows.reverse();
        Ok(rows)
    }
}

impl<T: Clone> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlightStore for MemoryStore<Flight> {
    async fn insert(&self, flight: &NewFlight) -> Result<i64, StoreError> {
        self.push(|id| flight.clone().with_id(id)).await
    }

    async fn fetch_all(&self) -> Result<Vec<Flight>, StoreError> {
        self.scan().await
    }
}

#[async_trait]
impl BookingStore for MemoryStore<Booking> {
    async fn insert(&self, booking: &NewBooking) -> Result<i64, StoreError> {
        self.push(|id| booking.clone().with_id(id)).await
    }

    async fn fetch_all(&self) -> Result<Vec<Booking>, StoreError> {
        self.scan().await
    }
}

async fn stall(delay: &Mutex<Option<Duration>>) {
    let delay = *delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

/// Expiry is not simulated; the TTL of each entry is kept for inspection
/// and [`MemoryCache::expire`] drops an entry by hand.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Duration)>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every call sleeps this long before answering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn value_of(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone())
    }

    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), Duration::ZERO));
    }

    pub fn expire(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    async fn enter(&self) -> Result<(), CacheError> {
        stall(&self.delay).await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("cache unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.enter().await?;
        Ok(self.value_of(key))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.enter().await?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.enter().await?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.enter().await?;
        Ok(self.entries.lock().unwrap().contains_key(key))
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, CacheError> {
        self.enter().await?;
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), (value.to_string(), ttl));
        Ok(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedEvent {
    pub topic: String,
    pub key: String,
    pub payload: String,
}

/// Records every publish attempt, including the ones it fails.
#[derive(Default)]
pub struct RecordingPublisher {
    attempts: Mutex<Vec<PublishedEvent>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn attempts(&self) -> Vec<PublishedEvent> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), PublishError> {
        self.attempts.lock().unwrap().push(PublishedEvent {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.to_string(),
        });
        stall(&self.delay).await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::Delivery("broker unavailable".into()));
        }
        Ok(())
    }
}
