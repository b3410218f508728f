//! Data-access components: cache-aside reads, invalidating writes, the
//! booking dedupe guard and post-write event emission.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::effects::{EffectStatus, Listing, ReadSource, SideEffects, Step};
use crate::error::AccessError;
use crate::repository::{Cache, CacheError, EventPublisher, PublishError, StoreError};

pub mod bookings;
pub mod flights;

pub use bookings::BookingAccess;
pub use flights::FlightAccess;

/// Per-call deadlines for each collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallBudget {
    pub store: Duration,
    pub cache: Duration,
    pub publish: Duration,
}

impl Default for CallBudget {
    fn default() -> Self {
        Self {
            store: Duration::from_secs(5),
            cache: Duration::from_secs(1),
            publish: Duration::from_secs(5),
        }
    }
}

/// How `add_booking` guards against duplicate (passenger, flight) pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupeMode {
    /// Check the marker, insert, then write the marker. Two concurrent
    /// requests can both pass the check.
    #[default]
    Advisory,
    /// Claim the marker with an atomic set-if-absent before inserting.
    ///
    /// The claim is released when the store rejects the insert. After a
    /// store timeout the row may still land, so the claim is kept and the
    /// pair stays blocked until the marker expires.
    Locked,
}

pub(crate) async fn store_call<T, F>(
    limit: Duration,
    context: &'static str,
    call: F,
) -> Result<T, AccessError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => {
            error!("Store failure while trying to {}: {}", context, source);
            Err(AccessError::Store { context, source })
        }
        Err(_) => {
            error!("Store call to {} timed out after {:?}", context, limit);
            Err(AccessError::Timeout {
                operation: context,
                after: limit,
            })
        }
    }
}

pub(crate) async fn cache_call<T, F>(limit: Duration, call: F) -> Result<T, CacheError>
where
    F: Future<Output = Result<T, CacheError>>,
{
    timeout(limit, call)
        .await
        .unwrap_or(Err(CacheError::Timeout(limit)))
}

/// Publisher handle bound to a topic.
#[derive(Clone)]
pub struct EventSink {
    publisher: Arc<dyn EventPublisher>,
    topic: String,
}

impl EventSink {
    pub fn new(publisher: Arc<dyn EventPublisher>, topic: impl Into<String>) -> Self {
        Self {
            publisher,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Fire-and-forget from the caller's view: failures are logged and
    /// recorded, never returned.
    pub(crate) async fn emit<T: Serialize>(
        &self,
        limit: Duration,
        key: &str,
        value: &T,
        effects: &mut SideEffects,
    ) {
        let target = format!("{}/{}", self.topic, key);
        let outcome = match serde_json::to_string(value) {
            Ok(payload) => timeout(limit, self.publisher.publish(&self.topic, key, &payload))
                .await
                .unwrap_or(Err(PublishError::Timeout(limit))),
            Err(e) => Err(PublishError::from(e)),
        };

        match outcome {
            Ok(()) => {
                info!("Published {} event to {}", key, self.topic);
                effects.record(Step::Publish, target, EffectStatus::Applied);
            }
            Err(e) => {
                error!("Failed to publish {} event to {}: {}", key, self.topic, e);
                effects.failed(Step::Publish, target, e);
            }
        }
    }
}

/// Cache-aside read shared by both list operations.
///
/// A hit that decodes cleanly is returned without touching the store. A
/// miss, an undecodable payload or a cache error falls back to `load`; a
/// non-empty store result is written back with `ttl`.
pub(crate) async fn read_through<T, F, Fut>(
    cache: &dyn Cache,
    budget: CallBudget,
    key: &str,
    ttl: Duration,
    context: &'static str,
    load: F,
) -> Result<Listing<T>, AccessError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, StoreError>>,
{
    let mut effects = SideEffects::default();

    match cache_call(budget.cache, cache.get(key)).await {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => {
                info!("{} served from cache", key);
                effects.record(Step::CacheLookup, key, EffectStatus::Applied);
                return Ok(Listing {
                    items,
                    source: ReadSource::Cache,
                    effects,
                });
            }
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                effects.failed(Step::CacheLookup, key, e);
            }
        },
        Ok(None) => effects.record(Step::CacheLookup, key, EffectStatus::Skipped),
        Err(e) => {
            warn!("Cache read for {} failed, falling back to store: {}", key, e);
            effects.failed(Step::CacheLookup, key, e);
        }
    }

    let items = store_call(budget.store, context, load()).await?;

    if items.is_empty() {
        effects.record(Step::CacheFill, key, EffectStatus::Skipped);
    } else {
        let written = match serde_json::to_string(&items) {
            Ok(payload) => cache_call(budget.cache, cache.set_with_ttl(key, &payload, ttl)).await,
            Err(e) => Err(CacheError::Backend(Box::new(e))),
        };
        match written {
            Ok(()) => {
                info!("Cached {} ({} entries, ttl {:?})", key, items.len(), ttl);
                effects.record(Step::CacheFill, key, EffectStatus::Applied);
            }
            Err(e) => {
                warn!("Failed to cache {}: {}", key, e);
                effects.failed(Step::CacheFill, key, e);
            }
        }
    }

    Ok(Listing {
        items,
        source: ReadSource::Store,
        effects,
    })
}
