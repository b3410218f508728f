use std::sync::Arc;
use tracing::{info, warn};

use super::{cache_call, read_through, store_call, CallBudget, EventSink};
use crate::cache_policy::{FLIGHTS_ALL, FLIGHTS_TTL, FLIGHT_CREATED};
use crate::effects::{EffectStatus, Listing, SideEffects, Step, Written};
use crate::error::AccessResult;
use crate::models::{Flight, NewFlight};
use crate::repository::{Cache, EventPublisher, FlightStore};

/// Flight catalog access: cache-aside listing and invalidate-on-write inserts.
pub struct FlightAccess {
    store: Arc<dyn FlightStore>,
    cache: Arc<dyn Cache>,
    events: Option<EventSink>,
    budget: CallBudget,
}

impl FlightAccess {
    pub fn new(store: Arc<dyn FlightStore>, cache: Arc<dyn Cache>) -> Self {
        Self {
            store,
            cache,
            events: None,
            budget: CallBudget::default(),
        }
    }

    /// Announce inserted flights as `flight_created` events on `topic`.
    pub fn with_events(mut self, publisher: Arc<dyn EventPublisher>, topic: impl Into<String>) -> Self {
        self.events = Some(EventSink::new(publisher, topic));
        self
    }

    pub fn with_budget(mut self, budget: CallBudget) -> Self {
        self.budget = budget;
        self
    }

    pub async fn list_flights(&self) -> AccessResult<Listing<Flight>> {
        read_through(
            self.cache.as_ref(),
            self.budget,
            FLIGHTS_ALL,
            FLIGHTS_TTL,
            "fetch flights",
            || self.store.fetch_all(),
        )
        .await
    }

    /// Inserts the flight, then drops the cached catalog. A failed
    /// invalidation leaves the old listing readable until its TTL runs out.
    pub async fn add_flight(&self, flight: NewFlight) -> AccessResult<Written<Flight>> {
        let id = store_call(self.budget.store, "insert flight", self.store.insert(&flight)).await?;
        let flight = flight.with_id(id);
        let mut effects = SideEffects::default();

        match cache_call(self.budget.cache, self.cache.delete(FLIGHTS_ALL)).await {
            Ok(()) => {
                info!("Cache invalidated after flight insert: {}", FLIGHTS_ALL);
                effects.record(Step::CacheInvalidate, FLIGHTS_ALL, EffectStatus::Applied);
            }
            Err(e) => {
                warn!("Failed to invalidate {} after inserting flight {}: {}", FLIGHTS_ALL, id, e);
                effects.failed(Step::CacheInvalidate, FLIGHTS_ALL, e);
            }
        }

        if let Some(events) = &self.events {
            events
                .emit(self.budget.publish, FLIGHT_CREATED, &flight, &mut effects)
                .await;
        }

        Ok(Written {
            value: flight,
            effects,
        })
    }
}
