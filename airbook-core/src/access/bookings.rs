use std::sync::Arc;
use tracing::{info, warn};

use super::{cache_call, read_through, store_call, CallBudget, DedupeMode, EventSink};
use crate::cache_policy::{dedupe_key, BOOKINGS_ALL, BOOKINGS_TTL, BOOKING_CREATED, DEDUPE_TTL};
use crate::effects::{EffectStatus, Listing, SideEffects, Step, Written};
use crate::error::{AccessError, AccessResult};
use crate::models::{Booking, NewBooking};
use crate::repository::{BookingStore, Cache, CacheError, EventPublisher};

/// Booking access: duplicate-suppressed inserts with a `booking_created`
/// event, and a short-lived cached listing.
///
/// The dedupe marker is advisory. In [`DedupeMode::Advisory`] the
/// check, insert and marker write are separate calls, so two concurrent
/// requests for the same passenger and flight can both be admitted. A hard
/// guarantee needs a unique constraint in the store.
pub struct BookingAccess {
    store: Arc<dyn BookingStore>,
    cache: Arc<dyn Cache>,
    events: EventSink,
    budget: CallBudget,
    dedupe: DedupeMode,
}

impl BookingAccess {
    pub fn new(
        store: Arc<dyn BookingStore>,
        cache: Arc<dyn Cache>,
        publisher: Arc<dyn EventPublisher>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            store,
            cache,
            events: EventSink::new(publisher, topic),
            budget: CallBudget::default(),
            dedupe: DedupeMode::default(),
        }
    }

    pub fn with_budget(mut self, budget: CallBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_dedupe_mode(mut self, mode: DedupeMode) -> Self {
        self.dedupe = mode;
        self
    }

    /// Never invalidated by [`BookingAccess::add_booking`]; a new booking
    /// can take up to the 30s TTL to show up in a cached listing.
    pub async fn list_bookings(&self) -> AccessResult<Listing<Booking>> {
        read_through(
            self.cache.as_ref(),
            self.budget,
            BOOKINGS_ALL,
            BOOKINGS_TTL,
            "fetch bookings",
            || self.store.fetch_all(),
        )
        .await
    }

    pub async fn add_booking(&self, booking: NewBooking) -> AccessResult<Written<Booking>> {
        let key = dedupe_key(&booking.passenger, booking.flight_id);
        let mut effects = SideEffects::default();

        let claimed = match self.dedupe {
            DedupeMode::Advisory => {
                self.check_marker(&key, &booking, &mut effects).await?;
                false
            }
            DedupeMode::Locked => self.claim_marker(&key, &booking, &mut effects).await?,
        };

        let id = match store_call(self.budget.store, "insert booking", self.store.insert(&booking)).await {
            Ok(id) => id,
            Err(e) => {
                // A timed-out insert may still commit, so the claim stays.
                if claimed && matches!(e, AccessError::Store { .. }) {
                    self.release_marker(&key, &mut effects).await;
                }
                return Err(e);
            }
        };
        let booking = booking.with_id(id);

        match serde_json::to_string(&booking) {
            Ok(payload) => {
                let marked = cache_call(
                    self.budget.cache,
                    self.cache.set_with_ttl(&key, &payload, DEDUPE_TTL),
                )
                .await;
                match marked {
                    Ok(()) => {
                        info!("Booking cached for dedupe: {}", key);
                        effects.record(Step::DedupeMark, key.as_str(), EffectStatus::Applied);
                    }
                    Err(e) => {
                        warn!("Failed to cache booking {}: {}", key, e);
                        effects.failed(Step::DedupeMark, key.as_str(), e);
                    }
                }
            }
            Err(e) => {
                warn!("Failed to encode booking {} for cache: {}", key, e);
                effects.failed(Step::DedupeMark, key.as_str(), e);
            }
        }

        self.events
            .emit(self.budget.publish, BOOKING_CREATED, &booking, &mut effects)
            .await;

        Ok(Written {
            value: booking,
            effects,
        })
    }

    /// A cache error counts as "not found" so bookings keep flowing while
    /// the cache is down.
    async fn check_marker(
        &self,
        key: &str,
        booking: &NewBooking,
        effects: &mut SideEffects,
    ) -> AccessResult<()> {
        match cache_call(self.budget.cache, self.cache.exists(key)).await {
            Ok(true) => {
                info!("Rejecting duplicate booking {}", key);
                Err(duplicate(booking))
            }
            Ok(false) => {
                effects.record(Step::DedupeCheck, key, EffectStatus::Applied);
                Ok(())
            }
            Err(e) => {
                warn!("Dedupe check for {} failed, admitting booking: {}", key, e);
                effects.failed(Step::DedupeCheck, key, e);
                Ok(())
            }
        }
    }

    /// Returns whether this call owns the marker.
    async fn claim_marker(
        &self,
        key: &str,
        booking: &NewBooking,
        effects: &mut SideEffects,
    ) -> AccessResult<bool> {
        let claim = match serde_json::to_string(booking) {
            Ok(payload) => {
                cache_call(
                    self.budget.cache,
                    self.cache.set_if_absent(key, &payload, DEDUPE_TTL),
                )
                .await
            }
            Err(e) => Err(CacheError::Backend(Box::new(e))),
        };

        match claim {
            Ok(true) => {
                effects.record(Step::DedupeCheck, key, EffectStatus::Applied);
                Ok(true)
            }
            Ok(false) => {
                info!("Rejecting duplicate booking {}", key);
                Err(duplicate(booking))
            }
            Err(e) => {
                warn!("Dedupe claim for {} failed, admitting booking: {}", key, e);
                effects.failed(Step::DedupeCheck, key, e);
                Ok(false)
            }
        }
    }

    async fn release_marker(&self, key: &str, effects: &mut SideEffects) {
        match cache_call(self.budget.cache, self.cache.delete(key)).await {
            Ok(()) => effects.record(Step::DedupeRelease, key, EffectStatus::Applied),
            Err(e) => {
                warn!("Failed to release dedupe claim {}: {}", key, e);
                effects.failed(Step::DedupeRelease, key, e);
            }
        }
    }
}

fn duplicate(booking: &NewBooking) -> AccessError {
    AccessError::Duplicate {
        passenger: booking.passenger.clone(),
        flight_id: booking.flight_id,
    }
}
