pub mod access;
pub mod cache_policy;
pub mod effects;
pub mod error;
pub mod models;
pub mod repository;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use access::{BookingAccess, CallBudget, DedupeMode, FlightAccess};
pub use effects::{EffectStatus, Listing, ReadSource, SideEffects, Step, Written};
pub use error::{AccessError, AccessResult};
pub use models::{Booking, BookingStatus, Flight, NewBooking, NewFlight};
