//! Cache key layout and expiry policy shared by the access components.

use std::time::Duration;

pub const FLIGHTS_ALL: &str = "flights:all";
pub const BOOKINGS_ALL: &str = "bookings:all";

/// Invalidated on every successful flight insert.
pub const FLIGHTS_TTL: Duration = Duration::from_secs(10 * 60);
/// Never invalidated; staleness is bounded by this window alone.
pub const BOOKINGS_TTL: Duration = Duration::from_secs(30);
pub const DEDUPE_TTL: Duration = Duration::from_secs(60 * 60);

pub const BOOKING_CREATED: &str = "booking_created";
pub const FLIGHT_CREATED: &str = "flight_created";

pub fn dedupe_key(passenger: &str, flight_id: i64) -> String {
    format!("booking:{}:{}", passenger, flight_id)
}
