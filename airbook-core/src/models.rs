use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scheduled flight as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: i64,
    pub airline: String,
    pub source: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub price: f64,
    pub available_seats: i32,
}

/// Flight submitted for insertion; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFlight {
    pub airline: String,
    pub source: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub price: f64,
    pub available_seats: i32,
}

impl NewFlight {
    pub fn with_id(self, id: i64) -> Flight {
        Flight {
            id,
            airline: self.airline,
            source: self.source,
            destination: self.destination,
            departure: self.departure,
            arrival: self.arrival,
            price: self.price,
            available_seats: self.available_seats,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub flight_id: i64,
    pub passenger: String,
    pub seats: i32,
    pub total_price: f64,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub flight_id: i64,
    pub passenger: String,
    pub seats: i32,
    pub total_price: f64,
    #[serde(default)]
    pub status: BookingStatus,
}

impl NewBooking {
    pub fn with_id(self, id: i64) -> Booking {
        Booking {
            id,
            flight_id: self.flight_id,
            passenger: self.passenger,
            seats: self.seats,
            total_price: self.total_price,
            status: self.status,
        }
    }
}

/// Booking status tag. The set is open: unknown tags survive a round trip
/// through the store and the cache unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Pending,
    Cancelled,
    Other(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Pending => "pending",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Other(tag) => tag,
        }
    }
}

impl From<String> for BookingStatus {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "confirmed" => BookingStatus::Confirmed,
            "pending" => BookingStatus::Pending,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Other(tag),
        }
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_tags_round_trip() {
        let json = serde_json::to_string(&BookingStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");

        let custom: BookingStatus = serde_json::from_str("\"waitlisted\"").unwrap();
        assert_eq!(custom, BookingStatus::Other("waitlisted".to_string()));
        assert_eq!(serde_json::to_string(&custom).unwrap(), "\"waitlisted\"");
    }

    #[test]
    fn test_new_booking_defaults_to_confirmed() {
        let booking: NewBooking = serde_json::from_str(
            r#"{"flight_id": 42, "passenger": "alice", "seats": 2, "total_price": 300.0}"#,
        )
        .unwrap();

        assert_eq!(booking.status, BookingStatus::Confirmed);
        let stored = booking.with_id(7);
        assert_eq!(stored.id, 7);
        assert_eq!(stored.flight_id, 42);
    }
}
