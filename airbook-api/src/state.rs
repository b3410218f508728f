use airbook_core::{BookingAccess, FlightAccess};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<FlightAccess>,
    pub bookings: Arc<BookingAccess>,
}
