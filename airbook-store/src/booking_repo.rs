use airbook_core::models::{Booking, BookingStatus, NewBooking};
use airbook_core::repository::{BookingStore, StoreError};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    flight_id: i64,
    passenger: String,
    seats: i32,
    total_price: f64,
    status: String,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            flight_id: row.flight_id,
            passenger: row.passenger,
            seats: row.seats,
            total_price: row.total_price,
            status: BookingStatus::from(row.status),
        }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn insert(&self, booking: &NewBooking) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO bookings (flight_id, passenger, seats, total_price, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(booking.flight_id)
        .bind(&booking.passenger)
        .bind(booking.seats)
        .bind(booking.total_price)
        .bind(booking.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(crate::store_error)
    }

    async fn fetch_all(&self) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT id, flight_id, passenger, seats, total_price, status FROM bookings",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(crate::store_error)?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }
}
