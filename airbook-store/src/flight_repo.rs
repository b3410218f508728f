use airbook_core::models::{Flight, NewFlight};
use airbook_core::repository::{FlightStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PgFlightStore {
    pool: PgPool,
}

impl PgFlightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: i64,
    airline: String,
    source: String,
    destination: String,
    departure: DateTime<Utc>,
    arrival: DateTime<Utc>,
    price: f64,
    available_seats: i32,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            airline: row.airline,
            source: row.source,
            destination: row.destination,
            departure: row.departure,
            arrival: row.arrival,
            price: row.price,
            available_seats: row.available_seats,
        }
    }
}

#[async_trait]
impl FlightStore for PgFlightStore {
    async fn insert(&self, flight: &NewFlight) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO flights (airline, source, destination, departure, arrival, price, available_seats)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&flight.airline)
        .bind(&flight.source)
        .bind(&flight.destination)
        .bind(flight.departure)
        .bind(flight.arrival)
        .bind(flight.price)
        .bind(flight.available_seats)
        .fetch_one(&self.pool)
        .await
        .map_err(crate::store_error)
    }

    // No ORDER BY: row order is whatever the scan returns.
    async fn fetch_all(&self) -> Result<Vec<Flight>, StoreError> {
        let rows = sqlx::query_as::<_, FlightRow>(
            r#"
            SELECT id, airline, source, destination, departure, arrival, price, available_seats
            FROM flights
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(crate::store_error)?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }
}
