pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod events;
pub mod flight_repo;
pub mod redis_repo;

use airbook_core::repository::StoreError;

pub use booking_repo::PgBookingStore;
pub use database::DbClient;
pub use events::KafkaPublisher;
pub use flight_repo::PgFlightStore;
pub use redis_repo::RedisCache;

pub(crate) fn store_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Decode(Box::new(e))
        }
        other => StoreError::Query(Box::new(other)),
    }
}
