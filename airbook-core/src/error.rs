use std::time::Duration;

use crate::repository::StoreError;

/// Failures that reach the caller. Cache and publish errors are absorbed by
/// the access components and never appear here.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("duplicate booking detected for passenger {passenger} and flight {flight_id}")]
    Duplicate { passenger: String, flight_id: i64 },

    #[error("failed to {context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("store call to {operation} exceeded {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl AccessError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, AccessError::Duplicate { .. })
    }
}

pub type AccessResult<T> = Result<T, AccessError>;
