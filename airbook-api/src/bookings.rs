use airbook_core::{Booking, NewBooking};
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    routing::get,
    Router,
};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;
use crate::CreatedResponse;

pub fn routes() -> Router<AppState> {
    Router::new().route("/bookings", get(list_bookings).post(add_booking))
}

async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, AppError> {
    let listing = state.bookings.list_bookings().await?;
    Ok(Json(listing.items))
}

async fn add_booking(
    State(state): State<AppState>,
    payload: Result<Json<NewBooking>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let Json(booking) = payload?;
    let written = state.bookings.add_booking(booking).await?;

    let degraded = written.effects.failures().count();
    if degraded > 0 {
        info!("Booking {} created with {} degraded side effects", written.value.id, degraded);
    }

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: written.value.id,
            message: "Booking created successfully",
        }),
    ))
}
