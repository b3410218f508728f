use airbook_core::{Flight, NewFlight};
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    routing::get,
    Router,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::CreatedResponse;

pub fn routes() -> Router<AppState> {
    Router::new().route("/flights", get(list_flights).post(add_flight))
}

async fn list_flights(State(state): State<AppState>) -> Result<Json<Vec<Flight>>, AppError> {
    let listing = state.flights.list_flights().await?;
    Ok(Json(listing.items))
}

async fn add_flight(
    State(state): State<AppState>,
    payload: Result<Json<NewFlight>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let Json(flight) = payload?;
    let written = state.flights.add_flight(flight).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: written.value.id,
            message: "Flight added successfully",
        }),
    ))
}
