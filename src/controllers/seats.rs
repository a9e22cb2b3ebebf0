use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use super::ApiError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/showings/{showing_id}/seats", get(get_seat_map))
        .route("/showings/{showing_id}/seats/{seat_number}", get(get_seat_availability))
}

// GET /api/showings/{showing_id}/seats
async fn get_seat_map(
    State(state): State<Arc<AppState>>,
    Path(showing_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let map = state.booking.inventory().availability(showing_id).await?;
    Ok((StatusCode::OK, Json(map)))
}

#[derive(Debug, Serialize)]
struct SeatAvailabilityResponse {
    showing_id: i64,
    seat_number: u32,
    available: bool,
}

// GET /api/showings/{showing_id}/seats/{seat_number}
async fn get_seat_availability(
    State(state): State<Arc<AppState>>,
    Path((showing_id, seat_number)): Path<(i64, u32)>,
) -> Result<impl IntoResponse, ApiError> {
    let available = state
        .booking
        .inventory()
        .is_available(showing_id, seat_number)
        .await?;

    Ok((
        StatusCode::OK,
        Json(SeatAvailabilityResponse { showing_id, seat_number, available }),
    ))
}
