use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::ApiError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/showings/{showing_id}/tickets", post(book_seat).get(get_showing_tickets))
        .route("/tickets/{ticket_id}", get(get_ticket).delete(delete_ticket))
        .route("/customers/{customer_id}/tickets", get(get_customer_tickets))
}

// POST /api/showings/{showing_id}/tickets
#[derive(Debug, Deserialize, Validate)]
struct BookSeatRequest {
    #[validate(range(min = 1))]
    customer_id: i64,
    // 0 и места за пределами зала отклоняет сама транзакция (SeatOutOfRange)
    seat_number: u32,
}

async fn book_seat(
    State(state): State<Arc<AppState>>,
    Path(showing_id): Path<i64>,
    payload: Result<Json<BookSeatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // отказ экстрактора отдаём 400 в общем формате, а не 422 текстом от axum
    let Json(req) = payload?;
    req.validate()?;

    let ticket = state
        .booking
        .book_seat(showing_id, req.customer_id, req.seat_number)
        .await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

// GET /api/showings/{showing_id}/tickets
async fn get_showing_tickets(
    State(state): State<Arc<AppState>>,
    Path(showing_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let tickets = state.booking.showing_tickets(showing_id).await?;
    Ok((StatusCode::OK, Json(tickets)))
}

// GET /api/tickets/{ticket_id}
async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = state.booking.get_ticket(ticket_id).await?;
    Ok((StatusCode::OK, Json(ticket)))
}

// DELETE /api/tickets/{ticket_id}
async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.booking.delete_ticket(ticket_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/customers/{customer_id}/tickets
async fn get_customer_tickets(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let tickets = state.booking.customer_tickets(customer_id).await?;
    Ok((StatusCode::OK, Json(tickets)))
}
