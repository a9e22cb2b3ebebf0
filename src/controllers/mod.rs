pub mod seats;
pub mod tickets;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use std::sync::Arc;
use validator::ValidationErrors;

use crate::error::BookingError;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(seats::routes())
        .merge(tickets::routes())
}

/// Ошибка HTTP-слоя: ошибки ядра отдаются как есть, плюс невалидный запрос.
#[derive(Debug)]
pub enum ApiError {
    Booking(BookingError),
    Validation(ValidationErrors),
    /// Тело запроса не разобралось: не JSON, нет поля, неверный тип
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        ApiError::Booking(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Validation(err)
    }
}

pub fn status_for(err: &BookingError) -> StatusCode {
    match err {
        BookingError::SeatTaken { .. } => StatusCode::CONFLICT,
        BookingError::SeatOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        BookingError::NotFound(_) => StatusCode::NOT_FOUND,
        BookingError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Booking(err) => {
                if let BookingError::StoreUnavailable(ref reason) = err {
                    tracing::error!("store unavailable: {}", reason);
                }
                (status_for(&err), err.kind(), err.to_string())
            }
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, "Validation", errors.to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "BadRequest", message),
        };

        (status, Json(serde_json::json!({ "error": kind, "message": message }))).into_response()
    }
}
