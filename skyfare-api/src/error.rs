use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use skyfare_booking::BookingError;
use skyfare_core::StoreError;

#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Booking(BookingError),
    Store(StoreError),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Booking(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Booking(err) => match &err {
                BookingError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                BookingError::FlightNotFound(_)
                | BookingError::NotFound(_)
                | BookingError::UnknownSeatClass(_) => (StatusCode::NOT_FOUND, err.to_string()),
                BookingError::FlightDeparted
                | BookingError::InsufficientInventory { .. }
                | BookingError::AlreadyCancelled => (StatusCode::CONFLICT, err.to_string()),
                BookingError::ReferenceGenerationFailed | BookingError::Persistence(_) => {
                    tracing::error!("booking failed: {err}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error".to_string(),
                    )
                }
            },
            AppError::Store(err) => match err {
                StoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                StoreError::StatusConflict(msg) => (StatusCode::CONFLICT, msg),
                other => {
                    tracing::error!("storage failure: {other}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error".to_string(),
                    )
                }
            },
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
