use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use skyfare_booking::{BookingError, BookingRequest, CancellationOutcome};
use skyfare_core::{Booking, BookingHistoryEntry, StoreError};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PricingSummary {
    pub unit_price_cents: i64,
    pub seats: i32,
    pub total_price_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct BookingConfirmation {
    pub booking: Booking,
    pub pricing_summary: PricingSummary,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/{booking_id}/cancel", post(cancel_booking))
        .route("/api/bookings/{booking_id}/history", get(booking_history))
}

async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<BookingConfirmation>, AppError> {
    let seats = request.seats;
    // The transaction runs on its own task so a client disconnect cannot
    // drop it between the inventory reserve and the commit.
    let orchestrator = state.orchestrator.clone();
    let booking = tokio::spawn(async move { orchestrator.book(request).await })
        .await
        .map_err(|e| BookingError::Persistence(format!("booking task failed: {e}")))??;
    let unit_price_cents = booking.final_price_cents / seats.max(1) as i64;
    Ok(Json(BookingConfirmation {
        pricing_summary: PricingSummary {
            unit_price_cents,
            seats,
            total_price_cents: booking.final_price_cents,
        },
        booking,
    }))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<CancellationOutcome>, AppError> {
    let orchestrator = state.orchestrator.clone();
    let outcome = tokio::spawn(async move { orchestrator.cancel(booking_id).await })
        .await
        .map_err(|e| BookingError::Persistence(format!("cancel task failed: {e}")))??;
    Ok(Json(outcome))
}

async fn booking_history(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Vec<BookingHistoryEntry>>, AppError> {
    // 404 for a booking that never existed, rather than an empty list.
    state
        .bookings
        .get_booking(booking_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("booking {booking_id}")))?;

    let entries = state.recorder.history_for_booking(booking_id).await?;
    Ok(Json(entries))
}
