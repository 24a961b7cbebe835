use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skyfare_core::{DemandLevel, FareSnapshot, SeatClass, StoreError};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteParams {
    #[serde(default = "default_seat_class")]
    pub seat_class: SeatClass,
    #[serde(default = "default_seats")]
    pub seats: i32,
}

fn default_seat_class() -> SeatClass {
    SeatClass::Economy
}

fn default_seats() -> i32 {
    1
}

#[derive(Debug, Serialize)]
pub struct FareBreakdown {
    pub flight_id: Uuid,
    pub flight_number: String,
    pub seat_class: SeatClass,
    pub base_price_cents: i64,
    pub seat_class_multiplier: f64,
    pub occupancy_ratio: f64,
    pub demand_level: DemandLevel,
    pub hours_to_departure: i64,
    pub available_seats: i32,
    pub initial_inventory: i32,
    pub unit_price_cents: i64,
    pub seats: i32,
    pub total_price_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct FareHistoryParams {
    pub since: Option<DateTime<Utc>>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/pricing/flights/{flight_id}", get(quote_fare))
        .route("/api/flights/{flight_id}/fares", get(fare_history))
}

/// Price a prospective booking. Every quote leaves a fare snapshot behind,
/// whether or not the caller goes on to book.
async fn quote_fare(
    State(state): State<AppState>,
    Path(flight_id): Path<Uuid>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<FareBreakdown>, AppError> {
    let flight = state
        .flights
        .get_flight(flight_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("flight {flight_id}")))?;

    let inventory = state
        .flights
        .seat_inventory(flight_id, params.seat_class)
        .await?
        .ok_or_else(|| {
            StoreError::NotFound(format!("seat class {} not available", params.seat_class))
        })?;
    let availability = state
        .ledger
        .peek(flight_id, params.seat_class)
        .await
        .ok_or_else(|| {
            StoreError::NotFound(format!("seat class {} not available", params.seat_class))
        })?;

    let now = state.clock.now();
    let quote = state
        .fares
        .price(&flight, &inventory, availability, params.seats, now)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state.recorder.record_snapshot(&quote.snapshot).await?;

    Ok(Json(FareBreakdown {
        flight_id,
        flight_number: flight.flight_number,
        seat_class: params.seat_class,
        base_price_cents: flight.base_price_cents,
        seat_class_multiplier: inventory.price_multiplier,
        occupancy_ratio: quote.occupancy_ratio,
        demand_level: quote.demand_level,
        hours_to_departure: (flight.scheduled_departure - now).num_hours(),
        available_seats: availability.available,
        initial_inventory: availability.initial,
        unit_price_cents: quote.unit_price_cents,
        seats: params.seats,
        total_price_cents: quote.unit_price_cents * params.seats as i64,
    }))
}

async fn fare_history(
    State(state): State<AppState>,
    Path(flight_id): Path<Uuid>,
    Query(params): Query<FareHistoryParams>,
) -> Result<Json<Vec<FareSnapshot>>, AppError> {
    let snapshots = state
        .recorder
        .fares_for_flight(flight_id, params.since)
        .await?;
    Ok(Json(snapshots))
}
