use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skyfare_core::{DemandLevel, SeatClass, StoreError};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DetailParams {
    #[serde(default = "default_seat_class")]
    pub seat_class: SeatClass,
}

fn default_seat_class() -> SeatClass {
    SeatClass::Economy
}

#[derive(Debug, Serialize)]
pub struct CabinRow {
    pub seat_class: SeatClass,
    pub initial_inventory: i32,
    pub available_seats: i32,
    pub price_multiplier: f64,
}

#[derive(Debug, Serialize)]
pub struct FlightDetail {
    pub flight_id: Uuid,
    pub flight_number: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub base_price_cents: i64,
    pub seat_class: SeatClass,
    pub dynamic_price_cents: i64,
    pub demand_level: DemandLevel,
    pub available_seats: i32,
    pub cabins: Vec<CabinRow>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/flights/{flight_id}", get(flight_detail))
}

async fn flight_detail(
    State(state): State<AppState>,
    Path(flight_id): Path<Uuid>,
    Query(params): Query<DetailParams>,
) -> Result<Json<FlightDetail>, AppError> {
    let flight = state
        .flights
        .get_flight(flight_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("flight {flight_id}")))?;

    let mut cabins = Vec::new();
    for row in state.flights.seat_inventories(flight_id).await? {
        // Live count from the ledger; the stored row only has the load-time
        // value.
        let available = state
            .ledger
            .peek(flight_id, row.seat_class)
            .await
            .map_or(row.available_seats, |a| a.available);
        cabins.push(CabinRow {
            seat_class: row.seat_class,
            initial_inventory: row.initial_inventory,
            available_seats: available,
            price_multiplier: row.price_multiplier,
        });
    }

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

    let quote = state
        .fares
        .price(&flight, &inventory, availability, 1, state.clock.now())
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(Json(FlightDetail {
        flight_id,
        flight_number: flight.flight_number,
        airline: flight.airline,
        origin: flight.origin,
        destination: flight.destination,
        departure_time: flight.scheduled_departure,
        arrival_time: flight.scheduled_arrival,
        base_price_cents: flight.base_price_cents,
        seat_class: params.seat_class,
        dynamic_price_cents: quote.unit_price_cents,
        demand_level: quote.demand_level,
        available_seats: availability.available,
        cabins,
    }))
}
