use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skyfare_core::{DemandLevel, SeatClass};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub origin: String,
    pub destination: String,
    /// YYYY-MM-DD.
    pub departure_date: String,
    #[serde(default = "default_seat_class")]
    pub seat_class: SeatClass,
    pub sort_by: Option<String>,
}

fn default_seat_class() -> SeatClass {
    SeatClass::Economy
}

#[derive(Debug, Serialize)]
pub struct SearchRow {
    pub flight_id: Uuid,
    pub flight_number: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub base_price_cents: i64,
    pub dynamic_price_cents: i64,
    pub demand_level: DemandLevel,
    pub available_seats: i32,
    pub seat_class: SeatClass,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/flights/search", get(search_flights))
}

async fn search_flights(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchRow>>, AppError> {
    let date = NaiveDate::parse_from_str(&params.departure_date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("invalid date format, use YYYY-MM-DD".to_string()))?;

    let flights = state
        .flights
        .search_flights(&params.origin, &params.destination, date)
        .await?;

    let now = state.clock.now();
    let mut rows = Vec::new();
    for flight in flights {
        // Flights without the requested cabin are skipped, not errors.
        let Some(inventory) = state
            .flights
            .seat_inventory(flight.id, params.seat_class)
            .await?
        else {
            continue;
        };
        let Some(availability) = state.ledger.peek(flight.id, params.seat_class).await else {
            continue;
        };

        let quote = state
            .fares
            .price(&flight, &inventory, availability, 1, now)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        rows.push(SearchRow {
            flight_id: flight.id,
            flight_number: flight.flight_number,
            airline: flight.airline,
            origin: flight.origin,
            destination: flight.destination,
            departure_time: flight.scheduled_departure,
            arrival_time: flight.scheduled_arrival,
            base_price_cents: flight.base_price_cents,
            dynamic_price_cents: quote.unit_price_cents,
            demand_level: quote.demand_level,
            available_seats: availability.available,
            seat_class: params.seat_class,
        });
    }

    match params.sort_by.as_deref() {
        Some("price") => rows.sort_by_key(|r| r.dynamic_price_cents),
        Some("duration") => {
            rows.sort_by_key(|r| (r.arrival_time - r.departure_time).num_seconds())
        }
        Some("departure_time") => rows.sort_by_key(|r| r.departure_time),
        _ => {}
    }

    Ok(Json(rows))
}
