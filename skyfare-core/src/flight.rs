use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cabin class for a seat inventory block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeatClass {
    Economy,
    Business,
    First,
}

impl std::fmt::Display for SeatClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeatClass::Economy => write!(f, "Economy"),
            SeatClass::Business => write!(f, "Business"),
            SeatClass::First => write!(f, "First"),
        }
    }
}

/// A scheduled flight. Immutable after catalog load; referenced by id from
/// inventory and bookings, never copied into them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    pub airline: String,
    /// IATA airport codes.
    pub origin: String,
    pub destination: String,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: DateTime<Utc>,
    pub base_price_cents: i64,
    pub total_seats: i32,
}

/// One seat block per flight and class, as loaded from the catalog.
///
/// `available_seats` is the count at load time; once the inventory ledger has
/// been opened for the key it is the ledger, not this row, that owns the live
/// count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatInventory {
    pub flight_id: Uuid,
    pub seat_class: SeatClass,
    pub initial_inventory: i32,
    pub available_seats: i32,
    pub price_multiplier: f64,
}
