use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flight::SeatClass;

/// Discretized demand bucket derived from the occupancy ratio. A closed enum
/// so the fare engine's branching is checked exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemandLevel::Low => write!(f, "low"),
            DemandLevel::Medium => write!(f, "medium"),
            DemandLevel::High => write!(f, "high"),
            DemandLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Immutable record of one price computation. Written for every priced quote
/// and booking attempt, including attempts later rejected for oversell, so
/// the demand signal survives regardless of booking outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareSnapshot {
    pub id: Uuid,
    pub flight_id: Uuid,
    pub seat_class: SeatClass,
    pub base_price_cents: i64,
    pub unit_price_cents: i64,
    pub occupancy_ratio: f64,
    pub demand_level: DemandLevel,
    pub quoted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryAction {
    Created,
    Cancelled,
}

/// Append-only audit trail entry tied to a booking. Corrections are new
/// entries, never mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingHistoryEntry {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub action: HistoryAction,
    pub details: String,
    pub recorded_at: DateTime<Utc>,
}
