use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skyfare_core::money::round_half_up_cents;
use skyfare_core::{DemandLevel, FareSnapshot, Flight, SeatInventory};

use crate::inventory::SeatAvailability;

/// Multipliers applied by the fare engine. The bucket boundaries themselves
/// are fixed (documented on [`FareEngine::demand_level`] and
/// [`FareEngine::urgency_factor`]); only the per-bucket multipliers are
/// configurable, and they must stay monotone for the engine's guarantees to
/// hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareConfig {
    pub low_demand: f64,
    pub medium_demand: f64,
    pub high_demand: f64,
    pub critical_demand: f64,
    /// More than 168 hours out.
    pub advance_purchase: f64,
    /// 72 to 168 hours out.
    pub standard_window: f64,
    /// 24 to 72 hours out.
    pub approach_window: f64,
    /// Under 24 hours, including departures already in the past.
    pub last_minute: f64,
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            low_demand: 1.0,
            medium_demand: 1.15,
            high_demand: 1.35,
            critical_demand: 1.6,
            advance_purchase: 0.9,
            standard_window: 1.0,
            approach_window: 1.15,
            last_minute: 1.3,
        }
    }
}

/// Result of one price computation: the fixed unit price and the audit
/// snapshot describing the state that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareQuote {
    pub unit_price_cents: i64,
    pub demand_level: DemandLevel,
    pub occupancy_ratio: f64,
    pub snapshot: FareSnapshot,
}

#[derive(Debug, thiserror::Error)]
pub enum FareError {
    #[error("invalid quantity: {0}, must be at least 1")]
    InvalidQuantity(i32),
}

/// Pure dynamic-fare calculator. Takes every input explicitly, including the
/// current time, and never touches inventory or storage.
pub struct FareEngine {
    config: FareConfig,
}

impl FareEngine {
    pub fn new(config: FareConfig) -> Self {
        Self { config }
    }

    /// Compute the unit price for `quantity` seats of one class at `now`.
    ///
    /// The unit price is fixed at the inventory state observed here; the
    /// caller multiplies by quantity and never reprices the batch. Identical
    /// inputs produce an identical price and demand level.
    pub fn price(
        &self,
        flight: &Flight,
        inventory: &SeatInventory,
        availability: SeatAvailability,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> Result<FareQuote, FareError> {
        if quantity < 1 {
            return Err(FareError::InvalidQuantity(quantity));
        }

        let occupancy_ratio = occupancy_ratio(availability.available, availability.initial);
        let demand_level = Self::demand_level(occupancy_ratio);
        let demand_factor = self.demand_factor(demand_level);
        let urgency_factor = self.urgency_factor(flight.scheduled_departure, now);

        let raw = flight.base_price_cents as f64
            * inventory.price_multiplier
            * demand_factor
            * urgency_factor;
        // Single rounding step, half-up to whole cents, floored at one cent.
        let unit_price_cents = round_half_up_cents(raw).max(1);

        let snapshot = FareSnapshot {
            id: Uuid::new_v4(),
            flight_id: flight.id,
            seat_class: inventory.seat_class,
            base_price_cents: flight.base_price_cents,
            unit_price_cents,
            occupancy_ratio,
            demand_level,
            quoted_at: now,
        };

        Ok(FareQuote {
            unit_price_cents,
            demand_level,
            occupancy_ratio,
            snapshot,
        })
    }

    /// Demand bucket for an occupancy ratio, total over `[0, 1]`:
    /// `< 0.50` low, `0.50..0.80` medium, `0.80..0.95` high, `>= 0.95`
    /// critical.
    pub fn demand_level(occupancy_ratio: f64) -> DemandLevel {
        if occupancy_ratio >= 0.95 {
            DemandLevel::Critical
        } else if occupancy_ratio >= 0.80 {
            DemandLevel::High
        } else if occupancy_ratio >= 0.50 {
            DemandLevel::Medium
        } else {
            DemandLevel::Low
        }
    }

    pub fn demand_factor(&self, level: DemandLevel) -> f64 {
        match level {
            DemandLevel::Low => self.config.low_demand,
            DemandLevel::Medium => self.config.medium_demand,
            DemandLevel::High => self.config.high_demand,
            DemandLevel::Critical => self.config.critical_demand,
        }
    }

    /// Time-to-departure multiplier, non-increasing in hours remaining:
    /// `> 168h` advance, `72..=168h` standard, `24..72h` approach, `< 24h`
    /// last-minute. A departure already in the past clamps to the
    /// last-minute bucket.
    pub fn urgency_factor(&self, departure: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let hours = (departure - now).num_hours();
        if hours > 168 {
            self.config.advance_purchase
        } else if hours >= 72 {
            self.config.standard_window
        } else if hours >= 24 {
            self.config.approach_window
        } else {
            self.config.last_minute
        }
    }
}

impl Default for FareEngine {
    fn default() -> Self {
        Self::new(FareConfig::default())
    }
}

/// Fraction of the initial inventory already sold. An empty cabin
/// (`initial <= 0`) counts as sold out rather than dividing by zero.
fn occupancy_ratio(available: i32, initial: i32) -> f64 {
    if initial <= 0 {
        return 1.0;
    }
    let sold = (initial - available).clamp(0, initial);
    sold as f64 / initial as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use skyfare_core::SeatClass;

    fn flight(base_cents: i64, departure: DateTime<Utc>) -> Flight {
        Flight {
            id: Uuid::new_v4(),
            flight_number: "SF101".to_string(),
            airline: "Skyfare Air".to_string(),
            origin: "JFK".to_string(),
            destination: "LAX".to_string(),
            scheduled_departure: departure,
            scheduled_arrival: departure + Duration::hours(6),
            base_price_cents: base_cents,
            total_seats: 200,
        }
    }

    fn economy(flight_id: Uuid, initial: i32, available: i32) -> SeatInventory {
        SeatInventory {
            flight_id,
            seat_class: SeatClass::Economy,
            initial_inventory: initial,
            available_seats: available,
            price_multiplier: 1.0,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn critical_demand_last_minute_scenario() {
        // available 1 of 200 => ratio 0.995 (critical, x1.6), departure in
        // 10 hours (last-minute, x1.3): 300.00 * 1.0 * 1.6 * 1.3 = 624.00.
        let now = now();
        let f = flight(30_000, now + Duration::hours(10));
        let inv = economy(f.id, 200, 1);
        let quote = FareEngine::default()
            .price(&f, &inv, SeatAvailability { available: 1, initial: 200 }, 1, now)
            .unwrap();
        assert_eq!(quote.unit_price_cents, 62_400);
        assert_eq!(quote.demand_level, DemandLevel::Critical);
    }

    #[test]
    fn identical_inputs_are_byte_identical() {
        let now = now();
        let f = flight(30_000, now + Duration::hours(50));
        let inv = economy(f.id, 100, 37);
        let avail = SeatAvailability { available: 37, initial: 100 };
        let engine = FareEngine::default();
        let a = engine.price(&f, &inv, avail, 3, now).unwrap();
        let b = engine.price(&f, &inv, avail, 3, now).unwrap();
        assert_eq!(a.unit_price_cents, b.unit_price_cents);
        assert_eq!(a.demand_level, b.demand_level);
        assert_eq!(a.occupancy_ratio, b.occupancy_ratio);
    }

    #[test]
    fn demand_factor_is_monotone_in_occupancy() {
        let engine = FareEngine::default();
        let mut last = 0.0;
        for ratio in [0.0, 0.1, 0.49, 0.5, 0.79, 0.8, 0.94, 0.95, 0.99, 1.0] {
            let factor = engine.demand_factor(FareEngine::demand_level(ratio));
            assert!(factor >= last, "demand factor dropped at ratio {ratio}");
            last = factor;
        }
    }

    #[test]
    fn urgency_factor_is_monotone_in_time_remaining() {
        let engine = FareEngine::default();
        let now = now();
        let mut last = f64::MAX;
        for hours in [500, 169, 168, 100, 72, 71, 24, 23, 1, 0] {
            let factor = engine.urgency_factor(now + Duration::hours(hours), now);
            assert!(factor <= last, "urgency factor rose at {hours}h out");
            last = factor;
        }
    }

    #[test]
    fn busier_cabin_is_never_cheaper() {
        let engine = FareEngine::default();
        let now = now();
        let f = flight(30_000, now + Duration::hours(96));
        let inv = economy(f.id, 100, 90);
        let quiet = engine
            .price(&f, &inv, SeatAvailability { available: 90, initial: 100 }, 1, now)
            .unwrap();
        let busy = engine
            .price(&f, &inv, SeatAvailability { available: 1, initial: 100 }, 1, now)
            .unwrap();
        assert!(busy.unit_price_cents >= quiet.unit_price_cents);
    }

    #[test]
    fn past_departure_clamps_to_last_minute() {
        let engine = FareEngine::default();
        let now = now();
        let factor = engine.urgency_factor(now - Duration::hours(3), now);
        assert_eq!(factor, FareConfig::default().last_minute);
    }

    #[test]
    fn rejects_quantity_below_one() {
        let now = now();
        let f = flight(30_000, now + Duration::hours(48));
        let inv = economy(f.id, 100, 50);
        let avail = SeatAvailability { available: 50, initial: 100 };
        let err = FareEngine::default().price(&f, &inv, avail, 0, now);
        assert!(matches!(err, Err(FareError::InvalidQuantity(0))));
    }

    #[test]
    fn price_never_drops_to_zero() {
        let now = now();
        let f = flight(0, now + Duration::hours(48));
        let inv = economy(f.id, 100, 50);
        let avail = SeatAvailability { available: 50, initial: 100 };
        let quote = FareEngine::default().price(&f, &inv, avail, 1, now).unwrap();
        assert!(quote.unit_price_cents > 0);
    }

    #[test]
    fn empty_cabin_counts_as_sold_out() {
        assert_eq!(occupancy_ratio(0, 0), 1.0);
        assert_eq!(occupancy_ratio(5, 0), 1.0);
    }
}
