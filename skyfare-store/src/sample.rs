use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use skyfare_core::{Flight, SeatClass, SeatInventory};

use crate::memory::MemoryStore;

fn cabin(flight_id: Uuid, seat_class: SeatClass, initial: i32, available: i32, multiplier: f64) -> SeatInventory {
    SeatInventory {
        flight_id,
        seat_class,
        initial_inventory: initial,
        available_seats: available,
        price_multiplier: multiplier,
    }
}

/// Seed a handful of flights relative to `now` so the service is usable out
/// of the box. Departures and sold fractions are spread out to exercise the
/// different demand and urgency buckets.
pub async fn load(store: &MemoryStore, now: DateTime<Utc>) -> Vec<Flight> {
    let mut flights = Vec::new();

    let schedule = [
        // (number, airline, origin, dest, hours out, duration h, base cents,
        //  economy sold, business sold)
        ("SF101", "Skyfare Air", "JFK", "LAX", 240, 6, 30_000, 30, 4),
        ("SF102", "Skyfare Air", "JFK", "LAX", 60, 6, 32_000, 110, 12),
        ("SF201", "Pacific Wing", "SFO", "SEA", 30, 2, 15_000, 85, 16),
        ("SF301", "Skyfare Air", "LAX", "JFK", 12, 6, 30_000, 158, 19),
    ];

    for (number, airline, origin, destination, hours_out, duration, base, eco_sold, biz_sold) in
        schedule
    {
        let departure = now + Duration::hours(hours_out);
        let flight = Flight {
            id: Uuid::new_v4(),
            flight_number: number.to_string(),
            airline: airline.to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            scheduled_departure: departure,
            scheduled_arrival: departure + Duration::hours(duration),
            base_price_cents: base,
            total_seats: 180,
        };
        let inventories = vec![
            cabin(flight.id, SeatClass::Economy, 160, 160 - eco_sold, 1.0),
            cabin(flight.id, SeatClass::Business, 20, 20 - biz_sold, 2.2),
        ];
        store.insert_flight(flight.clone(), inventories).await;
        flights.push(flight);
    }

    tracing::info!(count = flights.len(), "sample catalog loaded");
    flights
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfare_core::FlightRepository;

    #[tokio::test]
    async fn seeds_flights_with_seat_blocks() {
        let store = MemoryStore::new();
        let flights = load(&store, Utc::now()).await;
        assert_eq!(flights.len(), 4);

        for flight in &flights {
            let rows = store.seat_inventories(flight.id).await.unwrap();
            assert_eq!(rows.len(), 2);
            for row in rows {
                assert!(row.available_seats >= 0);
                assert!(row.available_seats <= row.initial_inventory);
            }
        }
    }
}
