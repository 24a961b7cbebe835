use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use skyfare_core::{
    Booking, BookingHistoryEntry, BookingRepository, BookingStatus, FareSnapshot, Flight,
    FlightRepository, HistoryRepository, Passenger, SeatClass, SeatInventory, StoreError,
    TransactionRecord,
};

#[derive(Default)]
struct Inner {
    flights: HashMap<Uuid, Flight>,
    inventories: HashMap<(Uuid, SeatClass), SeatInventory>,
    bookings: HashMap<Uuid, Booking>,
    references: HashSet<String>,
    passengers: Vec<Passenger>,
    transactions: Vec<TransactionRecord>,
    snapshots: Vec<FareSnapshot>,
    history: Vec<BookingHistoryEntry>,
}

/// In-memory implementation of the core repositories. One mutex over the
/// whole state gives `create_booking` the atomic multi-row commit the
/// orchestrator requires: the booking, its passengers, the transaction and
/// the history entry land under a single lock acquisition or not at all.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Catalog load path; flight creation is not part of the booking core.
    pub async fn insert_flight(&self, flight: Flight, inventories: Vec<SeatInventory>) {
        let mut inner = self.inner.lock().await;
        for inventory in inventories {
            inner
                .inventories
                .insert((flight.id, inventory.seat_class), inventory);
        }
        inner.flights.insert(flight.id, flight);
    }

    /// Every seat block in the catalog, used to open the inventory ledger at
    /// startup.
    pub async fn all_seat_inventories(&self) -> Vec<SeatInventory> {
        self.inner.lock().await.inventories.values().cloned().collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlightRepository for MemoryStore {
    async fn get_flight(&self, id: Uuid) -> Result<Option<Flight>, StoreError> {
        Ok(self.inner.lock().await.flights.get(&id).cloned())
    }

    async fn search_flights(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
    ) -> Result<Vec<Flight>, StoreError> {
        let inner = self.inner.lock().await;
        let mut matches: Vec<Flight> = inner
            .flights
            .values()
            .filter(|f| {
                f.origin.eq_ignore_ascii_case(origin)
                    && f.destination.eq_ignore_ascii_case(destination)
                    && f.scheduled_departure.date_naive() == date
            })
            .cloned()
            .collect();
        matches.sort_by_key(|f| f.scheduled_departure);
        Ok(matches)
    }

    async fn seat_inventory(
        &self,
        flight_id: Uuid,
        seat_class: SeatClass,
    ) -> Result<Option<SeatInventory>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .inventories
            .get(&(flight_id, seat_class))
            .cloned())
    }

    async fn seat_inventories(&self, flight_id: Uuid) -> Result<Vec<SeatInventory>, StoreError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<SeatInventory> = inner
            .inventories
            .values()
            .filter(|i| i.flight_id == flight_id)
            .cloned()
            .collect();
        rows.sort_by_key(|i| i.seat_class as u8);
        Ok(rows)
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create_booking(
        &self,
        booking: &Booking,
        passengers: &[Passenger],
        transaction: &TransactionRecord,
        entry: &BookingHistoryEntry,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        // Unique constraint on the reference; checked before any row is
        // written so a collision leaves no partial state.
        if inner.references.contains(&booking.reference) {
            return Err(StoreError::DuplicateReference);
        }
        inner.references.insert(booking.reference.clone());
        inner.bookings.insert(booking.id, booking.clone());
        inner.passengers.extend_from_slice(passengers);
        inner.transactions.push(transaction.clone());
        inner.history.push(entry.clone());
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.inner.lock().await.bookings.get(&id).cloned())
    }

    async fn bookings_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(rows)
    }

    async fn cancel_booking(
        &self,
        id: Uuid,
        entry: &BookingHistoryEntry,
        refund: Option<&TransactionRecord>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        // Check-and-flip under the same lock acquisition as the appended
        // rows, so losing a concurrent cancel race writes nothing.
        {
            let booking = inner
                .bookings
                .get_mut(&id)
                .ok_or_else(|| StoreError::NotFound(format!("booking {id}")))?;
            if booking.status == BookingStatus::Cancelled {
                return Err(StoreError::StatusConflict(format!(
                    "booking {id} already cancelled"
                )));
            }
            booking.status = BookingStatus::Cancelled;
        }
        inner.history.push(entry.clone());
        if let Some(transaction) = refund {
            inner.transactions.push(transaction.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryRepository for MemoryStore {
    async fn record_snapshot(&self, snapshot: &FareSnapshot) -> Result<(), StoreError> {
        self.inner.lock().await.snapshots.push(snapshot.clone());
        Ok(())
    }

    async fn record_entry(&self, entry: &BookingHistoryEntry) -> Result<(), StoreError> {
        self.inner.lock().await.history.push(entry.clone());
        Ok(())
    }

    async fn fares_for_flight(
        &self,
        flight_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<FareSnapshot>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .snapshots
            .iter()
            .filter(|s| s.flight_id == flight_id)
            .filter(|s| since.map_or(true, |bound| s.quoted_at >= bound))
            .cloned()
            .collect())
    }

    async fn history_for_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Vec<BookingHistoryEntry>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .history
            .iter()
            .filter(|e| e.booking_id == booking_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use skyfare_core::{HistoryAction, TransactionStatus};

    fn booking(reference: &str, user_id: Uuid, booked_at: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            flight_id: Uuid::new_v4(),
            user_id,
            seat_class: SeatClass::Economy,
            seats_booked: 1,
            final_price_cents: 30_000,
            booked_at,
            status: BookingStatus::Confirmed,
            reference: reference.to_string(),
        }
    }

    fn rows_for(b: &Booking) -> (TransactionRecord, BookingHistoryEntry) {
        let transaction = TransactionRecord {
            id: Uuid::new_v4(),
            booking_id: b.id,
            amount_cents: b.final_price_cents,
            payment_method: "card".to_string(),
            status: TransactionStatus::Completed,
            created_at: b.booked_at,
        };
        let entry = BookingHistoryEntry {
            id: Uuid::new_v4(),
            booking_id: b.id,
            action: HistoryAction::Created,
            details: "Booked 1 seats in Economy".to_string(),
            recorded_at: b.booked_at,
        };
        (transaction, entry)
    }

    #[tokio::test]
    async fn duplicate_reference_commit_writes_nothing() {
        let store = MemoryStore::new();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let first = booking("ABCD23", Uuid::new_v4(), now);
        let (txn, entry) = rows_for(&first);
        store.create_booking(&first, &[], &txn, &entry).await.unwrap();

        let clash = booking("ABCD23", Uuid::new_v4(), now);
        let (txn2, entry2) = rows_for(&clash);
        let err = store.create_booking(&clash, &[], &txn2, &entry2).await;
        assert!(matches!(err, Err(StoreError::DuplicateReference)));

        // Nothing from the rejected commit is visible.
        assert!(store.get_booking(clash.id).await.unwrap().is_none());
        assert!(store
            .history_for_booking(clash.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn cancellation_commit_has_a_single_winner() {
        let store = MemoryStore::new();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let b = booking("CDEF45", Uuid::new_v4(), now);
        let (txn, entry) = rows_for(&b);
        store.create_booking(&b, &[], &txn, &entry).await.unwrap();

        let cancel_entry = BookingHistoryEntry {
            id: Uuid::new_v4(),
            booking_id: b.id,
            action: HistoryAction::Cancelled,
            details: "Refund 100% amount 300.00".to_string(),
            recorded_at: now,
        };
        let refund = TransactionRecord {
            id: Uuid::new_v4(),
            booking_id: b.id,
            amount_cents: -b.final_price_cents,
            payment_method: "REFUND".to_string(),
            status: TransactionStatus::Completed,
            created_at: now,
        };

        store
            .cancel_booking(b.id, &cancel_entry, Some(&refund))
            .await
            .unwrap();
        assert_eq!(
            store.get_booking(b.id).await.unwrap().unwrap().status,
            BookingStatus::Cancelled
        );

        // The losing attempt fails the compare-and-set and writes nothing.
        let err = store.cancel_booking(b.id, &cancel_entry, Some(&refund)).await;
        assert!(matches!(err, Err(StoreError::StatusConflict(_))));
        assert_eq!(store.history_for_booking(b.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn user_bookings_are_newest_first() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let older = booking("AAAA22", user_id, now - Duration::days(2));
        let newer = booking("BBBB33", user_id, now);
        for b in [&older, &newer] {
            let (txn, entry) = rows_for(b);
            store.create_booking(b, &[], &txn, &entry).await.unwrap();
        }

        let rows = store.bookings_for_user(user_id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, newer.id);
        assert_eq!(rows[1].id, older.id);
    }

    #[tokio::test]
    async fn fare_snapshots_respect_the_since_bound() {
        let store = MemoryStore::new();
        let flight_id = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        for offset in [0, 1, 2] {
            store
                .record_snapshot(&FareSnapshot {
                    id: Uuid::new_v4(),
                    flight_id,
                    seat_class: SeatClass::Economy,
                    base_price_cents: 30_000,
                    unit_price_cents: 31_000 + offset,
                    occupancy_ratio: 0.5,
                    demand_level: skyfare_core::DemandLevel::Medium,
                    quoted_at: now + Duration::hours(offset),
                })
                .await
                .unwrap();
        }

        let all = store.fares_for_flight(flight_id, None).await.unwrap();
        assert_eq!(all.len(), 3);

        let bounded = store
            .fares_for_flight(flight_id, Some(now + Duration::hours(1)))
            .await
            .unwrap();
        assert_eq!(bounded.len(), 2);
    }
}
