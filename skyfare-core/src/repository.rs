use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::booking::{Booking, Passenger, TransactionRecord};
use crate::flight::{Flight, SeatClass, SeatInventory};
use crate::history::{BookingHistoryEntry, FareSnapshot};

/// Storage-layer failure taxonomy shared by all repositories.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Uniqueness violation on the booking reference; the orchestrator
    /// treats this as a retry trigger, not a terminal failure.
    #[error("booking reference already exists")]
    DuplicateReference,

    #[error("not found: {0}")]
    NotFound(String),

    /// Compare-and-set failure on a status transition; the row was already
    /// in the requested state.
    #[error("status conflict: {0}")]
    StatusConflict(String),

    #[error("persistence failure: {0}")]
    Io(String),
}

/// Read access to the flight catalog. Flight creation is owned by the
/// catalog loader, not by this core.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn get_flight(&self, id: Uuid) -> Result<Option<Flight>, StoreError>;

    async fn search_flights(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
    ) -> Result<Vec<Flight>, StoreError>;

    async fn seat_inventory(
        &self,
        flight_id: Uuid,
        seat_class: SeatClass,
    ) -> Result<Option<SeatInventory>, StoreError>;

    async fn seat_inventories(&self, flight_id: Uuid) -> Result<Vec<SeatInventory>, StoreError>;
}

/// Durable booking storage. `create_booking` is the atomic multi-row commit
/// the orchestrator relies on: booking, passengers, transaction, and the
/// `Created` history entry land together or not at all.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(
        &self,
        booking: &Booking,
        passengers: &[Passenger],
        transaction: &TransactionRecord,
        entry: &BookingHistoryEntry,
    ) -> Result<(), StoreError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    /// Bookings for a user, newest first.
    async fn bookings_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError>;

    /// Atomic cancellation commit: checks the current status, flips it to
    /// `Cancelled`, and appends the history entry and refund row in one
    /// step. Fails with `StatusConflict` when the booking is already
    /// cancelled, in which case nothing is written; exactly one of any
    /// number of concurrent callers can win the transition.
    async fn cancel_booking(
        &self,
        id: Uuid,
        entry: &BookingHistoryEntry,
        refund: Option<&TransactionRecord>,
    ) -> Result<(), StoreError>;
}

/// Append-only audit storage. No update or delete surface exists.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn record_snapshot(&self, snapshot: &FareSnapshot) -> Result<(), StoreError>;

    async fn record_entry(&self, entry: &BookingHistoryEntry) -> Result<(), StoreError>;

    /// Fare snapshots for a flight in quote order, optionally bounded below.
    async fn fares_for_flight(
        &self,
        flight_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<FareSnapshot>, StoreError>;

    /// History entries for a booking in record order.
    async fn history_for_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Vec<BookingHistoryEntry>, StoreError>;
}
