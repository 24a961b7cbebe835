use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use skyfare_core::{BookingHistoryEntry, FareSnapshot, HistoryRepository, StoreError};

/// Append-only writer over the history repository. The orchestrator and the
/// quote path funnel every snapshot and audit entry through here; nothing in
/// the workspace ever updates or deletes what was recorded.
#[derive(Clone)]
pub struct HistoryRecorder {
    repo: Arc<dyn HistoryRepository>,
}

impl HistoryRecorder {
    pub fn new(repo: Arc<dyn HistoryRepository>) -> Self {
        Self { repo }
    }

    pub async fn record_snapshot(&self, snapshot: &FareSnapshot) -> Result<(), StoreError> {
        self.repo.record_snapshot(snapshot).await
    }

    pub async fn record_entry(&self, entry: &BookingHistoryEntry) -> Result<(), StoreError> {
        self.repo.record_entry(entry).await
    }

    /// Fare snapshots for a flight, oldest first, optionally bounded below.
    pub async fn fares_for_flight(
        &self,
        flight_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<FareSnapshot>, StoreError> {
        self.repo.fares_for_flight(flight_id, since).await
    }

    /// Audit trail for a booking, oldest first.
    pub async fn history_for_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Vec<BookingHistoryEntry>, StoreError> {
        self.repo.history_for_booking(booking_id).await
    }
}
