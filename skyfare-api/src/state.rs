use std::sync::Arc;

use skyfare_booking::{BookingOrchestrator, HistoryRecorder};
use skyfare_catalog::{FareEngine, InventoryLedger};
use skyfare_core::{BookingRepository, Clock, FlightRepository};

#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<dyn FlightRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub ledger: Arc<InventoryLedger>,
    pub fares: Arc<FareEngine>,
    pub orchestrator: Arc<BookingOrchestrator>,
    pub recorder: HistoryRecorder,
    pub clock: Arc<dyn Clock>,
}
