pub mod inventory;
pub mod pricing;

pub use inventory::{InventoryError, InventoryLedger, ReservationToken, SeatAvailability};
pub use pricing::{FareConfig, FareEngine, FareError, FareQuote};
