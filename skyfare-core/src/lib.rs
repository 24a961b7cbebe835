pub mod booking;
pub mod clock;
pub mod flight;
pub mod history;
pub mod money;
pub mod repository;

pub use booking::{Booking, BookingStatus, Passenger, TransactionRecord, TransactionStatus};
pub use clock::{Clock, FixedClock, SystemClock};
pub use flight::{Flight, SeatClass, SeatInventory};
pub use history::{BookingHistoryEntry, DemandLevel, FareSnapshot, HistoryAction};
pub use repository::{BookingRepository, FlightRepository, HistoryRepository, StoreError};
