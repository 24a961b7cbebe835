pub mod history;
pub mod orchestrator;
pub mod reference;
pub mod refund;

pub use history::HistoryRecorder;
pub use orchestrator::{
    BookingError, BookingOrchestrator, BookingRequest, BookingRules, CancellationOutcome,
    PassengerDetails,
};
pub use reference::generate_reference;
pub use refund::refund_percentage;
