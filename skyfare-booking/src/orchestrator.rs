use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skyfare_catalog::inventory::{
    InventoryError, InventoryLedger, ReservationToken, SeatAvailability,
};
use skyfare_catalog::pricing::{FareEngine, FareError, FareQuote};
use skyfare_core::money::{format_cents, round_half_up_cents};
use skyfare_core::{
    Booking, BookingHistoryEntry, BookingRepository, BookingStatus, Clock, FlightRepository,
    HistoryAction, Passenger, SeatClass, StoreError, TransactionRecord, TransactionStatus,
};

use crate::history::HistoryRecorder;
use crate::reference::generate_reference;
use crate::refund::refund_percentage;

/// Operational limits for the booking path.
#[derive(Debug, Clone)]
pub struct BookingRules {
    pub max_seats_per_booking: i32,
    /// Bound on reference regeneration after uniqueness collisions.
    pub reference_attempts: u32,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            max_seats_per_booking: 9,
            reference_attempts: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PassengerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub flight_id: Uuid,
    pub user_id: Uuid,
    pub seat_class: SeatClass,
    pub seats: i32,
    pub payment_method: String,
    #[serde(default)]
    pub passengers: Vec<PassengerDetails>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancellationOutcome {
    pub booking_id: Uuid,
    pub status: BookingStatus,
    pub refund_percentage: i64,
    pub refund_amount_cents: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("flight not found: {0}")]
    FlightNotFound(Uuid),

    #[error("flight has already departed")]
    FlightDeparted,

    #[error("seat class {0} not available on this flight")]
    UnknownSeatClass(SeatClass),

    #[error("insufficient inventory: requested {requested}, available {available}")]
    InsufficientInventory { requested: i32, available: i32 },

    #[error("booking not found: {0}")]
    NotFound(Uuid),

    #[error("booking is already cancelled")]
    AlreadyCancelled,

    #[error("could not generate a unique booking reference")]
    ReferenceGenerationFailed,

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        BookingError::Persistence(err.to_string())
    }
}

impl From<InventoryError> for BookingError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::InsufficientInventory {
                requested,
                available,
                ..
            } => BookingError::InsufficientInventory {
                requested,
                available,
            },
            InventoryError::NotFound { seat_class, .. } => {
                BookingError::UnknownSeatClass(seat_class)
            }
            InventoryError::InvalidQuantity(q) => {
                BookingError::Validation(format!("invalid quantity: {q}"))
            }
        }
    }
}

impl From<FareError> for BookingError {
    fn from(err: FareError) -> Self {
        BookingError::Validation(err.to_string())
    }
}

/// Coordinates the fare engine, inventory ledger and stores for one booking
/// request at a time. Each call is a logical transaction: either a confirmed
/// booking exists with its seats decremented, or no rows beyond the fare
/// snapshot were written and the inventory is untouched.
pub struct BookingOrchestrator {
    flights: Arc<dyn FlightRepository>,
    bookings: Arc<dyn BookingRepository>,
    recorder: HistoryRecorder,
    ledger: Arc<InventoryLedger>,
    fares: Arc<FareEngine>,
    clock: Arc<dyn Clock>,
    rules: BookingRules,
}

impl BookingOrchestrator {
    pub fn new(
        flights: Arc<dyn FlightRepository>,
        bookings: Arc<dyn BookingRepository>,
        recorder: HistoryRecorder,
        ledger: Arc<InventoryLedger>,
        fares: Arc<FareEngine>,
        clock: Arc<dyn Clock>,
        rules: BookingRules,
    ) -> Self {
        Self {
            flights,
            bookings,
            recorder,
            ledger,
            fares,
            clock,
            rules,
        }
    }

    pub async fn book(&self, request: BookingRequest) -> Result<Booking, BookingError> {
        // 1. Validate the request shape before touching any state.
        if request.seats < 1 {
            return Err(BookingError::Validation(format!(
                "seats must be at least 1, got {}",
                request.seats
            )));
        }
        if request.seats > self.rules.max_seats_per_booking {
            return Err(BookingError::Validation(format!(
                "at most {} seats per booking, got {}",
                self.rules.max_seats_per_booking, request.seats
            )));
        }
        // Passenger details are optional, but when given there must be one
        // per seat.
        if !request.passengers.is_empty() && request.passengers.len() != request.seats as usize {
            return Err(BookingError::Validation(format!(
                "{} passengers listed for {} seats",
                request.passengers.len(),
                request.seats
            )));
        }

        let flight = self
            .flights
            .get_flight(request.flight_id)
            .await?
            .ok_or(BookingError::FlightNotFound(request.flight_id))?;

        let now = self.clock.now();
        if flight.scheduled_departure <= now {
            return Err(BookingError::FlightDeparted);
        }

        let inventory = self
            .flights
            .seat_inventory(request.flight_id, request.seat_class)
            .await?
            .ok_or(BookingError::UnknownSeatClass(request.seat_class))?;

        // 2. Reserve. The ledger is the serialization point; the
        // availability it hands back was observed under the same per-key
        // lock as the decrement, so the fare below can never be computed
        // from a count a concurrent request already superseded. A refused
        // reservation is priced from the refusing observation instead and
        // still leaves a snapshot: a refused sale is a demand signal too.
        let (observed, token) = match self
            .ledger
            .reserve(request.flight_id, request.seat_class, request.seats)
            .await
        {
            Ok(pair) => pair,
            Err(InventoryError::InsufficientInventory {
                requested,
                available,
                initial,
            }) => {
                let quote = self.fares.price(
                    &flight,
                    &inventory,
                    SeatAvailability { available, initial },
                    request.seats,
                    now,
                )?;
                self.recorder.record_snapshot(&quote.snapshot).await?;
                return Err(BookingError::InsufficientInventory {
                    requested,
                    available,
                });
            }
            Err(err) => return Err(err.into()),
        };

        // 3. Price the observed state, record the snapshot, and commit the
        // booking rows atomically, regenerating the reference on uniqueness
        // collisions.
        let outcome = async {
            let quote = self
                .fares
                .price(&flight, &inventory, observed, request.seats, now)?;
            self.recorder.record_snapshot(&quote.snapshot).await?;
            self.commit_booking(&request, &quote, now).await
        }
        .await;

        match outcome {
            Ok(booking) => {
                tracing::info!(
                    booking_id = %booking.id,
                    reference = %booking.reference,
                    flight_id = %booking.flight_id,
                    seats = booking.seats_booked,
                    final_price = %format_cents(booking.final_price_cents),
                    "booking confirmed"
                );
                Ok(booking)
            }
            Err(err) => {
                // 4. No booking row exists, so the decrement must not
                // survive either.
                self.ledger.release(token).await;
                Err(err)
            }
        }
    }

    async fn commit_booking(
        &self,
        request: &BookingRequest,
        quote: &FareQuote,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Booking, BookingError> {
        for _ in 0..self.rules.reference_attempts {
            let reference = generate_reference();
            let booking = Booking {
                id: Uuid::new_v4(),
                flight_id: request.flight_id,
                user_id: request.user_id,
                seat_class: request.seat_class,
                seats_booked: request.seats,
                final_price_cents: quote.unit_price_cents * request.seats as i64,
                booked_at: now,
                status: BookingStatus::Confirmed,
                reference,
            };
            let passengers: Vec<Passenger> = request
                .passengers
                .iter()
                .map(|p| Passenger {
                    id: Uuid::new_v4(),
                    booking_id: booking.id,
                    first_name: p.first_name.clone(),
                    last_name: p.last_name.clone(),
                    email: p.email.clone(),
                    phone: p.phone.clone(),
                })
                .collect();
            let transaction = TransactionRecord {
                id: Uuid::new_v4(),
                booking_id: booking.id,
                amount_cents: booking.final_price_cents,
                payment_method: request.payment_method.clone(),
                status: TransactionStatus::Completed,
                created_at: now,
            };
            let entry = BookingHistoryEntry {
                id: Uuid::new_v4(),
                booking_id: booking.id,
                action: HistoryAction::Created,
                details: format!(
                    "Booked {} seats in {}",
                    booking.seats_booked, booking.seat_class
                ),
                recorded_at: now,
            };

            match self
                .create_with_retry(&booking, &passengers, &transaction, &entry)
                .await
            {
                Ok(()) => return Ok(booking),
                Err(StoreError::DuplicateReference) => {
                    tracing::warn!(
                        reference = %booking.reference,
                        "booking reference collision, regenerating"
                    );
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(BookingError::ReferenceGenerationFailed)
    }

    /// One retry on an I/O failure during the atomic commit; collisions and a
    /// second failure propagate.
    async fn create_with_retry(
        &self,
        booking: &Booking,
        passengers: &[Passenger],
        transaction: &TransactionRecord,
        entry: &BookingHistoryEntry,
    ) -> Result<(), StoreError> {
        match self
            .bookings
            .create_booking(booking, passengers, transaction, entry)
            .await
        {
            Err(StoreError::Io(msg)) => {
                tracing::warn!(booking_id = %booking.id, error = %msg, "commit failed, retrying once");
                self.bookings
                    .create_booking(booking, passengers, transaction, entry)
                    .await
            }
            other => other,
        }
    }

    /// Cancel a booking, releasing its seats exactly once. The status flip,
    /// history entry and refund row are one atomic compare-and-set commit
    /// in the store; of any number of concurrent cancels only the one that
    /// wins the transition releases the seats, the rest get
    /// `AlreadyCancelled` with nothing written.
    pub async fn cancel(&self, booking_id: Uuid) -> Result<CancellationOutcome, BookingError> {
        let booking = self
            .bookings
            .get_booking(booking_id)
            .await?
            .ok_or(BookingError::NotFound(booking_id))?;

        if booking.status == BookingStatus::Cancelled {
            return Err(BookingError::AlreadyCancelled);
        }

        let flight = self
            .flights
            .get_flight(booking.flight_id)
            .await?
            .ok_or(BookingError::FlightNotFound(booking.flight_id))?;

        let now = self.clock.now();
        let percentage = refund_percentage(flight.scheduled_departure, now);
        let refund_amount_cents =
            round_half_up_cents(booking.final_price_cents as f64 * percentage as f64 / 100.0);

        let entry = BookingHistoryEntry {
            id: Uuid::new_v4(),
            booking_id,
            action: HistoryAction::Cancelled,
            details: format!(
                "Refund {}% amount {}",
                percentage,
                format_cents(refund_amount_cents)
            ),
            recorded_at: now,
        };
        let refund = (refund_amount_cents > 0).then(|| TransactionRecord {
            id: Uuid::new_v4(),
            booking_id,
            amount_cents: -refund_amount_cents,
            payment_method: "REFUND".to_string(),
            status: TransactionStatus::Completed,
            created_at: now,
        });

        match self
            .bookings
            .cancel_booking(booking_id, &entry, refund.as_ref())
            .await
        {
            Ok(()) => {}
            Err(StoreError::StatusConflict(_)) => return Err(BookingError::AlreadyCancelled),
            Err(err) => return Err(err.into()),
        }

        // The commit above won the transition, so this is the only caller
        // that reaches the release for this booking.
        self.ledger
            .release(ReservationToken::new(
                booking.flight_id,
                booking.seat_class,
                booking.seats_booked,
            ))
            .await;

        tracing::info!(
            %booking_id,
            refund_percentage = percentage,
            refund = %format_cents(refund_amount_cents),
            "booking cancelled"
        );

        Ok(CancellationOutcome {
            booking_id,
            status: BookingStatus::Cancelled,
            refund_percentage: percentage,
            refund_amount_cents,
        })
    }
}
