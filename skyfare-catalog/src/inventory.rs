use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use skyfare_core::SeatClass;

/// Non-mutating view of one seat block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeatAvailability {
    pub available: i32,
    pub initial: i32,
}

/// Handle for a committed decrement. Holding one means `quantity` seats of
/// the key are accounted to the holder until it is spent on a `release`.
#[derive(Debug)]
pub struct ReservationToken {
    pub flight_id: Uuid,
    pub seat_class: SeatClass,
    pub quantity: i32,
}

impl ReservationToken {
    pub fn new(flight_id: Uuid, seat_class: SeatClass, quantity: i32) -> Self {
        Self {
            flight_id,
            seat_class,
            quantity,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("no seat inventory for flight {flight_id} class {seat_class}")]
    NotFound {
        flight_id: Uuid,
        seat_class: SeatClass,
    },

    #[error("insufficient inventory: requested {requested}, available {available}")]
    InsufficientInventory {
        requested: i32,
        available: i32,
        initial: i32,
    },

    #[error("invalid quantity: {0}, must be at least 1")]
    InvalidQuantity(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct InventoryKey {
    flight_id: Uuid,
    seat_class: SeatClass,
}

#[derive(Debug)]
struct SeatBlock {
    available: i32,
    initial: i32,
}

/// Owner of live seat counts, one block per `(flight, class)` key.
///
/// Each block sits behind its own async mutex, so reservations against
/// different flights or classes never contend, while reservations on the same
/// key are strictly ordered: whoever acquires the block first commits first,
/// and the next caller observes the updated count. The outer map lock is held
/// only to look up or insert the block handle, never across a count change.
pub struct InventoryLedger {
    blocks: RwLock<HashMap<InventoryKey, Arc<Mutex<SeatBlock>>>>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Register a seat block at catalog load time. `available` is clamped
    /// into `[0, initial]`; loading the same key again replaces the block.
    pub async fn open(&self, flight_id: Uuid, seat_class: SeatClass, initial: i32, available: i32) {
        let key = InventoryKey {
            flight_id,
            seat_class,
        };
        let block = SeatBlock {
            available: available.clamp(0, initial.max(0)),
            initial: initial.max(0),
        };
        self.blocks
            .write()
            .await
            .insert(key, Arc::new(Mutex::new(block)));
    }

    async fn block(
        &self,
        flight_id: Uuid,
        seat_class: SeatClass,
    ) -> Option<Arc<Mutex<SeatBlock>>> {
        let key = InventoryKey {
            flight_id,
            seat_class,
        };
        self.blocks.read().await.get(&key).cloned()
    }

    /// Current counts for a key. Booking paths must pair this with `reserve`
    /// rather than trust it: the value may be stale by the time it is used.
    pub async fn peek(&self, flight_id: Uuid, seat_class: SeatClass) -> Option<SeatAvailability> {
        let block = self.block(flight_id, seat_class).await?;
        let guard = block.lock().await;
        Some(SeatAvailability {
            available: guard.available,
            initial: guard.initial,
        })
    }

    /// The only decrementing mutator. Observes the counts and decrements
    /// under one per-key lock acquisition, so concurrent callers can never
    /// oversell the block or observe an intermediate count. The returned
    /// availability is the state the decrement applied to; a fare computed
    /// from it can never describe a count already superseded by a racing
    /// reservation on the same key. The refusal error carries the same
    /// observation for the caller's audit record.
    pub async fn reserve(
        &self,
        flight_id: Uuid,
        seat_class: SeatClass,
        quantity: i32,
    ) -> Result<(SeatAvailability, ReservationToken), InventoryError> {
        if quantity < 1 {
            return Err(InventoryError::InvalidQuantity(quantity));
        }
        let block = self
            .block(flight_id, seat_class)
            .await
            .ok_or(InventoryError::NotFound {
                flight_id,
                seat_class,
            })?;

        let mut guard = block.lock().await;
        if guard.available < quantity {
            return Err(InventoryError::InsufficientInventory {
                requested: quantity,
                available: guard.available,
                initial: guard.initial,
            });
        }
        let observed = SeatAvailability {
            available: guard.available,
            initial: guard.initial,
        };
        guard.available -= quantity;
        tracing::debug!(
            %flight_id,
            %seat_class,
            quantity,
            remaining = guard.available,
            "reserved seats"
        );
        Ok((observed, ReservationToken::new(flight_id, seat_class, quantity)))
    }

    /// Return a reservation's seats on rollback or cancellation. Consumes
    /// the token; the count is clamped at `initial` so a stray release can
    /// never inflate the block.
    pub async fn release(&self, token: ReservationToken) {
        let Some(block) = self.block(token.flight_id, token.seat_class).await else {
            tracing::warn!(
                flight_id = %token.flight_id,
                seat_class = %token.seat_class,
                "release for unknown seat block ignored"
            );
            return;
        };
        let mut guard = block.lock().await;
        guard.available = (guard.available + token.quantity).min(guard.initial);
        tracing::debug!(
            flight_id = %token.flight_id,
            seat_class = %token.seat_class,
            quantity = token.quantity,
            available = guard.available,
            "released seats"
        );
    }
}

impl Default for InventoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reserve_release_lifecycle() {
        let ledger = InventoryLedger::new();
        let flight_id = Uuid::new_v4();
        ledger.open(flight_id, SeatClass::Economy, 100, 100).await;

        let (observed, token) = ledger.reserve(flight_id, SeatClass::Economy, 10).await.unwrap();
        // The observation is the state the decrement applied to.
        assert_eq!(observed.available, 100);
        assert_eq!(observed.initial, 100);
        let peek = ledger.peek(flight_id, SeatClass::Economy).await.unwrap();
        assert_eq!(peek.available, 90);
        assert_eq!(peek.initial, 100);

        ledger.release(token).await;
        let peek = ledger.peek(flight_id, SeatClass::Economy).await.unwrap();
        assert_eq!(peek.available, 100);
    }

    #[tokio::test]
    async fn rejects_oversell_and_unknown_key() {
        let ledger = InventoryLedger::new();
        let flight_id = Uuid::new_v4();
        ledger.open(flight_id, SeatClass::Business, 10, 3).await;

        let err = ledger.reserve(flight_id, SeatClass::Business, 4).await;
        assert!(matches!(
            err,
            Err(InventoryError::InsufficientInventory { requested: 4, available: 3, initial: 10 })
        ));

        let err = ledger.reserve(flight_id, SeatClass::First, 1).await;
        assert!(matches!(err, Err(InventoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn release_clamps_at_initial_inventory() {
        let ledger = InventoryLedger::new();
        let flight_id = Uuid::new_v4();
        ledger.open(flight_id, SeatClass::Economy, 50, 48).await;

        // A release larger than what is outstanding cannot push the count
        // past the initial inventory.
        ledger
            .release(ReservationToken::new(flight_id, SeatClass::Economy, 10))
            .await;
        let peek = ledger.peek(flight_id, SeatClass::Economy).await.unwrap();
        assert_eq!(peek.available, 50);
    }

    #[tokio::test]
    async fn concurrent_reservations_never_oversell() {
        let ledger = Arc::new(InventoryLedger::new());
        let flight_id = Uuid::new_v4();
        ledger.open(flight_id, SeatClass::Economy, 10, 10).await;

        let mut handles = Vec::new();
        for _ in 0..40 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                ledger.reserve(flight_id, SeatClass::Economy, 1).await.is_ok()
            }));
        }

        let mut confirmed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                confirmed += 1;
            }
        }

        assert_eq!(confirmed, 10);
        let peek = ledger.peek(flight_id, SeatClass::Economy).await.unwrap();
        assert_eq!(peek.available, 0);
    }

    #[tokio::test]
    async fn each_reservation_observes_the_one_before_it() {
        let ledger = Arc::new(InventoryLedger::new());
        let flight_id = Uuid::new_v4();
        ledger.open(flight_id, SeatClass::Economy, 10, 10).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                let (observed, _token) = ledger
                    .reserve(flight_id, SeatClass::Economy, 1)
                    .await
                    .unwrap();
                observed.available
            }));
        }

        let mut observations = Vec::new();
        for handle in handles {
            observations.push(handle.await.unwrap());
        }
        observations.sort_unstable();

        // No two reservations were applied to the same count.
        assert_eq!(observations, (1..=10).collect::<Vec<i32>>());
    }

    #[tokio::test]
    async fn distinct_keys_do_not_interfere() {
        let ledger = InventoryLedger::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        ledger.open(a, SeatClass::Economy, 5, 5).await;
        ledger.open(b, SeatClass::Economy, 5, 5).await;

        ledger.reserve(a, SeatClass::Economy, 5).await.unwrap();
        let peek_b = ledger.peek(b, SeatClass::Economy).await.unwrap();
        assert_eq!(peek_b.available, 5);
    }
}
