use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skyfare_api::{app, AppState};
use skyfare_booking::{BookingOrchestrator, BookingRules, HistoryRecorder};
use skyfare_catalog::{FareConfig, FareEngine, InventoryLedger};
use skyfare_core::{Clock, SystemClock};
use skyfare_store::{sample, Config, MemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyfare_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("failed to load config")?;
    tracing::info!("Starting Skyfare API on port {}", config.server.port);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(MemoryStore::new());
    sample::load(&store, clock.now()).await;

    // Open a ledger block for every catalog seat row; from here on the
    // ledger owns the live counts.
    let ledger = Arc::new(InventoryLedger::new());
    for row in store.all_seat_inventories().await {
        ledger
            .open(
                row.flight_id,
                row.seat_class,
                row.initial_inventory,
                row.available_seats,
            )
            .await;
    }

    let fares = Arc::new(FareEngine::new(FareConfig::default()));
    let recorder = HistoryRecorder::new(store.clone());
    let rules = BookingRules {
        max_seats_per_booking: config.booking.max_seats_per_booking,
        reference_attempts: config.booking.reference_attempts,
    };
    let orchestrator = Arc::new(BookingOrchestrator::new(
        store.clone(),
        store.clone(),
        recorder.clone(),
        ledger.clone(),
        fares.clone(),
        clock.clone(),
        rules,
    ));

    let state = AppState {
        flights: store.clone(),
        bookings: store.clone(),
        ledger,
        fares,
        orchestrator,
        recorder,
        clock,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app(state))
        .await
        .context("server error")?;

    Ok(())
}
