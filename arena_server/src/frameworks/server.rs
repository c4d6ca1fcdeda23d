// Framework bootstrap for the arena server runtime.

use crate::frameworks::config;
use crate::interface_adapters::net::{reset_handler, telemetry_handler, world_update_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::game::world_task;
use crate::use_cases::{SimEvent, Simulation, SimulationSettings, Telemetry, WorldUpdate};

use axum::{
    Router,
    extract::ws::Utf8Bytes,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::atomic::AtomicU64;
use std::{io::Result, sync::Arc};
use tokio::sync::{Notify, broadcast, mpsc, watch};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves on `listener` with settings read from the environment.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    run_with_settings(listener, config::simulation_settings()).await
}

pub async fn run_with_settings(listener: tokio::net::TcpListener, settings: SimulationSettings) -> Result<()> {
    let address = listener.local_addr()?;
    let shutdown = Arc::new(Notify::new());
    let state = build_state(settings, shutdown.clone());

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/telemetry", get(telemetry_handler))
        .route("/reset", post(reset_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    });
    // Stop the world task once nothing can reach it any more.
    shutdown.notify_one();
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state(settings: SimulationSettings, shutdown: Arc<Notify>) -> Arc<AppState> {
    tracing::debug!(
        population_size = settings.genetic.population_size,
        elitism = settings.genetic.elitism,
        mutation_rate = settings.genetic.mutation_rate,
        generation_time_limit_ms = settings.generation_time_limit.as_millis(),
        ai_enabled = settings.ai_enabled,
        seed = settings.seed,
        "simulation configured"
    );

    // event_tx/rx: every socket and control route feeds the single world task.
    let (event_tx, event_rx) = mpsc::channel::<SimEvent>(config::EVENT_CHANNEL_CAPACITY);

    // world_tx/rx: raw snapshots for the serializer.
    let (world_tx, world_rx) = broadcast::channel::<WorldUpdate>(config::WORLD_BROADCAST_CAPACITY);

    // world_bytes_tx/rx: serialized snapshots shared across all clients.
    let (world_bytes_tx, _world_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(config::WORLD_BROADCAST_CAPACITY);
    let (world_latest_tx, _world_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
    let (telemetry_tx, telemetry_rx) = watch::channel::<Telemetry>(Telemetry::default());

    let tick_interval = settings.tick_interval;
    let sim = Simulation::new(settings);

    // Subscribe the serializer before the world task can publish its first tick.
    tokio::spawn(world_update_serializer(
        world_rx,
        world_bytes_tx.clone(),
        world_latest_tx.clone(),
    ));
    tokio::spawn(world_task(
        sim,
        event_rx,
        world_tx,
        telemetry_tx,
        tick_interval,
        shutdown,
    ));

    Arc::new(AppState {
        event_tx,
        world_bytes_tx,
        world_latest_tx,
        telemetry_rx,
        next_conn_id: AtomicU64::new(1),
    })
}
