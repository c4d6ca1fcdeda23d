use crate::use_cases::{SimEvent, Telemetry};
use axum::extract::ws::Utf8Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, mpsc, watch};

pub struct AppState {
    // Events flowing from sockets and HTTP routes into the world task.
    pub event_tx: mpsc::Sender<SimEvent>,
    // Serialized world updates, shared across all connections.
    pub world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    // Latest serialized world update for lag recovery and first paint.
    pub world_latest_tx: watch::Sender<Utf8Bytes>,
    // Latest telemetry published by the world task.
    pub telemetry_rx: watch::Receiver<Telemetry>,
    // Source of per-connection ids for log correlation.
    pub next_conn_id: AtomicU64,
}

impl AppState {
    pub fn conn_id(&self) -> u64 {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }
}
