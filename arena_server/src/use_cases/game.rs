use super::simulation::Simulation;
use super::types::{SimEvent, Telemetry, TickReport, WorldUpdate};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tracing::{debug, info};

/// Owns the simulation and steps it at a fixed rate until `shutdown` fires.
///
/// Events queued between ticks are applied before the next step, so a tick never
/// observes a half-applied change.
pub async fn world_task(
    mut sim: Simulation,
    mut event_rx: mpsc::Receiver<SimEvent>,
    world_tx: broadcast::Sender<WorldUpdate>,
    telemetry_tx: watch::Sender<Telemetry>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) {
    info!(
        population_size = sim.model().population_size(),
        generation_ticks = sim.settings().generation_ticks(),
        ai_enabled = sim.ai_enabled(),
        "simulation started"
    );

    let mut interval = tokio::time::interval(tick_interval);
    // A slow tick delays the schedule instead of bursting to catch up.
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!(tick = sim.tick_count(), generation = sim.model().generation(), "simulation stopped");
                break;
            }
            _ = interval.tick() => {}
        }

        while let Ok(event) = event_rx.try_recv() {
            debug!(?event, "sim event");
            sim.handle_event(event);
        }

        if let TickReport::GenerationEnded(summary) = sim.tick() {
            debug!(
                generation = summary.generation,
                champion = ?summary.champion.parameters,
                "champion parameters"
            );
        }

        let update = sim.snapshot();
        let _ = telemetry_tx.send(update.telemetry.clone());
        // No receivers is fine; the serializer may not have subscribed yet.
        let _ = world_tx.send(update);
    }
}
