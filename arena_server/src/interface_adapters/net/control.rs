use crate::domain::genetic::MAX_POPULATION;
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{ConfigDto, TelemetryDto};
use crate::interface_adapters::state::AppState;
use crate::use_cases::SimEvent;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Latest telemetry published by the world task.
pub async fn telemetry_handler(State(state): State<Arc<AppState>>) -> Json<TelemetryDto> {
    let telemetry = state.telemetry_rx.borrow().clone();
    Json(TelemetryDto::from(&telemetry))
}

/// Applies the optional settings and restarts with a fresh random population.
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ConfigDto>>,
) -> impl IntoResponse {
    let config = body.map(|Json(config)| config).unwrap_or_default();

    if config.mutation_rate.is_some_and(|rate| !rate.is_finite()) {
        return bad_request("mutation_rate must be finite".to_string());
    }
    if config.population_size.is_some_and(|size| size > MAX_POPULATION) {
        return bad_request(format!("population_size must be at most {MAX_POPULATION}"));
    }

    info!(
        population_size = ?config.population_size,
        elitism = ?config.elitism,
        mutation_rate = ?config.mutation_rate,
        "reset requested"
    );

    // Configure first so the fresh population is built from the new settings.
    for event in [SimEvent::Configure(config.into()), SimEvent::Reset] {
        if state.event_tx.send(event).await.is_err() {
            warn!("simulation unavailable; reset dropped");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "simulation unavailable".to_string(),
                }),
            )
                .into_response();
        }
    }

    StatusCode::ACCEPTED.into_response()
}

fn bad_request(error: String) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
}
