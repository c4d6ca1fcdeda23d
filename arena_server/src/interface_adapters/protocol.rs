// Wire protocol DTOs and conversions for the arena WebSocket and HTTP routes.

use crate::domain::{ManualInput, PolygonSnapshot, SensorSnapshot, TankSnapshot, Vector};
use crate::use_cases::{SettingsUpdate, Telemetry, WorldUpdate};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Snapshot of the simulation for a given tick.
    WorldUpdate(WorldUpdateDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Held keys for the manually driven tank.
    Input(ManualInputDto),
    ToggleAi,
    SetAi { enabled: bool },
    ShowGrid { enabled: bool },
    // Appends a vertex to the polygon being drawn.
    AddPoint(PointDto),
    FinalizePolygon,
    // Optimizer settings picked up at the next spawn or reset.
    Configure(ConfigDto),
    // Fresh random population.
    Reset,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ManualInputDto {
    #[serde(default)]
    pub rotate_left: bool,
    #[serde(default)]
    pub rotate_right: bool,
    #[serde(default)]
    pub forward: bool,
}

impl From<ManualInputDto> for ManualInput {
    fn from(input: ManualInputDto) -> Self {
        Self {
            rotate_left: input.rotate_left,
            rotate_right: input.rotate_right,
            forward: input.forward,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDto {
    pub x: f32,
    pub y: f32,
}

impl From<PointDto> for Vector {
    fn from(point: PointDto) -> Self {
        Vector::new(point.x, point.y)
    }
}

impl From<Vector> for PointDto {
    fn from(v: Vector) -> Self {
        Self { x: v.x, y: v.y }
    }
}

/// Optimizer settings; missing fields keep the current value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ConfigDto {
    #[serde(default)]
    pub population_size: Option<usize>,
    #[serde(default)]
    pub elitism: Option<i64>,
    #[serde(default)]
    pub mutation_rate: Option<f32>,
}

impl From<ConfigDto> for SettingsUpdate {
    fn from(config: ConfigDto) -> Self {
        Self {
            population_size: config.population_size,
            elitism: config.elitism,
            mutation_rate: config.mutation_rate,
        }
    }
}

/// Snapshot of the simulation sent to clients on each tick.
#[derive(Debug, Clone, Serialize)]
pub struct WorldUpdateDto {
    pub tick: u64,
    pub generation: u32,
    pub ai_enabled: bool,
    pub show_grid: bool,
    pub tanks: Vec<TankDto>,
    pub polygons: Vec<PolygonDto>,
    pub staged_polygons: Vec<PolygonDto>,
    pub pending_points: Vec<PointDto>,
    pub telemetry: TelemetryDto,
}

impl From<WorldUpdate> for WorldUpdateDto {
    fn from(update: WorldUpdate) -> Self {
        Self {
            tick: update.tick,
            generation: update.generation,
            ai_enabled: update.ai_enabled,
            show_grid: update.show_grid,
            tanks: update.tanks.iter().map(TankDto::from).collect(),
            polygons: update.polygons.iter().map(PolygonDto::from).collect(),
            staged_polygons: update.staged_polygons.iter().map(PolygonDto::from).collect(),
            pending_points: update.pending_points.into_iter().map(PointDto::from).collect(),
            telemetry: TelemetryDto::from(&update.telemetry),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TankDto {
    pub x: f32,
    pub y: f32,
    // Radians.
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
    pub stopped: bool,
    pub fitness: f32,
    pub sensors: Vec<SensorDto>,
}

impl From<&TankSnapshot> for TankDto {
    fn from(tank: &TankSnapshot) -> Self {
        Self {
            x: tank.position.x,
            y: tank.position.y,
            rotation: tank.rotation,
            width: tank.width,
            height: tank.height,
            stopped: tank.stopped,
            fitness: tank.fitness,
            sensors: tank.sensors.iter().map(SensorDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorDto {
    pub role: &'static str,
    pub origin: PointDto,
    pub direction: PointDto,
    pub length: f32,
    pub hit: bool,
    // Absent when the ray hit nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_distance: Option<f32>,
}

impl From<&SensorSnapshot> for SensorDto {
    fn from(sensor: &SensorSnapshot) -> Self {
        Self {
            role: sensor.role.name(),
            origin: sensor.position.into(),
            direction: sensor.direction.into(),
            length: sensor.length,
            hit: sensor.hit,
            hit_distance: sensor.hit_distance,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PolygonDto {
    pub vertices: Vec<PointDto>,
}

impl From<&PolygonSnapshot> for PolygonDto {
    fn from(polygon: &PolygonSnapshot) -> Self {
        Self {
            vertices: polygon.vertices.iter().copied().map(PointDto::from).collect(),
        }
    }
}

/// Telemetry as served on the WebSocket and `GET /telemetry`.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryDto {
    pub tick: u64,
    pub generation: u32,
    pub ai_enabled: bool,
    pub population_size: usize,
    pub elitism: i64,
    pub mutation_rate: f32,
    pub remaining_ms: u64,
    pub fitness: Vec<f32>,
    pub stopped: usize,
    pub best_history: Vec<f32>,
}

impl From<&Telemetry> for TelemetryDto {
    fn from(t: &Telemetry) -> Self {
        Self {
            tick: t.tick,
            generation: t.generation,
            ai_enabled: t.ai_enabled,
            population_size: t.settings.population_size,
            elitism: t.settings.elitism,
            mutation_rate: t.settings.mutation_rate,
            remaining_ms: u64::try_from(t.remaining.as_millis()).unwrap_or(u64::MAX),
            fitness: t.fitness.clone(),
            stopped: t.stopped,
            best_history: t.best_history.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeneticSettings;

    #[test]
    fn client_messages_parse_from_tagged_json() {
        let input: ClientMessage =
            serde_json::from_str(r#"{"type":"Input","data":{"forward":true}}"#).unwrap();
        match input {
            ClientMessage::Input(dto) => {
                assert!(dto.forward);
                assert!(!dto.rotate_left);
            }
            other => panic!("unexpected {other:?}"),
        }

        let toggle: ClientMessage = serde_json::from_str(r#"{"type":"ToggleAi"}"#).unwrap();
        assert!(matches!(toggle, ClientMessage::ToggleAi));

        let grid: ClientMessage =
            serde_json::from_str(r#"{"type":"ShowGrid","data":{"enabled":true}}"#).unwrap();
        assert!(matches!(grid, ClientMessage::ShowGrid { enabled: true }));

        let point: ClientMessage =
            serde_json::from_str(r#"{"type":"AddPoint","data":{"x":12.5,"y":40}}"#).unwrap();
        let ClientMessage::AddPoint(point) = point else {
            panic!("expected point");
        };
        assert_eq!(point, PointDto { x: 12.5, y: 40.0 });
    }

    #[test]
    fn partial_config_keeps_current_values() {
        let reset: ClientMessage = serde_json::from_str(r#"{"type":"Reset"}"#).unwrap();
        assert!(matches!(reset, ClientMessage::Reset));

        let configure: ClientMessage =
            serde_json::from_str(r#"{"type":"Configure","data":{"elitism":4}}"#).unwrap();
        let ClientMessage::Configure(config) = configure else {
            panic!("expected config");
        };
        let applied = SettingsUpdate::from(config).apply(GeneticSettings::default());
        assert_eq!(applied.elitism, 4);
        assert_eq!(applied.population_size, 30);
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"Fire"}"#).is_err());
    }

    #[test]
    fn missing_hit_distance_is_omitted() {
        let dto = SensorDto {
            role: "front_left",
            origin: PointDto { x: 0.0, y: 0.0 },
            direction: PointDto { x: 1.0, y: 0.0 },
            length: 1000.0,
            hit: false,
            hit_distance: None,
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("hit_distance").is_none());
        assert_eq!(json["hit"], false);
    }
}
