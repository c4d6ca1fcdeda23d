// Read-only per-tick views handed to renderers.

use crate::domain::geometry::{Polygon, Vector};
use crate::domain::sensor::{Sensor, SensorRole};
use crate::domain::tank::Tank;

#[derive(Debug, Clone)]
pub struct SensorSnapshot {
    pub role: SensorRole,
    pub position: Vector,
    pub direction: Vector,
    pub length: f32,
    pub hit: bool,
    pub hit_distance: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct TankSnapshot {
    pub position: Vector,
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
    pub stopped: bool,
    pub fitness: f32,
    pub sensors: Vec<SensorSnapshot>,
}

#[derive(Debug, Clone)]
pub struct PolygonSnapshot {
    pub vertices: Vec<Vector>,
}

impl From<&Sensor> for SensorSnapshot {
    fn from(s: &Sensor) -> Self {
        Self {
            role: s.role(),
            position: s.position(),
            direction: s.direction(),
            length: s.range(),
            hit: s.hit(),
            hit_distance: s.hit().then(|| s.hit_distance()),
        }
    }
}

impl From<&Tank> for TankSnapshot {
    fn from(t: &Tank) -> Self {
        Self {
            position: t.position,
            rotation: t.rotation,
            width: t.width(),
            height: t.height(),
            stopped: t.is_stopped(),
            fitness: t.fitness(),
            sensors: t.sensors().iter().map(SensorSnapshot::from).collect(),
        }
    }
}

impl From<&Polygon> for PolygonSnapshot {
    fn from(p: &Polygon) -> Self {
        Self {
            vertices: p.vertices().to_vec(),
        }
    }
}
