// Domain layer: core simulation types and rules.

pub mod arena;
pub mod controller;
pub mod genetic;
pub mod geometry;
pub mod sensor;
pub mod state;
pub mod systems;
pub mod tank;
pub mod tuning;

pub use arena::Arena;
pub use controller::{Command, Controller, ManualController, ManualInput, Parked, SensorPolicy};
pub use genetic::{GeneticModel, GeneticSettings, Individual};
pub use geometry::{Polygon, Segment, Vector};
pub use state::{PolygonSnapshot, SensorSnapshot, TankSnapshot};
pub use tank::Tank;
