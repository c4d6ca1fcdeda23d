// Use cases layer: the simulation workflow and the task that drives it.

pub mod game;
pub mod simulation;
pub mod types;

pub use simulation::{Simulation, SimulationSettings};
pub use types::{
    GenerationEnd, GenerationSummary, SettingsUpdate, SimEvent, Telemetry, TickReport, WorldUpdate,
};
