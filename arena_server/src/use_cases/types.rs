// Use-case level inputs/outputs for the simulation loop.

use crate::domain::{GeneticSettings, Individual, ManualInput, PolygonSnapshot, TankSnapshot, Vector};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum SimEvent {
    /// Held keys for the manually driven tank.
    ManualInput(ManualInput),
    ToggleAi,
    SetAi(bool),
    SetShowGrid(bool),
    AddPoint(Vector),
    FinalizePolygon,
    /// New optimizer settings, picked up at the next spawn (population size at the next reset).
    Configure(SettingsUpdate),
    /// Discard the population and start over with random individuals.
    Reset,
}

/// Partial optimizer settings; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettingsUpdate {
    pub population_size: Option<usize>,
    pub elitism: Option<i64>,
    pub mutation_rate: Option<f32>,
}

impl SettingsUpdate {
    pub fn apply(self, current: GeneticSettings) -> GeneticSettings {
        GeneticSettings {
            population_size: self.population_size.unwrap_or(current.population_size),
            elitism: self.elitism.unwrap_or(current.elitism),
            mutation_rate: self.mutation_rate.unwrap_or(current.mutation_rate),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationEnd {
    Timeout,
    AllStopped,
}

/// Outcome of a finished generation, taken just before the population was bred.
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub generation: u32,
    pub reason: GenerationEnd,
    pub ticks: u64,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    /// Per-tank fitness in population order.
    pub fitness: Vec<f32>,
    pub champion: Individual,
}

#[derive(Debug, Clone)]
pub enum TickReport {
    /// Nothing to simulate (no tanks).
    Idle,
    Running,
    GenerationEnded(GenerationSummary),
}

#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    pub tick: u64,
    pub generation: u32,
    pub ai_enabled: bool,
    /// Settings in effect for the running generation (after clamping).
    pub settings: GeneticSettings,
    pub remaining: Duration,
    /// Current fitness per individual, indexed like the tanks.
    pub fitness: Vec<f32>,
    pub stopped: usize,
    /// Best fitness of each finished generation, most recent last.
    pub best_history: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct WorldUpdate {
    pub tick: u64,
    pub generation: u32,
    pub ai_enabled: bool,
    pub show_grid: bool,
    pub tanks: Vec<TankSnapshot>,
    pub polygons: Vec<PolygonSnapshot>,
    pub staged_polygons: Vec<PolygonSnapshot>,
    pub pending_points: Vec<Vector>,
    pub telemetry: Telemetry,
}
