// Gameplay tuning, kept apart from runtime configuration (ports, tick rate, channel sizes).

pub mod arena;
pub mod exploration;
pub mod tank;

pub use arena::ArenaTuning;
pub use exploration::ExplorationTuning;
pub use tank::TankTuning;
