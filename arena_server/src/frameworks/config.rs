use crate::domain::GeneticSettings;
use crate::use_cases::SimulationSettings;
use std::{
    env,
    str::FromStr,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

// Runtime/server constants (not gameplay tuning).

pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
pub const WORLD_BROADCAST_CAPACITY: usize = 128;

pub const TICK_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Reads `key`, falling back to `default` when unset or unparseable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "unparseable setting; using default");
            default
        }),
        Err(_) => default,
    }
}

pub fn http_port() -> u16 {
    env_or("ARENA_SERVER_PORT", 3001)
}

pub fn population_size() -> usize {
    env_or("POPULATION_SIZE", GeneticSettings::default().population_size)
}

pub fn elitism() -> i64 {
    env_or("ELITISM", GeneticSettings::default().elitism)
}

pub fn mutation_rate() -> f32 {
    env_or("MUTATION_RATE", GeneticSettings::default().mutation_rate)
}

pub fn generation_time_limit() -> Duration {
    Duration::from_millis(env_or("GENERATION_TIME_LIMIT_MS", 30_000))
}

pub fn ai_enabled() -> bool {
    env_or("AI_ENABLED", true)
}

/// Explicit seed, or one derived from the clock so separate runs differ.
pub fn simulation_seed() -> u64 {
    env::var("SIMULATION_SEED")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos() as u64
        })
}

pub fn simulation_settings() -> SimulationSettings {
    SimulationSettings {
        genetic: GeneticSettings {
            population_size: population_size(),
            elitism: elitism(),
            mutation_rate: mutation_rate(),
        },
        tick_interval: TICK_INTERVAL,
        generation_time_limit: generation_time_limit(),
        ai_enabled: ai_enabled(),
        seed: simulation_seed(),
    }
}
