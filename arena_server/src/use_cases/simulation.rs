// Simulation context and its fixed-step scheduler.
//
// One `Simulation` owns everything that changes during a run: the arena, the tanks, the
// genetic model and the RNG. Callers advance it one tick at a time; nothing in here
// knows about wall-clock time.

use super::types::{GenerationEnd, GenerationSummary, SimEvent, Telemetry, TickReport, WorldUpdate};
use crate::domain::systems::kinematics::{MovementConfig, TankStep, tick_tank};
use crate::domain::genetic::MAX_POPULATION;
use crate::domain::tank::Progress;
use crate::domain::tuning::{ArenaTuning, ExplorationTuning, TankTuning};
use crate::domain::{
    Arena, Controller, GeneticModel, GeneticSettings, ManualController, Parked, PolygonSnapshot,
    SensorPolicy, Tank, TankSnapshot,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, error, info, warn};

// Finished generations kept for telemetry.
const BEST_HISTORY_LEN: usize = 100;

/// Settings read when a run (re)starts.
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    pub genetic: GeneticSettings,
    /// Simulated time per tick; used to convert the generation budget into ticks.
    pub tick_interval: Duration,
    /// Simulated time a generation may run before it is cut off.
    pub generation_time_limit: Duration,
    /// Whether the evolved policy drives the tanks from the start.
    pub ai_enabled: bool,
    pub seed: u64,
}

impl SimulationSettings {
    /// Generation budget in ticks, rounded to the nearest tick (at least one).
    pub fn generation_ticks(&self) -> u64 {
        let interval = self.tick_interval.as_nanos();
        if interval == 0 {
            return 1;
        }
        let ticks = (self.generation_time_limit.as_nanos() + interval / 2) / interval;
        u64::try_from(ticks).unwrap_or(u64::MAX).max(1)
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            genetic: GeneticSettings::default(),
            tick_interval: Duration::from_nanos(1_000_000_000 / 60),
            generation_time_limit: Duration::from_secs(30),
            ai_enabled: true,
            seed: 0,
        }
    }
}

pub struct Simulation {
    settings: SimulationSettings,
    tank_tuning: TankTuning,
    exploration: ExplorationTuning,
    arena_tuning: ArenaTuning,
    arena: Arena,
    model: GeneticModel,
    // Index-aligned with `model.individuals()`.
    tanks: Vec<Tank>,
    policy: Box<dyn Controller>,
    manual: ManualController,
    ai_enabled: bool,
    show_grid: bool,
    tick: u64,
    generation_tick: u64,
    best_history: VecDeque<f32>,
    rng: ChaCha8Rng,
}

impl Simulation {
    /// Default arena, evolved sensor policy, random first generation.
    pub fn new(settings: SimulationSettings) -> Self {
        let arena_tuning = ArenaTuning::default();
        let arena = Arena::bounded(&arena_tuning);
        let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
        let model = GeneticModel::new(settings.genetic, &mut rng);

        let mut sim = Self {
            ai_enabled: settings.ai_enabled,
            settings,
            tank_tuning: TankTuning::default(),
            exploration: ExplorationTuning::default(),
            arena_tuning,
            arena,
            model,
            tanks: Vec::new(),
            policy: Box::new(SensorPolicy),
            manual: ManualController::default(),
            show_grid: false,
            tick: 0,
            generation_tick: 0,
            best_history: VecDeque::new(),
            rng,
        };
        sim.spawn();
        sim
    }

    /// Replaces the policy used while AI is enabled.
    pub fn with_policy(mut self, policy: Box<dyn Controller>) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the arena and restarts the current generation in it.
    pub fn with_arena(mut self, arena: Arena) -> Self {
        self.arena = arena;
        self.spawn();
        self
    }

    /// Replaces the population (its length becomes the population size) and respawns.
    pub fn with_model(mut self, model: GeneticModel) -> Self {
        self.model = model;
        self.spawn();
        self
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn model(&self) -> &GeneticModel {
        &self.model
    }

    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai_enabled
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn generation_tick(&self) -> u64 {
        self.generation_tick
    }

    /// Spawn: staged obstacles join the arena, settings are clamped and applied, fitness
    /// is cleared and one fresh tank is placed per individual.
    fn spawn(&mut self) {
        let committed = self.arena.commit_staged();
        if committed > 0 {
            info!(polygons = committed, "staged obstacles added to arena");
        }

        let requested = self.settings.genetic;
        self.model.configure(requested.elitism, requested.mutation_rate);
        let applied = self.model.settings();
        if applied.elitism != requested.elitism || applied.mutation_rate != requested.mutation_rate {
            debug!(
                requested_elitism = requested.elitism,
                elitism = applied.elitism,
                requested_mutation_rate = requested.mutation_rate,
                mutation_rate = applied.mutation_rate,
                "genetic settings clamped"
            );
        }
        self.model.reset_fitness();

        let history_capacity = usize::try_from(self.settings.generation_ticks()).unwrap_or(usize::MAX);
        let position = self.arena_tuning.spawn_position;
        let rotation = self.arena_tuning.spawn_rotation();
        self.tanks = (0..self.model.individuals().len())
            .map(|_| Tank::spawn(position, rotation, &self.tank_tuning, history_capacity))
            .collect();
        self.generation_tick = 0;
    }

    /// Throws away the population and starts over from random individuals.
    pub fn reset(&mut self) {
        self.model = GeneticModel::new(self.settings.genetic.normalized(), &mut self.rng);
        self.best_history.clear();
        self.spawn();
        info!(
            population_size = self.model.population_size(),
            elitism = self.model.settings().elitism,
            mutation_rate = self.model.settings().mutation_rate,
            "simulation reset"
        );
    }

    pub fn handle_event(&mut self, event: SimEvent) {
        match event {
            SimEvent::ManualInput(input) => self.manual.input = input,
            SimEvent::ToggleAi => self.set_ai(!self.ai_enabled),
            SimEvent::SetAi(enabled) => self.set_ai(enabled),
            SimEvent::SetShowGrid(show) => self.show_grid = show,
            SimEvent::AddPoint(point) => {
                if point.x.is_finite() && point.y.is_finite() {
                    self.arena.add_point(point);
                }
            }
            SimEvent::FinalizePolygon => {
                if self.arena.finalize_polygon() {
                    info!(staged = self.arena.staged().len(), "polygon staged for next generation");
                }
            }
            SimEvent::Configure(update) => {
                let mut settings = update.apply(self.settings.genetic);
                if settings.population_size > MAX_POPULATION {
                    warn!(
                        requested = settings.population_size,
                        max = MAX_POPULATION,
                        "population size capped"
                    );
                    settings.population_size = MAX_POPULATION;
                }
                info!(
                    population_size = settings.population_size,
                    elitism = settings.elitism,
                    mutation_rate = settings.mutation_rate,
                    "genetic settings updated"
                );
                self.settings.genetic = settings;
            }
            SimEvent::Reset => self.reset(),
        }
    }

    fn set_ai(&mut self, enabled: bool) {
        if self.ai_enabled != enabled {
            info!(enabled, "ai toggled");
        }
        self.ai_enabled = enabled;
    }

    /// Advances one fixed step. Tanks run in index order, each through sensors, control,
    /// collision and fitness before the next; a finished generation is bred and respawned
    /// before this returns.
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;

        if self.tanks.len() != self.model.individuals().len() {
            error!(
                tanks = self.tanks.len(),
                individuals = self.model.individuals().len(),
                "tank/individual mismatch; respawning"
            );
            self.spawn();
            return TickReport::Idle;
        }
        if self.tanks.is_empty() {
            return TickReport::Idle;
        }

        self.generation_tick += 1;

        let cfg = MovementConfig::from(&self.tank_tuning);
        let polygons = self.arena.polygons();
        let ai_enabled = self.ai_enabled;

        for (index, (tank, individual)) in self
            .tanks
            .iter_mut()
            .zip(self.model.individuals_mut())
            .enumerate()
        {
            let controller: &dyn Controller = if ai_enabled {
                self.policy.as_ref()
            } else if index == 0 {
                &self.manual
            } else {
                &Parked
            };

            match tick_tank(tank, controller, &individual.parameters, polygons, cfg, &self.exploration) {
                TankStep::Moved(Progress::Flushed { .. }) => individual.fitness = tank.fitness(),
                TankStep::Collided => debug!(tank = index, tick = self.generation_tick, "tank stopped"),
                TankStep::Moved(Progress::Buffered) | TankStep::Skipped => {}
            }
        }

        if !self.ai_enabled {
            return TickReport::Running;
        }

        let reason = if self.tanks.iter().all(Tank::is_stopped) {
            Some(GenerationEnd::AllStopped)
        } else if self.generation_tick >= self.settings.generation_ticks() {
            Some(GenerationEnd::Timeout)
        } else {
            None
        };

        match reason {
            Some(reason) => TickReport::GenerationEnded(self.finish_generation(reason)),
            None => TickReport::Running,
        }
    }

    fn finish_generation(&mut self, reason: GenerationEnd) -> GenerationSummary {
        let generation = self.model.generation();
        let ticks = self.generation_tick;
        let fitness: Vec<f32> = self.model.individuals().iter().map(|i| i.fitness).collect();
        for (tank, score) in fitness.iter().enumerate() {
            debug!(generation, tank, fitness = score, "final fitness");
        }

        let ranked = self.model.evolve(&mut self.rng);
        let champion = ranked[0].clone();
        let mean_fitness = fitness.iter().sum::<f32>() / fitness.len() as f32;

        if self.best_history.len() == BEST_HISTORY_LEN {
            self.best_history.pop_front();
        }
        self.best_history.push_back(champion.fitness);

        info!(
            generation,
            ?reason,
            ticks,
            best_fitness = champion.fitness,
            mean_fitness,
            "generation finished"
        );

        self.spawn();

        GenerationSummary {
            generation,
            reason,
            ticks,
            best_fitness: champion.fitness,
            mean_fitness,
            fitness,
            champion,
        }
    }

    pub fn telemetry(&self) -> Telemetry {
        let remaining_ticks = self
            .settings
            .generation_ticks()
            .saturating_sub(self.generation_tick);

        Telemetry {
            tick: self.tick,
            generation: self.model.generation(),
            ai_enabled: self.ai_enabled,
            settings: self.model.settings(),
            remaining: self
                .settings
                .tick_interval
                .saturating_mul(u32::try_from(remaining_ticks).unwrap_or(u32::MAX)),
            fitness: self.model.individuals().iter().map(|i| i.fitness).collect(),
            stopped: self.tanks.iter().filter(|t| t.is_stopped()).count(),
            best_history: self.best_history.iter().copied().collect(),
        }
    }

    /// Consistent read-only view of the current tick for renderers.
    pub fn snapshot(&self) -> WorldUpdate {
        WorldUpdate {
            tick: self.tick,
            generation: self.model.generation(),
            ai_enabled: self.ai_enabled,
            show_grid: self.show_grid,
            tanks: self.tanks.iter().map(TankSnapshot::from).collect(),
            polygons: self.arena.polygons().iter().map(PolygonSnapshot::from).collect(),
            staged_polygons: self.arena.staged().iter().map(PolygonSnapshot::from).collect(),
            pending_points: self.arena.pending_points().to_vec(),
            telemetry: self.telemetry(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sensor::SensorRole;
    use crate::use_cases::types::SettingsUpdate;
    use crate::domain::{Command, GeneticSettings, Individual, ManualInput, Polygon, Vector};

    struct Forward;

    impl Controller for Forward {
        fn command(&self, _readings: &[f32; 4], _parameters: &[f32]) -> Command {
            Command {
                turn: 0.0,
                throttle: 1.0,
            }
        }
    }

    fn settings(population_size: usize) -> SimulationSettings {
        SimulationSettings {
            genetic: GeneticSettings {
                population_size,
                elitism: 1,
                mutation_rate: 0.2,
            },
            seed: 11,
            ..SimulationSettings::default()
        }
    }

    #[test]
    fn generation_ticks_follow_time_budget() {
        let s = SimulationSettings::default();
        // 30 s at 60 ticks per second.
        assert_eq!(s.tick_interval.as_nanos(), 16_666_666);
        assert_eq!(s.generation_ticks(), 1800);

        let s = SimulationSettings {
            tick_interval: Duration::ZERO,
            ..SimulationSettings::default()
        };
        assert_eq!(s.generation_ticks(), 1);
    }

    #[test]
    fn spawn_aligns_tanks_with_individuals() {
        let sim = Simulation::new(settings(7));
        assert_eq!(sim.tanks().len(), 7);
        assert_eq!(sim.model().individuals().len(), 7);
        assert!(sim.tanks().iter().all(|t| t.position == Vector::new(200.0, 150.0)));
    }

    #[test]
    fn empty_population_ticks_are_idle() {
        let mut sim = Simulation::new(settings(0));
        for _ in 0..3 {
            assert!(matches!(sim.tick(), TickReport::Idle));
        }
        assert_eq!(sim.tick_count(), 3);
        assert_eq!(sim.generation_tick(), 0);
    }

    #[test]
    fn no_polygons_is_not_fatal() {
        let mut sim = Simulation::new(settings(3))
            .with_arena(Arena::default())
            .with_policy(Box::new(Forward));
        for _ in 0..10 {
            assert!(matches!(sim.tick(), TickReport::Running));
        }
        assert!(sim.tanks().iter().all(|t| !t.sensor(SensorRole::FrontLeft).hit()));
    }

    #[test]
    fn all_stopped_ends_the_generation_early() {
        // Spawned noses sit at y=185; the first step carries them across the wall.
        let mut arena = Arena::bounded(&ArenaTuning::default());
        arena.add_point(Vector::new(0.0, 187.0));
        arena.add_point(Vector::new(1000.0, 187.0));
        arena.finalize_polygon();

        let mut sim = Simulation::new(settings(4))
            .with_arena(arena)
            .with_policy(Box::new(Forward));

        match sim.tick() {
            TickReport::GenerationEnded(summary) => {
                assert_eq!(summary.reason, GenerationEnd::AllStopped);
                assert_eq!(summary.ticks, 1);
                assert_eq!(summary.generation, 0);
            }
            other => panic!("expected generation end, got {other:?}"),
        }
        assert_eq!(sim.model().generation(), 1);
        assert_eq!(sim.tanks().len(), 4);
        assert!(sim.tanks().iter().all(|t| !t.is_stopped()));
    }

    #[test]
    fn manual_mode_drives_only_the_first_tank() {
        let mut sim = Simulation::new(settings(3));
        sim.handle_event(SimEvent::SetAi(false));
        sim.handle_event(SimEvent::ManualInput(ManualInput {
            forward: true,
            ..ManualInput::default()
        }));

        for _ in 0..10 {
            sim.tick();
        }

        let spawn = Vector::new(200.0, 150.0);
        assert!((sim.tanks()[0].position.y - 200.0).abs() < 1e-3);
        assert_eq!(sim.tanks()[1].position, spawn);
        assert_eq!(sim.tanks()[2].position, spawn);
    }

    #[test]
    fn timeout_is_ignored_while_ai_is_off() {
        let mut sim = Simulation::new(SimulationSettings {
            generation_time_limit: Duration::from_millis(50),
            ai_enabled: false,
            ..settings(2)
        });

        for _ in 0..20 {
            assert!(matches!(sim.tick(), TickReport::Running));
        }
        assert_eq!(sim.model().generation(), 0);
        assert_eq!(sim.telemetry().remaining, Duration::ZERO);

        sim.handle_event(SimEvent::ToggleAi);
        assert!(matches!(sim.tick(), TickReport::GenerationEnded(_)));
    }

    #[test]
    fn configure_applies_at_next_spawn_and_reset() {
        let mut sim = Simulation::new(settings(4));
        sim.handle_event(SimEvent::Configure(SettingsUpdate {
            population_size: Some(6),
            elitism: Some(99),
            mutation_rate: Some(3.0),
        }));
        assert_eq!(sim.model().settings().elitism, 1);
        assert_eq!(sim.telemetry().settings.population_size, 4);

        sim.handle_event(SimEvent::Reset);
        assert_eq!(sim.tanks().len(), 6);
        assert_eq!(sim.model().settings().elitism, 6);
        assert_eq!(sim.model().settings().mutation_rate, 1.0);
    }

    #[test]
    fn oversized_population_request_is_capped_on_reset() {
        let mut sim = Simulation::new(settings(4));
        sim.handle_event(SimEvent::Configure(SettingsUpdate {
            population_size: Some(usize::MAX),
            elitism: None,
            mutation_rate: None,
        }));
        sim.handle_event(SimEvent::Reset);

        assert_eq!(sim.tanks().len(), MAX_POPULATION);
        assert_eq!(sim.model().population_size(), MAX_POPULATION);
        assert_eq!(sim.telemetry().settings.population_size, MAX_POPULATION);
        assert!(matches!(sim.tick(), TickReport::Running));
    }

    #[test]
    fn staged_polygon_joins_arena_at_generation_start() {
        let mut sim = Simulation::new(SimulationSettings {
            generation_time_limit: Duration::from_millis(32),
            ..settings(2)
        });
        sim.handle_event(SimEvent::AddPoint(Vector::new(600.0, 100.0)));
        sim.handle_event(SimEvent::AddPoint(Vector::new(600.0, 500.0)));
        sim.handle_event(SimEvent::AddPoint(Vector::new(f32::NAN, 1.0)));
        sim.handle_event(SimEvent::FinalizePolygon);

        assert_eq!(sim.arena().polygons().len(), 1);
        assert_eq!(sim.snapshot().staged_polygons.len(), 1);
        assert_eq!(sim.snapshot().staged_polygons[0].vertices.len(), 2);

        while !matches!(sim.tick(), TickReport::GenerationEnded(_)) {}
        assert_eq!(sim.arena().polygons().len(), 2);
        assert!(sim.arena().staged().is_empty());
    }

    #[test]
    fn fitness_is_written_to_the_paired_individual() {
        let individuals = (0..2)
            .map(|_| Individual::new(vec![0.0; crate::domain::controller::PARAMETER_COUNT]))
            .collect();
        let model = GeneticModel::from_individuals(GeneticSettings::default(), individuals);
        let mut sim = Simulation::new(settings(2))
            .with_model(model)
            .with_policy(Box::new(Forward));

        for _ in 0..5 {
            sim.tick();
        }

        let telemetry = sim.telemetry();
        assert_eq!(telemetry.fitness.len(), 2);
        for (tank, fitness) in sim.tanks().iter().zip(&telemetry.fitness) {
            assert_eq!(tank.fitness(), *fitness);
            assert!(*fitness > 200.0);
        }
    }

    #[test]
    fn snapshot_reflects_sensor_state() {
        let mut sim = Simulation::new(settings(1)).with_policy(Box::new(Forward));
        sim.tick();
        let snapshot = sim.snapshot();
        let tank = &snapshot.tanks[0];
        assert_eq!(tank.sensors.len(), 4);
        assert!(tank.sensors.iter().all(|s| s.hit == s.hit_distance.is_some()));
        assert_eq!(snapshot.polygons.len(), 1);
        assert!(!snapshot.show_grid);
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let mut sim = Simulation::new(SimulationSettings {
                generation_time_limit: Duration::from_millis(200),
                ..settings(5)
            });
            for _ in 0..40 {
                sim.tick();
            }
            sim.tanks().iter().map(|t| t.position).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn polygon_api_is_read_only_during_generation() {
        let mut sim = Simulation::new(settings(1));
        let before: Vec<Polygon> = sim.arena().polygons().to_vec();
        sim.handle_event(SimEvent::AddPoint(Vector::new(1.0, 1.0)));
        sim.handle_event(SimEvent::FinalizePolygon);
        sim.tick();
        assert_eq!(sim.arena().polygons(), before.as_slice());
    }
}
