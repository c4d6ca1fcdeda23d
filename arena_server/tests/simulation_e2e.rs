// Drives the simulation directly, one tick at a time.

use arena_server::domain::{Command, Controller, GeneticSettings, ManualInput, Vector};
use arena_server::use_cases::{GenerationEnd, SimEvent, Simulation, SimulationSettings, TickReport};
use std::time::Duration;

struct Forward;

impl Controller for Forward {
    fn command(&self, _readings: &[f32; 4], _parameters: &[f32]) -> Command {
        Command {
            turn: 0.0,
            throttle: 1.0,
        }
    }
}

fn settings(population_size: usize, generation_time_limit: Duration) -> SimulationSettings {
    SimulationSettings {
        genetic: GeneticSettings {
            population_size,
            elitism: 1,
            mutation_rate: 0.25,
        },
        generation_time_limit,
        seed: 2024,
        ..SimulationSettings::default()
    }
}

#[test]
fn straight_run_banks_distance_then_freezes_at_the_wall() {
    let mut sim = Simulation::new(SimulationSettings {
        ai_enabled: false,
        ..settings(1, Duration::from_secs(30))
    });
    sim.handle_event(SimEvent::ManualInput(ManualInput {
        forward: true,
        ..ManualInput::default()
    }));

    let mut ticks = 0u64;
    while !sim.tanks()[0].is_stopped() {
        sim.tick();
        ticks += 1;
        assert!(ticks < 200, "tank never reached the wall");

        let tank = &sim.tanks()[0];
        if !tank.is_stopped() && ticks % 5 == 0 {
            // Five 5-unit steps pass the flush threshold every time.
            let expected = 5.0 * ticks as f32;
            assert!(
                (tank.total_distance() - expected).abs() < 0.01,
                "tick {ticks}: distance {} != {expected}",
                tank.total_distance()
            );
            assert_eq!(tank.total_squares() % 200.0, 0.0);
            assert!(tank.total_squares() >= 200.0);
        }
    }

    // Heading +y at 5 units per tick, the nose starts 495 units from the far wall.
    assert!((99..=100).contains(&ticks), "stopped after {ticks} ticks");

    let frozen = (sim.tanks()[0].position, sim.tanks()[0].rotation, sim.tanks()[0].fitness());
    for _ in 0..20 {
        sim.tick();
    }
    let tank = &sim.tanks()[0];
    assert_eq!((tank.position, tank.rotation, tank.fitness()), frozen);
    assert_eq!(sim.telemetry().fitness[0], frozen.2);
    assert_eq!(sim.model().generation(), 0);
}

#[test]
fn champion_carries_into_the_next_generation() {
    let mut sim = Simulation::new(settings(5, Duration::from_millis(100))).with_policy(Box::new(Forward));

    let summary = loop {
        if let TickReport::GenerationEnded(summary) = sim.tick() {
            break summary;
        }
    };

    assert_eq!(summary.reason, GenerationEnd::Timeout);
    // 100 ms at 60 ticks per second.
    assert_eq!(summary.ticks, 6);
    assert_eq!(summary.fitness.len(), 5);
    let best = summary.fitness.iter().copied().fold(f32::MIN, f32::max);
    assert_eq!(summary.best_fitness, best);
    assert_eq!(summary.champion.fitness, best);

    assert_eq!(sim.model().generation(), 1);
    assert_eq!(sim.model().individuals()[0].parameters, summary.champion.parameters);
    assert!(sim.model().individuals().iter().all(|i| i.fitness == 0.0));
    assert!(
        sim.tanks()
            .iter()
            .all(|t| t.position == Vector::new(200.0, 150.0) && t.fitness() == 0.0)
    );
    assert_eq!(sim.telemetry().best_history, vec![best]);
}

#[test]
fn same_seed_evolves_identically() {
    let run = || {
        let mut sim = Simulation::new(settings(8, Duration::from_millis(500)));
        let mut summaries = Vec::new();
        while summaries.len() < 2 {
            if let TickReport::GenerationEnded(summary) = sim.tick() {
                summaries.push((summary.fitness, summary.champion.parameters));
            }
        }
        summaries
    };
    assert_eq!(run(), run());
}

#[test]
fn reset_starts_over_from_generation_zero() {
    let mut sim = Simulation::new(settings(4, Duration::from_millis(50))).with_policy(Box::new(Forward));
    while sim.model().generation() < 2 {
        sim.tick();
    }

    sim.handle_event(SimEvent::Reset);
    assert_eq!(sim.model().generation(), 0);
    assert_eq!(sim.tanks().len(), 4);
    assert!(sim.telemetry().best_history.is_empty());
    assert_eq!(sim.generation_tick(), 0);
}
