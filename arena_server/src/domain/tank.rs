// Tank body state and the exploration bookkeeping that turns movement into fitness.

use crate::domain::geometry::{Polygon, Vector};
use crate::domain::sensor::{Sensor, SensorRole};
use crate::domain::tuning::{ExplorationTuning, TankTuning};
use std::collections::{HashSet, VecDeque};

/// Outcome of feeding one tick of movement into the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Movement buffered; fitness unchanged.
    Buffered,
    /// Buffer flushed into fitness.
    Flushed { distance: f32, new_cell: bool },
}

/// Distance and novelty accounting for one tank over one generation.
#[derive(Debug, Clone, Default)]
pub struct ExplorationTracker {
    // Net displacement since the last flush.
    pending: Vector,
    visited: HashSet<i64>,
    total_distance: f32,
    total_squares: f32,
}

impl ExplorationTracker {
    pub fn total_distance(&self) -> f32 {
        self.total_distance
    }

    pub fn total_squares(&self) -> f32 {
        self.total_squares
    }

    pub fn visited_cells(&self) -> usize {
        self.visited.len()
    }

    pub fn pending(&self) -> Vector {
        self.pending
    }

    pub fn score(&self) -> f32 {
        self.total_distance + self.total_squares
    }

    /// Buffers `displacement`; once the buffered travel passes the flush distance the
    /// cell under `position` is scored and the distance is banked.
    pub fn record(&mut self, position: Vector, displacement: Vector, tuning: &ExplorationTuning) -> Progress {
        self.pending = self.pending + displacement;

        let travelled = self.pending.length();
        if travelled <= tuning.flush_distance {
            return Progress::Buffered;
        }

        let cell = cell_id(position, tuning);
        let new_cell = self.visited.insert(cell);
        if new_cell {
            self.total_squares += tuning.novelty_bonus;
        }
        self.total_distance += travelled;
        self.pending = Vector::ZERO;

        Progress::Flushed {
            distance: travelled,
            new_cell,
        }
    }
}

/// Coarse grid cell containing `position`.
pub fn cell_id(position: Vector, tuning: &ExplorationTuning) -> i64 {
    let column = (position.x / tuning.cell_width).round() as i64;
    let row = (position.y / tuning.cell_height).round() as i64;
    column * 10 + row
}

#[derive(Debug, Clone)]
pub struct Tank {
    pub position: Vector,
    pub rotation: f32,
    width: f32,
    height: f32,
    sensors: [Sensor; 4],
    stopped: bool,
    exploration: ExplorationTracker,
    history: VecDeque<Vector>,
    history_capacity: usize,
}

impl Tank {
    /// Fresh tank for a new generation; `history_capacity` caps the recorded path.
    pub fn spawn(position: Vector, rotation: f32, tuning: &TankTuning, history_capacity: usize) -> Self {
        Self {
            position,
            rotation,
            width: tuning.width,
            height: tuning.height,
            sensors: SensorRole::ALL.map(|role| Sensor::new(role, tuning)),
            stopped: false,
            exploration: ExplorationTracker::default(),
            history: VecDeque::with_capacity(history_capacity.min(4096)),
            history_capacity,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn center(&self) -> Vector {
        self.position + Vector::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn sensors(&self) -> &[Sensor; 4] {
        &self.sensors
    }

    pub fn sensor(&self, role: SensorRole) -> &Sensor {
        &self.sensors[role.index()]
    }

    /// Normalized readings in `SensorRole::ALL` order.
    pub fn readings(&self) -> [f32; 4] {
        self.sensors.each_ref().map(Sensor::normalized_reading)
    }

    pub fn refresh_sensors(&mut self, polygons: &[Polygon]) {
        let (position, center, rotation) = (self.position, self.center(), self.rotation);
        for sensor in &mut self.sensors {
            sensor.update(position, center, rotation, polygons);
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Freezes the tank for the rest of the generation.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn exploration(&self) -> &ExplorationTracker {
        &self.exploration
    }

    pub fn total_distance(&self) -> f32 {
        self.exploration.total_distance()
    }

    pub fn total_squares(&self) -> f32 {
        self.exploration.total_squares()
    }

    pub fn fitness(&self) -> f32 {
        self.exploration.score()
    }

    pub fn history(&self) -> &VecDeque<Vector> {
        &self.history
    }

    /// Logs the current position and feeds the tick displacement into fitness.
    pub fn record_progress(&mut self, displacement: Vector, tuning: &ExplorationTuning) -> Progress {
        if self.history_capacity > 0 {
            if self.history.len() == self.history_capacity {
                self.history.pop_front();
            }
            self.history.push_back(self.position);
        }
        self.exploration.record(self.position, displacement, tuning)
    }
}
