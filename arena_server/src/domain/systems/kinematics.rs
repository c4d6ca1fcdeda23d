use crate::domain::controller::{Command, Controller};
use crate::domain::geometry::{Polygon, Vector};
use crate::domain::systems::collision::tank_collides;
use crate::domain::tank::{Progress, Tank};
use crate::domain::tuning::{ExplorationTuning, TankTuning};

#[derive(Debug, Clone, Copy)]
pub struct MovementConfig {
    pub rotation_speed: f32, // rad/tick
    pub move_speed: f32,     // units/tick
}

impl From<&TankTuning> for MovementConfig {
    fn from(tuning: &TankTuning) -> Self {
        Self {
            rotation_speed: tuning.rotation_speed(),
            move_speed: tuning.move_speed,
        }
    }
}

/// What happened to one tank during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TankStep {
    /// Already stopped; untouched.
    Skipped,
    /// Hit a wall this tick and is now stopped.
    Collided,
    /// Moved freely.
    Moved(Progress),
}

/// Rotate first, then advance along the new heading. Returns the displacement.
pub fn apply_command(tank: &mut Tank, command: Command, cfg: MovementConfig) -> Vector {
    let command = command.clamped();
    tank.rotation += command.turn * cfg.rotation_speed;

    let displacement = Vector::from_angle(tank.rotation) * (command.throttle * cfg.move_speed);
    tank.position += displacement;
    displacement
}

/// Full per-tank pipeline: sensors, control, integration, collision, fitness.
pub fn tick_tank(
    tank: &mut Tank,
    controller: &dyn Controller,
    parameters: &[f32],
    polygons: &[Polygon],
    cfg: MovementConfig,
    exploration: &ExplorationTuning,
) -> TankStep {
    if tank.is_stopped() {
        return TankStep::Skipped;
    }

    tank.refresh_sensors(polygons);
    let command = controller.command(&tank.readings(), parameters);
    let displacement = apply_command(tank, command, cfg);

    if tank_collides(tank, polygons) {
        tank.stop();
        return TankStep::Collided;
    }

    TankStep::Moved(tank.record_progress(displacement, exploration))
}
