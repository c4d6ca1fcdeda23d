// Policies that turn sensor readings into a steering command.

/// Length of every controller parameter vector.
pub const PARAMETER_COUNT: usize = 16;

const INPUTS: usize = 4;
const HIDDEN: usize = 2;

/// Normalized steering request; the kinematics system scales it by the tank's limits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Command {
    /// -1.0 (full left) ..= 1.0 (full right).
    pub turn: f32,
    /// 0.0 (hold) ..= 1.0 (full speed).
    pub throttle: f32,
}

impl Command {
    pub const IDLE: Command = Command {
        turn: 0.0,
        throttle: 0.0,
    };

    pub fn clamped(self) -> Self {
        let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
        Self {
            turn: finite(self.turn).clamp(-1.0, 1.0),
            throttle: finite(self.throttle).clamp(0.0, 1.0),
        }
    }
}

/// Anything that can steer a tank. `readings` follow `SensorRole::ALL` order and
/// `parameters` is the paired individual's vector.
pub trait Controller: Send {
    fn command(&self, readings: &[f32; 4], parameters: &[f32]) -> Command;
}

/// Default evolved policy: a 4-2-2 feed-forward net whose 16 weights are the
/// individual's parameters.
///
/// Layout: `[0..8]` input→hidden weights, `[8..10]` hidden biases, `[10..12]` hidden→turn,
/// `[12]` turn bias, `[13..15]` hidden→throttle, `[15]` throttle bias.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorPolicy;

impl Controller for SensorPolicy {
    fn command(&self, readings: &[f32; 4], parameters: &[f32]) -> Command {
        if parameters.len() < PARAMETER_COUNT {
            return Command::IDLE;
        }

        let mut hidden = [0.0_f32; HIDDEN];
        for (j, h) in hidden.iter_mut().enumerate() {
            let weights = &parameters[j * INPUTS..(j + 1) * INPUTS];
            let sum: f32 = weights.iter().zip(readings).map(|(w, x)| w * x).sum();
            *h = (sum + parameters[INPUTS * HIDDEN + j]).tanh();
        }

        let turn = parameters[10] * hidden[0] + parameters[11] * hidden[1] + parameters[12];
        let throttle = parameters[13] * hidden[0] + parameters[14] * hidden[1] + parameters[15];

        Command {
            turn: turn.tanh(),
            throttle: sigmoid(throttle),
        }
        .clamped()
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Holds position; used for tanks nobody is driving.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parked;

impl Controller for Parked {
    fn command(&self, _readings: &[f32; 4], _parameters: &[f32]) -> Command {
        Command::IDLE
    }
}

/// Held keys from a human driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManualInput {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub forward: bool,
}

/// Keyboard driving; ignores sensors and parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualController {
    pub input: ManualInput,
}

impl Controller for ManualController {
    fn command(&self, _readings: &[f32; 4], _parameters: &[f32]) -> Command {
        let mut turn = 0.0;
        if self.input.rotate_left {
            turn -= 1.0;
        }
        if self.input.rotate_right {
            turn += 1.0;
        }

        Command {
            turn,
            throttle: if self.input.forward { 1.0 } else { 0.0 },
        }
    }
}
