/// Body, speed and sensor tuning shared by every tank.

#[derive(Debug, Clone, Copy)]
pub struct TankTuning {
    /// Hitbox extent along the heading.
    pub width: f32,

    /// Hitbox extent across the heading.
    pub height: f32,

    /// Largest heading change per tick, in degrees.
    pub rotation_speed_deg: f32,

    /// Largest forward advance per tick, in distance units.
    pub move_speed: f32,

    /// Sensor ray length.
    pub sensor_range: f32,

    /// How far the side sensors sit behind the nose, and in from the sides.
    pub side_sensor_inset: f32,

    /// Angle of the side sensors away from the heading, in degrees.
    pub side_sensor_angle_deg: f32,
}

impl TankTuning {
    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed_deg.to_radians()
    }
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 20.0,
            rotation_speed_deg: 5.0,
            move_speed: 5.0,
            sensor_range: 1000.0,
            side_sensor_inset: 15.0,
            side_sensor_angle_deg: 30.0,
        }
    }
}
