use crate::domain::geometry::{Polygon, Vector};

/// Default arena layout and where each generation starts.

#[derive(Debug, Clone, Copy)]
pub struct ArenaTuning {
    /// Top-left corner of the boundary rectangle.
    pub min: Vector,

    /// Bottom-right corner of the boundary rectangle.
    pub max: Vector,

    /// Spawn position (top-left of the tank hitbox).
    pub spawn_position: Vector,

    /// Spawn heading in degrees.
    pub spawn_rotation_deg: f32,
}

impl ArenaTuning {
    pub fn spawn_rotation(&self) -> f32 {
        self.spawn_rotation_deg.to_radians()
    }

    /// Boundary rectangle as a closed polygon.
    pub fn boundary(&self) -> Polygon {
        Polygon::new(vec![
            self.min,
            Vector::new(self.min.x, self.max.y),
            self.max,
            Vector::new(self.max.x, self.min.y),
        ])
    }
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            min: Vector::new(10.0, 10.0),
            max: Vector::new(980.0, 680.0),
            spawn_position: Vector::new(200.0, 150.0),
            spawn_rotation_deg: 90.0,
        }
    }
}
