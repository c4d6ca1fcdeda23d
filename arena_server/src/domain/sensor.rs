// Distance sensors rigidly attached to a tank body.

use crate::domain::geometry::{Polygon, Segment, Vector, ray_polygon_nearest_hit};
use crate::domain::tuning::TankTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorRole {
    FrontLeft,
    FrontRight,
    LeftSide,
    RightSide,
}

impl SensorRole {
    /// Canonical order; sensor arrays and controller inputs follow it.
    pub const ALL: [SensorRole; 4] = [
        SensorRole::FrontLeft,
        SensorRole::FrontRight,
        SensorRole::LeftSide,
        SensorRole::RightSide,
    ];

    pub fn index(self) -> usize {
        match self {
            SensorRole::FrontLeft => 0,
            SensorRole::FrontRight => 1,
            SensorRole::LeftSide => 2,
            SensorRole::RightSide => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SensorRole::FrontLeft => "front_left",
            SensorRole::FrontRight => "front_right",
            SensorRole::LeftSide => "left_side",
            SensorRole::RightSide => "right_side",
        }
    }

    /// Where this sensor sits on a tank built from `tuning`.
    pub fn mount(self, tuning: &TankTuning) -> SensorMount {
        let (w, h) = (tuning.width, tuning.height);
        let inset = tuning.side_sensor_inset;
        let side_angle = tuning.side_sensor_angle_deg.to_radians();

        match self {
            SensorRole::FrontLeft => SensorMount::forward(Vector::new(w, 0.0)),
            SensorRole::FrontRight => SensorMount::forward(Vector::new(w, h)),
            SensorRole::LeftSide => SensorMount {
                offset: Vector::new(w - inset, inset),
                offset_angle: -side_angle,
            },
            SensorRole::RightSide => SensorMount {
                offset: Vector::new(w - inset, h - inset),
                offset_angle: side_angle,
            },
        }
    }
}

/// Body-relative placement: offset from the hitbox top-left, and angle from the heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorMount {
    pub offset: Vector,
    pub offset_angle: f32,
}

impl SensorMount {
    pub fn forward(offset: Vector) -> Self {
        Self {
            offset,
            offset_angle: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sensor {
    role: SensorRole,
    mount: SensorMount,
    range: f32,
    position: Vector,
    direction: Vector,
    // Infinite exactly when nothing was hit.
    hit_distance: f32,
}

impl Sensor {
    pub fn new(role: SensorRole, tuning: &TankTuning) -> Self {
        Self {
            role,
            mount: role.mount(tuning),
            range: tuning.sensor_range,
            position: Vector::ZERO,
            direction: Vector::ZERO,
            hit_distance: f32::INFINITY,
        }
    }

    pub fn role(&self) -> SensorRole {
        self.role
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    pub fn position(&self) -> Vector {
        self.position
    }

    pub fn direction(&self) -> Vector {
        self.direction
    }

    pub fn hit(&self) -> bool {
        self.hit_distance.is_finite()
    }

    pub fn hit_distance(&self) -> f32 {
        self.hit_distance
    }

    /// Hit distance as a fraction of range; 1.0 when nothing is in reach.
    pub fn normalized_reading(&self) -> f32 {
        if self.hit() && self.range > 0.0 {
            (self.hit_distance / self.range).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Re-derives the world pose from the owning tank and casts against the arena.
    pub fn update(&mut self, tank_position: Vector, tank_center: Vector, rotation: f32, polygons: &[Polygon]) {
        let attached = tank_position + self.mount.offset;
        self.position = (attached - tank_center).rotate(rotation) + tank_center;
        self.direction = Vector::from_angle(rotation + self.mount.offset_angle);

        let ray = Segment::new(self.position, self.position + self.direction * self.range);
        self.hit_distance = polygons
            .iter()
            .filter(|polygon| !polygon.is_degenerate())
            .filter_map(|polygon| ray_polygon_nearest_hit(ray, polygon))
            .fold(f32::INFINITY, f32::min);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_at_x(x: f32) -> Polygon {
        Polygon::new(vec![Vector::new(x, -500.0), Vector::new(x, 500.0)])
    }

    #[test]
    fn forward_sensor_reports_distance_to_wall() {
        let tuning = TankTuning::default();
        let mut sensor = Sensor::new(SensorRole::FrontLeft, &tuning);
        let position = Vector::new(0.0, 0.0);
        let center = Vector::new(tuning.width / 2.0, tuning.height / 2.0);

        sensor.update(position, center, 0.0, &[wall_at_x(150.0)]);

        assert!(sensor.hit());
        assert_eq!(sensor.position(), Vector::new(50.0, 0.0));
        assert!((sensor.hit_distance() - 100.0).abs() < 1e-3);
        assert!((sensor.normalized_reading() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn nearest_polygon_wins() {
        let tuning = TankTuning::default();
        let mut sensor = Sensor::new(SensorRole::FrontRight, &tuning);
        let center = Vector::new(25.0, 10.0);

        sensor.update(Vector::ZERO, center, 0.0, &[wall_at_x(400.0), wall_at_x(90.0), wall_at_x(250.0)]);

        assert!((sensor.hit_distance() - 40.0).abs() < 1e-3);
    }

    #[test]
    fn no_polygons_means_no_hit() {
        let tuning = TankTuning::default();
        let mut sensor = Sensor::new(SensorRole::LeftSide, &tuning);

        sensor.update(Vector::ZERO, Vector::new(25.0, 10.0), 0.3, &[]);

        assert!(!sensor.hit());
        assert!(sensor.hit_distance().is_infinite());
        assert_eq!(sensor.normalized_reading(), 1.0);
    }

    #[test]
    fn out_of_range_wall_is_not_hit() {
        let tuning = TankTuning::default();
        let mut sensor = Sensor::new(SensorRole::FrontLeft, &tuning);

        sensor.update(Vector::ZERO, Vector::new(25.0, 10.0), 0.0, &[wall_at_x(2000.0)]);

        assert!(!sensor.hit());
    }

    #[test]
    fn degenerate_polygons_are_skipped() {
        let tuning = TankTuning::default();
        let mut sensor = Sensor::new(SensorRole::FrontLeft, &tuning);
        let lonely = Polygon::new(vec![Vector::new(100.0, 0.0)]);

        sensor.update(Vector::ZERO, Vector::new(25.0, 10.0), 0.0, &[lonely, wall_at_x(300.0)]);

        assert!((sensor.hit_distance() - 250.0).abs() < 1e-3);
    }

    #[test]
    fn mount_rotates_with_the_body() {
        let tuning = TankTuning::default();
        let mut sensor = Sensor::new(SensorRole::FrontLeft, &tuning);
        let position = Vector::new(200.0, 150.0);
        let center = Vector::new(225.0, 160.0);

        sensor.update(position, center, std::f32::consts::FRAC_PI_2, &[]);

        // Nose-left corner (+25, -10 from center) turned a quarter clockwise in screen space.
        assert!((sensor.position().x - 235.0).abs() < 1e-3);
        assert!((sensor.position().y - 185.0).abs() < 1e-3);
        assert!((sensor.direction().y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn side_sensors_angle_away_from_heading() {
        let tuning = TankTuning::default();
        let left = SensorRole::LeftSide.mount(&tuning);
        let right = SensorRole::RightSide.mount(&tuning);

        assert!(left.offset_angle < 0.0);
        assert!((left.offset_angle + right.offset_angle).abs() < 1e-6);
        assert_eq!(left.offset, Vector::new(35.0, 15.0));
        assert_eq!(right.offset, Vector::new(35.0, 5.0));
    }
}
