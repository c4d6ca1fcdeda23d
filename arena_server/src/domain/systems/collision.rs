use crate::domain::geometry::{Polygon, Segment, Vector, segment_intersect};
use crate::domain::tank::Tank;

/// The four sides of a `width` x `height` rectangle centred on the origin.
fn local_sides(width: f32, height: f32) -> [Segment; 4] {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let top_left = Vector::new(-hw, -hh);
    let top_right = Vector::new(hw, -hh);
    let bottom_left = Vector::new(-hw, hh);
    let bottom_right = Vector::new(hw, hh);

    [
        Segment::new(top_left, top_right),
        Segment::new(bottom_left, bottom_right),
        Segment::new(top_left, bottom_left),
        Segment::new(top_right, bottom_right),
    ]
}

/// True when any side of the tank's rotated hitbox touches any arena edge.
///
/// Edges are moved into the tank frame (translate by -center, rotate by -rotation) so the
/// hitbox can stay axis-aligned.
pub fn tank_collides(tank: &Tank, polygons: &[Polygon]) -> bool {
    let center = tank.center();
    let sides = local_sides(tank.width(), tank.height());
    let to_local = |point: Vector| (point - center).rotate(-tank.rotation);

    polygons
        .iter()
        .filter(|polygon| !polygon.is_degenerate())
        .flat_map(Polygon::edges)
        .any(|edge| {
            let (a, b) = (to_local(edge.start), to_local(edge.end));
            sides
                .iter()
                .any(|side| segment_intersect(a, b, side.start, side.end))
        })
}
