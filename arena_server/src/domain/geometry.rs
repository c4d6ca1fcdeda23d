// Geometry kernel: 2D vectors, segments, polygons and the two intersection tests
// every other system is built on.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

// Cross products below this magnitude are treated as collinear.
const COLLINEAR_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians, 0 = +X, positive turns toward +Y).
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Rotates around the origin by `angle` radians.
    pub fn rotate(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn dot(self, other: Vector) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(self, other: Vector) -> f32 {
        self.x * other.y - self.y * other.x
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f32) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vector,
    pub end: Vector,
}

impl Segment {
    pub const fn new(start: Vector, end: Vector) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }
}

/// Ordered vertex chain; the closing edge back to the first vertex is implied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    vertices: Vec<Vector>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vector>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vector] {
        &self.vertices
    }

    /// Fewer than two vertices: no edges, ignored by sensors and collision.
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 2
    }

    /// Edges in vertex order. A two-vertex polygon is a single wall segment, and an
    /// explicitly repeated first vertex does not produce a zero-length closing edge.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        let open = self
            .vertices
            .windows(2)
            .map(|pair| Segment::new(pair[0], pair[1]));

        let closing = match self.vertices.as_slice() {
            [first, .., last] if self.vertices.len() > 2 && first != last => {
                Some(Segment::new(*last, *first))
            }
            _ => None,
        };

        open.chain(closing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

fn orientation(p: Vector, q: Vector, r: Vector) -> Orientation {
    let value = (q - p).cross(r - q);
    if value.abs() <= COLLINEAR_EPSILON {
        Orientation::Collinear
    } else if value > 0.0 {
        Orientation::CounterClockwise
    } else {
        Orientation::Clockwise
    }
}

// Given p, q, r collinear: does q lie within the bounding box of p-r?
fn on_segment(p: Vector, q: Vector, r: Vector) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Segment a1-a2 against b1-b2. Touching endpoints and collinear overlap count as
/// intersecting so nothing slides through a wall along a shared line.
pub fn segment_intersect(a1: Vector, a2: Vector, b1: Vector, b2: Vector) -> bool {
    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(a1, b1, a2))
        || (o2 == Orientation::Collinear && on_segment(a1, b2, a2))
        || (o3 == Orientation::Collinear && on_segment(b1, a1, b2))
        || (o4 == Orientation::Collinear && on_segment(b1, a2, b2))
}

/// Distance from `ray.start` to the nearest point where the ray segment meets
/// `edge`, if they meet at all.
fn ray_edge_distance(ray: Segment, edge: Segment) -> Option<f32> {
    let r = ray.end - ray.start;
    let s = edge.end - edge.start;
    let ray_length = r.length();
    if ray_length == 0.0 {
        return None;
    }

    let to_edge = edge.start - ray.start;
    let denom = r.cross(s);

    if denom.abs() <= COLLINEAR_EPSILON {
        if to_edge.cross(r).abs() > COLLINEAR_EPSILON * ray_length {
            // Parallel and apart.
            return None;
        }

        // Collinear: nearest overlapping point along the ray.
        let rr = r.dot(r);
        let t0 = to_edge.dot(r) / rr;
        let t1 = (edge.end - ray.start).dot(r) / rr;
        let (lo, hi) = (t0.min(t1), t0.max(t1));
        if hi < 0.0 || lo > 1.0 {
            return None;
        }
        return Some(lo.max(0.0) * ray_length);
    }

    let t = to_edge.cross(s) / denom;
    let u = to_edge.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(t * ray_length)
    } else {
        None
    }
}

/// Nearest hit of the ray segment against any edge of `polygon`. Every edge is
/// checked; the polygon need not be convex.
pub fn ray_polygon_nearest_hit(ray: Segment, polygon: &Polygon) -> Option<f32> {
    if polygon.is_degenerate() {
        return None;
    }

    polygon
        .edges()
        .filter_map(|edge| ray_edge_distance(ray, edge))
        .min_by(f32::total_cmp)
}
