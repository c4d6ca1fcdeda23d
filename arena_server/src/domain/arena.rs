// Arena obstacles plus the user's in-progress drawing.

use crate::domain::geometry::{Polygon, Vector};
use crate::domain::tuning::ArenaTuning;

#[derive(Debug, Clone, Default)]
pub struct Arena {
    // Live during the current generation; never changed mid-generation.
    polygons: Vec<Polygon>,
    // Finalized by the user, waiting for the next spawn.
    staged: Vec<Polygon>,
    // Points of the polygon being drawn.
    pending_points: Vec<Vector>,
}

impl Arena {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self {
            polygons,
            ..Self::default()
        }
    }

    /// Single boundary rectangle.
    pub fn bounded(tuning: &ArenaTuning) -> Self {
        Self::new(vec![tuning.boundary()])
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn staged(&self) -> &[Polygon] {
        &self.staged
    }

    pub fn pending_points(&self) -> &[Vector] {
        &self.pending_points
    }

    pub fn add_point(&mut self, point: Vector) {
        self.pending_points.push(point);
    }

    /// Moves the pending points into a staged polygon. Returns false when nothing was drawn.
    pub fn finalize_polygon(&mut self) -> bool {
        if self.pending_points.is_empty() {
            return false;
        }
        let points = std::mem::take(&mut self.pending_points);
        self.staged.push(Polygon::new(points));
        true
    }

    /// Promotes staged polygons into the live set; called at generation start.
    pub fn commit_staged(&mut self) -> usize {
        let count = self.staged.len();
        self.polygons.append(&mut self.staged);
        count
    }
}
