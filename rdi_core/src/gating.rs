//! Distance gating: decides which (trajectory, detection) pairs are close
//! enough to be considered for association.
//!
//! # Gating criterion
//! d² = ‖z − p‖²  where p is the trajectory's last position, z the detection.
//!
//! Accept if d² ≤ r² (closed interval: a detection exactly at the search
//! radius is a candidate).

use crate::types::{Detection, Position};
use std::collections::HashMap;

/// A uniform-grid spatial index for 2D points.
///
/// With the cell size equal to the search radius, every point within the
/// radius of a query lies in the query cell or one of its 8 neighbours.
pub struct SpatialGrid {
    cell_size: f64,
    /// Maps cell key (ix, iy) to a list of detection indices.
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    fn key(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    /// Insert a detection index at position (x, y).
    pub fn insert(&mut self, idx: usize, x: f64, y: f64) {
        let key = self.key(x, y);
        self.cells.entry(key).or_default().push(idx);
    }

    /// Indices in the cell containing (x, y) and its 8 direct neighbours,
    /// in ascending order.
    pub fn query_nearby(&self, x: f64, y: f64) -> Vec<usize> {
        let (ix, iy) = self.key(x, y);
        let mut results = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(indices) = self.cells.get(&(ix + dx, iy + dy)) {
                    results.extend_from_slice(indices);
                }
            }
        }
        results.sort_unstable();
        results
    }
}

/// True if squared distance `d2` is within `radius` (inclusive).
#[inline]
pub fn within_gate(d2: f64, radius: f64) -> bool {
    d2 <= radius * radius
}

/// All detections within `radius` of `origin`, as (detection index, d²),
/// in ascending detection order.
pub fn gate_detections(
    grid: &SpatialGrid,
    detections: &[Detection],
    origin: &Position,
    radius: f64,
) -> Vec<(usize, f64)> {
    grid.query_nearby(origin.x, origin.y)
        .into_iter()
        .filter_map(|mi| {
            let d2 = detections[mi].distance_sq_to(origin);
            within_gate(d2, radius).then_some((mi, d2))
        })
        .collect()
}

/// Build a grid over a frame's detections with cell size `radius`.
pub fn index_detections(detections: &[Detection], radius: f64) -> SpatialGrid {
    let mut grid = SpatialGrid::new(radius);
    for (mi, det) in detections.iter().enumerate() {
        grid.insert(mi, det.x, det.y);
    }
    grid
}
