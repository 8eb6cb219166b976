//! Spatial hash for broad-phase neighbor queries
//!
//! The world is unbounded (spawning is player-relative), so buckets are
//! keyed by hashed cell coordinates rather than array indices; negative
//! coordinates hash like any other. Rebuilt from scratch every tick.

use glam::Vec2;
use rustc_hash::FxHashMap;

pub struct SpatialGrid {
    cell_size: f32,
    cells: FxHashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: FxHashMap::default(),
        }
    }

    pub fn clear(&mut self) {
        // Keep bucket allocations alive across ticks
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
    }

    fn cell_key(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, id: usize, pos: Vec2) {
        let key = self.cell_key(pos);
        self.cells.entry(key).or_default().push(id);
    }

    /// Collect entity ids from the 3x3 block of cells around `pos` into
    /// `buf` (cleared first, no allocation in the steady state).
    ///
    /// This bounds neighbor search to one cell width in every direction;
    /// entities just past a diagonal boundary are missed, which is fine for
    /// separation but not for exact collision.
    pub fn neighbors_into(&self, pos: Vec2, buf: &mut Vec<usize>) {
        buf.clear();
        let (cx, cy) = self.cell_key(pos);
        for ix in (cx - 1)..=(cx + 1) {
            for iy in (cy - 1)..=(cy + 1) {
                if let Some(bucket) = self.cells.get(&(ix, iy)) {
                    buf.extend_from_slice(bucket);
                }
            }
        }
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(crate::consts::CELL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_returns_same_cell_and_neighbors() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert(0, Vec2::new(50.0, 50.0));
        grid.insert(1, Vec2::new(150.0, 50.0)); // adjacent cell
        grid.insert(2, Vec2::new(500.0, 500.0)); // far away

        let mut buf = Vec::new();
        grid.neighbors_into(Vec2::new(60.0, 60.0), &mut buf);
        assert!(buf.contains(&0));
        assert!(buf.contains(&1));
        assert!(!buf.contains(&2));
    }

    #[test]
    fn negative_coordinates_hash_correctly() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert(7, Vec2::new(-50.0, -50.0));

        let mut buf = Vec::new();
        grid.neighbors_into(Vec2::new(-20.0, -80.0), &mut buf);
        assert_eq!(buf, vec![7]);

        // (-1, -1) and (0, 0) are distinct cells but still 3x3 neighbors
        grid.insert(8, Vec2::new(20.0, 20.0));
        grid.neighbors_into(Vec2::new(-50.0, -50.0), &mut buf);
        assert!(buf.contains(&7));
        assert!(buf.contains(&8));
    }

    #[test]
    fn clear_empties_buckets() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert(0, Vec2::ZERO);
        grid.clear();
        let mut buf = Vec::new();
        grid.neighbors_into(Vec2::ZERO, &mut buf);
        assert!(buf.is_empty());
    }
}
