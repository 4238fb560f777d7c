//! Pile height map.
//!
//! A grid-quantized record of the tallest settled grain per horizontal
//! cell, used as the floor constraint for falling particles. Entries only
//! ever grow within an epoch; the map is cleared solely by an explicit
//! simulation reset.
//!
//! Writes are batched: during a substep every particle reads the heights
//! left by the previous batch, and the substep's settle events are applied
//! together afterwards. This keeps stacking independent of iteration order.

use rustc_hash::FxHashMap;

/// Quantized horizontal cell.
pub type PileCell = (i32, i32);

pub struct PileHeightMap {
    cell_size: f32,
    floor_y: f32,
    cells: FxHashMap<PileCell, f32>,
}

impl PileHeightMap {
    pub fn new(cell_size: f32, floor_y: f32) -> Self {
        Self {
            cell_size,
            floor_y,
            cells: FxHashMap::default(),
        }
    }

    /// Cell containing the world-space point (x, z).
    #[inline]
    pub fn cell_of(&self, x: f32, z: f32) -> PileCell {
        (
            (x / self.cell_size).floor() as i32,
            (z / self.cell_size).floor() as i32,
        )
    }

    /// Highest settled grain in `cell`, or the bare floor if none.
    #[inline]
    pub fn query(&self, cell: PileCell) -> f32 {
        self.cells.get(&cell).copied().unwrap_or(self.floor_y)
    }

    /// Record a settled grain; keeps the running maximum per cell.
    pub fn update(&mut self, cell: PileCell, height: f32) {
        let entry = self.cells.entry(cell).or_insert(self.floor_y);
        if height > *entry {
            *entry = height;
        }
    }

    /// Apply a substep's settle events after all reads are done.
    pub fn apply_batch(&mut self, batch: &[(PileCell, f32)]) {
        for &(cell, height) in batch {
            self.update(cell, height);
        }
    }

    /// Number of cells that hold settled material.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Tallest recorded height anywhere, or the floor if the map is empty.
    pub fn max_height(&self) -> f32 {
        self.cells
            .values()
            .fold(self.floor_y, |acc, &h| acc.max(h))
    }

    /// Bare floor height used for empty cells.
    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.floor_y
    }

    /// Start a new epoch. The only operation that lowers any entry.
    pub fn reset(&mut self) {
        self.cells.clear();
    }

    /// Snapshot of the occupied cells, for diagnostics and tests.
    pub fn iter(&self) -> impl Iterator<Item = (PileCell, f32)> + '_ {
        self.cells.iter().map(|(&c, &h)| (c, h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cell_reports_floor() {
        let pile = PileHeightMap::new(0.03, -0.9);
        assert_eq!(pile.query((4, -7)), -0.9);
    }

    #[test]
    fn test_update_keeps_maximum() {
        let mut pile = PileHeightMap::new(0.03, -0.9);
        let cell = pile.cell_of(0.01, 0.01);
        pile.update(cell, -0.888);
        pile.update(cell, -0.894); // lower arrival must not shrink the pile
        assert_eq!(pile.query(cell), -0.888);
        pile.update(cell, -0.876);
        assert_eq!(pile.query(cell), -0.876);
    }

    #[test]
    fn test_cell_quantization_handles_negatives() {
        let pile = PileHeightMap::new(0.03, -0.9);
        assert_eq!(pile.cell_of(0.01, 0.01), (0, 0));
        assert_eq!(pile.cell_of(-0.01, 0.01), (-1, 0));
        assert_eq!(pile.cell_of(0.031, -0.031), (1, -2));
    }

    #[test]
    fn test_batch_applies_all_and_keeps_max() {
        let mut pile = PileHeightMap::new(0.03, -0.9);
        let a = (0, 0);
        let b = (1, 0);
        pile.apply_batch(&[(a, -0.888), (b, -0.888), (a, -0.876)]);
        assert_eq!(pile.query(a), -0.876);
        assert_eq!(pile.query(b), -0.888);
        assert_eq!(pile.occupied_cells(), 2);
    }

    #[test]
    fn test_reset_clears_epoch() {
        let mut pile = PileHeightMap::new(0.03, -0.9);
        pile.update((0, 0), -0.5);
        pile.reset();
        assert_eq!(pile.query((0, 0)), -0.9);
        assert_eq!(pile.occupied_cells(), 0);
    }
}
