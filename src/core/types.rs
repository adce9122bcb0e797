//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Agro-ecological zone code read from the AEZ mask
pub type ZoneId = i32;

/// Crop rotation type code read from the rotation mask
pub type RotationId = i32;

/// Fill value for cells outside the simulated domain
pub const FILL_VALUE: f64 = f64::NAN;

/// Row/column address of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellIndex {
    pub row: usize,
    pub col: usize,
}

impl CellIndex {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for CellIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.row, self.col)
    }
}

/// Grid dimensions as (nrows, ncols)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    pub nrows: usize,
    pub ncols: usize,
}

impl GridShape {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self { nrows, ncols }
    }

    pub fn as_tuple(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn cell_count(&self) -> usize {
        self.nrows * self.ncols
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.nrows && col < self.ncols
    }

    /// Iterate all cells in raster (row-major) order
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        (0..self.nrows).flat_map(move |row| (0..self.ncols).map(move |col| CellIndex::new(row, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_in_raster_order() {
        let shape = GridShape::new(2, 3);
        let cells: Vec<_> = shape.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], CellIndex::new(0, 0));
        assert_eq!(cells[2], CellIndex::new(0, 2));
        assert_eq!(cells[3], CellIndex::new(1, 0));
    }

    #[test]
    fn test_contains() {
        let shape = GridShape::new(2, 3);
        assert!(shape.contains(1, 2));
        assert!(!shape.contains(2, 0));
        assert!(!shape.contains(0, 3));
    }
}
