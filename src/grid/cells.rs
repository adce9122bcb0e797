//! Sparse grid of per-cell simulation engines

use crate::core::types::{CellIndex, GridShape};

/// Whether a slot still takes part in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStatus {
    Active,
    /// Engine failed and was isolated; no longer stepped or queried
    Inert,
}

/// One occupied grid cell
#[derive(Debug)]
pub struct CellSlot<E> {
    pub engine: E,
    pub status: CellStatus,
}

impl<E> CellSlot<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            status: CellStatus::Active,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == CellStatus::Active
    }
}

/// Row-major grid where each slot holds at most one engine
#[derive(Debug)]
pub struct CellGrid<E> {
    shape: GridShape,
    slots: Vec<Option<CellSlot<E>>>,
}

impl<E> CellGrid<E> {
    pub fn new(shape: GridShape) -> Self {
        let mut slots = Vec::with_capacity(shape.cell_count());
        slots.resize_with(shape.cell_count(), || None);
        Self { shape, slots }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> Option<usize> {
        self.shape.contains(row, col).then(|| row * self.shape.ncols + col)
    }

    #[inline]
    fn index_of(&self, offset: usize) -> CellIndex {
        CellIndex::new(offset / self.shape.ncols, offset % self.shape.ncols)
    }

    pub(crate) fn insert(&mut self, cell: CellIndex, engine: E) {
        if let Some(i) = self.offset(cell.row, cell.col) {
            self.slots[i] = Some(CellSlot::new(engine));
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<&CellSlot<E>> {
        let i = self.offset(row, col)?;
        self.slots[i].as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut CellSlot<E>> {
        let i = self.offset(row, col)?;
        self.slots[i].as_mut()
    }

    /// Engine of an active cell
    pub fn engine(&self, row: usize, col: usize) -> Option<&E> {
        self.get(row, col).filter(|slot| slot.is_active()).map(|slot| &slot.engine)
    }

    /// Active cells in raster order
    pub fn active(&self) -> impl Iterator<Item = (CellIndex, &E)> + '_ {
        self.slots.iter().enumerate().filter_map(move |(i, slot)| {
            slot.as_ref()
                .filter(|s| s.is_active())
                .map(|s| (self.index_of(i), &s.engine))
        })
    }

    /// Active cells in raster order, mutably
    pub fn active_mut(&mut self) -> impl Iterator<Item = (CellIndex, &mut E)> + '_ {
        let ncols = self.shape.ncols;
        self.slots.iter_mut().enumerate().filter_map(move |(i, slot)| {
            slot.as_mut()
                .filter(|s| s.is_active())
                .map(|s| (CellIndex::new(i / ncols, i % ncols), &mut s.engine))
        })
    }

    /// Raw slots in raster order, for partitioned parallel access
    pub(crate) fn slots_mut(&mut self) -> &mut [Option<CellSlot<E>>] {
        &mut self.slots
    }

    pub fn first_active(&self) -> Option<&E> {
        self.active().next().map(|(_, engine)| engine)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().flatten().filter(|s| s.is_active()).count()
    }

    /// Cells holding an engine, active or inert
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn mark_inert(&mut self, row: usize, col: usize) {
        if let Some(slot) = self.get_mut(row, col) {
            slot.status = CellStatus::Inert;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid() {
        let grid: CellGrid<u32> = CellGrid::new(GridShape::new(3, 3));
        assert_eq!(grid.active_count(), 0);
        assert!(grid.first_active().is_none());
        assert!(grid.get(1, 1).is_none());
    }

    #[test]
    fn test_insert_and_iterate_in_raster_order() {
        let mut grid = CellGrid::new(GridShape::new(2, 3));
        grid.insert(CellIndex::new(1, 2), 12);
        grid.insert(CellIndex::new(0, 1), 1);

        let cells: Vec<_> = grid.active().map(|(c, e)| (c, *e)).collect();
        assert_eq!(cells, vec![(CellIndex::new(0, 1), 1), (CellIndex::new(1, 2), 12)]);
        assert_eq!(grid.first_active(), Some(&1));
    }

    #[test]
    fn test_out_of_range_insert_is_ignored() {
        let mut grid = CellGrid::new(GridShape::new(2, 2));
        grid.insert(CellIndex::new(5, 5), 1);
        assert_eq!(grid.occupied_count(), 0);
        assert!(grid.get(5, 5).is_none());
    }

    #[test]
    fn test_inert_cells_are_skipped() {
        let mut grid = CellGrid::new(GridShape::new(1, 2));
        grid.insert(CellIndex::new(0, 0), 'a');
        grid.insert(CellIndex::new(0, 1), 'b');
        grid.mark_inert(0, 0);

        assert_eq!(grid.active_count(), 1);
        assert_eq!(grid.occupied_count(), 2);
        assert!(grid.engine(0, 0).is_none());
        assert_eq!(grid.engine(0, 1), Some(&'b'));
        assert_eq!(grid.active_mut().count(), 1);
    }
}
