//! `Details`: the fixed-size per-dispatcher cell array attached to every
//! action (spec.md §3 "Details"). Slot 0 is reserved as the archetype;
//! remaining slots are dispatcher-private (interpreted body, adaptee,
//! counter, plug, ...).

use core_value::Cell;
use smallvec::SmallVec;

/// Most dispatchers need only the archetype plus a handful of private
/// slots (a body cell, an adaptee, a counter); 4 keeps those inline.
type Cells = SmallVec<[Cell; 4]>;

#[derive(Debug, Clone)]
pub struct Details {
    cells: Cells,
}

impl Details {
    pub fn new(private_slots: usize) -> Self {
        Self {
            cells: std::iter::repeat(Cell::trash()).take(1 + private_slots).collect(),
        }
    }

    pub fn archetype(&self) -> &Cell {
        &self.cells[0]
    }

    pub fn set_archetype(&mut self, cell: Cell) {
        self.cells[0] = cell;
    }

    /// Dispatcher-private slot, 0-based over the slots past the archetype.
    pub fn get(&self, index: usize) -> &Cell {
        &self.cells[1 + index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[1 + index]
    }

    pub fn set(&mut self, index: usize, cell: Cell) {
        self.cells[1 + index] = cell;
    }

    pub fn private_len(&self) -> usize {
        self.cells.len() - 1
    }
}
