//! `Source`: an array of [`Cell`]s (block/group/path/tuple/fence), plus the
//! array-specific half of series modify (spec.md §4.M) — the newline-flag
//! propagation that only makes sense once cells (which carry their own
//! per-cell `NEWLINE_BEFORE` flag) exist. The mechanical resize/splice part
//! is [`core_flex::Flex::splice`]; this module is the thin layer of
//! cell-aware policy on top of it.

use core_flex::Flex;
use core_stub::{StubFlavor, StubId, StubPool};

use crate::cell::{Cell, CellFlags};

#[derive(Debug, Clone)]
pub struct Source {
    flex: Flex<Cell>,
    newline_at_tail: bool,
}

impl Source {
    pub fn new(pool: &mut StubPool) -> Self {
        Self {
            flex: Flex::new(pool, StubFlavor::Array),
            newline_at_tail: false,
        }
    }

    pub fn from_cells(pool: &mut StubPool, cells: Vec<Cell>) -> Self {
        Self {
            flex: Flex::from_items(pool, StubFlavor::Array, cells),
            newline_at_tail: false,
        }
    }

    pub fn stub(&self) -> StubId {
        self.flex.stub()
    }

    pub fn len(&self) -> usize {
        self.flex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flex.is_empty()
    }

    pub fn as_slice(&self) -> &[Cell] {
        self.flex.as_slice()
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.flex.get(index)
    }

    pub fn newline_at_tail(&self) -> bool {
        self.newline_at_tail
    }

    pub fn set_newline_at_tail(&mut self, on: bool) {
        self.newline_at_tail = on;
    }

    /// Insert `dup` copies of `items` at `index`, removing `remove` existing
    /// cells first (CHANGE semantics; INSERT/APPEND pass `remove = 0`).
    ///
    /// Newline-before propagation (spec.md §4.L): a newline-before flag is
    /// set on each dup's first inserted cell if any of:
    /// - the caller requested `:line`,
    /// - `items`'s own newline-at-tail flag is set, or
    /// - the cell this dup's first element displaces (the old cell at
    ///   `index`, if any survives past the removed range) itself had
    ///   newline-before set — in which case that flag "moves" onto the new
    ///   first cell of the spliced-in run, rather than being silently lost.
    pub fn modify(
        &mut self,
        index: usize,
        remove: usize,
        items: &[Cell],
        items_newline_at_tail: bool,
        dup: usize,
        force_line: bool,
    ) {
        if items.is_empty() || dup == 0 {
            self.flex.remove_units(index, remove);
            return;
        }

        // Self-splice guard: copy source first if destination == source,
        // since `Flex::splice` would otherwise read from a slice that's
        // being mutated out from under it.
        let owned;
        let items: &[Cell] = if std::ptr::eq(items.as_ptr(), self.flex.as_slice().as_ptr()) {
            owned = items.to_vec();
            &owned
        } else {
            items
        };

        let successor_had_newline = self
            .flex
            .get(index + remove)
            .map(|c| c.flags.contains(CellFlags::NEWLINE_BEFORE))
            .unwrap_or(false);

        let first_gets_newline = force_line || items_newline_at_tail || successor_had_newline;

        self.flex.splice(index, remove, items, dup);

        if first_gets_newline {
            if let Some(first) = self.flex.as_mut_slice().get_mut(index) {
                first.flags.insert(CellFlags::NEWLINE_BEFORE);
            }
        }
    }

    pub fn append(&mut self, items: &[Cell], items_newline_at_tail: bool, dup: usize, force_line: bool) {
        let at = self.flex.len();
        self.modify(at, 0, items, items_newline_at_tail, dup, force_line);
    }

    pub fn insert(&mut self, index: usize, items: &[Cell], items_newline_at_tail: bool, dup: usize, force_line: bool) {
        self.modify(index, 0, items, items_newline_at_tail, dup, force_line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_spread_extends_block() {
        let mut pool = StubPool::new();
        let mut src = Source::from_cells(
            &mut pool,
            vec![Cell::integer(1), Cell::integer(2), Cell::integer(3)],
        );
        src.append(&[Cell::integer(4), Cell::integer(5)], false, 1, false);
        assert_eq!(src.len(), 5);
    }

    #[test]
    fn newline_before_propagates_from_displaced_successor() {
        let mut pool = StubPool::new();
        let mut second = Cell::integer(2);
        second.flags.insert(CellFlags::NEWLINE_BEFORE);
        let mut src = Source::from_cells(&mut pool, vec![Cell::integer(1), second]);
        src.insert(1, &[Cell::integer(99)], false, 1, false);
        assert!(src.as_slice()[1].flags.contains(CellFlags::NEWLINE_BEFORE));
    }

    #[test]
    fn dup_repeats_inserted_run() {
        let mut pool = StubPool::new();
        let mut src = Source::new(&mut pool);
        src.append(&[Cell::integer(7)], false, 3, false);
        assert_eq!(src.len(), 3);
    }
}
