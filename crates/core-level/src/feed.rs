//! The input `Feed` (spec.md §4.E "Feed"): look-ahead abstraction over
//! either an array-backed or a variadic stream of cells, with a cached
//! "gotten" resolution the evaluator maintains and invalidates.

use std::collections::VecDeque;

use core_stub::{StubId, StubPool};
use core_value::{Cell, Source};

/// Backing registry of array Sources a [`Feed`] can index into by
/// [`StubId`] — mirrors `core-bind::BindStore`'s "arena of owned values
/// addressed by an id already embedded in a `Cell::Series` payload" shape,
/// here applied to arrays instead of contexts.
#[derive(Debug, Default)]
pub struct ArrayStore {
    arrays: std::collections::HashMap<StubId, Source>,
}

impl ArrayStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: Source) -> StubId {
        let id = source.stub();
        self.arrays.insert(id, source);
        id
    }

    pub fn get(&self, id: StubId) -> Option<&Source> {
        self.arrays.get(&id)
    }

    pub fn get_mut(&mut self, id: StubId) -> Option<&mut Source> {
        self.arrays.get_mut(&id)
    }
}

#[derive(Debug, Clone)]
enum FeedSource {
    Array(StubId),
    Variadic(VecDeque<Cell>),
}

#[derive(Debug, Clone)]
pub struct Feed {
    source: FeedSource,
    index: usize,
    gotten: Option<Cell>,
}

impl Feed {
    pub fn from_array(array: StubId) -> Self {
        Self {
            source: FeedSource::Array(array),
            index: 0,
            gotten: None,
        }
    }

    pub fn from_variadic(cells: Vec<Cell>) -> Self {
        Self {
            source: FeedSource::Variadic(cells.into()),
            index: 0,
            gotten: None,
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self.source, FeedSource::Variadic(_))
    }

    /// The array this feed reads from, if array-backed.
    pub fn array(&self) -> Option<StubId> {
        match &self.source {
            FeedSource::Array(id) => Some(*id),
            FeedSource::Variadic(_) => None,
        }
    }

    /// Current cursor position (array-backed feeds only). Lets a
    /// sub-evaluator Level constructed over the same array resynchronize
    /// its caller's cursor after consuming one expression — see
    /// `core-action::eval`'s argument-fetching, which needs two Levels to
    /// cooperatively advance one shared array feed without literally
    /// sharing the `Feed` value (spec.md §9's arena-not-pointer rewrite of
    /// `Level`'s owned fields extends to `Feed` too).
    pub fn array_index(&self) -> Option<usize> {
        match &self.source {
            FeedSource::Array(_) => Some(self.index),
            FeedSource::Variadic(_) => None,
        }
    }

    pub fn set_array_index(&mut self, index: usize) {
        if matches!(self.source, FeedSource::Array(_)) {
            self.index = index;
            self.gotten = None;
        }
    }

    /// `at(feed)`: current element, or `None` at end. Returns an owned
    /// clone rather than a borrow so array- and variadic-backed feeds share
    /// one signature (a variadic element isn't array-owned, so it has no
    /// borrow to hand back through `store`).
    pub fn at(&self, store: &ArrayStore) -> Option<Cell> {
        match &self.source {
            FeedSource::Array(id) => store.get(*id)?.get(self.index).cloned(),
            FeedSource::Variadic(q) => q.front().cloned(),
        }
    }

    pub fn peek_variadic(&self) -> Option<&Cell> {
        match &self.source {
            FeedSource::Variadic(q) => q.front(),
            FeedSource::Array(_) => None,
        }
    }

    pub fn is_end(&self, store: &ArrayStore) -> bool {
        match &self.source {
            FeedSource::Array(_) => self.at(store).is_none(),
            FeedSource::Variadic(q) => q.is_empty(),
        }
    }

    /// `next(feed)`: advance, invalidating any cached `gotten`.
    pub fn next(&mut self) {
        match &mut self.source {
            FeedSource::Array(_) => self.index += 1,
            FeedSource::Variadic(q) => {
                q.pop_front();
            }
        }
        self.gotten = None;
    }

    pub fn gotten(&self) -> Option<&Cell> {
        self.gotten.as_ref()
    }

    pub fn set_gotten(&mut self, cell: Option<Cell>) {
        self.gotten = cell;
    }

    /// Arbitrary user code ran (e.g. a dispatcher called back into eval);
    /// any cached lookahead could now be stale (spec.md §4.E "invalidated
    /// whenever arbitrary user code runs").
    pub fn invalidate_gotten(&mut self) {
        self.gotten = None;
    }

    /// Reify a variadic feed into an array-backed one (spec.md §4.E "may
    /// be reified (variadic → array) at will").
    pub fn reify(&mut self, pool: &mut StubPool, store: &mut ArrayStore) {
        if let FeedSource::Variadic(q) = &self.source {
            let cells: Vec<Cell> = q.iter().cloned().collect();
            let source = Source::from_cells(pool, cells);
            let id = store.insert(source);
            self.source = FeedSource::Array(id);
            self.index = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_stub::StubPool;

    #[test]
    fn array_feed_advances_and_ends() {
        let mut pool = StubPool::new();
        let mut store = ArrayStore::new();
        let src = Source::from_cells(&mut pool, vec![Cell::integer(1), Cell::integer(2)]);
        let id = store.insert(src);
        let mut feed = Feed::from_array(id);
        assert_eq!(feed.at(&store), Some(Cell::integer(1)));
        feed.next();
        assert_eq!(feed.at(&store), Some(Cell::integer(2)));
        feed.next();
        assert!(feed.is_end(&store));
    }

    #[test]
    fn variadic_feed_reifies_to_array() {
        let mut pool = StubPool::new();
        let mut store = ArrayStore::new();
        let mut feed = Feed::from_variadic(vec![Cell::integer(9)]);
        assert!(feed.is_variadic());
        feed.reify(&mut pool, &mut store);
        assert!(!feed.is_variadic());
        assert_eq!(feed.at(&store), Some(Cell::integer(9)));
    }

    #[test]
    fn next_invalidates_cached_gotten() {
        let mut pool = StubPool::new();
        let mut store = ArrayStore::new();
        let src = Source::from_cells(&mut pool, vec![Cell::integer(1), Cell::integer(2)]);
        let id = store.insert(src);
        let mut feed = Feed::from_array(id);
        feed.set_gotten(Some(Cell::integer(42)));
        feed.next();
        assert!(feed.gotten().is_none());
    }
}
