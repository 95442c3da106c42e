//! Arena of [`Strand`]s (spec.md §3 "Strand"), indexed by the same
//! [`StubId`] a `Cell::strand` payload carries — the same "id already
//! embedded in a cell payload, registry owned one layer up" idiom as
//! [`core_level::ArrayStore`] and `core_bind::BindStore`.
//!
//! Kept in `core-action` rather than `core-flex` itself: `core-flex`
//! defines `Strand`'s mechanics but has no notion of "the one registry an
//! `Engine` owns" (that would make it depend on `core-stub::StubPool`
//! lifetimes an `Engine` manages); this mirrors `core-level::ArrayStore`'s
//! own split from `core-value::Source`.

use std::collections::HashMap;

use core_flex::strand::Strand;
use core_stub::StubId;

#[derive(Debug, Default)]
pub struct StrandStore {
    strands: HashMap<StubId, Strand>,
}

impl StrandStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, strand: Strand) -> StubId {
        let id = strand.stub();
        self.strands.insert(id, strand);
        id
    }

    pub fn get(&self, id: StubId) -> Option<&Strand> {
        self.strands.get(&id)
    }

    pub fn get_mut(&mut self, id: StubId) -> Option<&mut Strand> {
        self.strands.get_mut(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_stub::StubPool;

    #[test]
    fn inserted_strand_is_retrievable_by_its_own_stub_id() {
        let mut pool = StubPool::new();
        let mut store = StrandStore::new();
        let strand = Strand::from_str(&mut pool, "hello").unwrap();
        let id = store.insert(strand);
        assert_eq!(store.get(id).unwrap().as_str(), "hello");
    }
}
