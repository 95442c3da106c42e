//! Map & hashlist (spec.md §4.K, numbered 4.L in the distilled spec's own
//! lettering — see `SPEC_FULL.md` §0 for the crate-vs-spec-letter note).
//!
//! A map owns a pairlist (key, value, key, value, ...) and a sibling
//! hashlist sized to a prime, indexing into the pairlist by
//! `pair_index + 1` (`0` means empty). Collisions probe linearly with a
//! skip that is automatically coprime with the (prime) capacity.
//!
//! Open Question resolution (DESIGN.md): the distilled spec's "remember
//! first case-insensitive synonym, panic `conflicting-key` on a second
//! distinct spelling" policy is handled upstream by `core_value::SymbolTable`
//! — case variants of the same word already canonicalize to one `SymbolId`
//! before a key ever reaches this crate (see `SymbolTable::intern`'s doc
//! comment). [`MapError::ConflictingKey`] is kept for API parity with the
//! spec and exercised directly by a unit test here that bypasses interning,
//! but ordinary map-building code that goes through one shared
//! `RuntimeContext`'s `SymbolTable` cannot trigger it.

pub mod error;
mod prime;

pub use error::MapError;

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use ahash::AHasher;
use core_flex::Flex;
use core_stub::{StubFlavor, StubId, StubPool};
use core_value::{Cell, Payload, SymbolId};
use tracing::trace;

use prime::next_prime;

const INITIAL_CAPACITY: usize = 7;

fn hash_key(key: &Cell) -> u64 {
    let mut hasher = AHasher::default();
    key.heart.hash(&mut hasher);
    match &key.payload {
        Payload::None => 0u8.hash(&mut hasher),
        Payload::Int(n) => n.hash(&mut hasher),
        Payload::Decimal(f) => f.to_bits().hash(&mut hasher),
        Payload::Symbol(s) => s.hash(&mut hasher),
        Payload::Keyword(k) => k.hash(&mut hasher),
        Payload::Series(stub, index) => {
            stub.hash(&mut hasher);
            index.hash(&mut hasher);
        }
        // Structural hashing of a nested pair/error key is out of scope;
        // every such key falls into the same bucket and is disambiguated by
        // `key_eq`'s full comparison during probing.
        Payload::Pair(_) | Payload::Error(_) => 1u8.hash(&mut hasher),
    }
    hasher.finish()
}

/// Exact key match used by probing. Compares everything but [`Cell::flags`]
/// (incidental formatting, e.g. `NEWLINE_BEFORE`, is not part of a key's
/// identity).
fn key_eq(a: &Cell, b: &Cell) -> bool {
    a.heart == b.heart && a.lift == b.lift && a.sigil == b.sigil && a.payload == b.payload
}

/// Probe increment: any nonzero value below a prime capacity is coprime
/// with it, so deriving the skip straight from the hash is sufficient.
fn skip_for(hash: u64, capacity: usize) -> usize {
    1 + (hash % (capacity as u64 - 1)) as usize
}

#[derive(Debug, Clone)]
pub struct Map {
    handle: StubId,
    pairlist: Flex<Cell>,
    hashlist: Flex<i64>,
    live: usize,
    zombie: usize,
}

impl Map {
    pub fn new(pool: &mut StubPool) -> Self {
        let handle = pool.allocate(StubFlavor::PairList);
        Self {
            handle,
            pairlist: Flex::new(pool, StubFlavor::Array),
            hashlist: Flex::from_items(pool, StubFlavor::HashList, vec![0i64; INITIAL_CAPACITY]),
            live: 0,
            zombie: 0,
        }
    }

    /// The identity a `Cell::Series(handle, 0)` payload on a `Heart::Map`
    /// cell points at; distinct from the pairlist/hashlist Flexes' own
    /// internal stubs so rehashing never changes externally-visible
    /// identity.
    pub fn handle(&self) -> StubId {
        self.handle
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn probe(&self, key: &Cell) -> ProbeResult {
        let capacity = self.hashlist.len();
        let hash = hash_key(key);
        let mut index = (hash % capacity as u64) as usize;
        let skip = skip_for(hash, capacity);
        let mut first_zombie = None;

        for _ in 0..capacity {
            let slot = self.hashlist.as_slice()[index];
            if slot == 0 {
                return ProbeResult::Empty { hashlist_slot: index, reuse_zombie: first_zombie };
            }
            let pair_idx = (slot - 1) as usize;
            let stored_value = &self.pairlist.as_slice()[2 * pair_idx + 1];
            if stored_value.is_trash() {
                if first_zombie.is_none() {
                    first_zombie = Some(pair_idx);
                }
            } else {
                let stored_key = &self.pairlist.as_slice()[2 * pair_idx];
                if key_eq(stored_key, key) {
                    return ProbeResult::Found(pair_idx);
                }
            }
            index = (index + skip) % capacity;
        }
        // Every slot occupied without a match: load factor invariant (never
        // exceed half capacity) means this is unreachable in practice, but
        // fall back to "not found, no room" rather than looping forever.
        ProbeResult::Empty { hashlist_slot: index, reuse_zombie: first_zombie }
    }

    pub fn find(&self, key: &Cell) -> Option<usize> {
        match self.probe(key) {
            ProbeResult::Found(idx) => Some(idx),
            ProbeResult::Empty { .. } => None,
        }
    }

    pub fn get(&self, key: &Cell) -> Option<&Cell> {
        let idx = self.find(key)?;
        Some(&self.pairlist.as_slice()[2 * idx + 1])
    }

    pub fn key_at(&self, index: usize) -> &Cell {
        &self.pairlist.as_slice()[2 * index]
    }

    pub fn value_at(&self, index: usize) -> &Cell {
        &self.pairlist.as_slice()[2 * index + 1]
    }

    /// Non-zombie `(key, value)` pairs, in pairlist order — used for mold
    /// and `FOR-EACH`-style iteration.
    pub fn pairs(&self) -> impl Iterator<Item = (&Cell, &Cell)> {
        self.pairlist
            .as_slice()
            .chunks_exact(2)
            .filter(|pair| !pair[1].is_trash())
            .map(|pair| (&pair[0], &pair[1]))
    }

    pub fn insert(&mut self, pool: &mut StubPool, key: Cell, value: Cell) -> usize {
        let slot = self.probe(&key);
        let pair_idx = match slot {
            ProbeResult::Found(idx) => {
                self.pairlist.as_mut_slice()[2 * idx + 1] = value;
                return idx;
            }
            ProbeResult::Empty { hashlist_slot, reuse_zombie: Some(zombie_idx) } => {
                self.pairlist.as_mut_slice()[2 * zombie_idx] = key;
                self.pairlist.as_mut_slice()[2 * zombie_idx + 1] = value;
                self.hashlist.as_mut_slice()[hashlist_slot] = (zombie_idx + 1) as i64;
                self.zombie -= 1;
                self.live += 1;
                zombie_idx
            }
            ProbeResult::Empty { hashlist_slot, reuse_zombie: None } => {
                let idx = self.pairlist.len() / 2;
                self.pairlist.push(key);
                self.pairlist.push(value);
                self.hashlist.as_mut_slice()[hashlist_slot] = (idx + 1) as i64;
                self.live += 1;
                idx
            }
        };
        self.maybe_rehash(pool);
        pair_idx
    }

    /// Mark a key's slot a zombie (spec.md §4.K "'Zombie' slots ... are
    /// reusable and recorded"); does not shrink the hashlist.
    pub fn remove(&mut self, key: &Cell) -> bool {
        let Some(idx) = self.find(key) else { return false };
        self.pairlist.as_mut_slice()[2 * idx + 1] = Cell::trash();
        self.live -= 1;
        self.zombie += 1;
        true
    }

    fn maybe_rehash(&mut self, pool: &mut StubPool) {
        let capacity = self.hashlist.len();
        if (self.live + self.zombie) * 2 <= capacity {
            return;
        }
        let new_capacity = next_prime(capacity * 2);
        trace!(old = capacity, new = new_capacity, live = self.live, "map rehash");

        let mut new_hashlist: Flex<i64> = Flex::from_items(pool, StubFlavor::HashList, vec![0i64; new_capacity]);
        let mut new_pairlist_items = Vec::with_capacity(self.live * 2);

        for pair in self.pairlist.as_slice().chunks_exact(2) {
            if pair[1].is_trash() {
                continue;
            }
            let new_idx = new_pairlist_items.len() / 2;
            new_pairlist_items.push(pair[0].clone());
            new_pairlist_items.push(pair[1].clone());

            let hash = hash_key(&pair[0]);
            let mut index = (hash % new_capacity as u64) as usize;
            let skip = skip_for(hash, new_capacity);
            while new_hashlist.as_slice()[index] != 0 {
                index = (index + skip) % new_capacity;
            }
            new_hashlist.as_mut_slice()[index] = (new_idx + 1) as i64;
        }

        self.pairlist.replace_items(new_pairlist_items);
        self.hashlist = new_hashlist;
        self.zombie = 0;
    }
}

enum ProbeResult {
    Found(usize),
    Empty { hashlist_slot: usize, reuse_zombie: Option<usize> },
}

/// Registry of live [`Map`]s for one `RuntimeContext`, indexed by
/// [`Map::handle`] — same "id embedded in a `Cell::Series` payload, owner
/// one layer up" idiom as `core_level::ArrayStore`/`core_bind::BindStore`.
#[derive(Debug, Default)]
pub struct MapStore {
    maps: HashMap<StubId, Map>,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, map: Map) -> StubId {
        let handle = map.handle();
        self.maps.insert(handle, map);
        handle
    }

    pub fn get(&self, handle: StubId) -> &Map {
        self.maps.get(&handle).expect("map accessed after handle went stale")
    }

    pub fn get_mut(&mut self, handle: StubId) -> &mut Map {
        self.maps.get_mut(&handle).expect("map accessed after handle went stale")
    }
}

/// Directly exercises the `conflicting-key` policy's intent (see module
/// docs): two `Cell`s that are word-hearted, carry different `SymbolId`s,
/// yet whose spellings fold to the same string under an external table.
/// Ordinary interning never produces this because case variants share one
/// id; a caller who hand-builds `Cell::word(SymbolId(n))` without going
/// through `SymbolTable::intern` can still reach it, which is what this
/// helper is for.
pub fn check_conflicting(a_spelling: &str, a: SymbolId, b_spelling: &str, b: SymbolId) -> Result<(), MapError> {
    if a != b && a_spelling.eq_ignore_ascii_case(b_spelling) {
        return Err(MapError::ConflictingKey { a, b });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_value::SymbolId;

    fn word(id: u32) -> Cell {
        Cell::word(SymbolId(id))
    }

    #[test]
    fn insert_then_get_round_trips() {
        let mut pool = StubPool::new();
        let mut map = Map::new(&mut pool);
        map.insert(&mut pool, word(1), Cell::integer(10));
        assert_eq!(map.get(&word(1)), Some(&Cell::integer(10)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn insert_same_key_twice_overwrites_not_duplicates() {
        let mut pool = StubPool::new();
        let mut map = Map::new(&mut pool);
        map.insert(&mut pool, word(1), Cell::integer(1));
        map.insert(&mut pool, word(1), Cell::integer(2));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&word(1)), Some(&Cell::integer(2)));
    }

    #[test]
    fn remove_marks_zombie_and_is_reused_on_next_insert() {
        let mut pool = StubPool::new();
        let mut map = Map::new(&mut pool);
        map.insert(&mut pool, word(1), Cell::integer(1));
        assert!(map.remove(&word(1)));
        assert!(map.get(&word(1)).is_none());
        assert_eq!(map.len(), 0);

        let pairlist_len_before = map.pairlist.len();
        map.insert(&mut pool, word(2), Cell::integer(99));
        assert_eq!(map.pairlist.len(), pairlist_len_before, "zombie slot reused, no growth");
        assert_eq!(map.get(&word(2)), Some(&Cell::integer(99)));
    }

    #[test]
    fn rehash_preserves_all_live_entries() {
        let mut pool = StubPool::new();
        let mut map = Map::new(&mut pool);
        let handle = map.handle();
        for i in 0..20 {
            map.insert(&mut pool, word(i), Cell::integer(i as i64));
        }
        assert_eq!(map.handle(), handle, "rehash must not change the map's identity");
        for i in 0..20 {
            assert_eq!(map.get(&word(i)), Some(&Cell::integer(i as i64)));
        }
    }

    #[test]
    fn conflicting_key_detected_when_bypassing_interning() {
        assert!(check_conflicting("name", SymbolId(1), "NAME", SymbolId(2)).is_err());
        assert!(check_conflicting("name", SymbolId(1), "name", SymbolId(1)).is_ok());
    }
}
