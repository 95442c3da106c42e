//! Stub pool allocator.
//!
//! Every dynamically allocated object in the runtime — arrays, strings,
//! symbols, varlists, hashlists, paramlists, pairlists, details — is
//! identified by a [`StubId`], an index into a per-[`StubPool`] arena rather
//! than a raw pointer. This sidesteps the cyclic-reference problem the
//! source interpreter solves with raw pointers and a tracing GC (see
//! DESIGN.md, "Cyclic graphs"): a varlist can refer to the Level that owns
//! it and vice versa without either side needing `unsafe` or a strong `Rc`
//! cycle, because both sides just hold an index that is only ever resolved
//! back through the pool.
//!
//! This crate only manages *headers*: flavor, flags, and the four
//! interpretation-dependent words (`link`/`misc`/`info`/`bonus`). It does
//! not know about cells, bytes, or any other payload shape — those live one
//! layer up, in `core-flex`, which pairs a [`StubId`] with its own typed
//! `Vec<T>`. See DESIGN.md for why payload storage is split this way.

use std::fmt;

use bitflags::bitflags;
use tracing::trace;

/// Index into a [`StubPool`]. Stable for the lifetime of the stub; never
/// reused while the stub it names is alive (a freed/swept slot's id is only
/// handed back out to a *new* allocation, which callers must treat as an
/// unrelated object — exactly like the source interpreter's reuse of freed
/// memory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StubId(pub u32);

impl fmt::Display for StubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The primordial allocation kind of a stub. Stamped exactly once, at
/// [`StubPool::allocate`] time, and never changed afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StubFlavor {
    Array,
    Strand,
    Blob,
    Symbol,
    VarList,
    HashList,
    ParamList,
    PairList,
    Details,
    Pairing,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StubFlags: u16 {
        /// Tracked by the GC; once set, never cleared (`Manage_Flex` is irreversible).
        const MANAGED          = 1 << 0;
        /// Refuses further mutation. One-way, like MANAGED.
        const FROZEN           = 1 << 1;
        /// Payload has decayed (see [`StubPool::diminish`]); identity survives, content does not.
        const DIMINISHED       = 1 << 2;
        /// Set by [`StubPool::mark`] during a GC pass; cleared at the start of the next sweep.
        const GC_MARKED        = 1 << 3;
        /// Array-flavor only: a newline belongs after the last element.
        const NEWLINE_AT_TAIL  = 1 << 4;
        /// The stub's content must never become reachable as an antiform-bearing slot
        /// (used as a defensive belt on const source arrays).
        const CONST            = 1 << 5;
    }
}

/// A reference-like interpretation-dependent word. What flavor a stub has
/// determines how `link`/`misc` are read: a varlist's `link` is its keylist,
/// a details' `link` may be an adaptee, a hashlist's `misc` is unused, etc.
/// Modeled as a small closed sum so callers pattern-match instead of casting
/// raw integers, the idiomatic-Rust rendition of the source's `union`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubWord {
    None,
    Stub(StubId),
    Int(i64),
}

impl Default for StubWord {
    fn default() -> Self {
        StubWord::None
    }
}

/// A stub header. Owns no payload; see module docs.
#[derive(Debug, Clone)]
pub struct Stub {
    id: StubId,
    flavor: StubFlavor,
    flags: StubFlags,
    pub link: StubWord,
    pub misc: StubWord,
    pub info: u64,
    pub bonus: u64,
}

impl Stub {
    pub fn id(&self) -> StubId {
        self.id
    }

    pub fn flavor(&self) -> StubFlavor {
        self.flavor
    }

    pub fn flags(&self) -> StubFlags {
        self.flags
    }

    pub fn is_managed(&self) -> bool {
        self.flags.contains(StubFlags::MANAGED)
    }

    pub fn is_frozen(&self) -> bool {
        self.flags.contains(StubFlags::FROZEN)
    }

    pub fn is_diminished(&self) -> bool {
        self.flags.contains(StubFlags::DIMINISHED)
    }
}

/// Fixed-header allocation pool for one [`core_trampoline`]-style runtime
/// context. Each interpreter instance owns exactly one; nothing here is a
/// process-wide singleton (see spec.md §9, "Global state").
#[derive(Debug, Default)]
pub struct StubPool {
    stubs: Vec<Option<Stub>>,
    free: Vec<u32>,
    unmanaged_live: usize,
}

/// Fatal: the pool's backing `Vec` could not grow. Mirrors the source
/// interpreter's policy that out-of-memory aborts rather than propagating
/// as a recoverable error (spec.md §7, level 3).
fn oom() -> ! {
    panic!("core-stub: out of memory allocating stub header")
}

impl StubPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-reserve room for `chunk_stubs` headers (spec.md §4.N "initial
    /// stub pool chunk size") so the first burst of allocations doesn't
    /// repeatedly reallocate the backing `Vec`.
    pub fn with_capacity(chunk_stubs: usize) -> Self {
        Self {
            stubs: Vec::with_capacity(chunk_stubs),
            free: Vec::new(),
            unmanaged_live: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.stubs.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocate a fresh, unmanaged stub with the given flavor. The caller
    /// owns it until either [`StubPool::manage`] or [`StubPool::free`] is
    /// called; dropping it on the floor without either is a leak (caught in
    /// debug builds of the original; here we simply document the contract).
    pub fn allocate(&mut self, flavor: StubFlavor) -> StubId {
        let stub = Stub {
            id: StubId(0),
            flavor,
            flags: StubFlags::empty(),
            link: StubWord::None,
            misc: StubWord::None,
            info: 0,
            bonus: 0,
        };
        let id = if let Some(slot) = self.free.pop() {
            let idx = slot as usize;
            self.stubs[idx] = Some(Stub { id: StubId(slot), ..stub });
            StubId(slot)
        } else {
            let idx = self.stubs.len();
            if idx > u32::MAX as usize {
                oom();
            }
            let id = StubId(idx as u32);
            self.stubs.push(Some(Stub { id, ..stub }));
            id
        };
        self.unmanaged_live += 1;
        trace!(stub = %id, ?flavor, "stub allocated");
        id
    }

    pub fn get(&self, id: StubId) -> &Stub {
        self.stubs[id.0 as usize]
            .as_ref()
            .expect("stub access after free")
    }

    pub fn get_mut(&mut self, id: StubId) -> &mut Stub {
        self.stubs[id.0 as usize]
            .as_mut()
            .expect("stub access after free")
    }

    /// Become GC-tracked. Irreversible: once managed, only [`StubPool::sweep`]
    /// can reclaim the slot.
    pub fn manage(&mut self, id: StubId) {
        let stub = self.get_mut(id);
        if !stub.flags.contains(StubFlags::MANAGED) {
            stub.flags.insert(StubFlags::MANAGED);
            self.unmanaged_live -= 1;
        }
    }

    /// Free a stub that was never [`manage`]d. Panics (debug contract
    /// violation) if called on a managed stub — those are the GC's
    /// responsibility, freed only via [`sweep`].
    pub fn free(&mut self, id: StubId) {
        let was_managed = self.get(id).is_managed();
        assert!(!was_managed, "free() called on a managed stub {id}");
        self.stubs[id.0 as usize] = None;
        self.free.push(id.0);
        self.unmanaged_live -= 1;
        trace!(stub = %id, "stub freed");
    }

    /// Mark during a GC pass. Safe to call more than once per stub per pass.
    pub fn mark(&mut self, id: StubId) {
        self.get_mut(id).flags.insert(StubFlags::GC_MARKED);
    }

    pub fn is_marked(&self, id: StubId) -> bool {
        self.get(id).flags.contains(StubFlags::GC_MARKED)
    }

    /// Sweep: free every managed stub that was not marked since the last
    /// sweep, and clear the mark bit on survivors. Returns the ids freed so
    /// a higher layer (`core-flex`) can drop the payload it keeps alongside
    /// the header.
    pub fn sweep(&mut self) -> Vec<StubId> {
        let mut freed = Vec::new();
        for slot in self.stubs.iter_mut() {
            let Some(stub) = slot else { continue };
            if !stub.flags.contains(StubFlags::MANAGED) {
                continue;
            }
            if stub.flags.contains(StubFlags::GC_MARKED) {
                stub.flags.remove(StubFlags::GC_MARKED);
            } else {
                freed.push(stub.id);
            }
        }
        for id in &freed {
            self.stubs[id.0 as usize] = None;
            self.free.push(id.0);
        }
        if !freed.is_empty() {
            trace!(count = freed.len(), "stub sweep reclaimed");
        }
        freed
    }

    /// Logically empty a stub's payload while keeping its identity (and
    /// flavor) valid — used when a VarList outlives the Level that created
    /// it, or an array is cleared but outstanding references to the stub
    /// remain live. Does not free the header.
    pub fn diminish(&mut self, id: StubId) {
        self.get_mut(id).flags.insert(StubFlags::DIMINISHED);
        trace!(stub = %id, "stub diminished");
    }

    pub fn freeze(&mut self, id: StubId) {
        self.get_mut(id).flags.insert(StubFlags::FROZEN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_then_free_reuses_slot() {
        let mut pool = StubPool::new();
        let a = pool.allocate(StubFlavor::Array);
        pool.free(a);
        let b = pool.allocate(StubFlavor::Array);
        assert_eq!(a, b, "freed slot should be reused by the next allocation");
    }

    #[test]
    fn flavor_is_stamped_once_and_stable() {
        let mut pool = StubPool::new();
        let id = pool.allocate(StubFlavor::Symbol);
        assert_eq!(pool.get(id).flavor(), StubFlavor::Symbol);
    }

    #[test]
    fn manage_is_irreversible_and_blocks_direct_free() {
        let mut pool = StubPool::new();
        let id = pool.allocate(StubFlavor::VarList);
        pool.manage(id);
        assert!(pool.get(id).is_managed());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut pool = pool;
            pool.free(id);
        }));
        assert!(result.is_err());
    }

    #[test]
    fn sweep_reclaims_unmarked_managed_stubs_only() {
        let mut pool = StubPool::new();
        let kept = pool.allocate(StubFlavor::Array);
        let swept = pool.allocate(StubFlavor::Array);
        pool.manage(kept);
        pool.manage(swept);
        pool.mark(kept);
        let freed = pool.sweep();
        assert_eq!(freed, vec![swept]);
        assert!(!pool.is_marked(kept), "mark bit must clear on survivors");
    }

    #[test]
    fn diminish_keeps_identity_valid() {
        let mut pool = StubPool::new();
        let id = pool.allocate(StubFlavor::VarList);
        pool.manage(id);
        pool.diminish(id);
        assert!(pool.get(id).is_diminished());
        assert_eq!(pool.get(id).flavor(), StubFlavor::VarList);
    }
}
