//! `Engine`: the per-instance stores the evaluator and action executor
//! share, besides the `RuntimeContext` data they thread through
//! `core-trampoline`. Kept as a separate bundle (rather than folded into
//! `RuntimeContext`) because `core-trampoline` must not depend on
//! `core-bind`/`core-action` — see `core_trampoline::Execute`'s doc
//! comment for the acyclicity reasoning.

use core_bind::BindStore;
use core_level::ArrayStore;
use core_map::MapStore;
use core_stub::StubPool;

use crate::generator::GeneratorStore;
use crate::store::ActionStore;
use crate::strands::StrandStore;

pub struct Engine {
    pub pool: StubPool,
    pub arrays: ArrayStore,
    pub binds: BindStore,
    pub actions: ActionStore,
    pub maps: MapStore,
    pub generators: GeneratorStore,
    pub strands: StrandStore,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            pool: StubPool::new(),
            arrays: ArrayStore::new(),
            binds: BindStore::new(),
            actions: ActionStore::new(),
            maps: MapStore::new(),
            generators: GeneratorStore::new(),
            strands: StrandStore::new(),
        }
    }

    /// Like [`Engine::new`], but pre-sizes the stub pool for `chunk_stubs`
    /// headers (spec.md §4.N "initial stub pool chunk size").
    pub fn with_pool_capacity(chunk_stubs: usize) -> Self {
        Self { pool: StubPool::with_capacity(chunk_stubs), ..Self::new() }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
