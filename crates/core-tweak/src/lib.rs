//! The unified dual-protocol pick/poke primitive (spec.md §4.J "TWEAK"),
//! generalized from `core-config`'s `ConfigContext`/`ConfigFile` split (a
//! raw-vs-applied value pair resolved through a small lookup chain) and
//! `core-model::layout`'s per-view resolved-geometry getter — both
//! "resolve one step of a chain" shapes, widened here to "resolve one step
//! of *any* picker chain over any container this runtime knows about".
//!
//! [`tweak`] is the single-step primitive: one location, one picker, one
//! [`Dual`] signal. [`resolve_chain`] drives a whole path/tuple the way
//! spec.md §4.J describes: walk intermediate pickers with `Dual::Get`,
//! apply the real `dual` at the last step, and — since every container this
//! runtime tweaks (array, map, context) is a stable arena handle rather
//! than a copy-on-write value, see `core-map`'s `Map::handle` doc comment —
//! skip the explicit writeback walk spec.md describes for immutable-pairing
//! containers: the poke already landed in place through the handle.
//!
//! [`Stores`] borrows just the four arenas a tweak can ever touch
//! (pool/arrays/maps/binds) rather than a whole `core_action::Engine`, so
//! `core-action` itself can depend on this crate and call through it from
//! `core_action::eval::eval_sequence` instead of reimplementing a GET-only
//! subset inline.

use core_bind::{resolve, BindStore, ContextId};
use core_level::ArrayStore;
use core_map::MapStore;
use core_stub::StubPool;
use core_value::{decay, Cell, Heart, Payload, RebolError, SymbolId};

/// The arenas [`tweak`]/[`resolve_chain`] read and write. Borrowed rather
/// than owned so a caller holding a `core_action::Engine` can build one
/// from its fields (`pool`/`arrays`/`maps`/`binds`) without this crate
/// needing to know `Engine` exists.
pub struct Stores<'a> {
    pub pool: &'a mut StubPool,
    pub arrays: &'a mut ArrayStore,
    pub maps: &'a mut MapStore,
    pub binds: &'a mut BindStore,
}

/// The in-band/out-of-band signal TWEAK dispatches on (spec.md §4.J).
#[derive(Debug, Clone)]
pub enum Dual {
    /// `NULLED_PICK`: read the value at `picker` without changing it.
    Get,
    /// `REMOVE_WORD`: erase whatever is at `picker`, returning its old value.
    Remove,
    /// A lifted value to store at `picker`. Unstable antiforms are decayed
    /// before being written (spec.md §4.J; the "unless the picker is meta"
    /// exception is a chain-level concern handled by [`resolve_chain`], not
    /// this single-step primitive).
    Set(Cell),
}

/// A chain resolution failure, distinguishing where in the chain it
/// happened — spec.md §4.J: "Bad-pick at the last step produces a
/// recoverable `bad-pick` error antiform... earlier steps panic."
#[derive(Debug, Clone)]
pub enum ChainError {
    Panic(RebolError),
    Recoverable(RebolError),
}

fn bad_pick(picker: &Cell) -> RebolError {
    RebolError::BadPick { picker: format!("{picker:?}") }
}

/// One TWEAK step: pick, poke, or remove `picker` on `location`.
pub fn tweak(stores: &mut Stores<'_>, location: &Cell, picker: &Cell, dual: Dual) -> Result<Cell, RebolError> {
    if location.heart.is_any_list() || location.heart.is_any_sequence() {
        return tweak_series(stores, location, picker, dual);
    }
    match location.heart {
        Heart::Map => tweak_map(stores, location, picker, dual),
        Heart::Frame | Heart::VarList => tweak_context(stores, location, picker, dual),
        _ => Err(bad_pick(picker)),
    }
}

fn series_stub(location: &Cell) -> core_stub::StubId {
    match location.payload {
        Payload::Series(stub, _) => stub,
        _ => unreachable!("tweak only reaches here for heart variants that carry a Series payload"),
    }
}

fn series_index(picker: &Cell) -> Result<usize, RebolError> {
    match picker.payload {
        Payload::Int(n) if n >= 1 => Ok((n - 1) as usize),
        _ => Err(bad_pick(picker)),
    }
}

fn tweak_series(stores: &mut Stores<'_>, location: &Cell, picker: &Cell, dual: Dual) -> Result<Cell, RebolError> {
    let stub = series_stub(location);
    let idx = series_index(picker)?;
    match dual {
        Dual::Get => {
            let source = stores.arrays.get(stub).expect("tweak target array missing from ArrayStore");
            source.get(idx).cloned().ok_or(RebolError::OutOfRange { index: idx, len: source.len() })
        }
        Dual::Remove => {
            let source = stores.arrays.get_mut(stub).expect("tweak target array missing from ArrayStore");
            let old = source.get(idx).cloned().ok_or(RebolError::OutOfRange { index: idx, len: source.len() })?;
            source.modify(idx, 1, &[], false, 1, false);
            Ok(old)
        }
        Dual::Set(value) => {
            let value = decay(&value, None);
            let source = stores.arrays.get_mut(stub).expect("tweak target array missing from ArrayStore");
            if idx >= source.len() {
                return Err(RebolError::OutOfRange { index: idx, len: source.len() });
            }
            source.modify(idx, 1, std::slice::from_ref(&value), false, 1, false);
            Ok(value)
        }
    }
}

fn tweak_map(stores: &mut Stores<'_>, location: &Cell, picker: &Cell, dual: Dual) -> Result<Cell, RebolError> {
    let handle = series_stub(location);
    match dual {
        Dual::Get => stores.maps.get(handle).get(picker).cloned().ok_or_else(|| bad_pick(picker)),
        Dual::Remove => {
            let old = stores.maps.get(handle).get(picker).cloned().unwrap_or_else(Cell::trash);
            stores.maps.get_mut(handle).remove(picker);
            Ok(old)
        }
        Dual::Set(value) => {
            let value = decay(&value, None);
            let map = stores.maps.get_mut(handle);
            map.insert(stores.pool, picker.clone(), value.clone());
            Ok(value)
        }
    }
}

fn tweak_context(stores: &mut Stores<'_>, location: &Cell, picker: &Cell, dual: Dual) -> Result<Cell, RebolError> {
    let ctx_id = ContextId(series_stub(location).0);
    let sym = match picker.payload {
        Payload::Symbol(s) => s,
        _ => return Err(bad_pick(picker)),
    };
    let slot = stores.binds.get(ctx_id).lookup(sym).ok_or_else(|| bad_pick(picker))?;
    match dual {
        Dual::Get => Ok(stores.binds.get(ctx_id).get(slot).clone()),
        Dual::Remove => {
            let old = stores.binds.get(ctx_id).get(slot).clone();
            stores.binds.get_mut(ctx_id).set(slot, Cell::trash());
            Ok(old)
        }
        Dual::Set(value) => {
            let value = decay(&value, None);
            stores.binds.get_mut(ctx_id).set(slot, value.clone());
            Ok(value)
        }
    }
}

/// A full path/tuple TWEAK (spec.md §4.J steps 1-4): resolve `head_sym`'s
/// binding, walk every picker but the last with `Dual::Get`, then apply
/// `dual` at the last step. Only literal pickers are supported — a picker
/// that is itself a GROUP! needs a nested evaluator step this library, with
/// no `Level`/trampoline access, cannot drive.
pub fn resolve_chain(
    stores: &mut Stores<'_>,
    coupling: Option<ContextId>,
    head_sym: SymbolId,
    pickers: &[Cell],
    dual: Dual,
) -> Result<Cell, ChainError> {
    let (ctx_id, slot) =
        resolve(stores.binds, head_sym, coupling).ok_or_else(|| ChainError::Panic(RebolError::NoBinding { word: format!("{head_sym:?}") }))?;

    let Some((last, intermediate)) = pickers.split_last() else {
        return apply_to_slot(stores, ctx_id, slot, dual).map_err(ChainError::Recoverable);
    };

    let mut location = stores.binds.get(ctx_id).get(slot).clone();
    for picker in intermediate {
        location = tweak(stores, &location, picker, Dual::Get).map_err(ChainError::Panic)?;
    }
    tweak(stores, &location, last, dual).map_err(ChainError::Recoverable)
}

fn apply_to_slot(stores: &mut Stores<'_>, ctx_id: ContextId, slot: usize, dual: Dual) -> Result<Cell, RebolError> {
    match dual {
        Dual::Get => Ok(stores.binds.get(ctx_id).get(slot).clone()),
        Dual::Remove => {
            let old = stores.binds.get(ctx_id).get(slot).clone();
            stores.binds.get_mut(ctx_id).set(slot, Cell::trash());
            Ok(old)
        }
        Dual::Set(value) => {
            let value = decay(&value, None);
            stores.binds.get_mut(ctx_id).set(slot, value.clone());
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_bind::{BindStore, VarList};
    use core_map::MapStore;
    use core_value::Source;

    fn sym(id: u32) -> SymbolId {
        SymbolId(id)
    }

    struct Fixture {
        pool: StubPool,
        arrays: ArrayStore,
        maps: MapStore,
        binds: BindStore,
    }

    impl Fixture {
        fn new() -> Self {
            let mut pool = StubPool::new();
            let maps = MapStore::new(&mut pool);
            Self {
                pool,
                arrays: ArrayStore::new(),
                maps,
                binds: BindStore::new(),
            }
        }

        fn stores(&mut self) -> Stores<'_> {
            Stores { pool: &mut self.pool, arrays: &mut self.arrays, maps: &mut self.maps, binds: &mut self.binds }
        }
    }

    #[test]
    fn get_picks_a_block_element_by_one_based_index() {
        let mut fx = Fixture::new();
        let source = Source::from_cells(&mut fx.pool, vec![Cell::integer(10), Cell::integer(20), Cell::integer(30)]);
        let stub = fx.arrays.insert(source);
        let block = Cell::block(stub);

        let got = tweak(&mut fx.stores(), &block, &Cell::integer(2), Dual::Get).unwrap();
        assert_eq!(got, Cell::integer(20));
    }

    #[test]
    fn set_pokes_a_block_element_in_place() {
        let mut fx = Fixture::new();
        let source = Source::from_cells(&mut fx.pool, vec![Cell::integer(10), Cell::integer(20)]);
        let stub = fx.arrays.insert(source);
        let block = Cell::block(stub);

        tweak(&mut fx.stores(), &block, &Cell::integer(1), Dual::Set(Cell::integer(99))).unwrap();
        assert_eq!(fx.arrays.get(stub).unwrap().get(0), Some(&Cell::integer(99)));
    }

    #[test]
    fn out_of_range_index_is_bad_pick_style_recoverable_error() {
        let mut fx = Fixture::new();
        let source = Source::from_cells(&mut fx.pool, vec![Cell::integer(1)]);
        let stub = fx.arrays.insert(source);
        let block = Cell::block(stub);

        let err = tweak(&mut fx.stores(), &block, &Cell::integer(5), Dual::Get).unwrap_err();
        assert!(matches!(err, RebolError::OutOfRange { .. }));
    }

    #[test]
    fn resolve_chain_walks_a_word_then_an_index_picker() {
        let mut fx = Fixture::new();
        let source = Source::from_cells(&mut fx.pool, vec![Cell::integer(1), Cell::integer(2)]);
        let stub = fx.arrays.insert(source);
        let block = Cell::block(stub);

        let head = sym(1);
        let mut binding = VarList::new(vec![head], Cell::trash());
        binding.set(0, block);
        let ctx_id = fx.binds.insert(binding);

        let result = resolve_chain(&mut fx.stores(), None, head, &[Cell::integer(2)], Dual::Get).unwrap();
        assert_eq!(result, Cell::integer(2));
        let _ = ctx_id;
    }

    #[test]
    fn resolve_chain_reports_missing_binding_as_a_panic_not_recoverable() {
        let mut fx = Fixture::new();
        let err = resolve_chain(&mut fx.stores(), None, sym(999), &[Cell::integer(1)], Dual::Get).unwrap_err();
        assert!(matches!(err, ChainError::Panic(RebolError::NoBinding { .. })));
    }
}
