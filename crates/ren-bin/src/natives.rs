//! Built-in natives the host environment boots with (spec.md §8's worked
//! corpus needs `add`/`subtract`/`multiply`/`divide`/`equal?`/`less?`/
//! `print` at minimum) plus their conventional infix spellings `+ - * / = <`.
//! `func`/`change`/`append`/`insert`/`pick`/`poke` round the set out so a
//! script can actually build an action and mutate a series, rather than
//! only being reachable by hand-assembling a `DispatcherKind` in a test.
//!
//! Grounded on `core-action`'s own `register_native` test helper
//! (`core-action/src/lib.rs` unit tests) for the allocate-Details/insert-
//! into-ActionStore dance, and on `core-config`'s "one struct describes
//! several related entries" table style for [`NativeSpec`].

use core_action::{ActionEntry, ActionId, Details, DispatcherKind, Engine, NativeOp, Param, ParamList};
use core_bind::{ContextId, VarList};
use core_stub::StubFlavor;
use core_value::{Cell, SymbolId, SymbolTable};

struct NativeSpec {
    spellings: &'static [&'static str],
    op: NativeOp,
    arity: usize,
    infix: bool,
}

const NATIVES: &[NativeSpec] = &[
    NativeSpec { spellings: &["add", "+"], op: NativeOp::Add, arity: 2, infix: true },
    NativeSpec { spellings: &["subtract", "-"], op: NativeOp::Subtract, arity: 2, infix: true },
    NativeSpec { spellings: &["multiply", "*"], op: NativeOp::Multiply, arity: 2, infix: true },
    NativeSpec { spellings: &["divide", "/"], op: NativeOp::Divide, arity: 2, infix: true },
    NativeSpec { spellings: &["equal?", "="], op: NativeOp::Equal, arity: 2, infix: true },
    NativeSpec { spellings: &["less?", "<"], op: NativeOp::LessThan, arity: 2, infix: true },
    NativeSpec { spellings: &["print"], op: NativeOp::Print, arity: 1, infix: false },
    NativeSpec { spellings: &["yield"], op: NativeOp::Yield, arity: 1, infix: false },
    NativeSpec { spellings: &["func"], op: NativeOp::Func, arity: 2, infix: false },
    NativeSpec { spellings: &["change"], op: NativeOp::Change, arity: 2, infix: false },
    NativeSpec { spellings: &["append"], op: NativeOp::Append, arity: 2, infix: false },
    NativeSpec { spellings: &["insert"], op: NativeOp::Insert, arity: 2, infix: false },
    NativeSpec { spellings: &["pick"], op: NativeOp::Pick, arity: 2, infix: false },
    NativeSpec { spellings: &["poke"], op: NativeOp::Poke, arity: 3, infix: false },
];

fn register_native(engine: &mut Engine, spec: &NativeSpec) -> ActionId {
    let params: Vec<Param> = (0..spec.arity)
        .map(|i| Param::normal(SymbolId(1_000_000 + i as u32)))
        .collect();
    let entry = ActionEntry::new(ParamList::new(params), Details::new(0), DispatcherKind::Native(spec.op))
        .infix(spec.infix);
    let action_id = engine.pool.allocate(StubFlavor::Details);
    engine.actions.insert(action_id, entry);
    action_id
}

/// Build the root environment: one [`VarList`] binding every native's
/// spellings (and its conventional infix alias, where it has one) to its
/// action. Returns the [`ContextId`] a root `Level`'s `coupling` should be
/// set to.
pub fn install_natives(engine: &mut Engine, symbols: &mut SymbolTable) -> ContextId {
    let mut keys = Vec::new();
    let mut values = Vec::new();

    for spec in NATIVES {
        let action_id = register_native(engine, spec);
        for spelling in spec.spellings {
            keys.push(symbols.intern(spelling));
            values.push(Cell::action(action_id));
        }
    }

    let varlist = VarList::new(keys, Cell::trash());
    let ctx_id = engine.binds.insert(varlist);
    for (i, value) in values.into_iter().enumerate() {
        engine.binds.get_mut(ctx_id).set(i, value);
    }
    ctx_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installing_natives_binds_both_word_and_infix_spellings() {
        let mut engine = Engine::new();
        let mut symbols = SymbolTable::new();
        let ctx_id = install_natives(&mut engine, &mut symbols);

        let varlist = engine.binds.get(ctx_id);
        let add_sym = symbols.intern("add");
        let plus_sym = symbols.intern("+");
        let add_idx = varlist.lookup(add_sym).unwrap();
        let plus_idx = varlist.lookup(plus_sym).unwrap();
        assert!(varlist.get(add_idx).is_action());
        assert!(varlist.get(plus_idx).is_action());
    }

    #[test]
    fn infix_natives_are_flagged_infix() {
        let mut engine = Engine::new();
        let mut symbols = SymbolTable::new();
        let ctx_id = install_natives(&mut engine, &mut symbols);
        let print_sym = symbols.intern("print");
        let varlist = engine.binds.get(ctx_id);
        let print_cell = varlist.get(varlist.lookup(print_sym).unwrap());
        let action_id = match print_cell.payload {
            core_value::Payload::Series(id, _) => id,
            _ => panic!("expected action cell"),
        };
        assert!(!engine.actions.get(action_id).infix);
    }
}
