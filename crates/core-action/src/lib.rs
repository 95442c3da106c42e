//! Action dispatch: the frame-fulfillment executor (spec.md §4.H) and the
//! `DispatcherKind` variants it drives (spec.md §3 "Actions"), plus the
//! evaluator (spec.md §4.G) that calls into it and the generator mechanics
//! (spec.md §4.I/§4.J) that need direct `LevelStack` access to suspend.
//!
//! [`CoreExecutor`] is the one `core_trampoline::Execute` impl this crate
//! (and everything built on it) uses — it just routes a Level's step to
//! whichever module owns its `ExecutorKind`.

pub mod details;
pub mod engine;
pub mod error;
pub mod eval;
pub mod exec;
pub mod feedsync;
pub mod generator;
pub mod mold;
pub mod param;
pub mod store;
pub mod strands;

mod dispatch;

pub use details::Details;
pub use engine::Engine;
pub use error::ActionError;
pub use generator::GeneratorStore;
pub use mold::mold;
pub use param::{Param, ParamClass, ParamFlags, ParamList, TypeSet};
pub use store::{ActionEntry, ActionId, ActionStore, DispatcherKind, NShotMode, NativeOp};
pub use strands::StrandStore;

use core_level::{ExecutorKind, Level, LevelId, LevelStack};
use core_trampoline::{Bounce, Execute, RuntimeContext};

/// Routes each Level's cooperative step to the executor its `ExecutorKind`
/// names (spec.md §4.F "the Trampoline dispatches on this tag"). Borrows
/// the `Engine` rather than owning it so one `RuntimeContext` can drive
/// several short-lived trampoline runs (one per top-level expression,
/// one per generator resume) against the same long-lived stores.
pub struct CoreExecutor<'a> {
    pub engine: &'a mut Engine,
}

impl<'a> Execute for CoreExecutor<'a> {
    fn step(&mut self, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId) -> Bounce {
        match stack.get(id).executor {
            ExecutorKind::Eval => eval::step(self.engine, ctx, stack, id),
            ExecutorKind::Action => exec::step(self.engine, ctx, stack, id),
            ExecutorKind::Generator => generator::step(stack, id),
        }
    }

    /// Past the default data-stack rewind: an Action Level's varlist
    /// decays once its owning Level drops (spec.md §3 "the varlist decays:
    /// its keysource transitions from Level to paramlist").
    fn cleanup(&mut self, ctx: &mut RuntimeContext, level: &Level) {
        ctx.unwind_data_to(level.baseline);
        if let Some(ctx_id) = level.varlist {
            self.engine.binds.diminish(ctx_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_bind::VarList;
    use core_level::Feed;
    use core_trampoline::{HaltSignal, Trampoline};
    use core_value::{Cell, SymbolId};

    use crate::details::Details;
    use crate::param::{Param, ParamList};
    use crate::store::{ActionEntry, DispatcherKind, NativeOp};

    fn sym(id: u32) -> SymbolId {
        SymbolId(id)
    }

    fn push_binding(engine: &mut Engine, name: SymbolId, value: Cell) -> core_bind::ContextId {
        let varlist = VarList::new(vec![name], Cell::trash());
        let ctx_id = engine.binds.insert(varlist);
        engine.binds.get_mut(ctx_id).set(0, value);
        ctx_id
    }

    fn register_native(engine: &mut Engine, op: NativeOp, arity: usize) -> ActionId {
        let params = (0..arity).map(|i| Param::normal(sym(100 + i as u32))).collect();
        let entry = ActionEntry::new(ParamList::new(params), Details::new(0), DispatcherKind::Native(op));
        let action_id = engine.pool.allocate(core_stub::StubFlavor::Details);
        engine.actions.insert(action_id, entry);
        action_id
    }

    #[test]
    fn evaluating_a_two_argument_add_call_produces_the_sum() {
        let mut engine = Engine::new();
        let add_id = register_native(&mut engine, NativeOp::Add, 2);
        let word_sym = sym(1);
        let binding = push_binding(&mut engine, word_sym, Cell::action(add_id));

        let source = core_value::Source::from_cells(&mut engine.pool, vec![Cell::word(word_sym), Cell::integer(2), Cell::integer(3)]);
        let array_id = engine.arrays.insert(source);

        let mut stack = LevelStack::new();
        let mut root = Level::root(ExecutorKind::Eval, Feed::from_array(array_id));
        root.coupling = Some(binding);
        stack.push(root);

        let mut ctx = RuntimeContext::new(HaltSignal::never());
        let mut executor = CoreExecutor { engine: &mut engine };
        let result = Trampoline::run(&mut stack, &mut ctx, &mut executor);

        match result {
            Bounce::Value(v) => assert_eq!(v, Cell::integer(5)),
            other => panic!("expected Value(5), got {other:?}"),
        }
    }

    #[test]
    fn dividing_by_zero_throws_a_zero_divide_error() {
        let mut engine = Engine::new();
        let divide_id = register_native(&mut engine, NativeOp::Divide, 2);
        let word_sym = sym(1);
        let binding = push_binding(&mut engine, word_sym, Cell::action(divide_id));

        let source = core_value::Source::from_cells(&mut engine.pool, vec![Cell::word(word_sym), Cell::integer(1), Cell::integer(0)]);
        let array_id = engine.arrays.insert(source);

        let mut stack = LevelStack::new();
        let mut root = Level::root(ExecutorKind::Eval, Feed::from_array(array_id));
        root.coupling = Some(binding);
        stack.push(root);

        let mut ctx = RuntimeContext::new(HaltSignal::never());
        let mut executor = CoreExecutor { engine: &mut engine };
        let result = Trampoline::run(&mut stack, &mut ctx, &mut executor);
        assert!(matches!(result, Bounce::Thrown));
    }
}
