//! The action executor (spec.md §4.H): builds a frame, fulfills each
//! parameter in turn by pushing a one-step sub-evaluator over the call
//! site's feed, typechecks, then hands off to [`crate::dispatch::run`].
//!
//! Three states drive one call: [`STATE_PUSH`] builds the frame and starts
//! fulfillment, [`STATE_AWAIT_ARG`] resumes after each argument's
//! sub-evaluator completes, and [`STATE_DISPATCH`] is the common entry point
//! once every slot is filled — reached either by falling out of fulfillment
//! or by a pre-filled call built with [`push_prefilled_action`] (used by
//! Chain/Adapt/Enclose/Specialize/Hijack/NShot to invoke one action from
//! another's dispatcher without re-parsing a feed).
//! [`STATE_AWAIT_BODY`] is for dispatchers ([`crate::dispatch::run`]) that
//! push their own child Level (a body block, a chain step, ...) and resume
//! once it completes.

use core_bind::{ContextId, VarList};
use core_level::{ExecutorKind, Feed, Level, LevelFlags, LevelId, LevelStack};
use core_trampoline::{Bounce, RuntimeContext};
use core_value::{Cell, RebolError};

use crate::engine::Engine;
use crate::error::ActionError;
use crate::param::{ParamClass, ParamList};
use crate::store::ActionId;

pub(crate) const STATE_PUSH: u8 = 0;
pub(crate) const STATE_AWAIT_ARG: u8 = 1;
pub(crate) const STATE_DISPATCH: u8 = 2;
pub(crate) const STATE_AWAIT_BODY: u8 = 3;
/// This Action Level is a suspended `YIELD` call: its private generator
/// `LevelStack` has been unplugged (spec.md §4.J), and re-entry means the
/// generator was resumed, not that the call is starting over. See
/// `crate::dispatch::resume_after_yield`.
pub(crate) const STATE_YIELD_SUSPENDED: u8 = 4;

pub fn step(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId) -> Bounce {
    match stack.get(id).state {
        STATE_PUSH => begin(engine, ctx, stack, id),
        STATE_AWAIT_ARG => after_arg(engine, ctx, stack, id),
        STATE_DISPATCH => dispatch_current(engine, ctx, stack, id),
        STATE_AWAIT_BODY => crate::dispatch::after_body(engine, ctx, stack, id),
        STATE_YIELD_SUSPENDED => crate::dispatch::resume_after_yield(stack, id),
        other => unreachable!("exec::step: unknown state byte {other}"),
    }
}

pub(crate) fn throw_action_error(ctx: &mut RuntimeContext, err: ActionError) -> Bounce {
    ctx.throw(Cell::error(RebolError::BadValue { detail: err.to_string() }), None);
    Bounce::Thrown
}

pub(crate) fn action_id_of(stack: &LevelStack, id: LevelId) -> ActionId {
    stack.get(id).phase.expect("Action Level always carries its ActionId in `phase`")
}

fn current_index(stack: &LevelStack, id: LevelId) -> usize {
    scratch_index(stack, id)
}

fn set_index(stack: &mut LevelStack, id: LevelId, idx: usize) {
    set_scratch_index(stack, id, idx)
}

/// Read the Action Level's `scratch` cell as a progress counter. Shared
/// between fulfillment (`begin`/`fulfill_next`) and the dispatchers that
/// need their own counter (`Chain`'s step index) — safe because fulfillment
/// is done with `scratch` by the time `STATE_DISPATCH` is reached.
pub(crate) fn scratch_index(stack: &LevelStack, id: LevelId) -> usize {
    match stack.get(id).scratch.payload {
        core_value::Payload::Int(n) => n as usize,
        _ => 0,
    }
}

pub(crate) fn set_scratch_index(stack: &mut LevelStack, id: LevelId, idx: usize) {
    stack.get_mut(id).scratch = Cell::integer(idx as i64);
}

fn begin(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId) -> Bounce {
    let action_id = action_id_of(stack, id);
    let paramlist = engine.actions.get(action_id).paramlist.clone();
    let keys = paramlist.iter().map(|p| p.name).collect();
    let varlist = VarList::new(keys, Cell::trash());
    let ctx_id = engine.binds.insert(varlist);
    let outer = stack.get(id).coupling;
    engine.binds.get_mut(ctx_id).set_outer(outer);
    stack.get_mut(id).varlist = Some(ctx_id);

    let mut start = 0;
    if stack.get(id).flags.contains(LevelFlags::INFIX_SEEDED) {
        let left = stack.get(id).output.clone();
        engine.binds.get_mut(ctx_id).set(0, left);
        start = 1;
    }
    set_index(stack, id, start);
    fulfill_next(engine, ctx, stack, id)
}

fn fulfill_next(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId) -> Bounce {
    let action_id = action_id_of(stack, id);
    let paramlist = engine.actions.get(action_id).paramlist.clone();
    let idx = current_index(stack, id);
    if idx >= paramlist.len() {
        stack.get_mut(id).state = STATE_DISPATCH;
        return dispatch_current(engine, ctx, stack, id);
    }

    let param = paramlist.get(idx).clone();
    if param.class == ParamClass::Return {
        set_index(stack, id, idx + 1);
        return fulfill_next(engine, ctx, stack, id);
    }

    if stack.get(id).feed.is_end(&engine.arrays) {
        return throw_action_error(ctx, ActionError::ArgsExhausted);
    }

    let coupling = stack.get(id).coupling;
    let child_feed = clone_feed(&stack.get(id).feed);
    let mut child = Level::new(ExecutorKind::Eval, child_feed, ctx.data_depth());
    child.flags.insert(LevelFlags::ONE_STEP);
    child.coupling = coupling;
    stack.push(child);
    stack.get_mut(id).state = STATE_AWAIT_ARG;
    Bounce::Continue
}

fn after_arg(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId) -> Bounce {
    let value = stack.get(id).spare.clone();
    let action_id = action_id_of(stack, id);
    let paramlist = engine.actions.get(action_id).paramlist.clone();
    let idx = current_index(stack, id);
    let param = paramlist.get(idx);

    if !param.typeset.accepts(value.heart) {
        return throw_action_error(ctx, ActionError::BadArgumentType(param.name));
    }

    let varlist_id = stack.get(id).varlist.expect("varlist built in begin()");
    engine.binds.get_mut(varlist_id).set(idx, value);
    set_index(stack, id, idx + 1);
    fulfill_next(engine, ctx, stack, id)
}

fn dispatch_current(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId) -> Bounce {
    let action_id = action_id_of(stack, id);
    let varlist_id = stack.get(id).varlist.expect("varlist built before dispatch");
    let paramlist = engine.actions.get(action_id).paramlist.clone();
    let args = collect_args(&paramlist, engine.binds.get(varlist_id));
    crate::dispatch::run(engine, ctx, stack, id, action_id, args)
}

/// Positional argument values, in paramlist order, skipping Return params
/// (spec.md §4.H "gather refinements... fulfill arguments").
pub(crate) fn collect_args(paramlist: &ParamList, varlist: &VarList) -> Vec<Cell> {
    paramlist
        .iter()
        .enumerate()
        .filter(|(_, p)| p.class != ParamClass::Return)
        .map(|(i, _)| varlist.get(i).clone())
        .collect()
}

fn clone_feed(feed: &Feed) -> Feed {
    match feed.array() {
        Some(array) => {
            let mut f = Feed::from_array(array);
            f.set_array_index(feed.array_index().unwrap());
            f
        }
        None => feed.clone(),
    }
}

/// Build a Level for `action_id` with every (non-Return) slot pre-filled
/// from `slots`, entering directly at [`STATE_DISPATCH`] — used when one
/// dispatcher invokes another action on its behalf (Chain/Adapt/Enclose/
/// Specialize/Hijack) rather than re-reading a call-site feed.
pub(crate) fn push_prefilled_action(
    engine: &mut Engine,
    ctx: &RuntimeContext,
    action_id: ActionId,
    args: &[Cell],
    coupling: Option<ContextId>,
) -> Level {
    let paramlist = engine.actions.get(action_id).paramlist.clone();
    let keys = paramlist.iter().map(|p| p.name).collect();
    let mut varlist = VarList::new(keys, Cell::trash());
    let mut ai = 0;
    for (i, p) in paramlist.iter().enumerate() {
        if p.class == ParamClass::Return {
            continue;
        }
        if let Some(v) = args.get(ai) {
            varlist.set(i, v.clone());
        }
        ai += 1;
    }
    varlist.set_outer(coupling);
    let varlist_id = engine.binds.insert(varlist);

    let mut level = Level::new(ExecutorKind::Action, Feed::from_variadic(vec![]), ctx.data_depth());
    level.phase = Some(action_id);
    level.coupling = coupling;
    level.varlist = Some(varlist_id);
    level.state = STATE_DISPATCH;
    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_flex::strand::Strand;
    use core_trampoline::{HaltSignal, Trampoline};
    use core_value::{Heart, Source, SymbolId};

    use crate::details::Details;
    use crate::param::{Param, ParamFlags, TypeSet};
    use crate::store::{ActionEntry, DispatcherKind, NativeOp};
    use crate::CoreExecutor;

    fn sym(id: u32) -> SymbolId {
        SymbolId(id)
    }

    fn register(engine: &mut Engine, paramlist: ParamList, dispatcher: DispatcherKind) -> ActionId {
        let action_id = engine.pool.allocate(core_stub::StubFlavor::Details);
        engine.actions.insert(action_id, ActionEntry::new(paramlist, Details::new(0), dispatcher));
        action_id
    }

    fn bind_call(engine: &mut Engine, action_id: ActionId) -> (SymbolId, ContextId) {
        let f_sym = sym(900);
        let varlist = VarList::new(vec![f_sym], Cell::trash());
        let ctx_id = engine.binds.insert(varlist);
        engine.binds.get_mut(ctx_id).set(0, Cell::action(action_id));
        (f_sym, ctx_id)
    }

    fn run_feed(engine: &mut Engine, coupling: ContextId, cells: Vec<Cell>) -> Bounce {
        let source = Source::from_cells(&mut engine.pool, cells);
        let array_id = engine.arrays.insert(source);
        let mut stack = LevelStack::new();
        let mut root = Level::root(ExecutorKind::Eval, Feed::from_array(array_id));
        root.coupling = Some(coupling);
        stack.push(root);
        let mut ctx = RuntimeContext::new(HaltSignal::never());
        let mut executor = CoreExecutor { engine };
        Trampoline::run(&mut stack, &mut ctx, &mut executor)
    }

    #[test]
    fn running_out_of_feed_mid_fulfillment_throws_args_exhausted() {
        let mut engine = Engine::new();
        let action_id = register(
            &mut engine,
            ParamList::new(vec![Param::normal(sym(1)), Param::normal(sym(2))]),
            DispatcherKind::Native(NativeOp::Add),
        );
        let (f_sym, ctx_id) = bind_call(&mut engine, action_id);
        let result = run_feed(&mut engine, ctx_id, vec![Cell::word(f_sym), Cell::integer(1)]);
        assert!(matches!(result, Bounce::Thrown));
    }

    #[test]
    fn mismatched_argument_type_is_rejected_before_dispatch() {
        let mut engine = Engine::new();
        let typed_param = Param {
            name: sym(1),
            class: ParamClass::Normal,
            flags: ParamFlags::empty(),
            typeset: TypeSet::of(vec![Heart::Integer]),
        };
        let action_id = register(&mut engine, ParamList::new(vec![typed_param]), DispatcherKind::Native(NativeOp::Print));
        let (f_sym, ctx_id) = bind_call(&mut engine, action_id);

        let strand = Strand::from_str(&mut engine.pool, "oops").unwrap();
        let strand_id = engine.strands.insert(strand);
        let result = run_feed(&mut engine, ctx_id, vec![Cell::word(f_sym), Cell::strand(strand_id)]);
        assert!(matches!(result, Bounce::Thrown));
    }

    #[test]
    fn return_class_params_are_skipped_during_fulfillment() {
        let mut engine = Engine::new();
        let (a_sym, ret_sym) = (sym(1), sym(2));
        let params = vec![
            Param::normal(a_sym),
            Param { name: ret_sym, class: ParamClass::Return, flags: ParamFlags::empty(), typeset: TypeSet::any() },
        ];
        let action_id = register(&mut engine, ParamList::new(params), DispatcherKind::Native(NativeOp::Print));
        let (f_sym, ctx_id) = bind_call(&mut engine, action_id);

        // Only one feed cell is needed even though the paramlist has two
        // entries — the Return slot never asks the feed for a value.
        let result = run_feed(&mut engine, ctx_id, vec![Cell::word(f_sym), Cell::integer(5)]);
        assert!(matches!(result, Bounce::Value(_)));
    }

    #[test]
    fn push_prefilled_action_enters_dispatch_state_directly_with_slots_filled() {
        let mut engine = Engine::new();
        let action_id = register(&mut engine, ParamList::new(vec![Param::normal(sym(1))]), DispatcherKind::Native(NativeOp::Print));

        let ctx = RuntimeContext::new(HaltSignal::never());
        let level = push_prefilled_action(&mut engine, &ctx, action_id, &[Cell::integer(5)], None);
        assert_eq!(level.state, STATE_DISPATCH);
        let varlist_id = level.varlist.unwrap();
        assert_eq!(*engine.binds.get(varlist_id).get(0), Cell::integer(5));
    }
}
