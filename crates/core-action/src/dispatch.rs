//! `DispatcherKind` dispatch (spec.md §4.H "Generic_Dispatch"): what each
//! action variant does once its frame is fully fulfilled.
//!
//! Entered from [`crate::exec::dispatch_current`] at `STATE_DISPATCH` via
//! [`run`]; dispatchers that need to run a body/step as a child Level come
//! back through [`after_body`] once that child completes. Dispatchers that
//! hand off entirely to another action (Adapt/Specialize/Hijack/Enclose/
//! Reframe) replace the current Level in place via `Bounce::Delegate` —
//! the replacement copies the current Level's feed forward first, since
//! [`crate::feedsync::finish`] resyncs from whichever Level completes last,
//! not from the one that started the call.

use core_bind::VarList;
use core_flex::error::FlexError;
use core_flex::modify::{modify_strand, ModifySource};
use core_level::{Level, LevelId, LevelStack};
use core_stub::{StubFlavor, StubId};
use core_trampoline::{Bounce, RuntimeContext};
use core_value::{Cell, Heart, Keyword, Payload, RebolError};

use crate::details::Details;
use crate::engine::Engine;
use crate::error::ActionError;
use crate::exec;
use crate::param::{Param, ParamClass, ParamList};
use crate::store::{ActionEntry, ActionId, DispatcherKind, NShotMode, NativeOp};

fn throw_rebol_error(ctx: &mut RuntimeContext, err: RebolError) -> Bounce {
    ctx.throw(Cell::error(err), None);
    Bounce::Thrown
}

/// `STATE_DISPATCH`'s entry point: every parameter is fulfilled, `args`
/// holds the positional (non-Return) values in paramlist order.
pub(crate) fn run(
    engine: &mut Engine,
    ctx: &mut RuntimeContext,
    stack: &mut LevelStack,
    id: LevelId,
    action_id: ActionId,
    args: Vec<Cell>,
) -> Bounce {
    match engine.actions.get(action_id).dispatcher.clone() {
        DispatcherKind::Native(op) => native(engine, ctx, stack, id, op, args),
        DispatcherKind::Func { body } => push_body(ctx, stack, id, body),
        DispatcherKind::Lambda { body } => push_body(ctx, stack, id, body),
        DispatcherKind::Adapt { prelude, adaptee: _ } => push_body(ctx, stack, id, prelude),
        DispatcherKind::Chain { steps } => begin_chain(engine, ctx, stack, id, &steps, args),
        DispatcherKind::Enclose { inner, outer } => begin_enclose(engine, ctx, stack, id, inner, outer, args),
        DispatcherKind::Specialize { base, overlay } => begin_specialize(engine, ctx, stack, id, base, overlay, args),
        DispatcherKind::Hijack { replacement } => begin_hijack(engine, ctx, stack, id, action_id, replacement, args),
        DispatcherKind::Reframe { target, into_arg: _ } => delegate(engine, ctx, stack, id, target, args),
        DispatcherKind::NShot { mode, n, branch } => begin_nshot(engine, ctx, stack, id, action_id, mode, n, branch, args),
        DispatcherKind::Generator { body } => {
            let resume_value = args.into_iter().next().unwrap_or_else(Cell::trash);
            // Only consulted on the generator's first call (see
            // `call_generator`'s doc comment) — this call's own varlist
            // already holds the generator's fulfilled args and chains to
            // the caller's lexical scope via its `outer` link, so handing
            // it to the body as `coupling` is what lets the body both read
            // its own parameters and resolve outer words like `yield`.
            let coupling = stack.get(id).varlist;
            let result = crate::generator::call_generator(engine, ctx, action_id, body, coupling, resume_value);
            crate::feedsync::finish(stack, id, result)
        }
    }
}

/// `STATE_AWAIT_BODY`'s continuation: a child Level pushed by [`run`] just
/// completed, with its result in `stack.get(id).spare`. Which dispatcher is
/// in flight (and so what "done with the child" means) is read back off the
/// Action Level's own `phase`, not tracked separately.
pub(crate) fn after_body(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId) -> Bounce {
    let action_id = exec::action_id_of(stack, id);
    let result = stack.get(id).spare.clone();
    match engine.actions.get(action_id).dispatcher.clone() {
        DispatcherKind::Func { .. } => finish_func(engine, ctx, stack, id, action_id, result),
        DispatcherKind::Lambda { .. } => crate::feedsync::finish(stack, id, result),
        DispatcherKind::Adapt { adaptee, .. } => finish_adapt(engine, ctx, stack, id, action_id, adaptee),
        DispatcherKind::Chain { steps } => continue_chain(engine, ctx, stack, id, &steps, result),
        other => unreachable!("after_body: dispatcher {other:?} never pushes a body Level"),
    }
}

/// `STATE_YIELD_SUSPENDED`'s continuation: this Action Level (the `YIELD`
/// call itself) was unplugged and just got replugged back onto the stack —
/// `call_generator` leaves the resume value in the yielder Level's `output`
/// (spec.md §4.J, `LevelId(0)` is always the yielder in a generator's
/// private stack), read here as a one-slot mailbox.
pub(crate) fn resume_after_yield(stack: &mut LevelStack, id: LevelId) -> Bounce {
    let resumed = stack.get(LevelId(0)).output.clone();
    crate::feedsync::finish(stack, id, resumed)
}

fn push_body(ctx: &RuntimeContext, stack: &mut LevelStack, id: LevelId, body: StubId) -> Bounce {
    let varlist_id = stack.get(id).varlist.expect("varlist built in exec::begin before dispatch");
    let mut child = Level::new(core_level::ExecutorKind::Eval, core_level::Feed::from_array(body), ctx.data_depth());
    child.coupling = Some(varlist_id);
    stack.push(child);
    stack.get_mut(id).state = exec::STATE_AWAIT_BODY;
    Bounce::Continue
}

fn finish_func(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, action_id: ActionId, result: Cell) -> Bounce {
    let paramlist = engine.actions.get(action_id).paramlist.clone();
    let return_param = paramlist.iter().find(|p| p.class == ParamClass::Return);
    let value = if result.is_trash() { Cell::trash() } else { result };
    if let Some(p) = return_param {
        if !value.is_trash() && !p.typeset.accepts(value.heart) {
            return exec::throw_action_error(ctx, ActionError::BadReturnType);
        }
    }
    crate::feedsync::finish(stack, id, value)
}

fn finish_adapt(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, action_id: ActionId, adaptee: ActionId) -> Bounce {
    let paramlist = engine.actions.get(action_id).paramlist.clone();
    let varlist_id = stack.get(id).varlist.expect("varlist built in exec::begin before dispatch");
    let args = exec::collect_args(&paramlist, engine.binds.get(varlist_id));
    delegate(engine, ctx, stack, id, adaptee, args)
}

/// Tail-replace the current Action Level with a fresh one for `target`,
/// pre-filled with `args`, carrying this Level's feed forward (so whichever
/// Level eventually finishes resyncs the real call-site cursor, not an
/// empty prefilled one). Used by Adapt, Specialize, Hijack, Enclose, and
/// Reframe's forwarding simplification — see module docs.
fn delegate(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, target: ActionId, args: Vec<Cell>) -> Bounce {
    let coupling = stack.get(id).coupling;
    let feed = stack.get(id).feed.clone();
    let mut replacement = exec::push_prefilled_action(engine, ctx, target, &args, coupling);
    replacement.feed = feed;
    replacement.baseline = stack.get(id).baseline;
    stack.pop();
    stack.push(replacement);
    Bounce::Delegate
}

fn begin_chain(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, steps: &[ActionId], args: Vec<Cell>) -> Bounce {
    let Some(&first) = steps.first() else {
        return exec::throw_action_error(ctx, ActionError::EmptyChain);
    };
    exec::set_scratch_index(stack, id, 0);
    push_chain_step(engine, ctx, stack, id, first, args)
}

fn continue_chain(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, steps: &[ActionId], result: Cell) -> Bounce {
    let completed = exec::scratch_index(stack, id);
    let next_index = completed + 1;
    if next_index >= steps.len() {
        return crate::feedsync::finish(stack, id, result);
    }
    exec::set_scratch_index(stack, id, next_index);
    push_chain_step(engine, ctx, stack, id, steps[next_index], vec![result])
}

fn push_chain_step(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, step: ActionId, args: Vec<Cell>) -> Bounce {
    let coupling = stack.get(id).coupling;
    let mut child = exec::push_prefilled_action(engine, ctx, step, &args, coupling);
    child.baseline = stack.get(id).baseline;
    stack.push(child);
    stack.get_mut(id).state = exec::STATE_AWAIT_BODY;
    Bounce::Continue
}

/// Builds an un-executed frame for `inner`, passed to `outer` as its sole
/// argument — encoded as `Cell::frame(StubId(ctx_id.0))`, reusing the
/// `ContextId` arena's `u32` directly as a `StubId` rather than adding a
/// third arena just for frame cells (documented in DESIGN.md).
fn begin_enclose(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, inner: ActionId, outer: ActionId, args: Vec<Cell>) -> Bounce {
    let coupling = stack.get(id).coupling;
    let paramlist = engine.actions.get(inner).paramlist.clone();
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
    let ctx_id = engine.binds.insert(varlist);
    let frame_cell = Cell::frame(StubId(ctx_id.0));
    delegate(engine, ctx, stack, id, outer, vec![frame_cell])
}

/// Overlays `overlay`'s pre-filled (non-trash) slots onto `base`'s
/// paramlist, consuming `args` in order for whatever slots `overlay` left
/// unfilled, then delegates.
fn begin_specialize(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, base: ActionId, overlay: core_bind::ContextId, args: Vec<Cell>) -> Bounce {
    let base_paramlist = engine.actions.get(base).paramlist.clone();
    let overlay_varlist = engine.binds.get(overlay).clone();
    let mut merged = Vec::with_capacity(base_paramlist.len());
    let mut ai = 0;
    for (i, p) in base_paramlist.iter().enumerate() {
        if p.class == ParamClass::Return {
            continue;
        }
        let preset = overlay_varlist.get(i);
        if !preset.is_trash() {
            merged.push(preset.clone());
        } else {
            merged.push(args.get(ai).cloned().unwrap_or_else(Cell::trash));
            ai += 1;
        }
    }
    delegate(engine, ctx, stack, id, base, merged)
}

fn begin_hijack(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, action_id: ActionId, replacement: ActionId, args: Vec<Cell>) -> Bounce {
    let this_len = engine.actions.get(action_id).paramlist.len();
    let replacement_len = engine.actions.get(replacement).paramlist.len();
    if this_len != replacement_len {
        return exec::throw_action_error(ctx, ActionError::IncompatibleHijack);
    }
    delegate(engine, ctx, stack, id, replacement, args)
}

fn begin_nshot(
    engine: &mut Engine,
    ctx: &mut RuntimeContext,
    stack: &mut LevelStack,
    id: LevelId,
    action_id: ActionId,
    mode: NShotMode,
    n: i64,
    branch: ActionId,
    args: Vec<Cell>,
) -> Bounce {
    let count = match engine.actions.get(action_id).details.get(0).payload {
        Payload::Int(c) => c,
        _ => 0,
    };
    engine.actions.get_mut(action_id).details.set(0, Cell::integer(count + 1));
    let should_run = match mode {
        NShotMode::UntilN => count < n,
        NShotMode::AfterN => count >= n,
    };
    if !should_run {
        return crate::feedsync::finish(stack, id, Cell::keyword(Keyword::Null));
    }
    delegate(engine, ctx, stack, id, branch, args)
}

fn native(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, op: NativeOp, args: Vec<Cell>) -> Bounce {
    match op {
        NativeOp::Add | NativeOp::Subtract | NativeOp::Multiply | NativeOp::Divide => arithmetic(ctx, stack, id, op, &args),
        NativeOp::Equal => {
            let a = args.first().cloned().unwrap_or_else(Cell::trash);
            let b = args.get(1).cloned().unwrap_or_else(Cell::trash);
            let equal = a.heart == b.heart && a.payload == b.payload;
            let keyword = if equal { Keyword::True } else { Keyword::False };
            crate::feedsync::finish(stack, id, Cell::keyword(keyword))
        }
        NativeOp::LessThan => less_than(ctx, stack, id, &args),
        NativeOp::Print => {
            let text = args.first().map(|c| crate::mold::mold(engine, &ctx.symbols, c)).unwrap_or_default();
            tracing::info!(target: "ren::print", "{text}");
            println!("{text}");
            crate::feedsync::finish(stack, id, Cell::trash())
        }
        NativeOp::Yield => {
            let value = args.into_iter().next().unwrap_or_else(Cell::trash);
            stack.get_mut(id).state = exec::STATE_YIELD_SUSPENDED;
            crate::generator::dispatch_yield(engine, stack, value)
        }
        NativeOp::Func => func_native(engine, ctx, stack, id, &args),
        NativeOp::Change => series_edit_native(engine, ctx, stack, id, &args, SeriesEdit::Change),
        NativeOp::Append => series_edit_native(engine, ctx, stack, id, &args, SeriesEdit::Append),
        NativeOp::Insert => series_edit_native(engine, ctx, stack, id, &args, SeriesEdit::Insert),
        NativeOp::Pick => pick_native(engine, ctx, stack, id, &args),
        NativeOp::Poke => poke_native(engine, ctx, stack, id, &args),
    }
}

/// `func spec body`: the spec block is read only for its WORD! cells (a
/// refinement/type-block parser is out of scope here, see DESIGN.md) to
/// build a positional [`ParamList`]; the body block becomes the new
/// action's `Func` dispatcher body untouched.
fn func_native(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, args: &[Cell]) -> Bounce {
    let (Some(spec), Some(body)) = (args.first(), args.get(1)) else {
        return throw_rebol_error(ctx, RebolError::BadValue { detail: "func needs a spec block and a body block".to_string() });
    };
    let spec_stub = match (spec.heart, &spec.payload) {
        (Heart::Block, Payload::Series(stub, _)) => *stub,
        _ => return throw_rebol_error(ctx, RebolError::BadValue { detail: "func's spec must be a block".to_string() }),
    };
    let body_stub = match (body.heart, &body.payload) {
        (Heart::Block, Payload::Series(stub, _)) => *stub,
        _ => return throw_rebol_error(ctx, RebolError::BadValue { detail: "func's body must be a block".to_string() }),
    };

    let params: Vec<Param> = engine
        .arrays
        .get(spec_stub)
        .expect("func spec array missing from ArrayStore")
        .as_slice()
        .iter()
        .filter_map(|c| match (c.heart, &c.payload) {
            (Heart::Word, Payload::Symbol(sym)) => Some(Param::normal(*sym)),
            _ => None,
        })
        .collect();

    let action_id = engine.pool.allocate(StubFlavor::Details);
    engine.actions.insert(
        action_id,
        ActionEntry::new(ParamList::new(params), Details::new(0), DispatcherKind::Func { body: body_stub }),
    );
    crate::feedsync::finish(stack, id, Cell::action(action_id))
}

#[derive(Debug, Clone, Copy)]
enum SeriesEdit {
    Change,
    Append,
    Insert,
}

/// `change`/`append`/`insert` against a block/group (via
/// `core_value::Source::modify`) or a string (via
/// `core_flex::modify::modify_strand`) — both operate at the series
/// cell's own cursor (`Payload::Series`'s index), except `append`, which
/// always targets the tail.
fn series_edit_native(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, args: &[Cell], edit: SeriesEdit) -> Bounce {
    let (Some(series), Some(value)) = (args.first(), args.get(1)) else {
        return throw_rebol_error(ctx, RebolError::BadValue { detail: "expected a series and a value".to_string() });
    };
    let (stub, cursor) = match series.payload {
        Payload::Series(stub, cursor) => (stub, cursor),
        _ => return throw_rebol_error(ctx, RebolError::BadValue { detail: "expected a series argument".to_string() }),
    };
    let result = match series.heart {
        Heart::Strand => edit_strand(engine, stub, cursor, value, edit),
        Heart::Block | Heart::Group => {
            edit_array(engine, stub, cursor, value, edit);
            Ok(())
        }
        _ => Err(RebolError::BadValue { detail: "change/append/insert need a block, group, or string".to_string() }),
    };
    match result {
        Ok(()) => crate::feedsync::finish(stack, id, series.clone()),
        Err(e) => throw_rebol_error(ctx, e),
    }
}

fn edit_strand(engine: &mut Engine, stub: StubId, cursor: usize, value: &Cell, edit: SeriesEdit) -> Result<(), RebolError> {
    let text = strand_text_of(engine, value)?;
    let strand = engine.strands.get_mut(stub).expect("strand missing from StrandStore");
    let at = match edit {
        SeriesEdit::Append => strand.codepoint_len(),
        SeriesEdit::Change | SeriesEdit::Insert => cursor,
    };
    let remove_cp = if matches!(edit, SeriesEdit::Change) { 1 } else { 0 };
    modify_strand(strand, at, remove_cp, ModifySource::Text(&text), 1).map_err(flex_to_rebol_error)
}

fn edit_array(engine: &mut Engine, stub: StubId, cursor: usize, value: &Cell, edit: SeriesEdit) {
    let source = engine.arrays.get_mut(stub).expect("array missing from ArrayStore");
    match edit {
        SeriesEdit::Append => source.append(std::slice::from_ref(value), false, 1, false),
        SeriesEdit::Insert => source.insert(cursor, std::slice::from_ref(value), false, 1, false),
        SeriesEdit::Change => source.modify(cursor, 1, std::slice::from_ref(value), false, 1, false),
    }
}

fn strand_text_of(engine: &Engine, value: &Cell) -> Result<String, RebolError> {
    match (value.heart, &value.payload) {
        (Heart::Strand, Payload::Series(stub, _)) => {
            Ok(engine.strands.get(*stub).expect("strand missing from StrandStore").as_str().to_string())
        }
        _ => Err(RebolError::BadValue { detail: "expected a string value".to_string() }),
    }
}

fn flex_to_rebol_error(e: FlexError) -> RebolError {
    match e {
        FlexError::BadUtf8BinEdit { offset } => RebolError::BadUtf8BinEdit { offset },
        FlexError::IllegalZeroByte => RebolError::IllegalZeroByte,
        FlexError::OutOfRange { index, len } => RebolError::OutOfRange { index, len },
        FlexError::NotOneCodepoint { found } => RebolError::NotOneCodepoint { found },
    }
}

fn pick_native(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, args: &[Cell]) -> Bounce {
    let (Some(location), Some(picker)) = (args.first(), args.get(1)) else {
        return throw_rebol_error(ctx, RebolError::BadValue { detail: "pick needs a series and a picker".to_string() });
    };
    let mut stores = core_tweak::Stores { pool: &mut engine.pool, arrays: &mut engine.arrays, maps: &mut engine.maps, binds: &mut engine.binds };
    match core_tweak::tweak(&mut stores, location, picker, core_tweak::Dual::Get) {
        Ok(v) => crate::feedsync::finish(stack, id, v),
        Err(e) => throw_rebol_error(ctx, e),
    }
}

fn poke_native(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, args: &[Cell]) -> Bounce {
    let (Some(location), Some(picker), Some(value)) = (args.first(), args.get(1), args.get(2)) else {
        return throw_rebol_error(ctx, RebolError::BadValue { detail: "poke needs a series, a picker, and a value".to_string() });
    };
    let mut stores = core_tweak::Stores { pool: &mut engine.pool, arrays: &mut engine.arrays, maps: &mut engine.maps, binds: &mut engine.binds };
    match core_tweak::tweak(&mut stores, location, picker, core_tweak::Dual::Set(value.clone())) {
        Ok(v) => crate::feedsync::finish(stack, id, v),
        Err(e) => throw_rebol_error(ctx, e),
    }
}

fn arithmetic(ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, op: NativeOp, args: &[Cell]) -> Bounce {
    let (Some(a), Some(b)) = (args.first(), args.get(1)) else {
        return throw_rebol_error(ctx, RebolError::MathArgs);
    };
    let result = match (&a.payload, &b.payload) {
        (Payload::Int(x), Payload::Int(y)) => {
            let checked = match op {
                NativeOp::Add => x.checked_add(*y),
                NativeOp::Subtract => x.checked_sub(*y),
                NativeOp::Multiply => x.checked_mul(*y),
                NativeOp::Divide => {
                    if *y == 0 {
                        return throw_rebol_error(ctx, RebolError::ZeroDivide);
                    }
                    x.checked_div(*y)
                }
                _ => unreachable!(),
            };
            match checked {
                Some(n) => Cell::integer(n),
                None => return throw_rebol_error(ctx, RebolError::Overflow),
            }
        }
        (Payload::Int(_) | Payload::Decimal(_), Payload::Int(_) | Payload::Decimal(_)) => {
            let x = as_f64(a);
            let y = as_f64(b);
            if op == NativeOp::Divide && y == 0.0 {
                return throw_rebol_error(ctx, RebolError::ZeroDivide);
            }
            let n = match op {
                NativeOp::Add => x + y,
                NativeOp::Subtract => x - y,
                NativeOp::Multiply => x * y,
                NativeOp::Divide => x / y,
                _ => unreachable!(),
            };
            Cell::decimal(n)
        }
        _ => return throw_rebol_error(ctx, RebolError::MathArgs),
    };
    crate::feedsync::finish(stack, id, result)
}

fn less_than(ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, args: &[Cell]) -> Bounce {
    let (Some(a), Some(b)) = (args.first(), args.get(1)) else {
        return throw_rebol_error(ctx, RebolError::InvalidCompare);
    };
    let less = match (&a.payload, &b.payload) {
        (Payload::Int(x), Payload::Int(y)) => x < y,
        (Payload::Int(_) | Payload::Decimal(_), Payload::Int(_) | Payload::Decimal(_)) => as_f64(a) < as_f64(b),
        _ => return throw_rebol_error(ctx, RebolError::InvalidCompare),
    };
    let keyword = if less { Keyword::True } else { Keyword::False };
    crate::feedsync::finish(stack, id, Cell::keyword(keyword))
}

fn as_f64(c: &Cell) -> f64 {
    match c.payload {
        Payload::Int(n) => n as f64,
        Payload::Decimal(f) => f,
        _ => 0.0,
    }
}

/// Each test drives one `DispatcherKind` variant end-to-end against this
/// crate's own `Engine`/`CoreExecutor`, the same way `crate::lib`'s
/// `evaluating_a_two_argument_add_call_produces_the_sum` drives `Native`.
#[cfg(test)]
mod tests {
    use super::*;
    use core_bind::{ContextId, VarList};
    use core_level::{ExecutorKind, Feed, Level, LevelStack};
    use core_trampoline::{HaltSignal, Trampoline};
    use core_value::{Source, SymbolId};

    use crate::CoreExecutor;

    fn sym(id: u32) -> SymbolId {
        SymbolId(id)
    }

    fn register_action(engine: &mut Engine, paramlist: ParamList, details: Details, dispatcher: DispatcherKind) -> ActionId {
        let entry = ActionEntry::new(paramlist, details, dispatcher);
        let action_id = engine.pool.allocate(StubFlavor::Details);
        engine.actions.insert(action_id, entry);
        action_id
    }

    fn register_native(engine: &mut Engine, op: NativeOp, arity: usize) -> ActionId {
        let params = (0..arity).map(|i| Param::normal(sym(100 + i as u32))).collect();
        register_action(engine, ParamList::new(params), Details::new(0), DispatcherKind::Native(op))
    }

    fn push_binding(engine: &mut Engine, name: SymbolId, value: Cell) -> ContextId {
        let varlist = VarList::new(vec![name], Cell::trash());
        let ctx_id = engine.binds.insert(varlist);
        engine.binds.get_mut(ctx_id).set(0, value);
        ctx_id
    }

    fn run_call(engine: &mut Engine, binding: ContextId, cells: Vec<Cell>) -> Bounce {
        let source = Source::from_cells(&mut engine.pool, cells);
        let array_id = engine.arrays.insert(source);
        let mut stack = LevelStack::new();
        let mut root = Level::root(ExecutorKind::Eval, Feed::from_array(array_id));
        root.coupling = Some(binding);
        stack.push(root);
        let mut ctx = RuntimeContext::new(HaltSignal::never());
        let mut executor = CoreExecutor { engine };
        Trampoline::run(&mut stack, &mut ctx, &mut executor)
    }

    #[test]
    fn func_dispatcher_builds_a_callable_action_from_spec_and_body() {
        let mut engine = Engine::new();
        let add_id = register_native(&mut engine, NativeOp::Add, 2);
        let (a_sym, b_sym) = (sym(1), sym(2));
        let body = Source::from_cells(&mut engine.pool, vec![Cell::action(add_id), Cell::word(a_sym), Cell::word(b_sym)]);
        let body_id = engine.arrays.insert(body);
        let func_id = register_action(
            &mut engine,
            ParamList::new(vec![Param::normal(a_sym), Param::normal(b_sym)]),
            Details::new(0),
            DispatcherKind::Func { body: body_id },
        );

        let f_sym = sym(3);
        let binding = push_binding(&mut engine, f_sym, Cell::action(func_id));
        let result = run_call(&mut engine, binding, vec![Cell::word(f_sym), Cell::integer(2), Cell::integer(3)]);
        match result {
            Bounce::Value(v) => assert_eq!(v, Cell::integer(5)),
            other => panic!("expected Value(5), got {other:?}"),
        }
    }

    #[test]
    fn adapt_dispatcher_runs_prelude_before_delegating_to_adaptee() {
        let mut engine = Engine::new();
        let add_id = register_native(&mut engine, NativeOp::Add, 2);
        let (a_sym, b_sym) = (sym(1), sym(2));
        let prelude = Source::from_cells(&mut engine.pool, vec![Cell::set_word(a_sym), Cell::integer(99)]);
        let prelude_id = engine.arrays.insert(prelude);
        let adapt_id = register_action(
            &mut engine,
            ParamList::new(vec![Param::normal(a_sym), Param::normal(b_sym)]),
            Details::new(0),
            DispatcherKind::Adapt { prelude: prelude_id, adaptee: add_id },
        );

        let f_sym = sym(3);
        let binding = push_binding(&mut engine, f_sym, Cell::action(adapt_id));
        let result = run_call(&mut engine, binding, vec![Cell::word(f_sym), Cell::integer(1), Cell::integer(3)]);
        match result {
            Bounce::Value(v) => assert_eq!(v, Cell::integer(102)),
            other => panic!("expected Value(102), got {other:?}"),
        }
    }

    #[test]
    fn chain_dispatcher_feeds_each_steps_result_into_the_next() {
        let mut engine = Engine::new();
        let add_id = register_native(&mut engine, NativeOp::Add, 2);
        let x_sym = sym(1);
        let identity_body = Source::from_cells(&mut engine.pool, vec![Cell::word(x_sym)]);
        let identity_body_id = engine.arrays.insert(identity_body);
        let identity_id = register_action(
            &mut engine,
            ParamList::new(vec![Param::normal(x_sym)]),
            Details::new(0),
            DispatcherKind::Lambda { body: identity_body_id },
        );
        let chain_id = register_action(
            &mut engine,
            ParamList::new(vec![Param::normal(sym(10)), Param::normal(sym(11))]),
            Details::new(0),
            DispatcherKind::Chain { steps: vec![add_id, identity_id] },
        );

        let f_sym = sym(20);
        let binding = push_binding(&mut engine, f_sym, Cell::action(chain_id));
        let result = run_call(&mut engine, binding, vec![Cell::word(f_sym), Cell::integer(2), Cell::integer(3)]);
        match result {
            Bounce::Value(v) => assert_eq!(v, Cell::integer(5)),
            other => panic!("expected Value(5), got {other:?}"),
        }
    }

    #[test]
    fn enclose_dispatcher_hands_outer_an_unexecuted_frame() {
        let mut engine = Engine::new();
        let p_sym = sym(1);
        let inner_id = register_action(&mut engine, ParamList::new(vec![Param::normal(p_sym)]), Details::new(0), DispatcherKind::Native(NativeOp::Print));

        let frame_param = sym(2);
        let outer_body = Source::from_cells(&mut engine.pool, vec![Cell::word(frame_param)]);
        let outer_body_id = engine.arrays.insert(outer_body);
        let outer_id = register_action(
            &mut engine,
            ParamList::new(vec![Param::normal(frame_param)]),
            Details::new(0),
            DispatcherKind::Func { body: outer_body_id },
        );

        let enclose_id = register_action(
            &mut engine,
            ParamList::new(vec![Param::normal(p_sym)]),
            Details::new(0),
            DispatcherKind::Enclose { inner: inner_id, outer: outer_id },
        );

        let f_sym = sym(3);
        let binding = push_binding(&mut engine, f_sym, Cell::action(enclose_id));
        let result = run_call(&mut engine, binding, vec![Cell::word(f_sym), Cell::integer(7)]);
        match result {
            Bounce::Value(v) => assert_eq!(v.heart, Heart::Frame),
            other => panic!("expected a frame value, got {other:?}"),
        }
    }

    #[test]
    fn specialize_dispatcher_overlays_presets_then_fills_the_rest_from_args() {
        let mut engine = Engine::new();
        let (a_sym, b_sym) = (sym(1), sym(2));
        let add_id = register_action(&mut engine, ParamList::new(vec![Param::normal(a_sym), Param::normal(b_sym)]), Details::new(0), DispatcherKind::Native(NativeOp::Add));

        let mut overlay = VarList::new(vec![a_sym, b_sym], Cell::trash());
        overlay.set(0, Cell::integer(10));
        let overlay_id = engine.binds.insert(overlay);

        let specialize_id = register_action(
            &mut engine,
            ParamList::new(vec![Param::normal(b_sym)]),
            Details::new(0),
            DispatcherKind::Specialize { base: add_id, overlay: overlay_id },
        );

        let f_sym = sym(3);
        let binding = push_binding(&mut engine, f_sym, Cell::action(specialize_id));
        let result = run_call(&mut engine, binding, vec![Cell::word(f_sym), Cell::integer(5)]);
        match result {
            Bounce::Value(v) => assert_eq!(v, Cell::integer(15)),
            other => panic!("expected Value(15), got {other:?}"),
        }
    }

    #[test]
    fn hijack_dispatcher_delegates_to_the_replacement_action() {
        let mut engine = Engine::new();
        let subtract_id = register_native(&mut engine, NativeOp::Subtract, 2);
        let hijack_id = register_action(
            &mut engine,
            ParamList::new(vec![Param::normal(sym(1)), Param::normal(sym(2))]),
            Details::new(0),
            DispatcherKind::Hijack { replacement: subtract_id },
        );

        let f_sym = sym(3);
        let binding = push_binding(&mut engine, f_sym, Cell::action(hijack_id));
        let result = run_call(&mut engine, binding, vec![Cell::word(f_sym), Cell::integer(10), Cell::integer(3)]);
        match result {
            Bounce::Value(v) => assert_eq!(v, Cell::integer(7)),
            other => panic!("expected Value(7), got {other:?}"),
        }
    }

    #[test]
    fn reframe_dispatcher_delegates_its_fulfilled_args_to_the_target() {
        let mut engine = Engine::new();
        let add_id = register_native(&mut engine, NativeOp::Add, 2);
        let reframe_id = register_action(
            &mut engine,
            ParamList::new(vec![Param::normal(sym(1)), Param::normal(sym(2))]),
            Details::new(0),
            DispatcherKind::Reframe { target: add_id, into_arg: 0 },
        );

        let f_sym = sym(3);
        let binding = push_binding(&mut engine, f_sym, Cell::action(reframe_id));
        let result = run_call(&mut engine, binding, vec![Cell::word(f_sym), Cell::integer(4), Cell::integer(6)]);
        match result {
            Bounce::Value(v) => assert_eq!(v, Cell::integer(10)),
            other => panic!("expected Value(10), got {other:?}"),
        }
    }

    #[test]
    fn nshot_dispatcher_runs_the_branch_until_n_calls_then_returns_null() {
        let mut engine = Engine::new();
        let add_id = register_native(&mut engine, NativeOp::Add, 2);
        let nshot_id = register_action(
            &mut engine,
            ParamList::new(vec![Param::normal(sym(1)), Param::normal(sym(2))]),
            Details::new(1),
            DispatcherKind::NShot { mode: NShotMode::UntilN, n: 1, branch: add_id },
        );

        let f_sym = sym(3);
        let binding = push_binding(&mut engine, f_sym, Cell::action(nshot_id));

        let first = run_call(&mut engine, binding, vec![Cell::word(f_sym), Cell::integer(1), Cell::integer(2)]);
        match first {
            Bounce::Value(v) => assert_eq!(v, Cell::integer(3)),
            other => panic!("expected Value(3) on the first call, got {other:?}"),
        }

        let second = run_call(&mut engine, binding, vec![Cell::word(f_sym), Cell::integer(1), Cell::integer(2)]);
        match second {
            Bounce::Value(v) => assert_eq!(v, Cell::keyword(Keyword::Null)),
            other => panic!("expected Value(null) on the second call, got {other:?}"),
        }
    }
}
