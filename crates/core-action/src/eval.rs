//! The evaluator executor (spec.md §4.G): one cooperative step of the
//! expression evaluator, implemented against `core_trampoline::Execute` for
//! [`ExecutorKind::Eval`] Levels.
//!
//! One call to [`step`] performs exactly one of: fetch-and-copy a literal,
//! recurse into a GROUP!, look up and maybe invoke a WORD!, assign a
//! SET-WORD!, or pick through a PATH!/TUPLE!. After producing a value it
//! always goes through [`after_value`], which does the infix lookahead
//! (spec.md §4.G "Infix lookahead") before tying off (one-step Levels) or
//! looping back to fetch the next expression.

use core_bind::resolve;
use core_level::{ExecutorKind, Feed, Level, LevelFlags, LevelId, LevelStack};
use core_trampoline::{Bounce, RuntimeContext};
use core_value::{decay, Cell, Heart, Payload, RebolError};

use crate::engine::Engine;
use crate::feedsync::finish;

const STATE_FETCH: u8 = 0;
const STATE_AFTER_GROUP: u8 = 1;
const STATE_AFTER_SET_WORD_RHS: u8 = 2;
const STATE_AFTER_ACTION: u8 = 3;

pub fn step(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId) -> Bounce {
    match stack.get(id).state {
        STATE_FETCH => fetch(engine, ctx, stack, id),
        STATE_AFTER_GROUP => {
            let v = stack.get(id).spare.clone();
            after_value(engine, ctx, stack, id, v)
        }
        STATE_AFTER_SET_WORD_RHS => {
            let v = stack.get(id).spare.clone();
            let target = stack.get(id).scratch.clone();
            let sym = match target.payload {
                Payload::Symbol(s) => s,
                _ => unreachable!("eval only parks a word cell in scratch"),
            };
            let coupling = stack.get(id).coupling;
            match resolve(&engine.binds, sym, coupling) {
                None => {
                    ctx.throw(Cell::error(RebolError::NoBinding { word: format!("{sym:?}") }), None);
                    Bounce::Thrown
                }
                Some((ctx_id, slot)) => {
                    engine.binds.get_mut(ctx_id).set(slot, v.clone());
                    after_value(engine, ctx, stack, id, v)
                }
            }
        }
        STATE_AFTER_ACTION => {
            let v = stack.get(id).spare.clone();
            after_value(engine, ctx, stack, id, v)
        }
        other => unreachable!("eval::step: unknown state byte {other}"),
    }
}

fn fetch(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId) -> Bounce {
    let coupling = stack.get(id).coupling;
    let current = stack.get(id).feed.at(&engine.arrays);

    let Some(current) = current else {
        let output = stack.get(id).output.clone();
        let result = if output.is_trash() { Cell::ghost() } else { output };
        return finish(stack, id, result);
    };
    stack.get_mut(id).feed.next();

    match current.heart {
        Heart::Group => {
            let array = match current.payload {
                Payload::Series(stub, _) => stub,
                _ => unreachable!("GROUP! always carries a Series payload"),
            };
            let mut child = Level::new(ExecutorKind::Eval, Feed::from_array(array), ctx.data_depth());
            child.flags.insert(LevelFlags::ONE_STEP);
            child.coupling = coupling;
            stack.push(child);
            stack.get_mut(id).state = STATE_AFTER_GROUP;
            Bounce::Continue
        }
        Heart::Word => {
            let sym = match current.payload {
                Payload::Symbol(s) => s,
                _ => unreachable!("WORD! always carries a Symbol payload"),
            };
            match resolve(&engine.binds, sym, coupling) {
                None => {
                    ctx.throw(Cell::error(RebolError::NoBinding { word: format!("{sym:?}") }), None);
                    Bounce::Thrown
                }
                Some((ctx_id, slot)) => {
                    let value = engine.binds.get(ctx_id).get(slot).clone();
                    if value.is_action() {
                        let action_id = match value.payload {
                            Payload::Series(s, _) => s,
                            _ => unreachable!("ACTION! always carries a Series payload"),
                        };
                        begin_action_call(engine, ctx, stack, id, action_id, None)
                    } else {
                        let decayed = decay(&value, None);
                        after_value(engine, ctx, stack, id, decayed)
                    }
                }
            }
        }
        Heart::GetWord => {
            let sym = match current.payload {
                Payload::Symbol(s) => s,
                _ => unreachable!("GET-WORD! always carries a Symbol payload"),
            };
            match resolve(&engine.binds, sym, coupling) {
                None => {
                    ctx.throw(Cell::error(RebolError::NoBinding { word: format!("{sym:?}") }), None);
                    Bounce::Thrown
                }
                Some((ctx_id, slot)) => {
                    let value = engine.binds.get(ctx_id).get(slot).clone();
                    after_value(engine, ctx, stack, id, value)
                }
            }
        }
        Heart::MetaWord => {
            let sym = match current.payload {
                Payload::Symbol(s) => s,
                _ => unreachable!("META-WORD! always carries a Symbol payload"),
            };
            match resolve(&engine.binds, sym, coupling) {
                None => {
                    ctx.throw(Cell::error(RebolError::NoBinding { word: format!("{sym:?}") }), None);
                    Bounce::Thrown
                }
                Some((ctx_id, slot)) => {
                    let value = engine.binds.get(ctx_id).get(slot).clone();
                    let lifted = value.lift_value().unwrap_or(value);
                    after_value(engine, ctx, stack, id, lifted)
                }
            }
        }
        Heart::SetWord => {
            stack.get_mut(id).scratch = current;
            let child_feed = clone_feed_from(&stack.get(id).feed);
            let mut child = Level::new(ExecutorKind::Eval, child_feed, ctx.data_depth());
            child.flags.insert(LevelFlags::ONE_STEP);
            child.coupling = coupling;
            stack.push(child);
            stack.get_mut(id).state = STATE_AFTER_SET_WORD_RHS;
            Bounce::Continue
        }
        Heart::Path | Heart::Tuple => match eval_sequence(engine, coupling, &current) {
            Ok(v) => after_value(engine, ctx, stack, id, v),
            Err(e) => {
                ctx.throw(Cell::error(e), None);
                Bounce::Thrown
            }
        },
        Heart::Action => {
            let action_id = match current.payload {
                Payload::Series(s, _) => s,
                _ => unreachable!("ACTION! always carries a Series payload"),
            };
            begin_action_call(engine, ctx, stack, id, action_id, None)
        }
        _ => after_value(engine, ctx, stack, id, current),
    }
}

/// Infix lookahead, then tie-off-or-loop (spec.md §4.G).
fn after_value(engine: &mut Engine, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId, value: Cell) -> Bounce {
    stack.get_mut(id).output = value.clone();
    let coupling = stack.get(id).coupling;

    if let Some(next) = stack.get(id).feed.at(&engine.arrays) {
        if next.heart == Heart::Word {
            if let Payload::Symbol(sym) = next.payload {
                if let Some((ctx_id, slot)) = resolve(&engine.binds, sym, coupling) {
                    let candidate = engine.binds.get(ctx_id).get(slot).clone();
                    if candidate.is_action() {
                        let action_id = match candidate.payload {
                            Payload::Series(s, _) => s,
                            _ => unreachable!(),
                        };
                        if engine.actions.get(action_id).infix {
                            stack.get_mut(id).feed.next();
                            return begin_action_call(engine, ctx, stack, id, action_id, Some(value));
                        }
                    }
                }
            }
        }
    }

    tie_off_or_loop(stack, id)
}

fn tie_off_or_loop(stack: &mut LevelStack, id: LevelId) -> Bounce {
    let one_step = stack.get(id).flags.contains(LevelFlags::ONE_STEP);
    if one_step {
        let output = stack.get(id).output.clone();
        finish(stack, id, output)
    } else {
        stack.get_mut(id).state = STATE_FETCH;
        Bounce::Continue
    }
}

/// Push an Action Level for `action_id`, seeded with `left` when this is an
/// infix call (spec.md §4.H "Push_Action").
pub(crate) fn begin_action_call(
    engine: &mut Engine,
    ctx: &mut RuntimeContext,
    stack: &mut LevelStack,
    id: LevelId,
    action_id: core_stub::StubId,
    left: Option<Cell>,
) -> Bounce {
    let coupling = stack.get(id).coupling;
    let child_feed = clone_feed_from(&stack.get(id).feed);
    let mut child = Level::new(ExecutorKind::Action, child_feed, ctx.data_depth());
    child.phase = Some(action_id);
    child.coupling = coupling;
    if let Some(left) = left {
        child.output = left;
        child.flags.insert(LevelFlags::INFIX_SEEDED);
    }
    stack.push(child);
    stack.get_mut(id).state = STATE_AFTER_ACTION;
    let _ = engine; // kept for symmetry with other branches; exec::step owns dispatch.
    Bounce::Continue
}

fn clone_feed_from(feed: &Feed) -> Feed {
    match feed.array() {
        Some(array) => {
            let mut f = Feed::from_array(array);
            f.set_array_index(feed.array_index().unwrap());
            f
        }
        None => feed.clone(),
    }
}

/// Resolve a PATH!/TUPLE! (spec.md §4.G "Path/tuple resolution"). Only
/// literal WORD!/INTEGER! pickers are supported — a picker that is itself a
/// GROUP! would need a nested evaluator step this inline resolver does not
/// drive; documented in DESIGN.md as an accepted simplification. Each
/// picker past the head word is resolved with one `core_tweak::tweak`
/// GET step rather than a second, locally-reimplemented series/map walker.
fn eval_sequence(engine: &mut Engine, coupling: Option<core_bind::ContextId>, seq: &Cell) -> Result<Cell, RebolError> {
    let array = match seq.payload {
        Payload::Series(stub, _) => stub,
        _ => return Err(RebolError::BadPick { picker: "non-sequence".to_string() }),
    };
    let source = engine.arrays.get(array).expect("sequence array missing from ArrayStore");
    let items = source.as_slice().to_vec();
    let Some((first, rest)) = items.split_first() else {
        return Err(RebolError::BadPick { picker: "empty sequence".to_string() });
    };

    let mut current = match first.heart {
        Heart::Word => {
            let sym = match first.payload {
                Payload::Symbol(s) => s,
                _ => unreachable!(),
            };
            let (ctx_id, slot) = resolve(&engine.binds, sym, coupling)
                .ok_or_else(|| RebolError::NoBinding { word: format!("{sym:?}") })?;
            engine.binds.get(ctx_id).get(slot).clone()
        }
        _ => first.clone(),
    };

    let mut stores = core_tweak::Stores { pool: &mut engine.pool, arrays: &mut engine.arrays, maps: &mut engine.maps, binds: &mut engine.binds };
    for picker in rest {
        current = core_tweak::tweak(&mut stores, &current, picker, core_tweak::Dual::Get)?;
    }
    Ok(current)
}
