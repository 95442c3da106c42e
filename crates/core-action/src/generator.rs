//! Generator mechanics (spec.md §4.I), implemented in this crate rather than
//! `core-generator` because suspension needs direct `LevelStack::unplug`
//! access and a side table keyed by the generator action's own `ActionId` —
//! both already live here, and `core-generator` depends on `core-action`
//! (not the reverse), so it cannot hand either back down. `core-generator`
//! is the thin public facade over [`call_generator`]/[`close`]; see its
//! module docs for the split.
//!
//! Each call to a generator action drives its own private [`LevelStack`] to
//! completion or suspension — a fresh one if the generator has never run or
//! has finished, a replugged one (spec.md §4.J "Replug") if it's mid-body.
//! This does reintroduce one native Rust stack frame per concurrently
//! active (not yet exhausted) generator call chain, unlike the rest of the
//! interpreter's stackless design — accepted simplification, see
//! DESIGN.md.

use std::collections::HashMap;

use core_bind::ContextId;
use core_level::{ExecutorKind, Feed, Level, LevelId, LevelStack};
use core_stub::StubId;
use core_trampoline::{Bounce, RuntimeContext, Trampoline};
use core_value::{Cell, RebolError};

use crate::engine::Engine;
use crate::CoreExecutor;

#[derive(Debug, Default)]
struct GeneratorEntry {
    plug: Option<Vec<Level>>,
    done: bool,
    running: bool,
}

#[derive(Debug, Default)]
pub struct GeneratorStore {
    entries: HashMap<StubId, GeneratorEntry>,
}

impl GeneratorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, id: StubId) -> &mut GeneratorEntry {
        self.entries.entry(id).or_default()
    }

    pub fn is_done(&self, id: StubId) -> bool {
        self.entries.get(&id).map(|e| e.done).unwrap_or(false)
    }

    /// Force completion (spec.md §4.I generators support an explicit close).
    pub fn close(&mut self, id: StubId) {
        let e = self.entry(id);
        e.plug = None;
        e.done = true;
        e.running = false;
    }
}

/// Invoke (or resume) the generator action `id`, whose body is `body`, with
/// `resume_value` sent in as the value of its own `yield` expression.
///
/// `coupling` is only consulted the first time this generator runs (plug is
/// `None`): it anchors the body's word lookups (its own bound parameters,
/// and everything outward from there) to the calling frame that fulfilled
/// them. Every later resume reuses whatever coupling the first build set,
/// since it travels with the unplugged Levels.
pub fn call_generator(engine: &mut Engine, ctx: &mut RuntimeContext, id: StubId, body: StubId, coupling: Option<ContextId>, resume_value: Cell) -> Cell {
    if engine.generators.is_done(id) {
        return Cell::error(RebolError::Done);
    }
    if engine.generators.entry(id).running {
        return Cell::error(RebolError::YielderReentered);
    }
    engine.generators.entry(id).running = true;

    let mut stack = LevelStack::new();
    match engine.generators.entry(id).plug.take() {
        Some(plug) => {
            stack.replug(plug);
            stack.get_mut(LevelId(0)).output = resume_value;
        }
        None => {
            let mut yielder = Level::new(ExecutorKind::Generator, Feed::from_variadic(vec![]), ctx.data_depth());
            yielder.phase = Some(id);
            stack.push(yielder);
            let mut body_level = Level::new(ExecutorKind::Eval, Feed::from_array(body), ctx.data_depth());
            body_level.coupling = coupling;
            stack.push(body_level);
        }
    }

    let mut executor = CoreExecutor { engine };
    let bounce = Trampoline::run(&mut stack, ctx, &mut executor);
    let result = match bounce {
        Bounce::Value(v) => {
            engine.generators.close(id);
            v
        }
        Bounce::Suspended => {
            let yielded = engine
                .generators
                .entries
                .get(&id)
                .and_then(|e| e.plug.as_ref())
                .map(|plug| plug[0].output.clone())
                .unwrap_or_else(Cell::trash);
            yielded
        }
        Bounce::Thrown => {
            engine.generators.close(id);
            Cell::error(RebolError::YielderPanicked)
        }
        other => unreachable!("generator Trampoline::run returned {other:?}"),
    };
    engine.generators.entry(id).running = false;
    result
}

/// `YIELD`'s dispatch body (spec.md §4.I "Unplug the stack between YIELD's
/// Level and the yielder's Level into a plug handle"). Each private
/// generator `LevelStack` always has the yielder Level at index 0, so there
/// is no coupling-chain walk to do — unplugging from index 0 detaches
/// everything, yielder included.
pub(crate) fn dispatch_yield(engine: &mut Engine, stack: &mut LevelStack, value: Cell) -> Bounce {
    let yielder_id = LevelId(0);
    let generator_id = stack
        .get(yielder_id)
        .phase
        .expect("generator Level always carries its ActionId");
    stack.get_mut(yielder_id).output = value;
    let plug = stack.unplug(yielder_id);
    engine.generators.entries.insert(generator_id, GeneratorEntry { plug: Some(plug), done: false, running: false });
    Bounce::Suspended
}

/// One cooperative step for a `Generator`-kind Level. Its body child is
/// always pushed directly above it, so by the time this Level is next on
/// top, the body has already run to completion (not suspension — a
/// suspension detaches this Level too, see [`dispatch_yield`]) and left its
/// result in `spare`. Forwarding it is the whole step.
pub(crate) fn step(stack: &LevelStack, id: LevelId) -> Bounce {
    Bounce::Value(stack.get(id).spare.clone())
}
