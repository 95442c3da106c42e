//! The Trampoline loop itself (spec.md §4.F).
//!
//! Grounded on `core-render::scheduler`'s "drive a queue of units of work,
//! route their outcome, repeat" loop.

use core_level::{Level, LevelFlags, LevelId, LevelStack};
use core_value::Cell;
use tracing::trace;

use crate::bounce::Bounce;
use crate::context::RuntimeContext;

/// Implemented by whatever owns the concrete executors (`core-action`'s
/// eval/exec dispatch, `core-generator`'s yielder). Kept as a trait here,
/// rather than a `core-trampoline -> core-action` dependency, because the
/// action executors need trampoline types (`Bounce`) while the trampoline
/// must stay ignorant of action-specific `Level.state` encodings — the
/// acyclic direction is trampoline-defines-the-seam,
/// executors-implement-it.
pub trait Execute {
    /// Perform one cooperative step for the Level at `id` (always the
    /// current top of `stack` when called by [`Trampoline::run`]).
    fn step(&mut self, ctx: &mut RuntimeContext, stack: &mut LevelStack, id: LevelId) -> Bounce;

    /// Unwind cleanup for a Level being dropped, whether by normal
    /// completion or a throw in flight. Default: restore the data-stack
    /// baseline (spec.md §4.F); dispatcher-specific state (pending
    /// arguments, generator plugs) is the implementer's to add.
    fn cleanup(&mut self, ctx: &mut RuntimeContext, level: &Level) {
        ctx.unwind_data_to(level.baseline);
    }
}

pub struct Trampoline;

impl Trampoline {
    /// Drive `stack` to completion (or suspension, or an uncaught throw).
    pub fn run(stack: &mut LevelStack, ctx: &mut RuntimeContext, exec: &mut dyn Execute) -> Bounce {
        loop {
            if !ctx.is_thrown() && ctx.should_poll_halt() && ctx.halt.poll() {
                trace!("halt requested, injecting halt throw");
                ctx.throw(Cell::trash(), None);
            }

            if ctx.is_thrown() {
                if let Some(result) = Self::unwind(stack, ctx, exec) {
                    return result;
                }
                // `unwind` stopped at a catching Level without clearing the
                // throw; fall through and let that Level's executor see
                // `ctx.is_thrown()` on its next step (recomputing `id`,
                // since unwind just popped frames above it).
            }

            let Some(id) = stack.top_id() else {
                return Bounce::Value(Cell::trash());
            };

            let bounce = exec.step(ctx, stack, id);
            trace!(?bounce, depth = stack.depth(), "trampoline step");

            match bounce {
                Bounce::Value(v) => {
                    let level = stack.pop().expect("executor returned Value for a Level it didn't own");
                    exec.cleanup(ctx, &level);
                    match stack.top_mut() {
                        Some(parent) => parent.spare = v,
                        None => return Bounce::Value(v),
                    }
                }
                Bounce::Continue | Bounce::Delegate => {
                    // Stack already reflects the push/replace; loop again.
                }
                Bounce::Redo => {
                    if let Some(top) = stack.top_mut() {
                        top.state = 0;
                        top.scratch = Cell::trash();
                        top.spare = Cell::trash();
                    }
                }
                Bounce::Thrown => {
                    // Executors can also signal THROWN by return value
                    // instead of pre-setting `ctx.thrown`; treat a bare
                    // Thrown without a label as a bug, not silently.
                    debug_assert!(ctx.is_thrown(), "Bounce::Thrown without a set throw label");
                }
                Bounce::Suspended => return Bounce::Suspended,
            }
        }
    }

    /// Unwind Levels until one marked [`LevelFlags::DISPATCHER_CATCHES`]
    /// is reached (return `None`, giving that Level's executor the next
    /// step) or the stack empties (return `Some(Bounce::Thrown)`).
    fn unwind(stack: &mut LevelStack, ctx: &mut RuntimeContext, exec: &mut dyn Execute) -> Option<Bounce> {
        loop {
            let top = stack.top()?;
            if top.flags.contains(LevelFlags::DISPATCHER_CATCHES) {
                return None;
            }
            let was_root = top.flags.contains(LevelFlags::ROOT);
            let level = stack.pop().expect("checked non-empty above");
            exec.cleanup(ctx, &level);
            if was_root || stack.is_empty() {
                return Some(Bounce::Thrown);
            }
        }
    }
}
