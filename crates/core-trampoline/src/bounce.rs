//! `Bounce`: what an executor step hands back to the Trampoline
//! (spec.md §4.F).

use core_value::Cell;

/// The result of one cooperative executor step. An executor that pushes or
/// pops Levels (`Continue`/`Delegate`) does so itself before returning —
/// the Trampoline doesn't inspect *which* Level changed, only that it
/// should loop again. This keeps [`crate::Trampoline`] ignorant of any
/// particular executor's internals, matching spec.md §9's "stackless
/// trampoline" redesign note.
#[derive(Debug, Clone)]
pub enum Bounce {
    /// The Level completed; the value is its output.
    Value(Cell),
    /// A sub-Level was pushed; the current Level's state byte remembers
    /// where to resume once the sub-Level completes.
    Continue,
    /// A sub-Level was pushed to tail-replace the current one (the current
    /// Level was already popped by the executor).
    Delegate,
    /// A non-local exit is in flight; consult `RuntimeContext::thrown`.
    Thrown,
    /// Re-enter the current Level's action with refreshed arguments.
    Redo,
    /// The top Level was physically unplugged from the stack (generator
    /// suspension); nothing further to do this trampoline turn.
    Suspended,
}
