//! `Level`: one cooperative call frame (spec.md §3 "Level", §4.F), and the
//! `LevelStack` the Trampoline drives (spec.md §4.F "A Level is a
//! cooperative task").
//!
//! Grounded on `core-input::async_service`'s per-connection state machine:
//! an explicit state byte driven across repeated polls, rather than a
//! suspended OS stack frame.

use core_bind::ContextId;
use core_stub::StubId;
use core_value::Cell;

use crate::feed::Feed;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LevelFlags: u16 {
        /// This Level's executor gets first refusal on an incoming throw
        /// label before it propagates further up the stack.
        const DISPATCHER_CATCHES = 1 << 0;
        /// Root Level of an evaluation (no prior); the Trampoline stops
        /// unwinding here if nothing else catches.
        const ROOT               = 1 << 1;
        /// Abrupt failure (panic) is in flight through this Level's cleanup.
        const ABRUPT              = 1 << 2;
        /// This evaluator Level stops after one expression instead of
        /// looping to the feed's end (spec.md §4.G "Tie-off: if this Level
        /// is a one-step evaluator, return O; else loop") — set on
        /// sub-evaluators pushed for a GROUP!, a SET-WORD right-hand side,
        /// or one argument's worth of fulfillment.
        const ONE_STEP             = 1 << 3;
        /// This Action Level's first Normal parameter is already fulfilled
        /// from `output` rather than the feed (spec.md §4.G "seed its first
        /// Normal parameter with the already-produced left-hand value") —
        /// set when the evaluator's infix lookahead starts an infix call.
        const INFIX_SEEDED         = 1 << 4;
    }
}

/// Which executor owns this Level's state byte. The Trampoline dispatches
/// on this tag to the subsystem that knows how to take one cooperative
/// step (`core-action::eval`, `core-action::exec`, `core-generator`) —
/// avoids a `Box<dyn Executor>` trait object, since every concrete executor
/// already lives behind a crate boundary this enum crosses for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorKind {
    Eval,
    Action,
    Generator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelId(pub u32);

/// A cooperative call frame (spec.md §3 "Level"). `prior` is recovered from
/// the owning [`LevelStack`]'s position rather than stored as a pointer;
/// everything else spec.md lists is a direct field.
#[derive(Debug, Clone)]
pub struct Level {
    pub executor: ExecutorKind,
    pub output: Cell,
    pub feed: Feed,
    pub varlist: Option<ContextId>,
    pub phase: Option<StubId>,
    pub coupling: Option<ContextId>,
    pub state: u8,
    pub flags: LevelFlags,
    pub scratch: Cell,
    pub spare: Cell,
    pub baseline: usize,
}

impl Level {
    pub fn new(executor: ExecutorKind, feed: Feed, baseline: usize) -> Self {
        Self {
            executor,
            output: Cell::trash(),
            feed,
            varlist: None,
            phase: None,
            coupling: None,
            state: 0,
            flags: LevelFlags::empty(),
            scratch: Cell::trash(),
            spare: Cell::trash(),
            baseline,
        }
    }

    pub fn root(executor: ExecutorKind, feed: Feed) -> Self {
        let mut level = Self::new(executor, feed, 0);
        level.flags.insert(LevelFlags::ROOT);
        level
    }
}

/// The live Level stack the Trampoline walks top-to-bottom. Indices are
/// stable only until the next `unplug` — generators rely on that to detach
/// and later reattach a contiguous run (spec.md §4.J "Unplug"/"Replug").
#[derive(Debug, Default)]
pub struct LevelStack {
    levels: Vec<Level>,
}

impl LevelStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: Level) -> LevelId {
        let id = LevelId(self.levels.len() as u32);
        self.levels.push(level);
        id
    }

    pub fn pop(&mut self) -> Option<Level> {
        self.levels.pop()
    }

    pub fn top(&self) -> Option<&Level> {
        self.levels.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Level> {
        self.levels.last_mut()
    }

    pub fn top_id(&self) -> Option<LevelId> {
        if self.levels.is_empty() {
            None
        } else {
            Some(LevelId((self.levels.len() - 1) as u32))
        }
    }

    pub fn get(&self, id: LevelId) -> &Level {
        &self.levels[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: LevelId) -> &mut Level {
        &mut self.levels[id.0 as usize]
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Detach the contiguous run `[from..]` off the top of the stack into a
    /// standalone plug (spec.md §4.J "Unplug the stack between YIELD's
    /// Level and the yielder's Level into a plug handle").
    pub fn unplug(&mut self, from: LevelId) -> Vec<Level> {
        self.levels.split_off(from.0 as usize)
    }

    /// Re-extend the stack with a previously unplugged run on top
    /// (spec.md §4.J "Replug").
    pub fn replug(&mut self, mut plug: Vec<Level>) {
        self.levels.append(&mut plug);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Feed;

    fn dummy_feed() -> Feed {
        Feed::from_variadic(vec![])
    }

    #[test]
    fn push_pop_respects_stack_order() {
        let mut stack = LevelStack::new();
        stack.push(Level::new(ExecutorKind::Eval, dummy_feed(), 0));
        let second = stack.push(Level::new(ExecutorKind::Action, dummy_feed(), 0));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.get(second).executor, ExecutorKind::Action);
        let popped = stack.pop().unwrap();
        assert_eq!(popped.executor, ExecutorKind::Action);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn unplug_then_replug_restores_depth_and_order() {
        let mut stack = LevelStack::new();
        stack.push(Level::new(ExecutorKind::Eval, dummy_feed(), 0));
        let from = stack.push(Level::new(ExecutorKind::Action, dummy_feed(), 0));
        stack.push(Level::new(ExecutorKind::Generator, dummy_feed(), 0));
        assert_eq!(stack.depth(), 3);

        let plug = stack.unplug(from);
        assert_eq!(plug.len(), 2);
        assert_eq!(stack.depth(), 1);

        stack.replug(plug);
        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.get(LevelId(2)).executor, ExecutorKind::Generator);
    }

    #[test]
    fn root_level_carries_root_flag() {
        let level = Level::root(ExecutorKind::Eval, dummy_feed());
        assert!(level.flags.contains(LevelFlags::ROOT));
        assert_eq!(level.baseline, 0);
    }
}
