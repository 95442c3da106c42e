//! `RuntimeContext`: the process-wide mutable state one interpreter
//! instance threads through every Level (spec.md §3 "Ownership &
//! lifecycle", §8 "After Drop_Level, the process-wide mold buffer, byte
//! buffer, and data stack are at their pre-push state").

use core_level::LevelId;
use core_value::{Cell, SymbolTable};

use crate::halt::HaltSignal;

/// The sentinel thrown-label plus unwind target (spec.md §4.F "Throw
/// machinery"). `target = None` means "unwind until a catching Level is
/// found or the stack empties", used by BREAK/CONTINUE/QUIT-style throws
/// that don't name a specific Level.
#[derive(Debug, Default, Clone)]
pub struct ThrowState {
    pub label: Option<Cell>,
    pub target: Option<LevelId>,
}

/// Per-instance runtime state, not a process-wide singleton (spec.md §9
/// "Global state" — "each interpreter instance owns one").
pub struct RuntimeContext {
    pub data_stack: Vec<Cell>,
    pub mold_buffer: String,
    pub byte_buffer: Vec<u8>,
    pub symbols: SymbolTable,
    pub thrown: ThrowState,
    pub halt: HaltSignal,
    /// How many Trampoline steps elapse between `halt.poll()` checks
    /// (spec.md §4.N "halt-poll interval" — how many evaluator steps
    /// between checks of the halt flag). 1 means "poll every step", the
    /// default and the only behavior exercised before this field existed.
    pub halt_poll_interval: u32,
    halt_poll_counter: u32,
}

impl RuntimeContext {
    pub fn new(halt: HaltSignal) -> Self {
        Self {
            data_stack: Vec::new(),
            mold_buffer: String::new(),
            byte_buffer: Vec::new(),
            symbols: SymbolTable::new(),
            thrown: ThrowState::default(),
            halt,
            halt_poll_interval: 1,
            halt_poll_counter: 0,
        }
    }

    pub fn set_halt_poll_interval(&mut self, interval: u32) {
        self.halt_poll_interval = interval.max(1);
    }

    /// Advance the step counter and report whether this step should poll
    /// the halt signal. Called once per Trampoline iteration.
    pub(crate) fn should_poll_halt(&mut self) -> bool {
        self.halt_poll_counter = self.halt_poll_counter.wrapping_add(1);
        self.halt_poll_counter % self.halt_poll_interval.max(1) == 0
    }

    pub fn push_data(&mut self, cell: Cell) {
        self.data_stack.push(cell);
    }

    pub fn data_depth(&self) -> usize {
        self.data_stack.len()
    }

    /// Drop pending data-stack items above `baseline` (spec.md §4.F "Each
    /// Level type's cleanup drops pending arguments/data-stack items above
    /// the Level's baseline").
    pub fn unwind_data_to(&mut self, baseline: usize) {
        self.data_stack.truncate(baseline);
    }

    pub fn throw(&mut self, label: Cell, target: Option<LevelId>) {
        self.thrown = ThrowState { label: Some(label), target };
    }

    pub fn is_thrown(&self) -> bool {
        self.thrown.label.is_some()
    }

    pub fn clear_thrown(&mut self) -> Option<Cell> {
        self.thrown.target = None;
        self.thrown.label.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwind_data_to_truncates_above_baseline() {
        let mut ctx = RuntimeContext::new(HaltSignal::never());
        ctx.push_data(Cell::integer(1));
        ctx.push_data(Cell::integer(2));
        let baseline = ctx.data_depth();
        ctx.push_data(Cell::integer(3));
        ctx.unwind_data_to(baseline);
        assert_eq!(ctx.data_depth(), baseline);
    }

    #[test]
    fn default_poll_interval_polls_every_step() {
        let mut ctx = RuntimeContext::new(HaltSignal::never());
        assert!(ctx.should_poll_halt());
        assert!(ctx.should_poll_halt());
    }

    #[test]
    fn wider_poll_interval_skips_intermediate_steps() {
        let mut ctx = RuntimeContext::new(HaltSignal::never());
        ctx.set_halt_poll_interval(4);
        assert!(!ctx.should_poll_halt());
        assert!(!ctx.should_poll_halt());
        assert!(!ctx.should_poll_halt());
        assert!(ctx.should_poll_halt());
    }

    #[test]
    fn zero_interval_clamps_to_one() {
        let mut ctx = RuntimeContext::new(HaltSignal::never());
        ctx.set_halt_poll_interval(0);
        assert!(ctx.should_poll_halt());
    }

    #[test]
    fn throw_then_clear_round_trips_label() {
        let mut ctx = RuntimeContext::new(HaltSignal::never());
        ctx.throw(Cell::integer(7), None);
        assert!(ctx.is_thrown());
        let label = ctx.clear_thrown().unwrap();
        assert_eq!(label, Cell::integer(7));
        assert!(!ctx.is_thrown());
    }
}
