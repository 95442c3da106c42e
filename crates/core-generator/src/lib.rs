//! Thin public facade over `core_action`'s generator mechanics (spec.md
//! §4.J "Yielder"). The suspend/resume machinery itself lives in
//! `core_action::generator` because it needs direct `LevelStack::unplug`
//! access and the `GeneratorStore` side table, both already owned by that
//! crate's `Engine` — see its module docs for why the split runs that
//! direction and not this one.
//!
//! This crate exists so callers outside `core-action` (the REPL host, a
//! future debugger) have a typed `Result`-returning entry point instead of
//! matching on `RebolError` antiform cells by hand, plus `tracing`
//! instrumentation on every resume (spec.md §4.J's suspend/resume counters,
//! grounded on `core-input::async_service`'s task lifecycle telemetry).

use core_action::Engine;
use core_bind::ContextId;
use core_stub::StubId;
use core_trampoline::RuntimeContext;
use core_value::{Cell, RebolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    #[error("generator already ran to completion")]
    AlreadyDone,
    #[error("generator invoked while already suspended inside its own body")]
    Reentered,
    #[error("generator body threw and cannot be resumed")]
    Panicked,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Yielded(Cell),
    Done(Cell),
}

impl Outcome {
    pub fn value(&self) -> &Cell {
        match self {
            Outcome::Yielded(c) | Outcome::Done(c) => c,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }
}

/// Resume generator action `id` (whose body is `body`), sending `resume_value`
/// in as the value its own last `yield` expression produces. `coupling` is
/// the lexical scope the body's words resolve against on its first call
/// (ignored on later resumes — see `call_generator`'s doc comment).
///
/// Returns `Ok(Yielded(cell))` if the generator suspended again, `Ok(Done(cell))`
/// if it ran to completion, or `Err` if it was already exhausted, is already
/// mid-resume (reentrancy), or panicked while running.
#[tracing::instrument(skip(engine, ctx, resume_value), fields(generator = ?id))]
pub fn resume(
    engine: &mut Engine,
    ctx: &mut RuntimeContext,
    id: StubId,
    body: StubId,
    coupling: Option<ContextId>,
    resume_value: Cell,
) -> Result<Outcome, GeneratorError> {
    let was_done = engine.generators.is_done(id);
    let result = core_action::generator::call_generator(engine, ctx, id, body, coupling, resume_value);

    if let Some(err) = result.as_error() {
        let mapped = match err {
            RebolError::Done => GeneratorError::AlreadyDone,
            RebolError::YielderReentered => GeneratorError::Reentered,
            RebolError::YielderPanicked => GeneratorError::Panicked,
            other => {
                tracing::warn!(?other, "generator body threw; treating as panicked");
                GeneratorError::Panicked
            }
        };
        tracing::debug!(outcome = ?mapped, "generator resume rejected");
        return Err(mapped);
    }

    if engine.generators.is_done(id) {
        tracing::debug!("generator completed");
        Ok(Outcome::Done(result))
    } else {
        if !was_done {
            tracing::debug!("generator suspended");
        }
        Ok(Outcome::Yielded(result))
    }
}

/// Force a generator closed without resuming it (spec.md §4.I "generators
/// support an explicit close").
pub fn close(engine: &mut Engine, id: StubId) {
    tracing::debug!(generator = ?id, "closing generator");
    engine.generators.close(id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_action::details::Details;
    use core_action::param::{Param, ParamList};
    use core_action::store::{ActionEntry, DispatcherKind, NativeOp};
    use core_action::ActionId;
    use core_bind::VarList;
    use core_trampoline::HaltSignal;
    use core_value::{Source, SymbolId};

    fn sym(id: u32) -> SymbolId {
        SymbolId(id)
    }

    fn register_native(engine: &mut Engine, op: NativeOp, arity: usize) -> ActionId {
        let params = (0..arity).map(|i| Param::normal(sym(200 + i as u32))).collect();
        let entry = ActionEntry::new(ParamList::new(params), Details::new(0), DispatcherKind::Native(op));
        let action_id = engine.pool.allocate(core_stub::StubFlavor::Details);
        engine.actions.insert(action_id, entry);
        action_id
    }

    /// `yield 1` as a generator body: a single-expression array calling the
    /// `yield` native, evaluated once per resume.
    #[test]
    fn resuming_a_single_yield_body_completes_on_the_second_call() {
        let mut engine = Engine::new();
        let yield_id = register_native(&mut engine, NativeOp::Yield, 1);
        let yield_word = sym(1);
        let mut binding = VarList::new(vec![yield_word], Cell::trash());
        binding.set(0, Cell::action(yield_id));
        let binding_id = engine.binds.insert(binding);

        let source = Source::from_cells(&mut engine.pool, vec![Cell::word(yield_word), Cell::integer(1)]);
        let body = engine.arrays.insert(source);

        let generator_id = engine.pool.allocate(core_stub::StubFlavor::Details);
        let gen_entry = ActionEntry::new(ParamList::new(vec![]), Details::new(0), DispatcherKind::Generator { body });
        engine.actions.insert(generator_id, gen_entry);

        let mut ctx = RuntimeContext::new(HaltSignal::never());
        let coupling = Some(binding_id);
        let first = resume(&mut engine, &mut ctx, generator_id, body, coupling, Cell::trash()).unwrap();
        assert!(!first.is_done());
        assert_eq!(*first.value(), Cell::integer(1));

        let second = resume(&mut engine, &mut ctx, generator_id, body, coupling, Cell::trash()).unwrap();
        assert!(second.is_done());

        let third = resume(&mut engine, &mut ctx, generator_id, body, coupling, Cell::trash());
        assert_eq!(third, Err(GeneratorError::AlreadyDone));
    }

    #[test]
    fn closing_a_generator_marks_it_done_without_running_it() {
        let mut engine = Engine::new();
        let body_source = Source::from_cells(&mut engine.pool, vec![]);
        let body = engine.arrays.insert(body_source);
        let generator_id = engine.pool.allocate(core_stub::StubFlavor::Details);
        let gen_entry = ActionEntry::new(ParamList::new(vec![]), Details::new(0), DispatcherKind::Generator { body });
        engine.actions.insert(generator_id, gen_entry);

        close(&mut engine, generator_id);

        let mut ctx = RuntimeContext::new(HaltSignal::never());
        let result = resume(&mut engine, &mut ctx, generator_id, body, None, Cell::trash());
        assert_eq!(result, Err(GeneratorError::AlreadyDone));
    }
}
