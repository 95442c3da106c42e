//! The embedding surface a host drives (spec.md §6 "To hosts",
//! `rebValue`/`rebDid`/`rebRelease`): scan source text, run it to
//! completion on a fresh root `Level`, and read back either a value or a
//! thrown-error description.
//!
//! Grounded on `core-action`'s own `CoreExecutor` unit tests
//! (`core-action/src/lib.rs`) for the canonical "build a root Level over an
//! array Feed, drive it with `Trampoline::run`, match on `Bounce`" shape —
//! this module is that pattern promoted to a reusable host-facing function.

use core_action::{CoreExecutor, Engine};
use core_bind::ContextId;
use core_level::{ExecutorKind, Feed, Level, LevelStack};
use core_trampoline::{Bounce, HaltSignal, RuntimeContext, Trampoline};
use core_value::Cell;

use crate::config::Config;
use crate::scan::{self, ScanError};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("uncaught throw: {0}")]
    Thrown(String),
}

/// `rebValue`-equivalent: scan `source`, evaluate it to completion against
/// `coupling`'s binding, and return its result (spec.md §6 "rebValue:
/// evaluate source text to one value").
pub fn reb_value(
    engine: &mut Engine,
    ctx: &mut RuntimeContext,
    coupling: ContextId,
    source: &str,
) -> Result<Cell, HostError> {
    let array_id = scan::scan(engine, &mut ctx.symbols, source)?;

    let mut stack = LevelStack::new();
    let mut root = Level::root(ExecutorKind::Eval, Feed::from_array(array_id));
    root.coupling = Some(coupling);
    stack.push(root);

    let mut executor = CoreExecutor { engine };
    match Trampoline::run(&mut stack, ctx, &mut executor) {
        Bounce::Value(v) => Ok(v),
        Bounce::Thrown => {
            let label = ctx.clear_thrown().unwrap_or_else(Cell::trash);
            let rendered = core_action::mold(engine, &ctx.symbols, &label);
            Err(HostError::Thrown(rendered))
        }
        other => unreachable!("Trampoline::run must settle on Value or Thrown, got {other:?}"),
    }
}

/// `rebDid`-equivalent: Rebol/Ren-C truthiness — everything is truthy
/// except the `false`/`null` antiform keywords (spec.md §3 "Keyword").
pub fn reb_did(cell: &Cell) -> bool {
    !matches!(
        cell.payload,
        core_value::Payload::Keyword(core_value::Keyword::False) | core_value::Payload::Keyword(core_value::Keyword::Null)
    )
}

/// `rebRelease`-equivalent. A real embedding API would drop a host-held
/// reference-counted handle; here every `Cell` the host sees is already an
/// owned value with no separate lifetime to release, so this is a no-op
/// kept only for API-shape parity with spec.md §6.
pub fn reb_release(_cell: Cell) {}

/// Convenience constructor bundling a fresh `Engine`/`RuntimeContext` with
/// the built-in natives installed and bound, ready for `reb_value`.
pub fn new_session() -> (Engine, RuntimeContext, ContextId) {
    new_session_with_config(&Config::default())
}

/// Like [`new_session`], but sized and tuned from a loaded `ren.toml`
/// (spec.md §4.N: stub-pool chunk size and halt-poll interval apply to a
/// real running session rather than sitting unread).
pub fn new_session_with_config(config: &Config) -> (Engine, RuntimeContext, ContextId) {
    let mut engine = Engine::with_pool_capacity(config.file.pool.chunk_stubs as usize);
    let mut ctx = RuntimeContext::new(HaltSignal::never());
    ctx.set_halt_poll_interval(config.file.eval.halt_poll_interval);
    let coupling = crate::natives::install_natives(&mut engine, &mut ctx.symbols);
    (engine, ctx, coupling)
}
