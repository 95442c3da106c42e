//! The stackless Trampoline driver (spec.md §4.F).

pub mod bounce;
pub mod context;
pub mod halt;
pub mod trampoline;

pub use bounce::Bounce;
pub use context::{RuntimeContext, ThrowState};
pub use halt::{HaltSignal, HaltSwitch};
pub use trampoline::{Execute, Trampoline};
