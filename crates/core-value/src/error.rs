//! The wire-visible `Error` taxonomy of spec.md §6: one variant per id.
//! Surfaces at three escalation levels (spec.md §7): most of these are
//! carried as a recoverable `ERROR!` antiform first and only become a Rust
//! panic (a `Bounce::Thrown` in `core-trampoline`, never a native Rust
//! `panic!`) when they reach a slot that refuses them.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RebolError {
    #[error("bad-make: cannot construct {heart} from the given spec")]
    BadMake { heart: &'static str },
    #[error("bad-value: {detail}")]
    BadValue { detail: String },
    #[error("bad-utf8-bin-edit: edit would split a utf-8 codepoint at byte {offset}")]
    BadUtf8BinEdit { offset: usize },
    #[error("illegal-zero-byte: strand payload cannot contain a zero byte")]
    IllegalZeroByte,
    #[error("no-binding: word {word} has no binding in this context")]
    NoBinding { word: String },
    #[error("bad-pick: {picker} does not resolve against the given value")]
    BadPick { picker: String },
    #[error("conflicting-key: {a} and {b} hash to the same slot under the map's case policy")]
    ConflictingKey { a: String, b: String },
    #[error("zero-divide: division by zero")]
    ZeroDivide,
    #[error("out-of-range: index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("not-one-codepoint: expected exactly one codepoint, found {found}")]
    NotOneCodepoint { found: usize },
    #[error("overflow: arithmetic overflow")]
    Overflow,
    #[error("yielder-reentered: generator invoked while already suspended inside its own body")]
    YielderReentered,
    #[error("yielder-panicked: generator body panicked and cannot be resumed")]
    YielderPanicked,
    #[error("done")]
    Done,
    #[error("bad-return-type: return value does not satisfy the action's return: spec")]
    BadReturnType,
    #[error("invalid-exit: non-local exit has no matching level to unwind to")]
    InvalidExit,
    #[error("invalid-compare: values are not comparable at the requested specificity")]
    InvalidCompare,
    #[error("math-args: arguments are not valid for this arithmetic operation")]
    MathArgs,
    #[error("bad-refines: refinement usage is inconsistent with the action's paramlist")]
    BadRefines,
    #[error("surprising-action: a non-action value was encountered where an action was required")]
    SurprisingAction,
    #[error("no-catch: no enclosing level opted in to catch this throw")]
    NoCatch,
    #[error("bad argument type for parameter {param}")]
    BadArgumentType { param: String },
}

impl RebolError {
    /// The symbolic id portion of the wire-visible error (what molds as
    /// `~{id}~`), independent of the human-readable message.
    pub fn id(&self) -> &'static str {
        match self {
            RebolError::BadMake { .. } => "bad-make",
            RebolError::BadValue { .. } => "bad-value",
            RebolError::BadUtf8BinEdit { .. } => "bad-utf8-bin-edit",
            RebolError::IllegalZeroByte => "illegal-zero-byte",
            RebolError::NoBinding { .. } => "no-binding",
            RebolError::BadPick { .. } => "bad-pick",
            RebolError::ConflictingKey { .. } => "conflicting-key",
            RebolError::ZeroDivide => "zero-divide",
            RebolError::OutOfRange { .. } => "out-of-range",
            RebolError::NotOneCodepoint { .. } => "not-one-codepoint",
            RebolError::Overflow => "overflow",
            RebolError::YielderReentered => "yielder-reentered",
            RebolError::YielderPanicked => "yielder-panicked",
            RebolError::Done => "done",
            RebolError::BadReturnType => "bad-return-type",
            RebolError::InvalidExit => "invalid-exit",
            RebolError::InvalidCompare => "invalid-compare",
            RebolError::MathArgs => "math-args",
            RebolError::BadRefines => "bad-refines",
            RebolError::SurprisingAction => "surprising-action",
            RebolError::NoCatch => "no-catch",
            RebolError::BadArgumentType { .. } => "bad-argument-type",
        }
    }
}
