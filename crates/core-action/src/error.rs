use core_value::SymbolId;

/// Errors raised by the evaluator and action executor that aren't already
/// covered by `core_value::RebolError`'s wire-visible taxonomy — these are
/// internal-invariant failures the executors use to drive unwind via
/// `RuntimeContext::throw`, not surfaced to script authors as `Cell::error`
/// values (spec.md §4.G/§4.H panics).
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("word `{0:?}` has no action bound")]
    NotAnAction(SymbolId),
    #[error("bad argument type for parameter `{0:?}`")]
    BadArgumentType(SymbolId),
    #[error("action called with too few arguments")]
    ArgsExhausted,
    #[error("return value failed its return: typecheck")]
    BadReturnType,
    #[error("chain step produced no value to feed the next step")]
    EmptyChain,
    #[error("hijack target and replacement paramlists are incompatible")]
    IncompatibleHijack,
}

impl ActionError {
    pub fn id(&self) -> &'static str {
        match self {
            ActionError::NotAnAction(_) => "not-an-action",
            ActionError::BadArgumentType(_) => "bad-argument-type",
            ActionError::ArgsExhausted => "args-exhausted",
            ActionError::BadReturnType => "bad-return-type",
            ActionError::EmptyChain => "empty-chain",
            ActionError::IncompatibleHijack => "incompatible-hijack",
        }
    }
}
