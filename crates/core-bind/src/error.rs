use core_value::SymbolId;

/// Raised by `core-action` when [`crate::resolve`] comes back empty at a
/// point the evaluator actually needs a value (spec.md §4.D "an unbound
/// word used as a value panics").
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("word has no binding in this context")]
    NotBound(SymbolId),
}

impl BindError {
    pub fn id(&self) -> &'static str {
        match self {
            BindError::NotBound(_) => "not-bound",
        }
    }
}
