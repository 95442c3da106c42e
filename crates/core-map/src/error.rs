use core_value::SymbolId;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MapError {
    #[error("conflicting-key: {a:?} and {b:?} hash to the same slot under the map's case policy")]
    ConflictingKey { a: SymbolId, b: SymbolId },
}

impl MapError {
    pub fn id(&self) -> &'static str {
        match self {
            MapError::ConflictingKey { .. } => "conflicting-key",
        }
    }
}
