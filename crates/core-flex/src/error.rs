use thiserror::Error;

/// Recoverable failure modes specific to Flex mutation. These surface as
/// `bad-utf8-bin-edit` / `illegal-zero-byte` antiforms at the `core-value`
/// layer (see spec.md §6 error taxonomy); this crate only knows about the
/// byte/codepoint-level contract, not about antiforms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlexError {
    #[error("change would split a utf-8 codepoint at byte offset {offset}")]
    BadUtf8BinEdit { offset: usize },
    #[error("insertion would place a zero byte inside a strand-backed blob")]
    IllegalZeroByte,
    #[error("index {index} out of bounds for flex of length {len}")]
    OutOfRange { index: usize, len: usize },
    #[error("expected exactly one codepoint, found {found}")]
    NotOneCodepoint { found: usize },
}
