//! Series modify: the shared mechanics behind INSERT/APPEND/CHANGE for
//! strings and blobs, per spec.md §4.L. Array-flavored modify (with its
//! newline-flag propagation, which needs the per-cell "newline before" bit
//! `core-value::source` owns) is implemented one layer up in
//! `core_value::source`, reusing [`crate::Flex::splice`] for the mechanical
//! part; this module only covers the byte/string surface that belongs at
//! this layer.

use crate::error::FlexError;
use crate::strand::Strand;

/// The four source shapes INSERT/APPEND/CHANGE accept against a string or
/// blob destination.
#[derive(Debug, Clone)]
pub enum ModifySource<'a> {
    Byte(u8),
    Blob(&'a [u8]),
    Text(&'a str),
    /// A "splice" of several text pieces — the degenerate expansion of a
    /// `spread block-of-strings` argument at the call site.
    Splice(&'a [&'a str]),
}

/// Apply one of the four source shapes as a CHANGE at codepoint index `at`,
/// removing `remove_cp` codepoints, `dup` times (APPEND/INSERT pass
/// `remove_cp = 0`). Blob aliasing of a strand must never land mid-codepoint
/// nor introduce a zero byte — both checked here rather than deep inside
/// [`Strand::change`], because only the blob-alias caller knows it is
/// operating byte-wise instead of codepoint-wise.
pub fn modify_strand(
    strand: &mut Strand,
    at: usize,
    remove_cp: usize,
    source: ModifySource<'_>,
    dup: usize,
) -> Result<(), FlexError> {
    let mut owned = String::new();
    match source {
        ModifySource::Byte(b) => {
            let ch = b as char;
            for _ in 0..dup {
                owned.push(ch);
            }
        }
        ModifySource::Blob(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| FlexError::BadUtf8BinEdit { offset: at })?;
            for _ in 0..dup {
                owned.push_str(text);
            }
        }
        ModifySource::Text(text) => {
            for _ in 0..dup {
                owned.push_str(text);
            }
        }
        ModifySource::Splice(parts) => {
            for _ in 0..dup {
                for part in parts {
                    owned.push_str(part);
                }
            }
        }
    }
    strand.change(at, remove_cp, &owned)
}

/// Reject a byte-indexed edit against a strand-aliased-as-blob destination
/// if it would land inside a multi-byte codepoint (splitting it) — the
/// `bad-utf8-bin-edit` failure mode of spec.md §4.B.
pub fn check_blob_alias_boundary(bytes: &[u8], byte_offset: usize) -> Result<(), FlexError> {
    if byte_offset == 0 || byte_offset == bytes.len() {
        return Ok(());
    }
    let is_continuation = bytes[byte_offset] & 0b1100_0000 == 0b1000_0000;
    if is_continuation {
        return Err(FlexError::BadUtf8BinEdit {
            offset: byte_offset,
        });
    }
    Ok(())
}
