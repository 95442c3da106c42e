//! `Strand`: a UTF-8 [`Flex<u8>`] with a codepoint-count side counter and an
//! optional [`BookmarkList`] caching codepoint-index -> byte-offset lookups,
//! grounded on `core-text`'s grapheme/codepoint boundary handling
//! (`core-text::width`, `core-text::segment`) but specialized here to the
//! plain codepoint-index bookmark cache spec.md §4.B describes (no grapheme
//! clustering — that is a molder/renderer concern out of this crate's scope).

use core_stub::{StubFlavor, StubId, StubPool};
use tracing::trace;

use crate::error::FlexError;
use crate::Flex;

/// How far a traversal must walk before it's worth caching a new bookmark.
/// Below this, recomputing from the nearer endpoint is cheaper than the
/// bookkeeping of maintaining another cache entry.
const BOOKMARK_WORTHWHILE_DISTANCE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bookmark {
    pub codepoint_index: usize,
    pub byte_offset: usize,
}

/// A small set of cached (codepoint-index, byte-offset) pairs. The source
/// interpreter keeps at most one live bookmark per strand; this keeps that
/// same one-slot cache (a `Vec` of length 0 or 1) rather than generalizing
/// to a multi-entry structure nothing in spec.md asks for.
#[derive(Debug, Clone, Default)]
pub struct BookmarkList {
    slot: Option<Bookmark>,
}

impl BookmarkList {
    pub fn get(&self) -> Option<Bookmark> {
        self.slot
    }

    fn set(&mut self, mark: Bookmark) {
        self.slot = Some(mark);
    }

    fn invalidate(&mut self) {
        self.slot = None;
    }
}

#[derive(Debug, Clone)]
pub struct Strand {
    bytes: Flex<u8>,
    codepoint_count: usize,
    bookmarks: BookmarkList,
}

fn utf8_len(first_byte: u8) -> usize {
    if first_byte & 0b1000_0000 == 0 {
        1
    } else if first_byte & 0b1110_0000 == 0b1100_0000 {
        2
    } else if first_byte & 0b1111_0000 == 0b1110_0000 {
        3
    } else {
        4
    }
}

impl Strand {
    pub fn new(pool: &mut StubPool) -> Self {
        Self {
            bytes: Flex::new(pool, StubFlavor::Strand),
            codepoint_count: 0,
            bookmarks: BookmarkList::default(),
        }
    }

    pub fn from_str(pool: &mut StubPool, s: &str) -> Result<Self, FlexError> {
        if s.bytes().any(|b| b == 0) {
            return Err(FlexError::IllegalZeroByte);
        }
        let codepoint_count = s.chars().count();
        Ok(Self {
            bytes: Flex::from_items(pool, StubFlavor::Strand, s.as_bytes().to_vec()),
            codepoint_count,
            bookmarks: BookmarkList::default(),
        })
    }

    pub fn stub(&self) -> StubId {
        self.bytes.stub()
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn codepoint_len(&self) -> usize {
        self.codepoint_count
    }

    pub fn as_str(&self) -> &str {
        // Invariant maintained by every mutator in this module: the payload
        // is always valid UTF-8.
        std::str::from_utf8(self.bytes.as_slice()).expect("Strand payload must stay valid utf-8")
    }

    /// `codepoint_index_to_byte_offset`: resolve a codepoint index to a byte
    /// offset, consulting the bookmark cache first.
    pub fn codepoint_index_to_byte_offset(&mut self, index: usize) -> usize {
        if index == 0 {
            return 0;
        }
        if index == self.codepoint_count {
            return self.bytes.len();
        }
        let (mut cur_cp, mut cur_byte) = match self.bookmarks.get() {
            Some(bm) => (bm.codepoint_index, bm.byte_offset),
            None => (0, 0),
        };

        // Choose the nearer of: bookmark, head, or tail.
        let dist_from_bookmark = cur_cp.abs_diff(index);
        let dist_from_head = index;
        let dist_from_tail = self.codepoint_count - index;
        if self.bookmarks.get().is_none() || dist_from_head < dist_from_bookmark {
            if dist_from_head <= dist_from_tail {
                cur_cp = 0;
                cur_byte = 0;
            } else {
                cur_cp = self.codepoint_count;
                cur_byte = self.bytes.len();
            }
        } else if dist_from_tail < dist_from_bookmark {
            cur_cp = self.codepoint_count;
            cur_byte = self.bytes.len();
        }

        let start_cp = cur_cp;
        let bytes = self.bytes.as_slice();
        while cur_cp < index {
            cur_byte += utf8_len(bytes[cur_byte]);
            cur_cp += 1;
        }
        while cur_cp > index {
            cur_cp -= 1;
            loop {
                cur_byte -= 1;
                if bytes[cur_byte] & 0b1100_0000 != 0b1000_0000 {
                    break;
                }
            }
        }

        let traveled = start_cp.abs_diff(cur_cp).max(index.abs_diff(start_cp));
        if traveled >= BOOKMARK_WORTHWHILE_DISTANCE {
            self.bookmarks.set(Bookmark {
                codepoint_index: index,
                byte_offset: cur_byte,
            });
        }
        cur_byte
    }

    /// Apply a byte-level delta at codepoint index `at`, with `removed_cp`
    /// codepoints removed and `inserted_cp` codepoints inserted (may differ,
    /// e.g. a multi-byte CHANGE). Updates bookmarks per spec.md invariant 3:
    /// bookmarks strictly before the mutation point shift by the byte/
    /// codepoint delta; any bookmark at or after it is invalidated, since
    /// the caller may not know precisely how to re-derive its new position
    /// for an arbitrary (non-pure-insert) CHANGE.
    fn adjust_bookmarks_after_mutation(
        &mut self,
        at_codepoint: usize,
        byte_delta: isize,
        codepoint_delta: isize,
        pure_insertion_or_deletion: bool,
    ) {
        if let Some(bm) = self.bookmarks.get() {
            if bm.codepoint_index < at_codepoint {
                // Strictly before the mutation point: unaffected.
                return;
            }
            if pure_insertion_or_deletion {
                let new_cp = (bm.codepoint_index as isize + codepoint_delta) as usize;
                let new_byte = (bm.byte_offset as isize + byte_delta) as usize;
                self.bookmarks.set(Bookmark {
                    codepoint_index: new_cp,
                    byte_offset: new_byte,
                });
            } else {
                self.bookmarks.invalidate();
            }
        }
    }

    /// CHANGE: replace the codepoint range `[at, at+remove_cp)` with `text`.
    /// Rejects zero bytes (illegal in a strand) — see spec.md §4.B.
    pub fn change(
        &mut self,
        at: usize,
        remove_cp: usize,
        text: &str,
    ) -> Result<(), FlexError> {
        if text.bytes().any(|b| b == 0) {
            return Err(FlexError::IllegalZeroByte);
        }
        let start_byte = self.codepoint_index_to_byte_offset(at);
        let end_byte = self.codepoint_index_to_byte_offset(at + remove_cp);
        let removed_bytes = end_byte - start_byte;
        let inserted_bytes = text.len();
        self.bytes
            .splice(start_byte, removed_bytes, text.as_bytes(), 1);
        let inserted_cp = text.chars().count();
        self.codepoint_count = self.codepoint_count - remove_cp + inserted_cp;
        // A "pure" edit is one that's purely an insertion (nothing removed)
        // or purely a deletion (nothing inserted) — those shift cleanly.
        // Anything else (an arbitrary CHANGE) invalidates instead, per
        // spec.md invariant 3.
        let pure = remove_cp == 0 || inserted_cp == 0;
        self.adjust_bookmarks_after_mutation(
            at,
            inserted_bytes as isize - removed_bytes as isize,
            inserted_cp as isize - remove_cp as isize,
            pure,
        );
        trace!(at, remove_cp, inserted_cp, "strand change");
        Ok(())
    }

    pub fn insert(&mut self, at: usize, text: &str) -> Result<(), FlexError> {
        self.change(at, 0, text)
    }

    pub fn remove(&mut self, at: usize, count_cp: usize) -> Result<(), FlexError> {
        self.change(at, count_cp, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> StubPool {
        StubPool::new()
    }

    #[test]
    fn ascii_roundtrip() {
        let mut p = pool();
        let s = Strand::from_str(&mut p, "hello").unwrap();
        assert_eq!(s.as_str(), "hello");
        assert_eq!(s.codepoint_len(), 5);
    }

    #[test]
    fn multibyte_codepoint_count() {
        let mut p = pool();
        let s = Strand::from_str(&mut p, "a\u{00e9}b\u{1F600}").unwrap();
        // a, e-acute, b, emoji = 4 codepoints even though byte length is larger.
        assert_eq!(s.codepoint_len(), 4);
    }

    #[test]
    fn change_updates_codepoint_count_and_bytes() {
        let mut p = pool();
        let mut s = Strand::from_str(&mut p, "abcdef").unwrap();
        s.change(0, 3, "XYZ").unwrap();
        assert_eq!(s.as_str(), "XYZdef");
    }

    #[test]
    fn change_with_shorter_replacement() {
        let mut p = pool();
        let mut s = Strand::from_str(&mut p, "abcdef").unwrap();
        s.change(0, 2, "XY").unwrap();
        assert_eq!(s.as_str(), "XYcdef");
    }

    #[test]
    fn rejects_zero_byte() {
        let mut p = pool();
        let mut s = Strand::from_str(&mut p, "abc").unwrap();
        let err = s.change(0, 0, "\0").unwrap_err();
        assert_eq!(err, FlexError::IllegalZeroByte);
    }

    #[test]
    fn codepoint_index_to_byte_offset_handles_multibyte() {
        let mut p = pool();
        let mut s = Strand::from_str(&mut p, "a\u{00e9}bcdefghijklmno").unwrap();
        // 'a' (1 byte) + 'e-acute' (2 bytes) -> index 2 should land at byte 3.
        assert_eq!(s.codepoint_index_to_byte_offset(2), 3);
    }
}
