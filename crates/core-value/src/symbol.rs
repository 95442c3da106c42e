//! Symbol interning & synonyms (spec.md §4.D).
//!
//! Grounded on `core-model`'s small tagged-aggregate style and, for the
//! synonym-chain shape specifically, the "first case-insensitive synonym
//! wins, else panic on conflicting spellings" policy spec.md §4.K describes
//! for maps — the same table backs both word lookup and map key lookup.

use std::collections::HashMap;

use ahash::RandomState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Canonical symbol table for one `RuntimeContext`. Not a process-wide
/// singleton (spec.md §9 "Global state") — each interpreter instance owns
/// one.
///
/// `intern` runs on every word the scanner produces, so both maps use
/// `ahash` (the same hasher `core-map` reaches for on its hot hashlist
/// path) instead of the default SipHash.
#[derive(Debug, Default)]
pub struct SymbolTable {
    canonical: Vec<String>,
    /// Every spelling (case included) seen, mapping to its canonical id.
    /// Two spellings that differ only in case share a canonical id (they
    /// are synonyms); two spellings that are NOT simple case variants of
    /// the registered spelling but collide under folding are a conflict the
    /// caller must detect before inserting (mirrors spec.md §4.K's
    /// "conflicting-key" policy, reused here for word interning).
    by_spelling: HashMap<String, SymbolId, RandomState>,
    by_fold: HashMap<String, (SymbolId, String), RandomState>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `spelling`, returning its canonical id. If `spelling` is a
    /// pure-case variant of an already-interned spelling, the existing id
    /// is returned (they are synonyms sharing one canonical symbol). If the
    /// casefold matches an existing entry whose exact spelling differs in
    /// more than case alone is not distinguishable at the string level, so
    /// this simply treats "same casefold" as "is a synonym" — the
    /// `conflicting-key` case is reserved for `core-map`, whose hashlist can
    /// observe two *distinct already-interned* symbols colliding.
    pub fn intern(&mut self, spelling: &str) -> SymbolId {
        if let Some(id) = self.by_spelling.get(spelling) {
            return *id;
        }
        let folded = spelling.to_lowercase();
        if let Some((id, _canonical)) = self.by_fold.get(&folded) {
            let id = *id;
            self.by_spelling.insert(spelling.to_string(), id);
            return id;
        }
        let id = SymbolId(self.canonical.len() as u32);
        self.canonical.push(spelling.to_string());
        self.by_spelling.insert(spelling.to_string(), id);
        self.by_fold.insert(folded, (id, spelling.to_string()));
        id
    }

    pub fn spelling(&self, id: SymbolId) -> &str {
        &self.canonical[id.0 as usize]
    }

    pub fn is_synonym(&self, a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut table = SymbolTable::new();
        let a = table.intern("foo");
        let b = table.intern("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn case_variants_share_canonical_id() {
        let mut table = SymbolTable::new();
        let a = table.intern("Foo");
        let b = table.intern("foo");
        assert_eq!(a, b);
        assert_eq!(table.spelling(a), "Foo");
    }

    #[test]
    fn distinct_spellings_get_distinct_ids() {
        let mut table = SymbolTable::new();
        let a = table.intern("foo");
        let b = table.intern("bar");
        assert_ne!(a, b);
    }
}
