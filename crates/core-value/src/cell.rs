//! `Cell`: the fixed-size tagged value (spec.md §3/§4.C).

use core_stub::StubId;

use crate::error::RebolError;
use crate::heart::Heart;
use crate::lift::LiftByte;
use crate::sigil::Sigil;
use crate::symbol::SymbolId;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CellFlags: u8 {
        const CONST           = 1 << 0;
        const NEWLINE_BEFORE  = 1 << 1;
        const PROTECTED       = 1 << 2;
    }
}

/// The closed set of antiform-only "keyword" values — antiforms of the
/// four reserved words `true`/`false`/`null`/`okay`. Modeled as a dedicated
/// payload variant (rather than routing through [`SymbolId`] interning)
/// because they're a small fixed set any `Cell` can construct without
/// access to a particular `RuntimeContext`'s symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    True,
    False,
    Null,
    Okay,
}

/// Polymorphic payload. `Series(stub, index)` is the pointer-plus-index
/// form spec.md describes for series views (arrays, strands, maps,
/// varlists, ...); `Pair` is the inline two-cell form used for pairings and
/// length-2 sequences (spec.md §4.M "(b) pairing for length-2 sequences").
#[derive(Debug, Clone)]
pub enum Payload {
    None,
    Int(i64),
    Decimal(f64),
    Symbol(SymbolId),
    Keyword(Keyword),
    Series(StubId, usize),
    Pair(Box<(Cell, Cell)>),
    Error(Box<RebolError>),
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Payload::None, Payload::None) => true,
            (Payload::Int(a), Payload::Int(b)) => a == b,
            (Payload::Decimal(a), Payload::Decimal(b)) => a == b,
            (Payload::Symbol(a), Payload::Symbol(b)) => a == b,
            (Payload::Keyword(a), Payload::Keyword(b)) => a == b,
            (Payload::Series(a, i), Payload::Series(b, j)) => a == b && i == j,
            (Payload::Pair(a), Payload::Pair(b)) => a == b,
            (Payload::Error(a), Payload::Error(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub heart: Heart,
    pub lift: LiftByte,
    pub sigil: Option<Sigil>,
    pub payload: Payload,
    pub flags: CellFlags,
}

impl Cell {
    pub fn new(heart: Heart, lift: LiftByte, payload: Payload) -> Self {
        Self {
            heart,
            lift,
            sigil: None,
            payload,
            flags: CellFlags::empty(),
        }
    }

    pub fn integer(n: i64) -> Self {
        Self::new(Heart::Integer, LiftByte::Normal, Payload::Int(n))
    }

    pub fn decimal(n: f64) -> Self {
        Self::new(Heart::Decimal, LiftByte::Normal, Payload::Decimal(n))
    }

    pub fn word(sym: SymbolId) -> Self {
        Self::new(Heart::Word, LiftByte::Normal, Payload::Symbol(sym))
    }

    pub fn set_word(sym: SymbolId) -> Self {
        Self::new(Heart::SetWord, LiftByte::Normal, Payload::Symbol(sym))
    }

    pub fn get_word(sym: SymbolId) -> Self {
        Self::new(Heart::GetWord, LiftByte::Normal, Payload::Symbol(sym))
    }

    pub fn meta_word(sym: SymbolId) -> Self {
        Self::new(Heart::MetaWord, LiftByte::Normal, Payload::Symbol(sym))
    }

    pub fn block(stub: StubId) -> Self {
        Self::new(Heart::Block, LiftByte::Normal, Payload::Series(stub, 0))
    }

    pub fn block_at(stub: StubId, index: usize) -> Self {
        Self::new(Heart::Block, LiftByte::Normal, Payload::Series(stub, index))
    }

    pub fn group(stub: StubId) -> Self {
        Self::new(Heart::Group, LiftByte::Normal, Payload::Series(stub, 0))
    }

    pub fn strand(stub: StubId) -> Self {
        Self::new(Heart::Strand, LiftByte::Normal, Payload::Series(stub, 0))
    }

    /// `~` — the trash antiform. "No useful value."
    pub fn trash() -> Self {
        Self::new(Heart::Trash, LiftByte::Antiform, Payload::None)
    }

    /// Ghost: the vanishing comma antiform.
    pub fn ghost() -> Self {
        Self::new(Heart::Comma, LiftByte::Antiform, Payload::None)
    }

    /// Void: engineering simplification noted in DESIGN.md — rather than
    /// always allocating a real empty-array Stub for `~[]~`, an empty Block
    /// antiform is represented directly as `Payload::None` on `Heart::Block`.
    /// Any non-empty block antiform (a genuine splice) always carries a real
    /// `Payload::Series` and is never confused with void by heart/lift alone
    /// — callers must check `payload` before treating a Block antiform as a
    /// splice.
    pub fn void() -> Self {
        Self::new(Heart::Block, LiftByte::Antiform, Payload::None)
    }

    pub fn splice(stub: StubId) -> Self {
        Self::new(Heart::Block, LiftByte::Antiform, Payload::Series(stub, 0))
    }

    pub fn pack(stub: StubId) -> Self {
        Self::new(Heart::Block, LiftByte::Antiform, Payload::Series(stub, 0))
    }

    pub fn error(err: RebolError) -> Self {
        Self::new(Heart::Error, LiftByte::Antiform, Payload::Error(Box::new(err)))
    }

    pub fn keyword(kw: Keyword) -> Self {
        Self::new(Heart::Word, LiftByte::Antiform, Payload::Keyword(kw))
    }

    pub fn action(details_stub: StubId) -> Self {
        Self::new(Heart::Action, LiftByte::Normal, Payload::Series(details_stub, 0))
    }

    pub fn frame(varlist_stub: StubId) -> Self {
        Self::new(Heart::Frame, LiftByte::Antiform, Payload::Series(varlist_stub, 0))
    }

    pub fn quasi(&self) -> Option<Self> {
        let lift = self.lift.lift()?;
        if !self.lift.is_antiform() {
            return None;
        }
        Some(Self { lift, ..self.clone() })
    }

    pub fn is_antiform(&self) -> bool {
        self.lift.is_antiform()
    }

    pub fn is_quasi(&self) -> bool {
        self.lift.is_quasi()
    }

    pub fn is_void(&self) -> bool {
        self.heart == Heart::Block && self.is_antiform() && matches!(self.payload, Payload::None)
    }

    pub fn is_splice(&self) -> bool {
        self.heart == Heart::Block
            && self.is_antiform()
            && matches!(self.payload, Payload::Series(..))
    }

    pub fn is_pack(&self) -> bool {
        self.is_splice()
    }

    pub fn is_error(&self) -> bool {
        self.heart == Heart::Error && self.is_antiform()
    }

    pub fn as_error(&self) -> Option<&RebolError> {
        match &self.payload {
            Payload::Error(e) if self.is_error() => Some(e),
            _ => None,
        }
    }

    pub fn is_trash(&self) -> bool {
        self.heart == Heart::Trash && self.is_antiform()
    }

    pub fn is_ghost(&self) -> bool {
        self.heart == Heart::Comma && self.is_antiform()
    }

    pub fn is_action(&self) -> bool {
        self.heart == Heart::Action
    }

    /// "Unstable" antiforms (spec.md §3 invariant): pack, error, ghost may
    /// only appear in designated output positions, not in variable slots or
    /// list containers.
    pub fn is_unstable_antiform(&self) -> bool {
        self.is_antiform() && (self.is_pack() || self.is_error() || self.is_ghost())
    }

    pub fn is_stable(&self) -> bool {
        !self.is_unstable_antiform()
    }

    /// `Lift(v)`: raise one rung (spec.md §3 "Quoting & antiform ladder").
    pub fn lift_value(&self) -> Option<Self> {
        let lift = self.lift.lift()?;
        Some(Self { lift, ..self.clone() })
    }

    /// `Unlift(v)`: inverse of [`Cell::lift_value`].
    pub fn unlift_value(&self) -> Option<Self> {
        let lift = self.lift.unlift()?;
        Some(Self { lift, ..self.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lift_unlift_round_trips_a_stable_value() {
        let v = Cell::integer(42);
        let lifted = v.lift_value().unwrap();
        assert_eq!(lifted.lift, LiftByte::Quoted(1));
        let back = lifted.unlift_value().unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn lift_of_antiform_is_quasi() {
        let trash = Cell::trash();
        let quasi = trash.lift_value().unwrap();
        assert!(quasi.is_quasi());
        assert_eq!(quasi.unlift_value().unwrap(), trash);
    }

    #[test]
    fn pack_error_ghost_are_unstable_trash_is_stable() {
        assert!(Cell::error(RebolError::Done).is_unstable_antiform());
        assert!(Cell::ghost().is_unstable_antiform());
        assert!(!Cell::trash().is_unstable_antiform());
    }

    #[test]
    fn void_and_splice_are_distinguished_by_payload() {
        assert!(Cell::void().is_void());
        assert!(!Cell::void().is_splice());
    }
}
