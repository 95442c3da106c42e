//! `ParamList`: the typed parameter description attached to every action
//! (spec.md §3 "ParamList").

use core_value::{Heart, SymbolId};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u16 {
        const REFINEMENT = 1 << 0;
        const ENDABLE    = 1 << 1;
        const SKIPPABLE  = 1 << 2;
        const CONST      = 1 << 3;
        const NULL_OK    = 1 << 4;
        const VOID_OK    = 1 << 5;
        const NIHIL_OK   = 1 << 6;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamClass {
    Normal,
    Meta,
    HardQuote,
    SoftQuote,
    TheQuote,
    Variadic,
    Return,
}

/// `None` means "no type restriction" (spec.md's typeset degenerates to
/// "any" when a parameter spec carries no type block).
#[derive(Debug, Clone)]
pub struct TypeSet(pub Option<Vec<Heart>>);

impl TypeSet {
    pub fn any() -> Self {
        Self(None)
    }

    pub fn of(hearts: Vec<Heart>) -> Self {
        Self(Some(hearts))
    }

    pub fn accepts(&self, heart: Heart) -> bool {
        match &self.0 {
            None => true,
            Some(set) => set.contains(&heart),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: SymbolId,
    pub class: ParamClass,
    pub flags: ParamFlags,
    pub typeset: TypeSet,
}

impl Param {
    pub fn normal(name: SymbolId) -> Self {
        Self {
            name,
            class: ParamClass::Normal,
            flags: ParamFlags::empty(),
            typeset: TypeSet::any(),
        }
    }

    pub fn refinement(name: SymbolId) -> Self {
        Self {
            name,
            class: ParamClass::Normal,
            flags: ParamFlags::REFINEMENT,
            typeset: TypeSet::any(),
        }
    }

    pub fn is_refinement(&self) -> bool {
        self.flags.contains(ParamFlags::REFINEMENT)
    }
}

/// Parameter description for one action; shared between related actions
/// (adapt, enclose, specialize) when the spec calls for it — sharing is
/// expressed here simply by cloning an `Rc`-free `ParamList`, since the
/// description itself is immutable once built.
#[derive(Debug, Clone, Default)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    pub fn new(params: Vec<Param>) -> Self {
        Self { params }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, index: usize) -> &Param {
        &self.params[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    pub fn position_of(&self, sym: SymbolId) -> Option<usize> {
        self.params.iter().position(|p| p.name == sym)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(id: u32) -> SymbolId {
        SymbolId(id)
    }

    #[test]
    fn typeset_any_accepts_everything() {
        assert!(TypeSet::any().accepts(Heart::Integer));
    }

    #[test]
    fn typeset_of_rejects_non_members() {
        let ts = TypeSet::of(vec![Heart::Integer]);
        assert!(ts.accepts(Heart::Integer));
        assert!(!ts.accepts(Heart::Decimal));
    }

    #[test]
    fn position_of_finds_named_param() {
        let list = ParamList::new(vec![Param::normal(sym(1)), Param::refinement(sym(2))]);
        assert_eq!(list.position_of(sym(2)), Some(1));
        assert!(list.get(1).is_refinement());
    }
}
