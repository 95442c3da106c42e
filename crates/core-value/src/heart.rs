//! `Heart`: the primordial datatype of a cell, independent of its quoting/
//! antiform rung (spec.md §3/§4.C). `Type_Of` — the kind a value presents
//! to user code — combines `Heart` with `LiftByte`; that combination lives
//! on [`crate::Cell::type_of`].

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heart {
    Integer,
    Decimal,
    Blob,
    Strand,
    Word,
    SetWord,
    GetWord,
    MetaWord,
    TieWord,
    PinnedWord,
    Block,
    Group,
    Path,
    Tuple,
    Chain,
    Fence,
    Map,
    Action,
    Frame,
    Error,
    /// The `~` primordial type; its antiform is `TRASH!`.
    Trash,
    /// The `,` primordial type; its antiform is `GHOST!`.
    Comma,
    Pairing,
    Parameter,
    Handle,
    VarList,
}

impl Heart {
    pub fn is_any_list(self) -> bool {
        matches!(self, Heart::Block | Heart::Group | Heart::Fence)
    }

    pub fn is_any_sequence(self) -> bool {
        matches!(self, Heart::Path | Heart::Tuple | Heart::Chain)
    }

    pub fn is_any_word(self) -> bool {
        matches!(
            self,
            Heart::Word
                | Heart::SetWord
                | Heart::GetWord
                | Heart::MetaWord
                | Heart::TieWord
                | Heart::PinnedWord
        )
    }

    pub fn is_any_utf8(self) -> bool {
        self.is_any_word() || matches!(self, Heart::Strand)
    }

    pub fn is_any_number(self) -> bool {
        matches!(self, Heart::Integer | Heart::Decimal)
    }

    pub fn is_any_series(self) -> bool {
        self.is_any_list()
            || self.is_any_sequence()
            || matches!(
                self,
                Heart::Blob | Heart::Strand | Heart::Map | Heart::VarList
            )
    }

    /// A stable-only name used in `bad-make` / mold error text. Not a
    /// user-facing datatype name registry (that belongs to the molder).
    pub fn debug_name(self) -> &'static str {
        match self {
            Heart::Integer => "integer!",
            Heart::Decimal => "decimal!",
            Heart::Blob => "blob!",
            Heart::Strand => "string!",
            Heart::Word => "word!",
            Heart::SetWord => "set-word!",
            Heart::GetWord => "get-word!",
            Heart::MetaWord => "meta-word!",
            Heart::TieWord => "tie-word!",
            Heart::PinnedWord => "pinned-word!",
            Heart::Block => "block!",
            Heart::Group => "group!",
            Heart::Path => "path!",
            Heart::Tuple => "tuple!",
            Heart::Chain => "chain!",
            Heart::Fence => "fence!",
            Heart::Map => "map!",
            Heart::Action => "action!",
            Heart::Frame => "frame!",
            Heart::Error => "error!",
            Heart::Trash => "trash!",
            Heart::Comma => "comma!",
            Heart::Pairing => "pairing!",
            Heart::Parameter => "parameter!",
            Heart::Handle => "handle!",
            Heart::VarList => "varlist!",
        }
    }
}
