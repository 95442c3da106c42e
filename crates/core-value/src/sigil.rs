/// Optional decoration on an element cell: pin (`@word`), tie (`$word`), or
/// meta (`^word`). Spec.md §3 "payload is polymorphic... sigil optional
/// (pin/tie/meta) when cell is an element".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sigil {
    Pin,
    Tie,
    Meta,
}
