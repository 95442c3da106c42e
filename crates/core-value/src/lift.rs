//! The quoting/antiform ladder (spec.md §3 "Quoting & antiform ladder").
//!
//! Open Question resolution (see DESIGN.md): the source interpreter packs
//! quote-count and antiform/quasi markers into one `lift_byte`, described in
//! spec.md only by example (`Lift` on an antiform yields a quasiform; `Lift`
//! on anything else adds one quoting level). This crate resolves the exact
//! shape as: `Antiform` and `Quasi` are a fixed pair for a value (lifting
//! one yields the other and nothing else), while `Normal`/`Quoted(n)` form a
//! separate, ordinary quote-count chain. This keeps `Unlift(Lift(v)) == v`
//! for every stable `v` (spec.md §8 invariant 1) without inventing an
//! arbitrary interleaving between the two chains that the prose doesn't
//! pin down.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiftByte {
    /// One and only one level of antiform; never itself quoted.
    Antiform,
    /// Plain, zero-quotes value.
    Normal,
    /// `~x~` syntax; evaluates to `Antiform` of the same heart/payload.
    Quasi,
    /// Quoted `n` times, `n >= 1`.
    Quoted(u32),
}

impl Default for LiftByte {
    fn default() -> Self {
        LiftByte::Normal
    }
}

impl LiftByte {
    pub fn is_antiform(self) -> bool {
        matches!(self, LiftByte::Antiform)
    }

    pub fn is_quasi(self) -> bool {
        matches!(self, LiftByte::Quasi)
    }

    pub fn is_quoted(self) -> bool {
        matches!(self, LiftByte::Quoted(_))
    }

    pub fn quote_count(self) -> u32 {
        match self {
            LiftByte::Quoted(n) => n,
            _ => 0,
        }
    }

    /// Raise one rung: `Antiform -> Quasi`, `Normal -> Quoted(1)`,
    /// `Quoted(n) -> Quoted(n+1)`. `Quasi` has no further rung (quasiforms
    /// are never themselves quoted) and returns `None`.
    pub fn lift(self) -> Option<LiftByte> {
        match self {
            LiftByte::Antiform => Some(LiftByte::Quasi),
            LiftByte::Quasi => None,
            LiftByte::Normal => Some(LiftByte::Quoted(1)),
            LiftByte::Quoted(n) => Some(LiftByte::Quoted(n + 1)),
        }
    }

    /// Inverse of [`lift`]. `Quasi -> Antiform`, `Quoted(1) -> Normal`,
    /// `Quoted(n) -> Quoted(n-1)` for `n > 1`. `Antiform` and `Normal` are
    /// the floor of their respective chains and return `None`.
    pub fn unlift(self) -> Option<LiftByte> {
        match self {
            LiftByte::Quasi => Some(LiftByte::Antiform),
            LiftByte::Antiform => None,
            LiftByte::Normal => None,
            LiftByte::Quoted(1) => Some(LiftByte::Normal),
            LiftByte::Quoted(n) => Some(LiftByte::Quoted(n - 1)),
        }
    }
}
