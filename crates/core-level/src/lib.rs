//! Call frames and the Feed input abstraction (spec.md §4.F).

pub mod feed;
pub mod level;

pub use feed::{ArrayStore, Feed};
pub use level::{ExecutorKind, Level, LevelFlags, LevelId, LevelStack};
