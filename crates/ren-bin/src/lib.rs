//! Library half of the `ren` CLI host (spec.md §6 "To hosts"): the
//! placeholder scanner, the built-in natives environment, the `rebValue`/
//! `rebDid`-equivalent embedding surface, and `ren.toml` config loading.
//! `src/main.rs` is a thin binary wrapper around these modules, mirroring
//! how `ox-bin::main` is itself mostly glue around library crates — the
//! difference here is that the glue is novel enough (a scanner, a host
//! API) to deserve its own library target instead of living only in the
//! binary.

pub mod config;
pub mod host;
pub mod natives;
pub mod scan;
