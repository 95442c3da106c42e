//! A minimal MOLDIFY stand-in (spec.md §6 "To the molder (consumed)"): the
//! generic "given a cell, an accumulating string buffer, append a
//! renderable textual form" contract spec.md describes, scoped down to
//! what `NativeOp::Print` and a host REPL need to show a result. A real
//! per-datatype MOLDIFY dispatch table is out of scope here (spec.md §1
//! "lexical scanner/molder beyond invariants stated below" is an explicit
//! external collaborator) — this is the placeholder spec.md §6 calls for,
//! not a claim of full coverage.

use core_value::{Cell, Heart, Payload};

use crate::engine::Engine;

/// Render `cell` as Rebol-ish source text, recursing into blocks/groups and
/// reading strand payloads back out of `engine.strands`.
pub fn mold(engine: &Engine, symbols: &core_value::SymbolTable, cell: &Cell) -> String {
    match &cell.payload {
        Payload::None if cell.is_trash() => "~".to_string(),
        Payload::None if cell.is_void() => String::new(),
        Payload::None => "none".to_string(),
        Payload::Int(n) => n.to_string(),
        Payload::Decimal(f) => f.to_string(),
        Payload::Symbol(s) => {
            let spelling = symbols.spelling(*s);
            match cell.heart {
                Heart::SetWord => format!("{spelling}:"),
                Heart::GetWord => format!(":{spelling}"),
                Heart::MetaWord => format!("^{spelling}"),
                _ => spelling.to_string(),
            }
        }
        Payload::Keyword(k) => format!("~{}~", format!("{k:?}").to_lowercase()),
        Payload::Series(stub, _) if cell.heart == Heart::Strand => match engine.strands.get(*stub) {
            Some(strand) => format!("\"{}\"", strand.as_str()),
            None => "\"\"".to_string(),
        },
        Payload::Series(stub, _) if cell.heart.is_any_list() => {
            let (open, close) = match cell.heart {
                Heart::Group => ("(", ")"),
                Heart::Fence => ("#[", "]"),
                _ => ("[", "]"),
            };
            match engine.arrays.get(*stub) {
                Some(source) => {
                    let items: Vec<String> = source.as_slice().iter().map(|c| mold(engine, symbols, c)).collect();
                    format!("{open}{}{close}", items.join(" "))
                }
                None => format!("{open}{close}"),
            }
        }
        Payload::Series(..) => format!("#[{}]", cell.heart.debug_name()),
        Payload::Pair(inner) => format!("{}x{}", mold(engine, symbols, &inner.0), mold(engine, symbols, &inner.1)),
        Payload::Error(e) => format!("~{}~", e.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_value::{Source, SymbolTable};

    #[test]
    fn molds_a_block_of_integers_with_spaces() {
        let mut engine = Engine::new();
        let symbols = SymbolTable::new();
        let source = Source::from_cells(&mut engine.pool, vec![Cell::integer(1), Cell::integer(2), Cell::integer(3)]);
        let id = engine.arrays.insert(source);
        let block = Cell::block(id);
        assert_eq!(mold(&engine, &symbols, &block), "[1 2 3]");
    }

    #[test]
    fn molds_a_strand_with_quotes() {
        let mut engine = Engine::new();
        let symbols = SymbolTable::new();
        let strand = core_flex::strand::Strand::from_str(&mut engine.pool, "hi").unwrap();
        let id = engine.strands.insert(strand);
        assert_eq!(mold(&engine, &symbols, &Cell::strand(id)), "\"hi\"");
    }

    #[test]
    fn molds_trash_as_tilde() {
        let engine = Engine::new();
        let symbols = SymbolTable::new();
        assert_eq!(mold(&engine, &symbols, &Cell::trash()), "~");
    }
}
