//! A placeholder lexical scanner (spec.md §1 "a lexical scanner ... is an
//! external collaborator ... out of scope for this crate", §8 "a host may
//! still need a minimal one to drive the corpus below"). This is that
//! minimal scanner: enough to turn the bracket/string/number/word source
//! text used by spec.md §8's examples into [`core_value::Cell`]s, nothing
//! more — no refinements-in-source-text, no path/tuple literals, no
//! radix/char/binary literal forms. A real scanner belongs to a
//! self-hosted "mezzanine" layer this repository doesn't build.
//!
//! Grounded on `core-action`'s own `Source`/`ArrayStore` plumbing: scanning
//! just builds the same `Vec<Cell>` a host would otherwise construct by
//! hand in a test, the same way `core_action`'s unit tests do.

use core_action::Engine;
use core_flex::strand::Strand;
use core_value::{Cell, Source, SymbolTable};
use core_stub::StubId;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block: missing closing ']'")]
    UnterminatedBlock,
    #[error("unterminated group: missing closing ')'")]
    UnterminatedGroup,
    #[error("unexpected ']'")]
    UnexpectedBlockClose,
    #[error("unexpected ')'")]
    UnexpectedGroupClose,
    #[error("string literal contains an illegal NUL byte")]
    IllegalZeroByte,
    #[error("malformed token: {0:?}")]
    MalformedToken(String),
}

/// One raw character-level token, not yet turned into a `Cell` — brackets
/// are structural and never reach [`classify`].
enum Lexeme {
    BlockOpen,
    BlockClose,
    GroupOpen,
    GroupClose,
    String(String),
    Word(String),
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self { chars: text.chars().peekable() }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
                self.chars.next();
            }
            if self.chars.peek() == Some(&';') {
                while let Some(c) = self.chars.next() {
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }
            break;
        }
    }

    fn next_lexeme(&mut self) -> Result<Option<Lexeme>, ScanError> {
        self.skip_whitespace_and_comments();
        let Some(&c) = self.chars.peek() else {
            return Ok(None);
        };
        match c {
            '[' => {
                self.chars.next();
                Ok(Some(Lexeme::BlockOpen))
            }
            ']' => {
                self.chars.next();
                Ok(Some(Lexeme::BlockClose))
            }
            '(' => {
                self.chars.next();
                Ok(Some(Lexeme::GroupOpen))
            }
            ')' => {
                self.chars.next();
                Ok(Some(Lexeme::GroupClose))
            }
            '"' => {
                self.chars.next();
                let mut s = String::new();
                loop {
                    match self.chars.next() {
                        None => return Err(ScanError::UnterminatedString),
                        Some('"') => break,
                        Some('\\') => match self.chars.next() {
                            Some('n') => s.push('\n'),
                            Some('t') => s.push('\t'),
                            Some('"') => s.push('"'),
                            Some('\\') => s.push('\\'),
                            Some(other) => s.push(other),
                            None => return Err(ScanError::UnterminatedString),
                        },
                        Some(other) => s.push(other),
                    }
                }
                Ok(Some(Lexeme::String(s)))
            }
            _ => {
                let mut tok = String::new();
                while let Some(&c) = self.chars.peek() {
                    if c.is_whitespace() || matches!(c, '[' | ']' | '(' | ')' | '"') {
                        break;
                    }
                    tok.push(c);
                    self.chars.next();
                }
                Ok(Some(Lexeme::Word(tok)))
            }
        }
    }
}

/// Turn a plain word token into its `Cell` form, folding in set-word/
/// get-word/meta-word/trash/number recognition (spec.md §3 "Word forms").
fn classify(engine: &mut Engine, symbols: &mut SymbolTable, tok: &str) -> Result<Cell, ScanError> {
    if tok == "~" {
        return Ok(Cell::trash());
    }
    if let Some(name) = tok.strip_suffix(':') {
        if name.is_empty() || name.contains(':') {
            return Err(ScanError::MalformedToken(tok.to_string()));
        }
        return Ok(Cell::set_word(symbols.intern(name)));
    }
    if let Some(name) = tok.strip_prefix(':') {
        if name.is_empty() {
            return Err(ScanError::MalformedToken(tok.to_string()));
        }
        return Ok(Cell::get_word(symbols.intern(name)));
    }
    if let Some(name) = tok.strip_prefix('^') {
        if name.is_empty() {
            return Err(ScanError::MalformedToken(tok.to_string()));
        }
        return Ok(Cell::meta_word(symbols.intern(name)));
    }
    if let Ok(n) = tok.parse::<i64>() {
        return Ok(Cell::integer(n));
    }
    if tok.contains('.') && tok.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-') {
        if let Ok(f) = tok.parse::<f64>() {
            return Ok(Cell::decimal(f));
        }
    }
    let _ = engine;
    Ok(Cell::word(symbols.intern(tok)))
}

fn string_cell(engine: &mut Engine, s: &str) -> Result<Cell, ScanError> {
    let strand = Strand::from_str(&mut engine.pool, s).map_err(|_| ScanError::IllegalZeroByte)?;
    let id = engine.strands.insert(strand);
    Ok(Cell::strand(id))
}

/// Scan the top level of `text` into a freshly-allocated array, returning
/// its [`StubId`] (suitable for `Feed::from_array`).
pub fn scan(engine: &mut Engine, symbols: &mut SymbolTable, text: &str) -> Result<StubId, ScanError> {
    let mut lexer = Lexer::new(text);
    let cells = scan_cells(engine, symbols, &mut lexer, None)?;
    let source = Source::from_cells(&mut engine.pool, cells);
    Ok(engine.arrays.insert(source))
}

/// `closing`, when set, is the bracket kind this nesting level must end on
/// (`']'` or `')'`); `None` means top level, where running out of input is
/// success and a stray close bracket is an error.
fn scan_cells(
    engine: &mut Engine,
    symbols: &mut SymbolTable,
    lexer: &mut Lexer,
    closing: Option<char>,
) -> Result<Vec<Cell>, ScanError> {
    let mut cells = Vec::new();
    loop {
        match lexer.next_lexeme()? {
            None => {
                return match closing {
                    None => Ok(cells),
                    Some(']') => Err(ScanError::UnterminatedBlock),
                    Some(')') => Err(ScanError::UnterminatedGroup),
                    Some(_) => unreachable!(),
                };
            }
            Some(Lexeme::BlockClose) => {
                return match closing {
                    Some(']') => Ok(cells),
                    _ => Err(ScanError::UnexpectedBlockClose),
                };
            }
            Some(Lexeme::GroupClose) => {
                return match closing {
                    Some(')') => Ok(cells),
                    _ => Err(ScanError::UnexpectedGroupClose),
                };
            }
            Some(Lexeme::BlockOpen) => {
                let inner = scan_cells(engine, symbols, lexer, Some(']'))?;
                let source = Source::from_cells(&mut engine.pool, inner);
                let id = engine.arrays.insert(source);
                cells.push(Cell::block(id));
            }
            Some(Lexeme::GroupOpen) => {
                let inner = scan_cells(engine, symbols, lexer, Some(')'))?;
                let source = Source::from_cells(&mut engine.pool, inner);
                let id = engine.arrays.insert(source);
                cells.push(Cell::group(id));
            }
            Some(Lexeme::String(s)) => cells.push(string_cell(engine, &s)?),
            Some(Lexeme::Word(tok)) => cells.push(classify(engine, symbols, &tok)?),
        }
    }
}
