//! Token and symbol identifiers shared by the tokenizer, the grammar table and the tree.
//!
//! Terminals and nonterminals live in one numeric space: ids below
//! [`NT_OFFSET`] are token types, ids at or above it are grammar symbols.

use serde::{Deserialize, Serialize};
use std::fmt;

/// First id reserved for nonterminal symbols.
pub const NT_OFFSET: u16 = 256;

/// A terminal token type or a nonterminal symbol id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub u16);

impl Symbol {
    pub const fn is_terminal(self) -> bool {
        self.0 < NT_OFFSET
    }

    pub const fn is_nonterminal(self) -> bool {
        !self.is_terminal()
    }

    /// Index of this nonterminal in a dense table starting at [`NT_OFFSET`].
    pub(crate) fn nonterminal_index(self) -> Option<usize> {
        self.0.checked_sub(NT_OFFSET).map(usize::from)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match token_name(*self) {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

pub const ENDMARKER: Symbol = Symbol(0);
pub const NAME: Symbol = Symbol(1);
pub const NUMBER: Symbol = Symbol(2);
pub const STRING: Symbol = Symbol(3);
pub const CHAR: Symbol = Symbol(4);
pub const OP: Symbol = Symbol(5);
pub const ERRORTOKEN: Symbol = Symbol(6);

const TOKEN_NAMES: [&str; 7] = [
    "ENDMARKER",
    "NAME",
    "NUMBER",
    "STRING",
    "CHAR",
    "OP",
    "ERRORTOKEN",
];

/// Name of one of the tokenizer's own token categories.
pub fn token_name(kind: Symbol) -> Option<&'static str> {
    TOKEN_NAMES.get(usize::from(kind.0)).copied()
}

/// A `(line, column)` pair. Lines are one-based, columns are zero-based byte offsets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line, self.column)
    }
}

/// One lexical token as produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: Symbol,
    pub text: String,
    pub start: Position,
    pub end: Position,
    /// The full physical line the token was read from.
    pub line: String,
}

impl Token {
    pub fn new(
        kind: Symbol,
        text: impl Into<String>,
        start: Position,
        end: Position,
        line: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
            line: line.into(),
        }
    }
}

/// Where a token or node sits in the source: the text skipped before it and its start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub prefix: String,
    pub start: Position,
}

impl Context {
    pub fn new(prefix: impl Into<String>, start: Position) -> Self {
        Self {
            prefix: prefix.into(),
            start,
        }
    }

    /// A context with no prefix.
    pub fn at(start: Position) -> Self {
        Self::new(String::new(), start)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, ({}))", self.prefix, self.start)
    }
}
