//! The grammar table: an immutable set of per-nonterminal DFAs plus the label,
//! keyword and token lookup tables the parser engine classifies tokens with.
//!
//! A [`Grammar`] is validated once when it is built (see [`loader`]) and is
//! never mutated afterwards, so one instance can be shared by any number of
//! concurrent parses.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::syntax::token::{token_name, Symbol, NT_OFFSET};

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::GrammarBuilder;
pub use error::GrammarError;
pub use loader::{RawDfa, RawGrammar};

/// Index into the grammar's label table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(pub u16);

impl LabelId {
    /// The reserved label carried by accepting self-loops.
    pub const EMPTY: LabelId = LabelId(0);

    pub(crate) fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an arc label stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// Label 0; marks accepting states.
    Empty,
    /// A token type, optionally restricted to one exact spelling (keywords and operators).
    Terminal { kind: Symbol, text: Option<String> },
    /// A reference to another nonterminal's DFA.
    Nonterminal(Symbol),
}

/// One arc of a DFA state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Edge {
    pub label: LabelId,
    pub next: usize,
}

#[derive(Debug, Clone)]
pub struct DfaState {
    edges: Vec<Edge>,
    accepting: bool,
    accept_only: bool,
}

impl DfaState {
    pub(crate) fn new(index: usize, edges: Vec<Edge>) -> Self {
        let is_self_loop = |e: &Edge| e.label == LabelId::EMPTY && e.next == index;
        let accepting = edges.iter().any(is_self_loop);
        let accept_only = edges.len() == 1 && accepting;
        Self {
            edges,
            accepting,
            accept_only,
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The production may end here.
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// The production has ended and nothing can extend it.
    pub fn is_accept_only(&self) -> bool {
        self.accept_only
    }
}

/// The automaton recognising one nonterminal.
#[derive(Debug, Clone)]
pub struct Dfa {
    symbol: Symbol,
    name: String,
    states: Vec<DfaState>,
    first: Vec<LabelId>,
    first_set: HashSet<LabelId>,
}

impl Dfa {
    pub(crate) fn new(symbol: Symbol, name: String, states: Vec<DfaState>, first: Vec<LabelId>) -> Self {
        let first_set = first.iter().copied().collect();
        Self {
            symbol,
            name,
            states,
            first,
            first_set,
        }
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn state(&self, index: usize) -> Option<&DfaState> {
        self.states.get(index)
    }

    /// Labels that can begin a derivation of this nonterminal, in table order.
    pub fn first(&self) -> &[LabelId] {
        &self.first
    }

    pub fn starts_with(&self, label: LabelId) -> bool {
        self.first_set.contains(&label)
    }
}

/// A validated, read-only grammar table.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) start: Symbol,
    pub(crate) dfas: Vec<Dfa>,
    pub(crate) labels: Vec<Label>,
    pub(crate) keywords: HashMap<String, LabelId>,
    pub(crate) tokens: HashMap<Symbol, LabelId>,
    pub(crate) symbol2number: HashMap<String, Symbol>,
    pub(crate) token_names: HashMap<Symbol, String>,
}

impl Grammar {
    /// The root nonterminal.
    pub fn start(&self) -> Symbol {
        self.start
    }

    /// The start symbol's DFA; its presence is checked when the table is built.
    pub(crate) fn start_dfa(&self) -> &Dfa {
        let index = usize::from(self.start.0 - NT_OFFSET);
        &self.dfas[index]
    }

    pub fn dfa(&self, symbol: Symbol) -> Option<&Dfa> {
        symbol.nonterminal_index().and_then(|i| self.dfas.get(i))
    }

    pub fn dfas(&self) -> impl Iterator<Item = &Dfa> {
        self.dfas.iter()
    }

    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.labels.get(id.index())
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn keyword(&self, text: &str) -> Option<LabelId> {
        self.keywords.get(text).copied()
    }

    pub fn token_label(&self, kind: Symbol) -> Option<LabelId> {
        self.tokens.get(&kind).copied()
    }

    /// Maps a token to its label: reserved spellings first, then the token type.
    pub fn classify(&self, kind: Symbol, text: &str) -> Option<LabelId> {
        self.keyword(text).or_else(|| self.token_label(kind))
    }

    /// The DFA an arc descends into, if its label is a nonterminal.
    pub(crate) fn descent(&self, label: LabelId) -> Option<&Dfa> {
        match self.label(label)? {
            Label::Nonterminal(symbol) => self.dfa(*symbol),
            _ => None,
        }
    }

    pub fn symbol_number(&self, name: &str) -> Option<Symbol> {
        self.symbol2number.get(name).copied()
    }

    /// Human-readable name of a token type or nonterminal.
    pub fn symbol_name(&self, symbol: Symbol) -> String {
        if let Some(dfa) = self.dfa(symbol) {
            return dfa.name.clone();
        }
        if let Some(name) = self.token_names.get(&symbol) {
            return name.clone();
        }
        match token_name(symbol) {
            Some(name) => name.to_string(),
            None => symbol.0.to_string(),
        }
    }

    /// Renders a label as it would appear in a grammar: `'print'`, `NUMBER`, `expr`.
    pub fn describe_label(&self, id: LabelId) -> String {
        match self.label(id) {
            Some(Label::Empty) => "EMPTY".to_string(),
            Some(Label::Terminal {
                text: Some(text), ..
            }) => format!("'{}'", text),
            Some(Label::Terminal { kind, text: None }) => self.symbol_name(*kind),
            Some(Label::Nonterminal(symbol)) => self.symbol_name(*symbol),
            None => format!("<label {}>", id),
        }
    }
}
