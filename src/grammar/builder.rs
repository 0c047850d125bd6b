//! Assembling grammar tables in code.
//!
//! The builder only records what it is given: states, arcs and FIRST sets are
//! supplied by the caller exactly as a grammar compiler would emit them.

use super::{Grammar, GrammarError, LabelId, RawDfa, RawGrammar};
use crate::syntax::token::{Symbol, NT_OFFSET};

/// Builds a [`Grammar`] label by label and rule by rule.
///
/// ```
/// use pushdown::grammar::{GrammarBuilder, LabelId};
/// use pushdown::syntax::token::{ENDMARKER, NUMBER, OP};
///
/// let mut b = GrammarBuilder::new();
/// let expr = b.symbol("expr");
/// let number = b.token(NUMBER);
/// let plus = b.literal(OP, "+");
/// let end = b.token(ENDMARKER);
/// b.rule(
///     expr,
///     &[number],
///     vec![
///         vec![(number, 1)],
///         vec![(plus, 2), (end, 3)],
///         vec![(number, 1)],
///         vec![(LabelId::EMPTY, 3)],
///     ],
/// );
/// let grammar = b.build().unwrap();
/// assert_eq!(grammar.start(), expr);
/// ```
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    raw: RawGrammar,
    start: Option<Symbol>,
    /// Set when an id no longer fits in 16 bits; reported by `build`.
    overflow: Option<&'static str>,
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawGrammar {
                labels: vec![(0, Some("EMPTY".to_string()))],
                ..RawGrammar::default()
            },
            start: None,
            overflow: None,
        }
    }

    /// Declares a nonterminal. The first one declared is the default start symbol.
    pub fn symbol(&mut self, name: &str) -> Symbol {
        if let Some(&id) = self.raw.symbols.get(name) {
            return Symbol(id);
        }
        let id = match u16::try_from(self.raw.symbols.len())
            .ok()
            .and_then(|n| NT_OFFSET.checked_add(n))
        {
            Some(id) => id,
            None => {
                self.overflow.get_or_insert("too many nonterminals");
                return Symbol(u16::MAX);
            }
        };
        self.raw.symbols.insert(name.to_string(), id);
        let symbol = Symbol(id);
        self.start.get_or_insert(symbol);
        symbol
    }

    /// Gives a grammar-specific token type a display name.
    pub fn token_name(&mut self, kind: Symbol, name: &str) -> &mut Self {
        self.raw.token_names.insert(kind.0, name.to_string());
        self
    }

    /// The label matching any token of `kind`.
    pub fn token(&mut self, kind: Symbol) -> LabelId {
        self.label(kind.0, None)
    }

    /// The label matching exactly one spelling.
    pub fn literal(&mut self, kind: Symbol, text: &str) -> LabelId {
        self.label(kind.0, Some(text.to_string()))
    }

    /// The label an arc uses to descend into `symbol`.
    pub fn reference(&mut self, symbol: Symbol) -> LabelId {
        self.label(symbol.0, None)
    }

    /// Records the DFA for `symbol`. States are lists of `(label, next)` arcs;
    /// an accepting state carries `(LabelId::EMPTY, itself)`.
    pub fn rule(
        &mut self,
        symbol: Symbol,
        first: &[LabelId],
        states: Vec<Vec<(LabelId, usize)>>,
    ) -> &mut Self {
        let dfa = RawDfa {
            states: states
                .into_iter()
                .map(|arcs| arcs.into_iter().map(|(l, n)| (l.0, n)).collect())
                .collect(),
            first: first.iter().map(|l| l.0).collect(),
        };
        self.raw.dfas.insert(symbol.0, dfa);
        self
    }

    pub fn start(&mut self, symbol: Symbol) -> &mut Self {
        self.start = Some(symbol);
        self
    }

    /// The persisted form of what has been assembled so far.
    pub fn into_raw(mut self) -> RawGrammar {
        if let Some(start) = self.start {
            self.raw.start = start.0;
        }
        self.raw
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        if let Some(reason) = self.overflow {
            return Err(GrammarError::invalid(reason));
        }
        Grammar::from_raw(self.into_raw())
    }

    fn label(&mut self, kind: u16, text: Option<String>) -> LabelId {
        let entry = (kind, text);
        let index = match self.raw.labels.iter().position(|l| *l == entry) {
            Some(index) => index,
            None => {
                self.raw.labels.push(entry);
                self.raw.labels.len() - 1
            }
        };
        match u16::try_from(index) {
            Ok(id) => LabelId(id),
            Err(_) => {
                self.raw.labels.pop();
                self.overflow.get_or_insert("too many labels");
                LabelId::EMPTY
            }
        }
    }
}
