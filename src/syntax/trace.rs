//! Observing the parser engine.
//!
//! The engine never logs on its own. Callers that want to watch the automaton
//! pass a [`TraceSink`] and receive one [`ParseEvent`] per transition, in the
//! order the transitions are applied.

use crate::grammar::{Grammar, LabelId};
use crate::syntax::token::{Position, Symbol};

/// One transition of the pushdown automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent<'a> {
    /// A token was classified and is about to be consumed.
    Token {
        kind: Symbol,
        value: &'a str,
        label: LabelId,
        start: Position,
    },
    /// A leaf was appended to `symbol`'s node, which moved to `state`.
    Shift {
        symbol: Symbol,
        kind: Symbol,
        value: &'a str,
        state: usize,
    },
    /// `parent` descended into `child`; the parent resumes at `resume`.
    Push {
        parent: Symbol,
        child: Symbol,
        resume: usize,
    },
    /// `symbol` completed and was attached to its parent.
    Pop { symbol: Symbol },
    /// The start symbol completed; the parse is done.
    Accept { symbol: Symbol },
}

impl ParseEvent<'_> {
    /// Renders the event with the grammar's names.
    pub fn describe(&self, grammar: &Grammar) -> String {
        let g = grammar;
        match self {
            ParseEvent::Token {
                kind,
                value,
                label,
                start,
            } => format!(
                "token {} {:?} as {} at {}",
                g.symbol_name(*kind),
                value,
                g.describe_label(*label),
                start
            ),
            ParseEvent::Shift {
                symbol,
                kind,
                value,
                state,
            } => format!(
                "shift {} {:?} in {} -> {}",
                g.symbol_name(*kind),
                value,
                g.symbol_name(*symbol),
                state
            ),
            ParseEvent::Push {
                parent,
                child,
                resume,
            } => format!(
                "push {} from {} (resume {})",
                g.symbol_name(*child),
                g.symbol_name(*parent),
                resume
            ),
            ParseEvent::Pop { symbol } => format!("pop {}", g.symbol_name(*symbol)),
            ParseEvent::Accept { symbol } => format!("accept {}", g.symbol_name(*symbol)),
        }
    }
}

/// Receives parser transitions.
pub trait TraceSink {
    fn event(&mut self, grammar: &Grammar, event: &ParseEvent<'_>);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn event(&mut self, _grammar: &Grammar, _event: &ParseEvent<'_>) {}
}

/// Collects rendered events, one line each.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub lines: Vec<String>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> String {
        self.lines.join("\n")
    }

    /// Number of recorded lines starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.lines.iter().filter(|l| l.starts_with(prefix)).count()
    }
}

impl TraceSink for EventLog {
    fn event(&mut self, grammar: &Grammar, event: &ParseEvent<'_>) {
        self.lines.push(event.describe(grammar));
    }
}

/// Forwards events to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn event(&mut self, grammar: &Grammar, event: &ParseEvent<'_>) {
        tracing::debug!(target: "pushdown::parser", "{}", event.describe(grammar));
    }
}
