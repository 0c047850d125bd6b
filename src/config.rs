//! Run-time configuration for parsing and batch checking.

use crate::grammar::{Dfa, Grammar, GrammarError};

/// Options for a [`Driver`](crate::driver::Driver).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseConfig {
    /// Nonterminal to parse instead of the grammar's start symbol.
    pub start: Option<String>,
}

impl ParseConfig {
    pub fn with_start(start: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
        }
    }

    /// Resolves the configured start symbol against `grammar`.
    pub(crate) fn start_dfa<'g>(&self, grammar: &'g Grammar) -> Result<Option<&'g Dfa>, GrammarError> {
        let Some(name) = &self.start else {
            return Ok(None);
        };
        grammar
            .symbol_number(name)
            .and_then(|symbol| grammar.dfa(symbol))
            .map(Some)
            .ok_or_else(|| GrammarError::UnknownSymbol { name: name.clone() })
    }
}

/// Options for checking a directory of sources.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// File extensions (without the dot) that are parsed; others are skipped.
    pub extensions: Vec<String>,
    pub use_colors: bool,
    pub parse: ParseConfig,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["txt".to_string()],
            use_colors: atty::is(atty::Stream::Stdout),
            parse: ParseConfig::default(),
        }
    }
}

impl CheckConfig {
    pub fn accepts(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}
