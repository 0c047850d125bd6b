//! Loading persisted grammar tables.
//!
//! Tables are produced by an external grammar compiler and stored as JSON or
//! YAML. Everything the parser engine relies on is checked here, once, so the
//! engine itself never re-validates.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Dfa, DfaState, Edge, Grammar, GrammarError, Label, LabelId};
use crate::syntax::token::{Symbol, NT_OFFSET};

/// Spelling of label 0 in persisted tables.
const EMPTY_TEXT: &str = "EMPTY";

/// The persisted shape of a grammar table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGrammar {
    pub start: u16,
    /// Nonterminal name → symbol id.
    #[serde(default)]
    pub symbols: BTreeMap<String, u16>,
    /// Names for grammar-specific token types.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub token_names: BTreeMap<u16, String>,
    /// `(type, text)` pairs; index 0 must be `(0, "EMPTY")`.
    pub labels: Vec<(u16, Option<String>)>,
    pub dfas: BTreeMap<u16, RawDfa>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<BTreeMap<String, u16>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<BTreeMap<u16, u16>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDfa {
    /// Each state is a list of `(label, next state)` arcs.
    pub states: Vec<Vec<(u16, usize)>>,
    pub first: Vec<u16>,
}

impl Grammar {
    /// Loads a table from disk, choosing the decoder by file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Grammar, GrammarError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GrammarError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let grammar = match extension {
            "json" => Self::from_json_str(&text)?,
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            _ => {
                return Err(GrammarError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };
        tracing::debug!(
            path = %path.display(),
            symbols = grammar.dfas.len(),
            labels = grammar.labels.len(),
            "loaded grammar table"
        );
        Ok(grammar)
    }

    pub fn from_json_str(text: &str) -> Result<Grammar, GrammarError> {
        let raw: RawGrammar = serde_json::from_str(text)?;
        Self::from_raw(raw)
    }

    pub fn from_yaml_str(text: &str) -> Result<Grammar, GrammarError> {
        let raw: RawGrammar = serde_yaml::from_str(text)?;
        Self::from_raw(raw)
    }

    /// Validates a raw table and builds the lookup structures.
    pub fn from_raw(raw: RawGrammar) -> Result<Grammar, GrammarError> {
        let labels = convert_labels(&raw.labels)?;
        let names = invert_symbols(&raw.symbols)?;

        let mut dfas = Vec::with_capacity(raw.dfas.len());
        for (offset, (&id, raw_dfa)) in raw.dfas.iter().enumerate() {
            let expected = NT_OFFSET as usize + offset;
            if usize::from(id) != expected {
                return Err(GrammarError::invalid(format!(
                    "nonterminal ids must be dense from {NT_OFFSET}; found {id} where {expected} was expected"
                )));
            }
            let symbol = Symbol(id);
            let name = names.get(&symbol).cloned().ok_or_else(|| {
                GrammarError::invalid(format!("nonterminal {id} has no entry in 'symbols'"))
            })?;
            dfas.push(convert_dfa(symbol, name, raw_dfa, &labels)?);
        }

        for (index, label) in labels.iter().enumerate() {
            if let Label::Nonterminal(symbol) = label {
                let known = symbol
                    .nonterminal_index()
                    .is_some_and(|i| i < dfas.len());
                if !known {
                    return Err(GrammarError::invalid(format!(
                        "label {index} refers to nonterminal {} which has no DFA",
                        symbol.0
                    )));
                }
            }
        }

        check_first_sets(&dfas, &labels)?;

        let start = Symbol(raw.start);
        if !start
            .nonterminal_index()
            .is_some_and(|i| i < dfas.len())
        {
            return Err(GrammarError::invalid(format!(
                "start symbol {} has no DFA",
                raw.start
            )));
        }
        if let Some(symbol) = names
            .keys()
            .find(|s| s.nonterminal_index().map_or(true, |i| i >= dfas.len()))
        {
            return Err(GrammarError::invalid(format!(
                "symbol '{}' ({}) has no DFA",
                names[symbol], symbol.0
            )));
        }

        let keywords = match &raw.keywords {
            Some(table) => check_keywords(table, &labels)?,
            None => derive_keywords(&labels)?,
        };
        let tokens = match &raw.tokens {
            Some(table) => check_tokens(table, &labels)?,
            None => derive_tokens(&labels),
        };

        let token_names = raw
            .token_names
            .iter()
            .map(|(&kind, name)| (Symbol(kind), name.clone()))
            .collect();
        let symbol2number = names.into_iter().map(|(symbol, name)| (name, symbol)).collect();

        Ok(Grammar {
            start,
            dfas,
            labels,
            keywords,
            tokens,
            symbol2number,
            token_names,
        })
    }
}

fn convert_labels(raw: &[(u16, Option<String>)]) -> Result<Vec<Label>, GrammarError> {
    match raw.first() {
        Some((0, Some(text))) if text == EMPTY_TEXT => {}
        _ => {
            return Err(GrammarError::invalid(format!(
                "label 0 must be (0, \"{EMPTY_TEXT}\")"
            )))
        }
    }
    let mut labels = Vec::with_capacity(raw.len());
    labels.push(Label::Empty);
    for (index, (kind, text)) in raw.iter().enumerate().skip(1) {
        let kind = Symbol(*kind);
        let label = if kind.is_terminal() {
            Label::Terminal {
                kind,
                text: text.clone(),
            }
        } else if text.is_none() {
            Label::Nonterminal(kind)
        } else {
            return Err(GrammarError::invalid(format!(
                "label {index} names nonterminal {} but carries text",
                kind.0
            )));
        };
        labels.push(label);
    }
    Ok(labels)
}

fn invert_symbols(symbols: &BTreeMap<String, u16>) -> Result<HashMap<Symbol, String>, GrammarError> {
    let mut names = HashMap::with_capacity(symbols.len());
    for (name, &id) in symbols {
        let symbol = Symbol(id);
        if symbol.is_terminal() {
            return Err(GrammarError::invalid(format!(
                "symbol '{name}' has terminal id {id}"
            )));
        }
        if let Some(other) = names.insert(symbol, name.clone()) {
            return Err(GrammarError::invalid(format!(
                "symbols '{other}' and '{name}' share id {id}"
            )));
        }
    }
    Ok(names)
}

fn convert_dfa(
    symbol: Symbol,
    name: String,
    raw: &RawDfa,
    labels: &[Label],
) -> Result<Dfa, GrammarError> {
    if raw.states.is_empty() {
        return Err(GrammarError::invalid(format!("DFA '{name}' has no states")));
    }
    let mut states = Vec::with_capacity(raw.states.len());
    for (index, arcs) in raw.states.iter().enumerate() {
        let mut edges = Vec::with_capacity(arcs.len());
        for &(label, next) in arcs {
            let id = LabelId(label);
            if id.index() >= labels.len() {
                return Err(GrammarError::invalid(format!(
                    "DFA '{name}' state {index} uses unknown label {label}"
                )));
            }
            if next >= raw.states.len() {
                return Err(GrammarError::invalid(format!(
                    "DFA '{name}' state {index} jumps to missing state {next}"
                )));
            }
            if id == LabelId::EMPTY && next != index {
                return Err(GrammarError::invalid(format!(
                    "DFA '{name}' state {index} has an EMPTY arc that is not a self-loop"
                )));
            }
            edges.push(Edge { label: id, next });
        }
        states.push(DfaState::new(index, edges));
    }

    let mut first = Vec::with_capacity(raw.first.len());
    for &label in &raw.first {
        match labels.get(usize::from(label)) {
            Some(Label::Terminal { .. }) => first.push(LabelId(label)),
            _ => {
                return Err(GrammarError::invalid(format!(
                    "FIRST set of '{name}' contains {label}, which is not a terminal label"
                )))
            }
        }
    }
    Ok(Dfa::new(symbol, name, states, first))
}

/// Every FIRST label must start an arc of state 0, either directly or
/// through the FIRST set of a nonterminal the arc descends into.
fn check_first_sets(dfas: &[Dfa], labels: &[Label]) -> Result<(), GrammarError> {
    for dfa in dfas {
        let Some(initial) = dfa.state(0) else {
            continue;
        };
        for &label in dfa.first() {
            let reachable = initial.edges().iter().any(|edge| {
                edge.label == label
                    || match labels.get(edge.label.index()) {
                        Some(Label::Nonterminal(symbol)) => symbol
                            .nonterminal_index()
                            .and_then(|i| dfas.get(i))
                            .is_some_and(|child| child.starts_with(label)),
                        _ => false,
                    }
            });
            if !reachable {
                return Err(GrammarError::invalid(format!(
                    "FIRST set of '{}' contains label {}, which no arc of its initial state accepts",
                    dfa.name(),
                    label.0
                )));
            }
        }
    }
    Ok(())
}

fn check_keywords(
    table: &BTreeMap<String, u16>,
    labels: &[Label],
) -> Result<HashMap<String, LabelId>, GrammarError> {
    let mut keywords = HashMap::with_capacity(table.len());
    for (text, &label) in table {
        match labels.get(usize::from(label)) {
            Some(Label::Terminal {
                text: Some(spelling),
                ..
            }) if spelling == text => {
                keywords.insert(text.clone(), LabelId(label));
            }
            _ => {
                return Err(GrammarError::invalid(format!(
                    "keyword '{text}' points at label {label}, which does not spell it"
                )))
            }
        }
    }
    Ok(keywords)
}

fn derive_keywords(labels: &[Label]) -> Result<HashMap<String, LabelId>, GrammarError> {
    let mut keywords = HashMap::new();
    for (index, label) in labels.iter().enumerate() {
        if let Label::Terminal {
            text: Some(text), ..
        } = label
        {
            let id = label_id(index)?;
            if keywords.insert(text.clone(), id).is_some() {
                return Err(GrammarError::invalid(format!(
                    "keyword '{text}' is spelled by more than one label"
                )));
            }
        }
    }
    Ok(keywords)
}

fn check_tokens(
    table: &BTreeMap<u16, u16>,
    labels: &[Label],
) -> Result<HashMap<Symbol, LabelId>, GrammarError> {
    let mut tokens = HashMap::with_capacity(table.len());
    for (&kind, &label) in table {
        match labels.get(usize::from(label)) {
            Some(Label::Terminal { kind: k, text: None }) if k.0 == kind => {
                tokens.insert(Symbol(kind), LabelId(label));
            }
            _ => {
                return Err(GrammarError::invalid(format!(
                    "token type {kind} points at label {label}, which is not its bare terminal"
                )))
            }
        }
    }
    Ok(tokens)
}

fn derive_tokens(labels: &[Label]) -> HashMap<Symbol, LabelId> {
    let mut tokens = HashMap::new();
    for (index, label) in labels.iter().enumerate() {
        if let (Label::Terminal { kind, text: None }, Ok(id)) = (label, label_id(index)) {
            tokens.entry(*kind).or_insert(id);
        }
    }
    tokens
}

fn label_id(index: usize) -> Result<LabelId, GrammarError> {
    u16::try_from(index)
        .map(LabelId)
        .map_err(|_| GrammarError::invalid("too many labels"))
}
