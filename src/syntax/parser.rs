//! The pushdown parser engine.
//!
//! A [`Parser`] runs the grammar's automaton one token at a time. Each call to
//! [`Parser::add_token`] works in two phases: it first plans the transitions
//! the token causes against a virtual view of the stack, and only if the token
//! is accepted applies them to the real stack and tree. A rejected token
//! therefore leaves the parser exactly as it was.

use crate::errors::{BadInputReason, ErrorContext, Offending, ParseError};
use crate::grammar::{Dfa, Grammar, GrammarError, LabelId};
use crate::syntax::token::{Context, Symbol};
use crate::syntax::trace::{NullSink, ParseEvent, TraceSink};
use crate::syntax::tree::{Arena, NodeId, SyntaxTree};

#[derive(Debug, Clone, Copy)]
struct StackEntry<'g> {
    dfa: &'g Dfa,
    state: usize,
    node: NodeId,
}

/// One planned transition.
#[derive(Debug, Clone, Copy)]
enum Step<'g> {
    /// Append the token as a leaf of the top node and move to `state`.
    Shift { state: usize },
    /// Move the top to `resume` and start recognising `dfa` above it.
    Push { dfa: &'g Dfa, resume: usize },
    /// The top production is complete.
    Pop,
}

/// The stack as it would look after the steps planned so far.
///
/// Entries below `depth` are read from the real stack; at most the topmost of
/// them has a changed state (`top_state`). Entries pushed during planning
/// live in `overlay`.
struct StackView<'s, 'g> {
    base: &'s [StackEntry<'g>],
    depth: usize,
    top_state: Option<usize>,
    overlay: Vec<(&'g Dfa, usize)>,
}

impl<'s, 'g> StackView<'s, 'g> {
    fn new(base: &'s [StackEntry<'g>]) -> Self {
        Self {
            base,
            depth: base.len(),
            top_state: None,
            overlay: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.depth == 0 && self.overlay.is_empty()
    }

    fn top(&self) -> Option<(&'g Dfa, usize)> {
        if let Some(&top) = self.overlay.last() {
            return Some(top);
        }
        let entry = self.base.get(self.depth.checked_sub(1)?)?;
        Some((entry.dfa, self.top_state.unwrap_or(entry.state)))
    }

    fn set_state(&mut self, state: usize) {
        match self.overlay.last_mut() {
            Some(top) => top.1 = state,
            None => self.top_state = Some(state),
        }
    }

    fn push(&mut self, dfa: &'g Dfa) {
        self.overlay.push((dfa, 0));
    }

    fn pop(&mut self) {
        if self.overlay.pop().is_none() && self.depth > 0 {
            self.depth -= 1;
            self.top_state = None;
        }
    }

    /// Names of the nonterminals on the stack, outermost first.
    fn derivation(&self) -> Vec<String> {
        self.base[..self.depth]
            .iter()
            .map(|e| e.dfa)
            .chain(self.overlay.iter().map(|(dfa, _)| *dfa))
            .map(|dfa| dfa.name().to_string())
            .collect()
    }
}

/// Why planning stopped without a valid transition sequence.
enum Rejection {
    TooMuchInput { derivation: Vec<String> },
    NoTransition {
        derivation: Vec<String>,
        expected: Vec<String>,
    },
}

/// One parse of one token stream against a shared grammar.
pub struct Parser<'g> {
    grammar: &'g Grammar,
    stack: Vec<StackEntry<'g>>,
    arena: Arena,
    root: NodeId,
    started: bool,
}

impl<'g> Parser<'g> {
    /// A parser for the grammar's own start symbol.
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::start_at(grammar, grammar.start_dfa())
    }

    /// A parser that recognises `symbol` instead of the table's start symbol.
    pub fn with_start(grammar: &'g Grammar, symbol: Symbol) -> Result<Self, GrammarError> {
        let dfa = grammar.dfa(symbol).ok_or_else(|| GrammarError::UnknownSymbol {
            name: grammar.symbol_name(symbol),
        })?;
        Ok(Self::start_at(grammar, dfa))
    }

    pub(crate) fn start_at(grammar: &'g Grammar, dfa: &'g Dfa) -> Self {
        let mut arena = Arena::default();
        let root = arena.interior(dfa.symbol(), Context::default());
        Self {
            grammar,
            stack: vec![StackEntry {
                dfa,
                state: 0,
                node: root,
            }],
            arena,
            root,
            started: false,
        }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// The start symbol has been recognised; no further tokens are accepted.
    pub fn is_done(&self) -> bool {
        self.stack.is_empty()
    }

    /// Nonterminals currently being recognised, outermost first.
    pub fn derivation(&self) -> Vec<String> {
        StackView::new(&self.stack).derivation()
    }

    /// `(nonterminal, state)` for every stack entry, bottom first.
    pub fn stack_snapshot(&self) -> Vec<(Symbol, usize)> {
        self.stack
            .iter()
            .map(|e| (e.dfa.symbol(), e.state))
            .collect()
    }

    /// Maps a token to the label the automaton matches on.
    pub fn classify(&self, kind: Symbol, value: &str) -> Option<LabelId> {
        self.grammar.classify(kind, value)
    }

    /// Feeds one token. Returns `Ok(true)` when it completes the start symbol.
    pub fn add_token(
        &mut self,
        kind: Symbol,
        value: impl Into<String>,
        context: Context,
    ) -> Result<bool, ParseError> {
        self.add_token_with(kind, value, context, &mut NullSink)
    }

    /// Like [`Parser::add_token`], reporting every applied transition to `sink`.
    pub fn add_token_with(
        &mut self,
        kind: Symbol,
        value: impl Into<String>,
        context: Context,
        sink: &mut dyn TraceSink,
    ) -> Result<bool, ParseError> {
        let value = value.into();
        let Some(label) = self.classify(kind, &value) else {
            return Err(ParseError::BadToken {
                token: self.offending(kind, value, context),
                ctx: ErrorContext::default(),
            });
        };

        let steps = match self.plan(label) {
            Ok(steps) => steps,
            Err(rejection) => return Err(self.rejected(rejection, kind, value, context)),
        };

        sink.event(
            self.grammar,
            &ParseEvent::Token {
                kind,
                value: &value,
                label,
                start: context.start,
            },
        );
        Ok(self.apply(&steps, kind, value, context, sink))
    }

    /// Consumes the parser, returning the tree if the parse completed.
    pub fn into_tree(self) -> Option<SyntaxTree> {
        self.is_done().then(|| self.arena.freeze(self.root))
    }

    fn plan(&self, label: LabelId) -> Result<Vec<Step<'g>>, Rejection> {
        let mut view = StackView::new(&self.stack);
        let mut steps = Vec::new();
        // Nonterminals entered for this token. Entering one twice, or popping
        // after entering any, means the table cannot consume the token.
        let mut descended: Vec<Symbol> = Vec::new();
        if view.is_empty() {
            return Err(Rejection::TooMuchInput {
                derivation: Vec::new(),
            });
        }

        while let Some((dfa, state)) = view.top() {
            let Some(current) = dfa.state(state) else {
                break;
            };

            if let Some(edge) = current.edges().iter().find(|e| e.label == label) {
                steps.push(Step::Shift { state: edge.next });
                view.set_state(edge.next);
                while let Some((dfa, state)) = view.top() {
                    if !dfa.state(state).is_some_and(|s| s.is_accept_only()) {
                        break;
                    }
                    steps.push(Step::Pop);
                    view.pop();
                }
                return Ok(steps);
            }

            let descent = current.edges().iter().find_map(|e| {
                self.grammar
                    .descent(e.label)
                    .filter(|child| child.starts_with(label))
                    .map(|child| (child, e.next))
            });
            if let Some((child, resume)) = descent {
                if descended.contains(&child.symbol()) {
                    return Err(self.stalled(&view, dfa, state));
                }
                descended.push(child.symbol());
                steps.push(Step::Push { dfa: child, resume });
                view.set_state(resume);
                view.push(child);
                continue;
            }

            if current.is_accepting() {
                if !descended.is_empty() {
                    return Err(self.stalled(&view, dfa, state));
                }
                let derivation = view.derivation();
                steps.push(Step::Pop);
                view.pop();
                if view.is_empty() {
                    return Err(Rejection::TooMuchInput { derivation });
                }
                continue;
            }

            return Err(self.stalled(&view, dfa, state));
        }

        Err(Rejection::TooMuchInput {
            derivation: view.derivation(),
        })
    }

    fn stalled(&self, view: &StackView<'_, 'g>, dfa: &'g Dfa, state: usize) -> Rejection {
        Rejection::NoTransition {
            derivation: view.derivation(),
            expected: self.expected(dfa, state),
        }
    }

    fn apply(
        &mut self,
        steps: &[Step<'g>],
        kind: Symbol,
        value: String,
        context: Context,
        sink: &mut dyn TraceSink,
    ) -> bool {
        if !self.started {
            self.arena.set_context(self.root, context.clone());
            self.started = true;
        }
        let mut value = Some(value);
        for step in steps {
            match *step {
                Step::Shift { state } => {
                    let Some(top) = self.stack.last_mut() else {
                        break;
                    };
                    let text = value.take().unwrap_or_default();
                    sink.event(
                        self.grammar,
                        &ParseEvent::Shift {
                            symbol: top.dfa.symbol(),
                            kind,
                            value: &text,
                            state,
                        },
                    );
                    let leaf = self.arena.leaf(kind, text, context.clone());
                    self.arena.append(top.node, leaf);
                    top.state = state;
                }
                Step::Push { dfa, resume } => {
                    let Some(top) = self.stack.last_mut() else {
                        break;
                    };
                    sink.event(
                        self.grammar,
                        &ParseEvent::Push {
                            parent: top.dfa.symbol(),
                            child: dfa.symbol(),
                            resume,
                        },
                    );
                    top.state = resume;
                    let node = self.arena.interior(dfa.symbol(), context.clone());
                    self.stack.push(StackEntry {
                        dfa,
                        state: 0,
                        node,
                    });
                }
                Step::Pop => {
                    let Some(done) = self.stack.pop() else {
                        break;
                    };
                    match self.stack.last() {
                        Some(parent) => {
                            self.arena.append(parent.node, done.node);
                            sink.event(
                                self.grammar,
                                &ParseEvent::Pop {
                                    symbol: done.dfa.symbol(),
                                },
                            );
                        }
                        None => sink.event(
                            self.grammar,
                            &ParseEvent::Accept {
                                symbol: done.dfa.symbol(),
                            },
                        ),
                    }
                }
            }
        }
        self.is_done()
    }

    /// Labels that could have continued from `state`, as grammar text.
    fn expected(&self, dfa: &Dfa, state: usize) -> Vec<String> {
        let mut labels: Vec<LabelId> = Vec::new();
        let edges = dfa.state(state).map(|s| s.edges()).unwrap_or_default();
        for edge in edges {
            if edge.label == LabelId::EMPTY {
                continue;
            }
            match self.grammar.descent(edge.label) {
                Some(child) => labels.extend(child.first()),
                None => labels.push(edge.label),
            }
        }
        let mut seen = Vec::with_capacity(labels.len());
        for label in labels {
            if !seen.contains(&label) {
                seen.push(label);
            }
        }
        seen.into_iter()
            .map(|l| self.grammar.describe_label(l))
            .collect()
    }

    fn offending(&self, kind: Symbol, value: String, context: Context) -> Offending {
        Offending {
            kind,
            kind_name: self.grammar.symbol_name(kind),
            value,
            context,
        }
    }

    fn rejected(
        &self,
        rejection: Rejection,
        kind: Symbol,
        value: String,
        context: Context,
    ) -> ParseError {
        let token = self.offending(kind, value, context);
        match rejection {
            Rejection::TooMuchInput { derivation } => ParseError::BadInput {
                reason: BadInputReason::TooMuchInput,
                token,
                derivation,
                expected: Vec::new(),
                ctx: ErrorContext::default(),
            },
            Rejection::NoTransition {
                derivation,
                expected,
            } => ParseError::BadInput {
                reason: BadInputReason::NoTransition,
                token,
                derivation,
                expected,
                ctx: ErrorContext::default(),
            },
        }
    }
}
