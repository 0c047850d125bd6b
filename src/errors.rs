//! Parse errors and their diagnostic presentation.
//!
//! Every rejection of the input surfaces here: the tokenizer never fails, it
//! emits `ERRORTOKEN`s that the parser then refuses. Errors are created with
//! the token that caused them and enriched with the source text afterwards
//! (see [`ParseError::with_source`]) so that `miette` can point at the spot.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode, SourceSpan};
use thiserror::Error;

use crate::syntax::token::{Context, Position, Symbol};

pub type SourceArc = Arc<NamedSource<String>>;

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// The text a parse ran over, kept for error reporting.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Wraps text read from `name` (a path or a label such as `<string>`).
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn to_named_source(&self) -> SourceArc {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }

    /// Byte offset of a `(line, column)` position, clamped to the end of the text.
    pub fn offset_of(&self, position: Position) -> usize {
        let mut offset = 0;
        for (index, line) in self.content.split_inclusive('\n').enumerate() {
            if index + 1 == position.line {
                return offset + position.column.min(line.len());
            }
            offset += line.len();
        }
        offset.min(self.content.len())
    }
}

/// Source and span attached to an error once the input text is known.
#[derive(Debug, Default)]
pub struct ErrorContext {
    pub source: Option<SourceArc>,
    pub span: Option<SourceSpan>,
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// The token a parse error is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offending {
    pub kind: Symbol,
    /// Display name of `kind` in the grammar that rejected it.
    pub kind_name: String,
    pub value: String,
    pub context: Context,
}

impl fmt::Display for Offending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type={}, value={:?}, context={}",
            self.kind_name, self.value, self.context
        )
    }
}

/// Why a token could not extend the derivation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BadInputReason {
    /// The start symbol was already complete.
    TooMuchInput,
    /// No arc matches and the state is not accepting.
    NoTransition,
}

impl fmt::Display for BadInputReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadInputReason::TooMuchInput => f.write_str("too much input"),
            BadInputReason::NoTransition => f.write_str("bad input"),
        }
    }
}

/// Type-safe classification of a [`ParseError`], for callers and tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    BadToken,
    BadInput(BadInputReason),
    IncompleteInput,
    Io,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("bad token: {token}")]
    BadToken { token: Offending, ctx: ErrorContext },

    #[error("{reason}: {token}")]
    BadInput {
        reason: BadInputReason,
        token: Offending,
        /// Nonterminals being recognised when the token was rejected, outermost first.
        derivation: Vec<String>,
        /// Labels the failing state could have accepted.
        expected: Vec<String>,
        ctx: ErrorContext,
    },

    #[error("incomplete input: {}", describe_last(.token))]
    IncompleteInput {
        /// The last token fed, if the stream had any.
        token: Option<Offending>,
        derivation: Vec<String>,
        ctx: ErrorContext,
    },

    #[error("failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe_last(token: &Option<Offending>) -> String {
    match token {
        Some(token) => token.to_string(),
        None => "no tokens".to_string(),
    }
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::BadToken { .. } => ParseErrorKind::BadToken,
            ParseError::BadInput { reason, .. } => ParseErrorKind::BadInput(*reason),
            ParseError::IncompleteInput { .. } => ParseErrorKind::IncompleteInput,
            ParseError::Io { .. } => ParseErrorKind::Io,
        }
    }

    pub fn token(&self) -> Option<&Offending> {
        match self {
            ParseError::BadToken { token, .. } | ParseError::BadInput { token, .. } => Some(token),
            ParseError::IncompleteInput { token, .. } => token.as_ref(),
            ParseError::Io { .. } => None,
        }
    }

    pub fn position(&self) -> Option<Position> {
        self.token().map(|t| t.context.start)
    }

    pub fn derivation(&self) -> &[String] {
        match self {
            ParseError::BadInput { derivation, .. }
            | ParseError::IncompleteInput { derivation, .. } => derivation,
            _ => &[],
        }
    }

    /// Attaches the parsed text so diagnostics can show where the error is.
    pub fn with_source(mut self, source: &SourceContext) -> Self {
        let span = self.token().map(|token| {
            let start = source.offset_of(token.context.start);
            let len = token.value.len().max(1);
            let len = len.min(source.content.len().saturating_sub(start));
            SourceSpan::from((start, len))
        });
        if let Some(ctx) = self.ctx_mut() {
            ctx.source = Some(source.to_named_source());
            ctx.span = span;
        }
        self
    }

    fn ctx(&self) -> Option<&ErrorContext> {
        match self {
            ParseError::BadToken { ctx, .. }
            | ParseError::BadInput { ctx, .. }
            | ParseError::IncompleteInput { ctx, .. } => Some(ctx),
            ParseError::Io { .. } => None,
        }
    }

    fn ctx_mut(&mut self) -> Option<&mut ErrorContext> {
        match self {
            ParseError::BadToken { ctx, .. }
            | ParseError::BadInput { ctx, .. }
            | ParseError::IncompleteInput { ctx, .. } => Some(ctx),
            ParseError::Io { .. } => None,
        }
    }

    fn help_text(&self) -> Option<String> {
        match self {
            ParseError::BadToken { token, .. } => Some(format!(
                "{} is not a terminal of this grammar",
                token.kind_name
            )),
            ParseError::BadInput {
                reason: BadInputReason::TooMuchInput,
                ..
            } => Some("the input was already complete; remove the trailing tokens".into()),
            ParseError::BadInput { expected, .. } if !expected.is_empty() => {
                Some(format!("expected one of: {}", expected.join(", ")))
            }
            ParseError::IncompleteInput { derivation, .. } if !derivation.is_empty() => Some(
                format!("input ended inside {}", derivation.join(" > ")),
            ),
            _ => None,
        }
    }
}

impl Diagnostic for ParseError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.kind() {
            ParseErrorKind::BadToken => "pushdown::parse::bad_token",
            ParseErrorKind::BadInput(BadInputReason::TooMuchInput) => {
                "pushdown::parse::too_much_input"
            }
            ParseErrorKind::BadInput(BadInputReason::NoTransition) => "pushdown::parse::bad_input",
            ParseErrorKind::IncompleteInput => "pushdown::parse::incomplete_input",
            ParseErrorKind::Io => "pushdown::io",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help_text()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.ctx()?
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.ctx()?.span?;
        let text = match self {
            ParseError::BadToken { .. } => "unknown token",
            ParseError::BadInput {
                reason: BadInputReason::TooMuchInput,
                ..
            } => "unexpected after end of input",
            ParseError::BadInput { .. } => "unexpected token",
            _ => "input ends here",
        };
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(text.to_string()),
            span,
        ))))
    }
}
