//! Whole-input entry points.
//!
//! The [`Driver`] pulls tokens from the tokenizer, reconstructs the text
//! skipped between them (each leaf's *prefix*) and feeds them to a fresh
//! [`Parser`] until the start symbol completes.

use std::fs;
use std::io::{self, BufRead};
use std::mem;
use std::path::{Path, PathBuf};

use crate::config::ParseConfig;
use crate::errors::{ErrorContext, Offending, ParseError, SourceContext};
use crate::grammar::{Dfa, Grammar, GrammarError};
use crate::syntax::token::{Context, Position, Token};
use crate::syntax::tokenizer::{tokenize, Tokenizer};
use crate::syntax::trace::{NullSink, TraceSink};
use crate::syntax::tree::SyntaxTree;
use crate::syntax::Parser;

/// Name used for sources that have no path.
const STRING_SOURCE: &str = "<string>";
const STREAM_SOURCE: &str = "<stream>";

pub struct Driver<'g, S = NullSink> {
    grammar: &'g Grammar,
    start: Option<&'g Dfa>,
    sink: S,
}

impl<'g> Driver<'g, NullSink> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            start: None,
            sink: NullSink,
        }
    }

    pub fn with_config(grammar: &'g Grammar, config: &ParseConfig) -> Result<Self, GrammarError> {
        Ok(Self {
            grammar,
            start: config.start_dfa(grammar)?,
            sink: NullSink,
        })
    }
}

impl<'g, S: TraceSink> Driver<'g, S> {
    /// Reports every parser transition to `sink`.
    pub fn with_sink<T: TraceSink>(self, sink: T) -> Driver<'g, T> {
        Driver {
            grammar: self.grammar,
            start: self.start,
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    fn parser(&self) -> Parser<'g> {
        match self.start {
            Some(dfa) => Parser::start_at(self.grammar, dfa),
            None => Parser::new(self.grammar),
        }
    }

    /// Parses an already tokenized stream.
    pub fn parse_tokens<I>(&mut self, tokens: I) -> Result<SyntaxTree, ParseError>
    where
        I: IntoIterator<Item = Token>,
    {
        let mut parser = self.parser();
        let mut cursor = Position::new(1, 0);
        let mut prefix = String::new();
        let mut prev_line = String::new();
        let mut last: Option<Offending> = None;

        for token in tokens {
            if token.start != cursor {
                if cursor.line < token.start.line {
                    let gap = token.start.line - cursor.line;
                    match prev_line.get(cursor.column..) {
                        Some(tail) if tail.ends_with('\n') => {
                            prefix.push_str(tail);
                            prefix.push_str(&"\n".repeat(gap - 1));
                        }
                        _ => prefix.push_str(&"\n".repeat(gap)),
                    }
                    cursor = Position::new(token.start.line, 0);
                }
                if cursor.column < token.start.column {
                    let gap = token.line.get(cursor.column..token.start.column);
                    prefix.push_str(gap.unwrap_or_default());
                }
            }

            let context = Context::new(mem::take(&mut prefix), token.start);
            last = Some(Offending {
                kind: token.kind,
                kind_name: self.grammar.symbol_name(token.kind),
                value: token.text.clone(),
                context: context.clone(),
            });
            let ends_line = token.text.ends_with('\n');
            if parser.add_token_with(token.kind, token.text, context, &mut self.sink)? {
                break;
            }

            cursor = token.end;
            if ends_line {
                cursor = Position::new(cursor.line + 1, 0);
            }
            prev_line = token.line;
        }

        if !parser.is_done() {
            return Err(ParseError::IncompleteInput {
                token: last,
                derivation: parser.derivation(),
                ctx: ErrorContext::default(),
            });
        }
        parser.into_tree().ok_or(ParseError::IncompleteInput {
            token: last,
            derivation: Vec::new(),
            ctx: ErrorContext::default(),
        })
    }

    /// Parses a stream of physical lines, each keeping its newline.
    pub fn parse_stream<I>(&mut self, lines: I) -> Result<SyntaxTree, ParseError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.parse_tokens(Tokenizer::new(lines.into_iter()))
    }

    pub fn parse_string(&mut self, text: &str) -> Result<SyntaxTree, ParseError> {
        self.parse_tokens(tokenize(text))
            .map_err(|e| e.with_source(&SourceContext::from_file(STRING_SOURCE, text)))
    }

    /// Parses lines read lazily from `reader`.
    pub fn parse_reader<R: BufRead>(&mut self, reader: R) -> Result<SyntaxTree, ParseError> {
        let mut error = None;
        let lines = ReaderLines {
            reader,
            error: &mut error,
        };
        let result = self.parse_tokens(Tokenizer::new(lines));
        match error {
            Some(source) => Err(ParseError::Io {
                path: PathBuf::from(STREAM_SOURCE),
                source,
            }),
            None => result,
        }
    }

    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<SyntaxTree, ParseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_tokens(tokenize(&text)).map_err(|e| {
            e.with_source(&SourceContext::from_file(path.display().to_string(), &text))
        })
    }
}

/// Physical lines of a reader. The first read error ends the stream and is
/// left in `error`.
struct ReaderLines<'e, R> {
    reader: R,
    error: &'e mut Option<io::Error>,
}

impl<R: BufRead> Iterator for ReaderLines<'_, R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.error.is_some() {
            return None;
        }
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(e) => {
                *self.error = Some(e);
                None
            }
        }
    }
}

pub fn parse_tokens<I>(grammar: &Grammar, tokens: I) -> Result<SyntaxTree, ParseError>
where
    I: IntoIterator<Item = Token>,
{
    Driver::new(grammar).parse_tokens(tokens)
}

pub fn parse_string(grammar: &Grammar, text: &str) -> Result<SyntaxTree, ParseError> {
    Driver::new(grammar).parse_string(text)
}

pub fn parse_stream<I>(grammar: &Grammar, lines: I) -> Result<SyntaxTree, ParseError>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    Driver::new(grammar).parse_stream(lines)
}

pub fn parse_reader<R: BufRead>(grammar: &Grammar, reader: R) -> Result<SyntaxTree, ParseError> {
    Driver::new(grammar).parse_reader(reader)
}

pub fn parse_file(grammar: &Grammar, path: impl AsRef<Path>) -> Result<SyntaxTree, ParseError> {
    Driver::new(grammar).parse_file(path)
}
