//! Line-oriented tokenizer.
//!
//! [`Tokenizer`] pulls physical lines from any iterator and yields [`Token`]s
//! lazily. It never fails: text that matches no alternative becomes a
//! one-character `ERRORTOKEN` for the parser to reject. The stream always ends
//! with exactly one `ENDMARKER`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::syntax::token::{
    Position, Symbol, Token, CHAR, ENDMARKER, ERRORTOKEN, NAME, NUMBER, OP, STRING,
};

/// Alternatives are tried in order; the first that matches wins.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"^(?:"[ !#-~]*""#,
        r"|[0-9]+",
        r"|'[-+*/_a-zA-Z0-9]'",
        r"|[_a-zA-Z][_a-zA-Z0-9]*",
        r"|[-+*/]",
        r"|[=!]?=",
        r"|[<>]=?",
        r"|[\[\](){}]",
        r"|[;:,]",
        r"|\r?\n)",
    ))
    .expect("token pattern is a valid regex")
});

fn is_horizontal_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn is_blank(line: &str) -> bool {
    line.chars().all(|c| matches!(c, ' ' | '\t' | '\x0c' | '\r' | '\n'))
}

fn classify(text: &str) -> Symbol {
    match text.chars().next() {
        Some(c) if c.is_ascii_digit() => NUMBER,
        Some('"') => STRING,
        Some('\'') => CHAR,
        Some(c) if c == '_' || c.is_ascii_alphabetic() => NAME,
        _ => OP,
    }
}

/// Tokenizes a string, splitting it into physical lines that keep their `\n`.
pub fn tokenize(source: &str) -> Tokenizer<std::str::SplitInclusive<'_, char>> {
    Tokenizer::new(source.split_inclusive('\n'))
}

/// Pull-based tokenizer over a stream of physical lines.
///
/// Each line should carry its terminating newline, if it has one; the last
/// line of a file may lack it.
pub struct Tokenizer<I> {
    lines: I,
    line: String,
    lnum: usize,
    pos: usize,
    finished: bool,
}

impl<I> Tokenizer<I>
where
    I: Iterator,
    I::Item: Into<String>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            line: String::new(),
            lnum: 0,
            pos: 0,
            finished: false,
        }
    }

    /// Advances to the next line with content. Returns false at end of input.
    fn next_line(&mut self) -> bool {
        for line in self.lines.by_ref() {
            self.line = line.into();
            self.lnum += 1;
            self.pos = 0;
            if !is_blank(&self.line) {
                return true;
            }
        }
        self.pos = self.line.len();
        false
    }

    fn end_marker(&mut self) -> Token {
        self.finished = true;
        let (position, line) = if self.lnum == 0 {
            (Position::new(1, 0), String::new())
        } else if self.line.ends_with('\n') {
            (Position::new(self.lnum + 1, 0), String::new())
        } else {
            (Position::new(self.lnum, self.line.len()), self.line.clone())
        };
        Token::new(ENDMARKER, "", position, position, line)
    }

    /// Scans one token from the current line, or `None` if the line is used up.
    fn scan(&mut self) -> Option<Token> {
        loop {
            let rest = self.line.get(self.pos..)?;
            let trimmed = rest.trim_start_matches(is_horizontal_space);
            self.pos += rest.len() - trimmed.len();
            if trimmed.is_empty() {
                return None;
            }

            let start = self.pos;
            let matched = TOKEN_PATTERN
                .find(trimmed)
                .map(|m| m.end())
                .filter(|&len| len > 0);
            let (kind, len) = match matched {
                Some(len) => (None, len),
                None => {
                    let width = trimmed.chars().next().map_or(1, char::len_utf8);
                    (Some(ERRORTOKEN), width)
                }
            };
            self.pos = start + len;
            let text = &self.line[start..self.pos];
            if kind.is_none() && text.ends_with('\n') {
                continue;
            }

            let kind = kind.unwrap_or_else(|| classify(text));
            let value = if kind == NAME {
                text.to_ascii_lowercase()
            } else {
                text.to_string()
            };
            return Some(Token::new(
                kind,
                value,
                Position::new(self.lnum, start),
                Position::new(self.lnum, self.pos),
                self.line.clone(),
            ));
        }
    }
}

impl<I> Iterator for Tokenizer<I>
where
    I: Iterator,
    I::Item: Into<String>,
{
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        loop {
            if let Some(token) = self.scan() {
                return Some(token);
            }
            if !self.next_line() {
                return Some(self.end_marker());
            }
        }
    }
}
