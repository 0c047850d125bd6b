//! Handles all user-facing output for the CLI.
//!
//! This module is responsible for the token listing, tree dumps, JSON output,
//! grammar summaries and the colored `check` report.

use std::fmt::Write as _;
use std::io::Write as _;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::check::{CheckOutcome, CheckReport};
use crate::grammar::Grammar;
use crate::syntax::token::{token_name, Token};

// ============================================================================
// FORMATTERS
// ============================================================================

/// One token per line: `start-end:` padded to 20, type name to 15, quoted text.
pub fn format_token(token: &Token) -> String {
    let span = format!("{}-{}:", token.start, token.end);
    let kind = match token_name(token.kind) {
        Some(name) => name.to_string(),
        None => token.kind.0.to_string(),
    };
    format!("{:<20}{:<15}{:?}", span, kind, token.text)
}

/// A summary of every DFA: name, id, state count, FIRST set.
pub fn format_grammar(grammar: &Grammar) -> String {
    let mut out = String::new();
    let start = grammar.symbol_name(grammar.start());
    let _ = writeln!(
        out,
        "start: {} ({}), {} labels",
        start,
        grammar.start().0,
        grammar.labels().len()
    );
    for dfa in grammar.dfas() {
        let first: Vec<String> = dfa
            .first()
            .iter()
            .map(|&l| grammar.describe_label(l))
            .collect();
        let _ = writeln!(
            out,
            "{:<16}{:>5}  states={:<3} first={{{}}}",
            dfa.name(),
            dfa.symbol().0,
            dfa.states().len(),
            first.join(", ")
        );
    }
    out
}

// ============================================================================
// CORE OUTPUT FUNCTIONS: User-facing CLI output utilities
// ============================================================================

pub fn print_tokens<I: IntoIterator<Item = Token>>(tokens: I) {
    for token in tokens {
        println!("{}", format_token(&token));
    }
}

/// Prints the `check` summary, one line per file, failures with their reason.
pub fn print_check_report(report: &CheckReport, use_colors: bool) {
    let choice = if use_colors {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);

    for outcome in &report.outcomes {
        match outcome {
            CheckOutcome::Pass { path, nodes } => {
                write_status(&mut stdout, "PASS", Color::Green);
                let _ = writeln!(stdout, " {} ({} nodes)", path.display(), nodes);
            }
            CheckOutcome::Fail { path, error } => {
                write_status(&mut stdout, "FAIL", Color::Red);
                let _ = writeln!(stdout, " {}: {}", path.display(), error);
            }
            CheckOutcome::Unreadable { path, reason } => {
                write_status(&mut stdout, "SKIP", Color::Yellow);
                let _ = writeln!(stdout, " {}: {}", path.display(), reason);
            }
        }
    }

    let color = if report.is_success() {
        Color::Green
    } else {
        Color::Red
    };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = writeln!(
        stdout,
        "{} passed, {} failed",
        report.passed(),
        report.failed()
    );
    let _ = stdout.reset();
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn write_status(stdout: &mut StandardStream, status: &str, color: Color) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(stdout, "{}", status);
    let _ = stdout.reset();
}
