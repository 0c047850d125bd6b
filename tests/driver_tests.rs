// tests/driver_tests.rs

mod common;

use std::io::{Cursor, Write};

use common::{calc, expr, open_sum_grammar};
use proptest::prelude::*;
use pushdown::config::ParseConfig;
use pushdown::errors::{BadInputReason, ParseError, ParseErrorKind};
use pushdown::grammar::{GrammarBuilder, GrammarError, LabelId};
use pushdown::syntax::token::{Position, ENDMARKER, ERRORTOKEN, NUMBER, OP};
use pushdown::syntax::tokenizer::tokenize;
use pushdown::syntax::trace::EventLog;
use pushdown::syntax::Parser;
use pushdown::{parse_file, parse_reader, parse_stream, parse_string, parse_tokens, Driver};

#[test]
fn parses_a_calc_program() {
    let grammar = calc();
    let source = "x = 1 + 2 * y;\nprint (x - 3) / 4;\n";
    let tree = parse_string(&grammar, source).unwrap();
    let statements = tree
        .root()
        .children()
        .filter(|c| grammar.symbol_name(c.kind()) == "stmt")
        .count();
    assert_eq!(statements, 2);
    assert_eq!(tree.to_source(), source);
}

#[test]
fn round_trip_keeps_layout() {
    let grammar = calc();
    let source = "\n  x   =1;\n\n\tprint x ;   \n";
    let tree = parse_string(&grammar, source).unwrap();
    assert_eq!(tree.to_source(), source);
}

#[test]
fn round_trip_folds_names_and_blank_lines() {
    let grammar = calc();
    let tree = parse_string(&grammar, "X = 1;\n    \nPRINT x;").unwrap();
    assert_eq!(tree.to_source(), "x = 1;\n\nprint x;");
}

#[test]
fn leaves_match_the_token_stream() {
    let grammar = calc();
    let source = "print (1 + a) * 2;";
    let tree = parse_string(&grammar, source).unwrap();
    let leaves: Vec<(u16, String)> = tree
        .root()
        .leaves()
        .map(|l| (l.kind().0, l.value().unwrap().to_string()))
        .collect();
    let tokens: Vec<(u16, String)> = tokenize(source).map(|t| (t.kind.0, t.text)).collect();
    assert_eq!(leaves, tokens);
}

#[test]
fn truncated_input_is_incomplete() {
    let grammar = calc();
    let tokens: Vec<_> = tokenize("x = 1;")
        .filter(|t| t.kind != ENDMARKER)
        .collect();
    let err = parse_tokens(&grammar, tokens).unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::IncompleteInput);
    let last = err.token().unwrap();
    assert_eq!(last.value, ";");
    assert_eq!(last.context.start, Position::new(1, 5));
    assert_eq!(err.derivation(), ["program".to_string()]);
}

#[test]
fn empty_token_stream_is_incomplete() {
    let grammar = calc();
    let err = parse_tokens(&grammar, Vec::new()).unwrap_err();
    assert!(matches!(
        err,
        ParseError::IncompleteInput { token: None, .. }
    ));
    assert_eq!(err.to_string(), "incomplete input: no tokens");
}

#[test]
fn tokens_after_completion_are_ignored() {
    let grammar = expr();
    let mut tokens: Vec<_> = tokenize("1 + 2").collect();
    tokens.extend(tokenize("3"));
    let tree = parse_tokens(&grammar, tokens).unwrap();
    assert_eq!(tree.root().leaves().count(), 4);
}

#[test]
fn string_errors_carry_source_diagnostics() {
    let grammar = calc();
    let err = parse_string(&grammar, "x = 1\nprint @;\n").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::BadInput(BadInputReason::NoTransition));
    assert_eq!(err.position(), Some(Position::new(2, 0)));
    let report = format!("{:?}", miette::Report::new(err));
    assert!(report.contains("pushdown::parse::bad_input"));
    assert!(report.contains("<string>"));
    assert!(report.contains("expected one of"));
}

#[test]
fn error_token_is_a_bad_token() {
    let grammar = calc();
    let err = parse_string(&grammar, "x = @;").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::BadToken);
    assert_eq!(err.token().unwrap().kind_name, "ERRORTOKEN");
}

#[test]
fn mapped_error_token_is_bad_input() {
    let mut b = GrammarBuilder::new();
    let single = b.symbol("single");
    let number = b.token(NUMBER);
    let end = b.token(ENDMARKER);
    let error = b.token(ERRORTOKEN);
    b.rule(
        single,
        &[number],
        vec![
            vec![(number, 1)],
            vec![(end, 2)],
            vec![(LabelId::EMPTY, 2)],
            vec![(error, 2)],
        ],
    );
    let grammar = b.build().unwrap();

    let err = parse_string(&grammar, "1 @").unwrap_err();
    assert_eq!(
        err.kind(),
        ParseErrorKind::BadInput(BadInputReason::NoTransition)
    );
    let token = err.token().unwrap();
    assert_eq!(token.kind_name, "ERRORTOKEN");
    assert_eq!(token.value, "@");
    assert_eq!(err.position(), Some(Position::new(1, 2)));
}

#[test]
fn reader_and_stream_entry_points() {
    let grammar = expr();
    let tree = parse_reader(&grammar, Cursor::new("1 +\n 2\n")).unwrap();
    assert_eq!(tree.to_source(), "1 +\n 2\n");

    let tree = parse_stream(&grammar, vec!["4+\n", "5"]).unwrap();
    assert_eq!(tree.to_source(), "4+\n5");
}

#[test]
fn file_entry_point_names_the_file() {
    let grammar = calc();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "print 1;\n").unwrap();
    let tree = parse_file(&grammar, file.path()).unwrap();
    assert_eq!(tree.to_source(), "print 1;\n");

    let mut bad = tempfile::NamedTempFile::new().unwrap();
    write!(bad, "print ;\n").unwrap();
    let err = parse_file(&grammar, bad.path()).unwrap_err();
    let report = format!("{:?}", miette::Report::new(err));
    let name = bad.path().file_name().unwrap().to_string_lossy().to_string();
    assert!(report.contains(&name));
}

#[test]
fn configured_start_symbol() {
    let grammar = calc();
    let config = ParseConfig::with_start("stmt");
    let mut driver = Driver::with_config(&grammar, &config).unwrap();
    let tree = driver.parse_string("y = 2;").unwrap();
    assert_eq!(grammar.symbol_name(tree.root().kind()), "stmt");

    let missing = ParseConfig::with_start("nope");
    assert!(matches!(
        Driver::with_config(&grammar, &missing),
        Err(GrammarError::UnknownSymbol { .. })
    ));
}

#[test]
fn driver_reports_to_its_sink() {
    let grammar = expr();
    let mut driver = Driver::new(&grammar).with_sink(EventLog::new());
    driver.parse_string("1 + 2").unwrap();
    let log = driver.into_sink();
    assert_eq!(log.count("token"), 4);
    assert_eq!(log.count("accept expr"), 1);
}

#[test]
fn open_grammar_cannot_consume_end_marker() {
    let grammar = open_sum_grammar();
    let err = parse_string(&grammar, "1").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::BadToken);
    assert_eq!(err.token().unwrap().kind, ENDMARKER);
}

fn spacing() -> impl Strategy<Value = String> {
    "[ \t]{0,2}\n{0,2}[ \t]{0,2}"
}

fn sum_source() -> impl Strategy<Value = String> {
    (
        "\n{0,2}[ \t]{0,2}",
        "[0-9]{1,4}",
        prop::collection::vec((spacing(), spacing(), "[0-9]{1,4}"), 0..6),
        "[ \t]{0,2}\n?",
    )
        .prop_map(|(lead, first, rest, trail)| {
            let mut text = lead;
            text.push_str(&first);
            for (before, after, number) in rest {
                text.push_str(&before);
                text.push('+');
                text.push_str(&after);
                text.push_str(&number);
            }
            text.push_str(&trail);
            text
        })
}

proptest! {
    #[test]
    fn prop_round_trip_reconstructs_source(source in sum_source()) {
        let grammar = expr();
        let tree = parse_string(&grammar, &source).unwrap();
        prop_assert_eq!(tree.to_source(), source);
    }

    #[test]
    fn prop_completion_reported_once_at_the_end(source in sum_source()) {
        let grammar = expr();
        let mut parser = Parser::new(&grammar);
        let tokens: Vec<_> = tokenize(&source).collect();
        let mut completions = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            let context = pushdown::syntax::token::Context::at(token.start);
            if parser.add_token(token.kind, token.text.clone(), context).unwrap() {
                completions.push(i);
            }
        }
        prop_assert_eq!(completions, vec![tokens.len() - 1]);
        let numbers = tokens.iter().filter(|t| t.kind == NUMBER).count();
        let pluses = tokens.iter().filter(|t| t.kind == OP).count();
        prop_assert_eq!(numbers, pluses + 1);
    }
}
