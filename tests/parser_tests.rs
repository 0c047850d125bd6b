// tests/parser_tests.rs

mod common;

use common::{calc, col, open_sum_grammar, sum_grammar, PLUS};
use pushdown::errors::{BadInputReason, ParseError, ParseErrorKind};
use pushdown::grammar::LabelId;
use pushdown::syntax::token::{Context, Position, Symbol, ENDMARKER, ERRORTOKEN, NAME, NUMBER, OP};
use pushdown::syntax::trace::EventLog;
use pushdown::syntax::Parser;

fn feed(parser: &mut Parser<'_>, tokens: &[(Symbol, &str)]) -> Vec<bool> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, &(kind, text))| parser.add_token(kind, text, col(i)).unwrap())
        .collect()
}

#[test]
fn scenario_sum_completes_on_last_token() {
    let grammar = sum_grammar();
    let mut parser = Parser::new(&grammar);
    let results = feed(
        &mut parser,
        &[(NUMBER, "3"), (PLUS, "+"), (NUMBER, "4"), (ENDMARKER, "")],
    );
    assert_eq!(results, vec![false, false, false, true]);

    let tree = parser.into_tree().unwrap();
    let root = tree.root();
    assert_eq!(grammar.symbol_name(root.kind()), "expr");
    let leaves: Vec<(Symbol, &str)> = root
        .leaves()
        .map(|leaf| (leaf.kind(), leaf.value().unwrap()))
        .collect();
    assert_eq!(
        leaves,
        vec![(NUMBER, "3"), (PLUS, "+"), (NUMBER, "4"), (ENDMARKER, "")]
    );
}

#[test]
fn scenario_leading_plus_is_bad_input() {
    let grammar = sum_grammar();
    let mut parser = Parser::new(&grammar);
    let err = parser.add_token(PLUS, "+", col(0)).unwrap_err();
    assert_eq!(
        err.kind(),
        ParseErrorKind::BadInput(BadInputReason::NoTransition)
    );
    assert_eq!(err.derivation(), ["expr".to_string()]);
    assert_eq!(err.token().unwrap().kind_name, "PLUS");
}

#[test]
fn unknown_token_type_is_bad_token() {
    let grammar = sum_grammar();
    let mut parser = Parser::new(&grammar);
    let err = parser.add_token(ERRORTOKEN, "@", col(0)).unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::BadToken);
    let token = err.token().unwrap();
    assert_eq!(token.value, "@");
    assert_eq!(token.context.start, Position::new(1, 0));
}

#[test]
fn failed_token_leaves_stack_untouched() {
    let grammar = calc();
    let mut parser = Parser::new(&grammar);
    feed(&mut parser, &[(NAME, "print"), (NUMBER, "1")]);
    let before = parser.stack_snapshot();
    assert_eq!(before.len(), 4);

    // ')' would pop term and expr before failing in stmt.
    let err = parser.add_token(OP, ")", col(2)).unwrap_err();
    assert_eq!(parser.stack_snapshot(), before);
    match err {
        ParseError::BadInput {
            reason: BadInputReason::NoTransition,
            derivation,
            expected,
            ..
        } => {
            assert_eq!(derivation, vec!["program", "stmt"]);
            assert_eq!(expected, vec!["';'"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The parser is still usable afterwards.
    assert!(!parser.add_token(OP, ";", col(2)).unwrap());
    assert!(parser.add_token(ENDMARKER, "", col(3)).unwrap());
}

#[test]
fn error_after_operator_reports_expected_operands() {
    let grammar = calc();
    let mut parser = Parser::new(&grammar);
    feed(&mut parser, &[(NAME, "print"), (NUMBER, "1"), (OP, "+")]);
    let err = parser.add_token(OP, ";", col(3)).unwrap_err();
    match err {
        ParseError::BadInput {
            derivation,
            expected,
            ..
        } => {
            assert_eq!(derivation, vec!["program", "stmt", "expr"]);
            assert_eq!(expected, vec!["NUMBER", "NAME", "'('"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unit_chains_collapse_without_losing_leaves() {
    let grammar = calc();
    let mut parser = Parser::new(&grammar);
    let results = feed(
        &mut parser,
        &[
            (NAME, "x"),
            (OP, "="),
            (NUMBER, "1"),
            (OP, ";"),
            (ENDMARKER, ""),
        ],
    );
    assert_eq!(results, vec![false, false, false, false, true]);
    let tree = parser.into_tree().unwrap();
    assert_eq!(
        tree.sexpr(&grammar),
        r#"(program (stmt (NAME "x") (OP "=") (expr (term (atom (NUMBER "1")))) (OP ";")) (ENDMARKER ""))"#
    );
    assert_eq!(tree.root().leaves().count(), 5);
}

#[test]
fn classify_prefers_keywords() {
    let grammar = calc();
    let parser = Parser::new(&grammar);
    let print = parser.classify(NAME, "print");
    assert_eq!(print, grammar.keyword("print"));
    assert_ne!(print, parser.classify(NAME, "x"));
    // Same inputs, same answer, no matter how often or in which parser.
    let other = Parser::new(&grammar);
    for _ in 0..3 {
        assert_eq!(other.classify(NAME, "print"), print);
        assert_eq!(other.classify(NUMBER, "7"), grammar.token_label(NUMBER));
    }
    assert_eq!(parser.classify(ERRORTOKEN, "@"), None);
}

#[test]
fn completed_production_rejects_more_input() {
    let grammar = open_sum_grammar();
    let mut parser = Parser::new(&grammar);
    let results = feed(&mut parser, &[(NUMBER, "3"), (PLUS, "+"), (NUMBER, "4")]);
    assert_eq!(results, vec![false, false, false]);

    let err = parser.add_token(NUMBER, "5", col(3)).unwrap_err();
    assert_eq!(
        err.kind(),
        ParseErrorKind::BadInput(BadInputReason::TooMuchInput)
    );
    assert_eq!(parser.stack_snapshot(), vec![(Symbol(256), 1)]);
    assert!(err.to_string().starts_with("too much input"));
}

#[test]
fn finished_parser_rejects_everything() {
    let grammar = sum_grammar();
    let mut parser = Parser::new(&grammar);
    feed(&mut parser, &[(NUMBER, "3"), (ENDMARKER, "")]);
    assert!(parser.is_done());
    let err = parser.add_token(NUMBER, "4", col(2)).unwrap_err();
    assert_eq!(
        err.kind(),
        ParseErrorKind::BadInput(BadInputReason::TooMuchInput)
    );
}

#[test]
fn start_symbol_can_be_overridden() {
    let grammar = calc();
    let expr = grammar.symbol_number("expr").unwrap();
    let mut parser = Parser::with_start(&grammar, expr).unwrap();
    feed(&mut parser, &[(NUMBER, "1"), (OP, "*"), (NAME, "y")]);
    assert_eq!(parser.derivation(), vec!["expr", "term"]);
    assert!(Parser::with_start(&grammar, NUMBER).is_err());
}

#[test]
fn root_takes_first_token_context() {
    let grammar = sum_grammar();
    let mut parser = Parser::new(&grammar);
    parser
        .add_token(NUMBER, "3", Context::new("  ", Position::new(2, 2)))
        .unwrap();
    parser
        .add_token(ENDMARKER, "", Context::at(Position::new(2, 3)))
        .unwrap();
    let tree = parser.into_tree().unwrap();
    assert_eq!(tree.root().prefix(), "  ");
    assert_eq!(tree.root().start(), Position::new(2, 2));
}

#[test]
fn trace_sink_sees_applied_transitions_only() {
    let grammar = calc();
    let mut parser = Parser::new(&grammar);
    let mut log = EventLog::new();
    parser
        .add_token_with(NAME, "print", col(0), &mut log)
        .unwrap();
    assert_eq!(
        log.lines,
        vec![
            "token NAME \"print\" as 'print' at 1,0",
            "push stmt from program (resume 0)",
            "shift NAME \"print\" in stmt -> 1",
        ]
    );

    let _ = parser.add_token_with(OP, ";", col(6), &mut log);
    assert_eq!(log.lines.len(), 3);

    parser
        .add_token_with(NUMBER, "1", col(6), &mut log)
        .unwrap();
    assert_eq!(log.count("push"), 4);
    assert_eq!(log.count("pop atom"), 1);
}

#[test]
fn one_grammar_serves_many_threads() {
    let grammar = calc();
    std::thread::scope(|scope| {
        for n in 0..4 {
            let grammar = &grammar;
            scope.spawn(move || {
                let mut parser = Parser::new(grammar);
                let value = n.to_string();
                let tokens = [
                    (NAME, "print"),
                    (NUMBER, value.as_str()),
                    (OP, ";"),
                    (ENDMARKER, ""),
                ];
                let done = feed(&mut parser, &tokens);
                assert_eq!(done.last(), Some(&true));
            });
        }
    });
}

#[test]
fn empty_label_is_reserved() {
    let grammar = calc();
    assert_eq!(grammar.describe_label(LabelId::EMPTY), "EMPTY");
}
