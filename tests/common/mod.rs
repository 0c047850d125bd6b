//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use pushdown::grammar::{Grammar, GrammarBuilder, LabelId};
use pushdown::syntax::token::{Context, Position, Symbol, ENDMARKER, NUMBER};

/// A grammar-specific token type, as a table compiler might assign it.
pub const PLUS: Symbol = Symbol(20);

pub fn grammar_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("grammars")
        .join(name)
}

pub fn calc() -> Grammar {
    Grammar::load(grammar_path("calc.json")).expect("calc.json loads")
}

pub fn expr() -> Grammar {
    Grammar::load(grammar_path("expr.yaml")).expect("expr.yaml loads")
}

/// `expr := NUMBER (PLUS NUMBER)* ENDMARKER` with `PLUS` as its own token type.
pub fn sum_grammar() -> Grammar {
    sum_builder(true).build().expect("sum grammar is valid")
}

/// The same language without the trailing `ENDMARKER`.
pub fn open_sum_grammar() -> Grammar {
    sum_builder(false).build().expect("open sum grammar is valid")
}

fn sum_builder(with_end: bool) -> GrammarBuilder {
    let mut b = GrammarBuilder::new();
    let expr = b.symbol("expr");
    b.token_name(PLUS, "PLUS");
    let number = b.token(NUMBER);
    let plus = b.token(PLUS);
    let states = if with_end {
        let end = b.token(ENDMARKER);
        vec![
            vec![(number, 1)],
            vec![(plus, 2), (end, 3)],
            vec![(number, 1)],
            vec![(LabelId::EMPTY, 3)],
        ]
    } else {
        vec![
            vec![(number, 1)],
            vec![(plus, 2), (LabelId::EMPTY, 1)],
            vec![(number, 1)],
        ]
    };
    b.rule(expr, &[number], states);
    b
}

/// A context on line 1 with no prefix.
pub fn col(column: usize) -> Context {
    Context::at(Position::new(1, column))
}
