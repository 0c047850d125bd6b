pub use crate::driver::{parse_file, parse_reader, parse_stream, parse_string, parse_tokens, Driver};
pub use crate::errors::{ParseError, ParseErrorKind, SourceContext};
pub use crate::grammar::{Grammar, GrammarBuilder, GrammarError};
pub use crate::syntax::{Parser, SyntaxTree};

pub mod check;
pub mod cli;
pub mod config;
pub mod driver;
pub mod errors;
pub mod grammar;
pub mod syntax;
