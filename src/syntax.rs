//! Tokens, the tokenizer, the parser engine and the tree it builds.
//!
//! Data flows leaf-first: [`tokenizer`] turns lines into [`token::Token`]s,
//! [`parser::Parser`] runs them through a grammar's automaton, and the result
//! is a [`tree::SyntaxTree`].

pub mod parser;
pub mod token;
pub mod tokenizer;
pub mod trace;
pub mod tree;

pub use parser::Parser;
pub use token::{Context, Position, Symbol, Token};
pub use tokenizer::{tokenize, Tokenizer};
pub use trace::{EventLog, NullSink, ParseEvent, TraceSink, TracingSink};
pub use tree::{NamedNode, NodeId, NodeRef, SyntaxTree};
