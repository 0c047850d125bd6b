//! Defines the command-line arguments and subcommands for the pushdown CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "pushdown",
    version,
    about = "Tokenize and parse source files with a table-driven grammar."
)]
pub struct PushdownArgs {
    /// Log every parser transition (also enabled by RUST_LOG).
    #[arg(long, global = true)]
    pub trace: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the token stream of a file.
    Tokens {
        /// The path to the source file to tokenize.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Parse a file and print its concrete syntax tree.
    Parse {
        /// The grammar table (.json, .yaml or .yml).
        #[arg(short, long)]
        grammar: PathBuf,
        /// Parse this nonterminal instead of the grammar's start symbol.
        #[arg(long)]
        start: Option<String>,
        /// Print the tree as JSON instead of an indented dump.
        #[arg(long)]
        json: bool,
        /// The path to the source file to parse.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Parse every matching file in a directory and summarise the results.
    Check {
        /// The grammar table (.json, .yaml or .yml).
        #[arg(short, long)]
        grammar: PathBuf,
        /// File extensions to parse.
        #[arg(long = "ext", default_values_t = vec!["txt".to_string()])]
        extensions: Vec<String>,
        /// Parse this nonterminal instead of the grammar's start symbol.
        #[arg(long)]
        start: Option<String>,
        /// The directory to search.
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Validate a grammar table and describe its automata.
    Grammar {
        /// The grammar table (.json, .yaml or .yml).
        #[arg(required = true)]
        file: PathBuf,
    },
}
