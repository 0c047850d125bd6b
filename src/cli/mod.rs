//! The pushdown command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::Path;
use std::{fs, process};

use clap::Parser as _;
use miette::Report;
use tracing_subscriber::EnvFilter;

use crate::check::check_directory;
use crate::cli::args::{Command, PushdownArgs};
use crate::config::{CheckConfig, ParseConfig};
use crate::driver::Driver;
use crate::errors::ParseError;
use crate::grammar::Grammar;
use crate::syntax::tokenizer::tokenize;
use crate::syntax::trace::TracingSink;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = PushdownArgs::parse();
    init_tracing(args.trace);

    // Dispatch to the appropriate subcommand handler.
    let result = match args.command {
        Command::Tokens { file } => handle_tokens(&file),
        Command::Parse {
            grammar,
            start,
            json,
            file,
        } => handle_parse(&grammar, ParseConfig { start }, json, &file),
        Command::Check {
            grammar,
            extensions,
            start,
            path,
        } => {
            let config = CheckConfig {
                extensions,
                parse: ParseConfig { start },
                ..CheckConfig::default()
            };
            handle_check(&grammar, &config, &path)
        }
        Command::Grammar { file } => handle_grammar(&file),
    };

    if let Err(report) = result {
        eprintln!("{:?}", report);
        process::exit(1);
    }
}

/// Installs a stderr subscriber when `--trace` is given or `RUST_LOG` is set.
fn init_tracing(trace: bool) {
    let filter = if trace {
        EnvFilter::new("pushdown=debug")
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => return,
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

/// Handles the `tokens` subcommand.
fn handle_tokens(path: &Path) -> Result<(), Report> {
    let source = read_source(path)?;
    output::print_tokens(tokenize(&source));
    Ok(())
}

/// Handles the `parse` subcommand.
fn handle_parse(grammar: &Path, config: ParseConfig, json: bool, file: &Path) -> Result<(), Report> {
    let grammar = Grammar::load(grammar)?;
    let mut driver = Driver::with_config(&grammar, &config)?.with_sink(TracingSink);
    let tree = driver.parse_file(file)?;
    if json {
        let text = serde_json::to_string_pretty(&tree.named(&grammar))
            .map_err(|e| miette::miette!("failed to serialize tree: {e}"))?;
        println!("{}", text);
    } else {
        print!("{}", tree.dump(&grammar));
    }
    Ok(())
}

/// Handles the `check` subcommand.
fn handle_check(grammar: &Path, config: &CheckConfig, root: &Path) -> Result<(), Report> {
    let grammar = Grammar::load(grammar)?;
    let report = check_directory(&grammar, root, config)?;
    output::print_check_report(&report, config.use_colors);
    if report.is_success() {
        Ok(())
    } else {
        Err(miette::miette!("{} of {} files failed to parse", report.failed(), report.outcomes.len()))
    }
}

/// Handles the `grammar` subcommand.
fn handle_grammar(path: &Path) -> Result<(), Report> {
    let grammar = Grammar::load(path)?;
    print!("{}", output::format_grammar(&grammar));
    Ok(())
}

fn read_source(path: &Path) -> Result<String, ParseError> {
    fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })
}
