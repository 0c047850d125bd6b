//! Parsing every source file under a directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::CheckConfig;
use crate::driver::Driver;
use crate::errors::ParseError;
use crate::grammar::{Grammar, GrammarError};

/// Result of parsing one file.
#[derive(Debug)]
pub enum CheckOutcome {
    Pass { path: PathBuf, nodes: usize },
    Fail { path: PathBuf, error: ParseError },
    /// A directory entry the walk could not read.
    Unreadable { path: PathBuf, reason: String },
}

impl CheckOutcome {
    pub fn path(&self) -> &Path {
        match self {
            CheckOutcome::Pass { path, .. }
            | CheckOutcome::Fail { path, .. }
            | CheckOutcome::Unreadable { path, .. } => path,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, CheckOutcome::Pass { .. })
    }
}

#[derive(Debug, Default)]
pub struct CheckReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl CheckReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_pass()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Files under `root` whose extension the config accepts, in path order.
/// Entries that cannot be read are skipped with a warning.
pub fn discover_sources<P: AsRef<Path>>(root: P, config: &CheckConfig) -> Vec<PathBuf> {
    walk(root.as_ref(), config).0
}

fn walk(root: &Path, config: &CheckConfig) -> (Vec<PathBuf>, Vec<(PathBuf, walkdir::Error)>) {
    let mut files = Vec::new();
    let mut unreadable = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        match entry {
            Ok(e) if e.file_type().is_file() && config.accepts(e.path()) => {
                files.push(e.path().to_path_buf());
            }
            Ok(_) => {}
            Err(error) => {
                let path = error.path().unwrap_or(root).to_path_buf();
                tracing::warn!(path = %path.display(), %error, "skipping unreadable entry");
                unreadable.push((path, error));
            }
        }
    }
    (files, unreadable)
}

/// Parses every discovered file. Only a bad start symbol aborts the run;
/// parse failures are collected in the report.
pub fn check_directory<P: AsRef<Path>>(
    grammar: &Grammar,
    root: P,
    config: &CheckConfig,
) -> Result<CheckReport, GrammarError> {
    let mut driver = Driver::with_config(grammar, &config.parse)?;
    let mut report = CheckReport::default();
    let (files, unreadable) = walk(root.as_ref(), config);
    for (path, error) in unreadable {
        report.outcomes.push(CheckOutcome::Unreadable {
            path,
            reason: error.to_string(),
        });
    }
    for path in files {
        let outcome = match driver.parse_file(&path) {
            Ok(tree) => CheckOutcome::Pass {
                path,
                nodes: tree.len(),
            },
            Err(error) => CheckOutcome::Fail { path, error },
        };
        tracing::debug!(path = %outcome.path().display(), pass = outcome.is_pass(), "checked");
        report.outcomes.push(outcome);
    }
    Ok(report)
}
