use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// A grammar table that cannot be loaded. These are configuration errors and
/// are reported before any parse starts.
#[derive(Debug, Error, Diagnostic)]
pub enum GrammarError {
    #[error("failed to read grammar table '{}'", path.display())]
    #[diagnostic(code(pushdown::grammar::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON grammar table")]
    #[diagnostic(code(pushdown::grammar::json))]
    Json(#[from] serde_json::Error),

    #[error("malformed YAML grammar table")]
    #[diagnostic(code(pushdown::grammar::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported grammar table format for '{}'", path.display())]
    #[diagnostic(
        code(pushdown::grammar::format),
        help("grammar tables must end in .json, .yaml or .yml")
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("invalid grammar table: {message}")]
    #[diagnostic(code(pushdown::grammar::invalid))]
    Invalid { message: String },

    #[error("unknown grammar symbol '{name}'")]
    #[diagnostic(code(pushdown::grammar::unknown_symbol))]
    UnknownSymbol { name: String },
}

impl GrammarError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        GrammarError::Invalid {
            message: message.into(),
        }
    }
}
