//! Errors raised while loading Go sources.

use goqual_core::error::GoqualError;
use thiserror::Error;

/// Errors from the Go adapter.
#[derive(Debug, Error)]
pub enum GoError {
    /// The bundled grammar could not be loaded into the parser.
    #[error("cannot load Go grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    /// The parser returned no tree.
    #[error("parser produced no syntax tree for {path}")]
    NoTree { path: String },

    /// A source file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for Go adapter operations.
pub type GoResult<T> = Result<T, GoError>;

impl From<GoError> for GoqualError {
    fn from(err: GoError) -> Self {
        match err {
            GoError::Read { path, .. } => GoqualError::FileNotFound { path },
            other => GoqualError::InternalError {
                message: other.to_string(),
            },
        }
    }
}
