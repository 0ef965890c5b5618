//! Error types and error code constants for goqual.
//!
//! `GoqualError` is the single error type surfaced by the CLI. Domain errors
//! from the Go adapter and from workspace scanning are bridged into it with
//! `From` impls so the front door can render one JSON error envelope.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad flags, bad globs, bad config)
//! - `3`: Resolution errors (catalogue or source root not found / not decodable)
//! - `4`: Apply errors (failed to write changes)
//! - `10`: Internal errors (walk failures, encoding failures)
//!
//! Only fatal conditions travel as `GoqualError`. Per-file failures in the
//! patcher are reported as outcomes and never abort a run.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed configuration).
    InvalidArguments = 2,
    /// Resolution errors (catalogue missing or malformed, root missing).
    ResolutionError = 3,
    /// Apply errors (failed to write changes).
    ApplyError = 4,
    /// Internal errors (bugs, unexpected state, walk failures).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum GoqualError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// The catalogue file could not be read.
    #[error("cannot read catalogue {path}: {reason}")]
    CatalogueUnreadable { path: String, reason: String },

    /// The catalogue file was read but could not be decoded.
    #[error("malformed catalogue {path}: {reason}")]
    CatalogueMalformed { path: String, reason: String },

    /// File or directory not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// A source file has no package clause.
    #[error("no package clause in {path}")]
    MissingPackage { path: String },

    /// Walking the source tree failed.
    #[error("cannot walk source tree at {root}: {message}")]
    WalkFailed { root: String, message: String },

    /// Failed to persist changes.
    #[error("apply error: {message}")]
    ApplyError {
        message: String,
        file: Option<String>,
    },

    /// Configuration file could not be read or parsed.
    #[error("config error: {message}")]
    Config { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&GoqualError> for OutputErrorCode {
    fn from(err: &GoqualError) -> Self {
        match err {
            GoqualError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            GoqualError::Config { .. } => OutputErrorCode::InvalidArguments,
            GoqualError::CatalogueUnreadable { .. } => OutputErrorCode::ResolutionError,
            GoqualError::CatalogueMalformed { .. } => OutputErrorCode::ResolutionError,
            GoqualError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            GoqualError::MissingPackage { .. } => OutputErrorCode::ResolutionError,
            GoqualError::ApplyError { .. } => OutputErrorCode::ApplyError,
            GoqualError::WalkFailed { .. } => OutputErrorCode::InternalError,
            GoqualError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<GoqualError> for OutputErrorCode {
    fn from(err: GoqualError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<globset::Error> for GoqualError {
    fn from(err: globset::Error) -> Self {
        GoqualError::InvalidArguments {
            message: format!("invalid exclude glob: {}", err),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl GoqualError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        GoqualError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        GoqualError::FileNotFound { path: path.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        GoqualError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
