//! JSON output types and serialization for CLI responses.
//!
//! `goqual index` writes the catalogue document itself; `goqual fix --format
//! json` writes a [`FixResponse`]. Failures of either command are reported as
//! an [`ErrorResponse`].
//!
//! Every response has `status` as its first field and carries
//! `schema_version`. Output is deterministic: maps are ordered and lists are
//! emitted in processing order, which is path order.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::engine::Proposal;
use crate::error::{GoqualError, OutputErrorCode};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Fix Response
// ============================================================================

/// Whether the patcher persisted its changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixMode {
    DryRun,
    Write,
}

/// Counters for one patcher run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixSummary {
    /// Source files visited.
    pub files_scanned: usize,
    /// Undefined-symbol diagnostics parsed across all files.
    pub diagnostics_found: usize,
    /// Lines rewritten (or proposed, in dry-run mode).
    pub fixes_applied: usize,
    /// Files whose content changed.
    pub files_changed: usize,
    /// Files skipped after an error.
    pub files_skipped: usize,
    /// Checker runs that exited non-zero without a parseable diagnostic.
    pub checker_failures: usize,
    /// Organizer runs that failed after a write.
    pub organizer_failures: usize,
}

/// A file the patcher gave up on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

/// Response for `goqual fix --format json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    pub mode: FixMode,
    pub summary: FixSummary,
    /// Every rewritten line, in file then line order.
    pub proposals: Vec<Proposal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
}

impl FixResponse {
    pub fn new(
        mode: FixMode,
        summary: FixSummary,
        proposals: Vec<Proposal>,
        skipped: Vec<SkippedFile>,
    ) -> Self {
        FixResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            mode,
            summary,
            proposals,
            skipped,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error information for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code, also used as the process exit status.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// File the error concerns, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl ErrorInfo {
    /// Create from a GoqualError.
    pub fn from_error(err: &GoqualError) -> Self {
        let file = match err {
            GoqualError::CatalogueUnreadable { path, .. }
            | GoqualError::CatalogueMalformed { path, .. }
            | GoqualError::FileNotFound { path }
            | GoqualError::MissingPackage { path } => Some(path.clone()),
            GoqualError::ApplyError { file, .. } => file.clone(),
            _ => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            file,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a GoqualError.
    pub fn from_error(err: &GoqualError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Response Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
///
/// The output is deterministic: same input produces identical bytes.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
