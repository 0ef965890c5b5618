//! Parse "undefined symbol" diagnostics out of a checker report.
//!
//! The checker is run against exactly one file and its combined output is
//! scanned line by line. A line of the shape
//!
//! ```text
//! <path>:<line>:<col>-<col>: undefined: <name>
//! ```
//!
//! yields one [`Diagnostic`]. Every other line is dropped without error, so an
//! empty result cannot distinguish a clean file from a checker that failed
//! or printed an unexpected format.

use std::path::Path;

use serde::{Deserialize, Serialize};
use winnow::ascii::dec_uint;
use winnow::combinator::{opt, preceded};
use winnow::prelude::*;
use winnow::token::{one_of, rest, take_till};
use winnow::ModalResult;

use crate::text::to_slash_path;

/// Marker between the position and the symbol name.
const UNDEFINED_MARKER: &str = ": undefined: ";

/// One "undefined symbol" report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// File path, relative to the scan root when possible.
    pub file: String,
    /// 1-indexed line.
    pub line: u32,
    /// Start column as reported by the checker.
    pub col_start: u32,
    /// End column as reported by the checker.
    pub col_end: u32,
    /// The bare identifier, trimmed.
    pub symbol: String,
}

// ============================================================================
// Grammar
// ============================================================================

struct RawDiagnostic<'i> {
    path: &'i str,
    line: u32,
    col_start: u32,
    col_end: u32,
    symbol: &'i str,
}

/// `C:\` or `C:/` at the start of an absolute Windows path.
fn drive_prefix<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic()),
        ':',
        one_of(['\\', '/']),
    )
        .take()
        .parse_next(input)
}

fn path<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (opt(drive_prefix), take_till(1.., ':'))
        .take()
        .parse_next(input)
}

fn diagnostic_line<'i>(input: &mut &'i str) -> ModalResult<RawDiagnostic<'i>> {
    let path = path.parse_next(input)?;
    let line: u32 = preceded(':', dec_uint).parse_next(input)?;
    let col_start: u32 = preceded(':', dec_uint).parse_next(input)?;
    let col_end: u32 = preceded('-', dec_uint).parse_next(input)?;
    let symbol = preceded(UNDEFINED_MARKER, rest).parse_next(input)?;
    Ok(RawDiagnostic {
        path,
        line,
        col_start,
        col_end,
        symbol,
    })
}

// ============================================================================
// Public API
// ============================================================================

/// Parse one report line.
///
/// Returns `None` for any line that is not an undefined-symbol diagnostic.
pub fn parse_diagnostic_line(line: &str, root: &Path) -> Option<Diagnostic> {
    let raw = diagnostic_line.parse(line).ok()?;
    let symbol = raw.symbol.trim();
    if symbol.is_empty() {
        return None;
    }
    Some(Diagnostic {
        file: relativize(raw.path, root),
        line: raw.line,
        col_start: raw.col_start,
        col_end: raw.col_end,
        symbol: symbol.to_string(),
    })
}

/// Parse a whole checker report.
pub fn parse_report(report: &str, root: &Path) -> Vec<Diagnostic> {
    report
        .lines()
        .filter_map(|line| parse_diagnostic_line(line, root))
        .collect()
}

/// Make `raw` relative to `root`, falling back to the raw path.
fn relativize(raw: &str, root: &Path) -> String {
    match Path::new(raw).strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => to_slash_path(relative),
        _ => raw.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
