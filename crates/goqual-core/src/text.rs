//! Text utilities for line-oriented editing.
//!
//! ## Coordinate Conventions
//!
//! - Line numbers are **1-indexed** (matching checker output and editors)
//! - Byte offsets are **0-indexed** and relative to the start of one line
//! - Spans are half-open `[start, end)` byte ranges
//!
//! [`SourceLines`] splits on `\n` only, so joining the lines back yields the
//! original bytes exactly (CRLF endings stay attached to their line as `\r`).

use std::path::Path;

use regex::Regex;

use crate::patch::Span;

// ============================================================================
// Source Lines
// ============================================================================

/// A file's content as an editable sequence of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLines {
    lines: Vec<String>,
}

impl SourceLines {
    /// Split content into lines on `\n`.
    pub fn parse(content: &str) -> Self {
        SourceLines {
            lines: content.split('\n').map(str::to_string).collect(),
        }
    }

    /// Get a line by its 1-indexed number.
    pub fn line(&self, line: u32) -> Option<&str> {
        let index = (line as usize).checked_sub(1)?;
        self.lines.get(index).map(String::as_str)
    }

    /// Replace a line by its 1-indexed number.
    ///
    /// Returns `false` if the line does not exist.
    pub fn replace(&mut self, line: u32, text: String) -> bool {
        let Some(index) = (line as usize).checked_sub(1) else {
            return false;
        };
        match self.lines.get_mut(index) {
            Some(slot) => {
                *slot = text;
                true
            }
            None => false,
        }
    }

    /// Join the lines back into file content.
    pub fn join(&self) -> String {
        self.lines.join("\n")
    }
}

// ============================================================================
// Word Occurrences
// ============================================================================

/// Find every word-boundary occurrence of `word` in `line`.
///
/// Spans are returned left to right and never overlap.
pub fn word_occurrences(line: &str, word: &str) -> Vec<Span> {
    if word.is_empty() {
        return Vec::new();
    }
    let pattern = format!(r"\b{}\b", regex::escape(word));
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };
    re.find_iter(line)
        .map(|m| Span::new(m.start(), m.end()))
        .collect()
}

// ============================================================================
// Paths
// ============================================================================

/// Render a path with forward slashes regardless of platform.
pub fn to_slash_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "/")
}

// ============================================================================
// Tests
// ============================================================================
