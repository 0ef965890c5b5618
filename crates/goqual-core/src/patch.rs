//! Line-level fixes: qualify bare symbol occurrences with a package name.
//!
//! A [`Fix`] is a byte-range replacement on one line of one file: the bare
//! symbol at `span` becomes `<qualifier>.<symbol>`. Fixes for a line are
//! planned left to right and applied right to left, so inserting a qualifier
//! never shifts the offsets of a fix that has not been applied yet.
//!
//! Planning skips occurrences rejected by the guard predicates
//! [`looks_like_field_label`] and [`looks_like_selector`]. Both are textual
//! heuristics and can be swapped for semantic checks without touching the
//! rest of the pipeline.

use anstyle::{AnsiColor, Style};
use serde::{Deserialize, Serialize};

use crate::text::word_occurrences;

// ============================================================================
// Span
// ============================================================================

/// Byte offsets into one line.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }
}

// ============================================================================
// Fix
// ============================================================================

/// Replace one bare symbol occurrence with its package-qualified form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    /// File the fix applies to (relative to the scan root).
    pub file: String,
    /// 1-indexed line number.
    pub line: u32,
    /// Byte range of the bare symbol within the line.
    pub span: Span,
    /// The bare symbol.
    pub symbol: String,
    /// Package name to insert in front of the symbol.
    pub qualifier: String,
}

impl Fix {
    /// The text that replaces the span.
    pub fn replacement(&self) -> String {
        format!("{}.{}", self.qualifier, self.symbol)
    }
}

// ============================================================================
// Guards
// ============================================================================

/// The occurrence is immediately followed by `:`, as in a struct literal
/// field label (`Foo{Bar: 1}`).
pub fn looks_like_field_label(line: &str, occurrence: Span) -> bool {
    line.get(occurrence.end..)
        .is_some_and(|rest| rest.starts_with(':'))
}

/// The occurrence is immediately preceded by `.`, i.e. it is already the
/// selected name of a qualified identifier or a field/method selector.
pub fn looks_like_selector(line: &str, occurrence: Span) -> bool {
    line.get(..occurrence.start)
        .is_some_and(|head| head.ends_with('.'))
}

// ============================================================================
// Planning and Applying
// ============================================================================

/// Plan the fixes that qualify `symbol` on one line.
///
/// Every word-boundary occurrence is considered; guarded occurrences are
/// skipped. The result is ordered left to right.
pub fn plan_line_fixes(
    file: &str,
    line_number: u32,
    line: &str,
    symbol: &str,
    qualifier: &str,
) -> Vec<Fix> {
    word_occurrences(line, symbol)
        .into_iter()
        .filter(|span| !looks_like_field_label(line, *span))
        .filter(|span| !looks_like_selector(line, *span))
        .map(|span| Fix {
            file: file.to_string(),
            line: line_number,
            span,
            symbol: symbol.to_string(),
            qualifier: qualifier.to_string(),
        })
        .collect()
}

/// Apply fixes to a line, rightmost first.
///
/// Fixes whose span does not fit the line are ignored.
pub fn apply_line_fixes(line: &str, fixes: &[Fix]) -> String {
    splice_right_to_left(line, fixes, |fix| fix.replacement())
}

/// Render the proposed line, optionally styling each inserted qualifier.
pub fn render_proposed(line: &str, fixes: &[Fix], highlight: bool) -> String {
    if !highlight {
        return apply_line_fixes(line, fixes);
    }
    let style = qualifier_style();
    splice_right_to_left(line, fixes, |fix| {
        format!(
            "{}{}.{}{}",
            style.render(),
            fix.qualifier,
            style.render_reset(),
            fix.symbol
        )
    })
}

fn qualifier_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::Green.into()))
        .bold()
}

fn splice_right_to_left(line: &str, fixes: &[Fix], text: impl Fn(&Fix) -> String) -> String {
    let mut out = line.to_string();

    // Sort by span start descending (apply from end to start to preserve offsets)
    let mut ordered: Vec<&Fix> = fixes.iter().collect();
    ordered.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    for fix in ordered {
        let Span { start, end } = fix.span;
        if end > out.len() || !out.is_char_boundary(start) || !out.is_char_boundary(end) {
            continue;
        }
        out.replace_range(start..end, &text(fix));
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
