//! Patch engine: resolve diagnostics against the reverse index and qualify
//! the offending symbols in one file's lines.
//!
//! The engine works on an in-memory copy of a file. It does not know about
//! dry-run or write mode; the caller decides whether to print the collected
//! [`Proposal`]s or persist [`FilePatch::content`].
//!
//! Per diagnostic:
//! 1. The symbol is looked up in the flattened reverse index; unknown
//!    symbols are ignored.
//! 2. The owning package is inferred from the defining file's directory
//!    ([`infer_package_name_from_path`]).
//! 3. If the owner is the file's own package, nothing is offered.
//! 4. Otherwise every unguarded occurrence on the diagnostic's line is
//!    qualified, rightmost first.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalogue::FlatIndex;
use crate::diagnostic::Diagnostic;
use crate::error::GoqualError;
use crate::patch::{apply_line_fixes, plan_line_fixes, render_proposed, Fix};
use crate::text::SourceLines;

static PACKAGE_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*package\s+([\p{L}_][\p{L}\p{Nd}_]*)").expect("package clause regex")
});

// ============================================================================
// Package Names
// ============================================================================

/// Read the declared package name from Go source text.
pub fn read_package_name(content: &str) -> Option<String> {
    PACKAGE_CLAUSE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Guess a package name from the directory holding `path`.
///
/// Assumes the directory name equals the declared package name, which does
/// not hold for every Go package (e.g. `package main` in `cmd/tool`).
/// Returns `None` for a file with no parent directory component.
pub fn infer_package_name_from_path(path: &Path) -> Option<String> {
    path.parent()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

// ============================================================================
// Proposals
// ============================================================================

/// One rewritten line, before and after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub file: String,
    pub line: u32,
    pub symbol: String,
    pub qualifier: String,
    pub original: String,
    pub proposed: String,
    #[serde(skip)]
    fixes: Vec<Fix>,
}

impl Proposal {
    /// The proposed line with inserted qualifiers optionally highlighted.
    pub fn render(&self, highlight: bool) -> String {
        render_proposed(&self.original, &self.fixes, highlight)
    }
}

/// Why a diagnostic produced no change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    /// The symbol is not in the reverse index.
    UnknownSymbol,
    /// The defining file's directory gives no package name.
    NoOwningPackage,
    /// The symbol belongs to the file's own package.
    SamePackage,
    /// The diagnostic line is outside the file.
    LineOutOfRange,
    /// Every occurrence on the line was guarded or none was found.
    NothingToQualify,
    /// The same (line, symbol) pair was already handled.
    Duplicate,
}

// ============================================================================
// File Patch
// ============================================================================

/// Editable state for one file under repair.
#[derive(Debug)]
pub struct FilePatch<'a> {
    path: String,
    package: String,
    lines: SourceLines,
    index: &'a FlatIndex,
    proposals: Vec<Proposal>,
    seen: HashSet<(u32, String)>,
    changed_lines: BTreeSet<u32>,
}

impl<'a> FilePatch<'a> {
    /// Prepare a file for patching.
    ///
    /// Fails if the content has no package clause.
    pub fn new(path: impl Into<String>, content: &str, index: &'a FlatIndex) -> Result<Self, GoqualError> {
        let path = path.into();
        let package =
            read_package_name(content).ok_or_else(|| GoqualError::MissingPackage { path: path.clone() })?;
        Ok(FilePatch {
            path,
            package,
            lines: SourceLines::parse(content),
            index,
            proposals: Vec::new(),
            seen: HashSet::new(),
            changed_lines: BTreeSet::new(),
        })
    }

    /// Resolve one diagnostic and qualify its symbol on the reported line.
    pub fn apply(&mut self, diagnostic: &Diagnostic) -> Result<&Proposal, Unresolved> {
        if !self.seen.insert((diagnostic.line, diagnostic.symbol.clone())) {
            return Err(Unresolved::Duplicate);
        }

        let symbol = diagnostic.symbol.as_str();
        let Some(defining_file) = self.index.get(symbol) else {
            debug!("{}: {} not in catalogue", self.path, symbol);
            return Err(Unresolved::UnknownSymbol);
        };
        let Some(owner) = infer_package_name_from_path(Path::new(defining_file)) else {
            debug!("{}: no package directory for {}", self.path, defining_file);
            return Err(Unresolved::NoOwningPackage);
        };
        if owner == self.package {
            debug!("{}: {} already belongs to package {}", self.path, symbol, owner);
            return Err(Unresolved::SamePackage);
        }

        let Some(original) = self.lines.line(diagnostic.line).map(str::to_string) else {
            return Err(Unresolved::LineOutOfRange);
        };
        let fixes = plan_line_fixes(&self.path, diagnostic.line, &original, symbol, &owner);
        if fixes.is_empty() {
            return Err(Unresolved::NothingToQualify);
        }

        let proposed = apply_line_fixes(&original, &fixes);
        if proposed != original {
            self.lines.replace(diagnostic.line, proposed.clone());
            self.changed_lines.insert(diagnostic.line);
        }
        self.proposals.push(Proposal {
            file: self.path.clone(),
            line: diagnostic.line,
            symbol: symbol.to_string(),
            qualifier: owner,
            original,
            proposed,
            fixes,
        });
        Ok(&self.proposals[self.proposals.len() - 1])
    }

    /// Apply every diagnostic; returns the number of distinct lines
    /// rewritten so far.
    pub fn apply_all<'d>(&mut self, diagnostics: impl IntoIterator<Item = &'d Diagnostic>) -> usize {
        for diagnostic in diagnostics {
            let _ = self.apply(diagnostic);
        }
        self.changed_lines.len()
    }

    /// Whether any line differs from the original content.
    pub fn is_changed(&self) -> bool {
        !self.changed_lines.is_empty()
    }

    pub fn into_proposals(self) -> Vec<Proposal> {
        self.proposals
    }

    /// The current file content.
    pub fn content(&self) -> String {
        self.lines.join()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, &str)]) -> FlatIndex {
        entries
            .iter()
            .map(|(name, path)| (name.to_string(), path.to_string()))
            .collect()
    }

    fn diag(line: u32, symbol: &str) -> Diagnostic {
        Diagnostic {
            file: "pkga/a.go".to_string(),
            line,
            col_start: 1,
            col_end: 1,
            symbol: symbol.to_string(),
        }
    }

    const PKGA: &str = "package pkga\n\nimport \"fmt\"\n\nfunc run() {\n\tx := Foo()\n\tfmt.Println(x)\n}\n";

    mod package_names {
        use super::*;

        #[test]
        fn reads_package_clause() {
            assert_eq!(read_package_name(PKGA), Some("pkga".to_string()));
            assert_eq!(
                read_package_name("// Package doc.\n\npackage   server // trailing\n"),
                Some("server".to_string())
            );
        }

        #[test]
        fn missing_package_clause() {
            assert_eq!(read_package_name("func main() {}\n"), None);
            assert_eq!(read_package_name("// package fake\n"), None);
        }

        #[test]
        fn infers_from_parent_directory() {
            assert_eq!(
                infer_package_name_from_path(Path::new("pkgb/file.go")),
                Some("pkgb".to_string())
            );
            assert_eq!(
                infer_package_name_from_path(Path::new("/abs/internal/store/db.go")),
                Some("store".to_string())
            );
            assert_eq!(infer_package_name_from_path(Path::new("main.go")), None);
        }
    }

    mod resolution {
        use super::*;

        #[test]
        fn qualifies_symbol_from_other_package() {
            let idx = index(&[("Foo", "pkgb/file.go")]);
            let mut patch = FilePatch::new("pkga/a.go", PKGA, &idx).unwrap();

            let proposal = patch.apply(&diag(6, "Foo")).unwrap();
            assert_eq!(proposal.original, "\tx := Foo()");
            assert_eq!(proposal.proposed, "\tx := pkgb.Foo()");
            assert_eq!(proposal.qualifier, "pkgb");
            assert!(patch.is_changed());
            assert!(patch.content().contains("\tx := pkgb.Foo()\n"));
        }

        #[test]
        fn unknown_symbol_is_ignored() {
            let idx = index(&[]);
            let mut patch = FilePatch::new("pkga/a.go", PKGA, &idx).unwrap();
            assert_eq!(patch.apply(&diag(6, "Foo")).unwrap_err(), Unresolved::UnknownSymbol);
            assert!(!patch.is_changed());
            assert_eq!(patch.content(), PKGA);
        }

        #[test]
        fn same_package_is_not_qualified() {
            let idx = index(&[("Foo", "pkga/other.go")]);
            let mut patch = FilePatch::new("pkga/a.go", PKGA, &idx).unwrap();
            assert_eq!(patch.apply(&diag(6, "Foo")).unwrap_err(), Unresolved::SamePackage);
            assert_eq!(patch.content(), PKGA);
        }

        #[test]
        fn root_level_owner_has_no_package() {
            let idx = index(&[("Foo", "file.go")]);
            let mut patch = FilePatch::new("pkga/a.go", PKGA, &idx).unwrap();
            assert_eq!(patch.apply(&diag(6, "Foo")).unwrap_err(), Unresolved::NoOwningPackage);
        }

        #[test]
        fn line_out_of_range() {
            let idx = index(&[("Foo", "pkgb/file.go")]);
            let mut patch = FilePatch::new("pkga/a.go", PKGA, &idx).unwrap();
            assert_eq!(patch.apply(&diag(99, "Foo")).unwrap_err(), Unresolved::LineOutOfRange);
        }

        #[test]
        fn field_label_only_line_is_untouched() {
            let content = "package main\n\nvar v = Foo{Bar: 1}\n";
            let idx = index(&[("Bar", "other/bar.go")]);
            let mut patch = FilePatch::new("main/v.go", content, &idx).unwrap();
            assert_eq!(patch.apply(&diag(3, "Bar")).unwrap_err(), Unresolved::NothingToQualify);
            assert_eq!(patch.content(), content);
        }

        #[test]
        fn missing_package_is_an_error() {
            let idx = index(&[]);
            let err = FilePatch::new("bad.go", "func f() {}\n", &idx).unwrap_err();
            assert!(matches!(err, GoqualError::MissingPackage { .. }));
        }
    }

    mod convergence {
        use super::*;

        #[test]
        fn repeated_diagnostics_on_one_line_qualify_once() {
            let content = "package pkga\n\nfunc f() int {\n\treturn Foo(Foo(1))\n}\n";
            let idx = index(&[("Foo", "pkg/foo.go")]);
            let mut patch = FilePatch::new("pkga/f.go", content, &idx).unwrap();

            let mut first = diag(4, "Foo");
            first.col_start = 9;
            let mut second = diag(4, "Foo");
            second.col_start = 13;

            assert_eq!(patch.apply_all([&first, &second]), 1);
            assert!(patch.content().contains("\treturn pkg.Foo(pkg.Foo(1))\n"));
        }

        #[test]
        fn second_pass_changes_nothing() {
            let idx = index(&[("Foo", "pkgb/file.go")]);
            let mut first = FilePatch::new("pkga/a.go", PKGA, &idx).unwrap();
            first.apply_all([&diag(6, "Foo")]);
            let once = first.content();

            let mut second = FilePatch::new("pkga/a.go", &once, &idx).unwrap();
            second.apply_all([&diag(6, "Foo")]);
            assert!(!second.is_changed());
            assert_eq!(second.content(), once);
        }

        #[test]
        fn no_diagnostics_leaves_content_identical() {
            let content = "package pkga\r\n\r\nvar x = 1\r\n";
            let idx = index(&[("Foo", "pkgb/file.go")]);
            let mut patch = FilePatch::new("pkga/x.go", content, &idx).unwrap();
            assert_eq!(patch.apply_all(std::iter::empty()), 0);
            assert!(!patch.is_changed());
            assert_eq!(patch.content(), content);
        }

        #[test]
        fn two_symbols_on_one_line_count_as_one_line() {
            let content = "package pkga\n\nvar v = Join(Split(s))\n";
            let idx = index(&[("Join", "strs/join.go"), ("Split", "strs/split.go")]);
            let mut patch = FilePatch::new("pkga/v.go", content, &idx).unwrap();
            assert_eq!(patch.apply_all([&diag(3, "Join"), &diag(3, "Split")]), 1);
            assert_eq!(patch.content(), "package pkga\n\nvar v = strs.Join(strs.Split(s))\n");
            assert_eq!(patch.into_proposals()[1].original, "var v = strs.Join(Split(s))");
        }
    }
}
