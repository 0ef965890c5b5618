//! Package loading and catalogue assembly.
//!
//! Files are grouped into packages by directory and declared package name.
//! A file that cannot be read is logged and left out; a file with syntax
//! errors is still indexed from whatever tree-sitter recovered.

use std::collections::BTreeMap;
use std::fs;

use goqual_core::catalogue::{GlobalCatalogue, IndexCollision};
use goqual_core::workspace::SourceFile;

use crate::error::{GoError, GoResult};
use crate::extract::extract_declarations;
use crate::matcher::match_implementations;
use crate::oracle::SyntaxOracle;
use crate::parser::{GoParser, ParsedFile};

/// One parsed file of a package.
#[derive(Debug)]
pub struct LoadedFile {
    /// Path relative to the scan root.
    pub relative: String,
    pub parsed: ParsedFile,
}

/// Files sharing a directory and package clause.
#[derive(Debug)]
pub struct GoPackage {
    /// Directory relative to the scan root (`""` for the root).
    pub dir: String,
    /// Declared package name; `None` for files without a package clause.
    pub name: Option<String>,
    pub files: Vec<LoadedFile>,
}

/// Parse `sources` and group them into packages.
///
/// Only a broken grammar is fatal; unreadable files are skipped with a warning.
pub fn load_packages(sources: &[SourceFile]) -> GoResult<Vec<GoPackage>> {
    let mut parser = GoParser::new()?;
    let mut grouped: BTreeMap<(String, Option<String>), Vec<LoadedFile>> = BTreeMap::new();

    for source in sources {
        let content = match fs::read_to_string(&source.path) {
            Ok(content) => content,
            Err(e) => {
                let err = GoError::Read {
                    path: source.relative.clone(),
                    source: e,
                };
                tracing::warn!("skipping file: {}", err);
                continue;
            }
        };
        let parsed = match parser.parse(&source.relative, content) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("skipping file: {}", e);
                continue;
            }
        };
        if parsed.has_errors() {
            tracing::warn!("{}: syntax errors, indexing recovered declarations", source.relative);
        }
        let name = parsed.package_name().map(str::to_string);
        if name.is_none() {
            tracing::debug!("{}: no package clause", source.relative);
        }
        grouped
            .entry((source.relative_dir(), name))
            .or_default()
            .push(LoadedFile {
                relative: source.relative.clone(),
                parsed,
            });
    }

    Ok(grouped
        .into_iter()
        .map(|((dir, name), files)| GoPackage { dir, name, files })
        .collect())
}

/// What the indexer should produce besides per-file declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptions {
    /// Populate the reverse symbol index.
    pub with_reverse_index: bool,
}

/// Result of one indexing run.
#[derive(Debug)]
pub struct IndexReport {
    pub catalogue: GlobalCatalogue,
    /// Reverse-index overwrites, in the order they happened.
    pub collisions: Vec<IndexCollision>,
}

/// Build the catalogue for already-loaded packages.
pub fn build_catalogue(packages: &[GoPackage], options: IndexOptions) -> IndexReport {
    let files = packages
        .iter()
        .flat_map(|package| &package.files)
        .map(|file| (file.relative.clone(), extract_declarations(&file.parsed)))
        .collect();
    let mut catalogue = GlobalCatalogue::from_files(files);
    catalogue.implementations = match_implementations(&SyntaxOracle::new(packages));

    let mut collisions = Vec::new();
    if options.with_reverse_index {
        let (indexed, found) = catalogue.with_reverse_index();
        catalogue = indexed;
        collisions = found;
    }

    let declarations: usize = catalogue
        .files
        .values()
        .map(|decls| decls.declaration_count())
        .sum();
    tracing::info!(
        "indexed {} declarations from {} files in {} packages: {} implementation relations, {} index collisions",
        declarations,
        catalogue.files.len(),
        packages.len(),
        catalogue.implementation_count(),
        collisions.len()
    );
    IndexReport {
        catalogue,
        collisions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goqual_core::workspace::{discover_go_files, ScanConfig};
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let full = root.join(relative);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "pkga/a.go",
            "package pkga\n\nvar X = 1\n\ntype Shape interface {\n\tArea() float64\n}\n",
        );
        write(
            root,
            "pkgb/b.go",
            "package pkgb\n\nvar X = 2\n\ntype Square struct{}\n\nfunc (Square) Area() float64 { return 1 }\n\nfunc Foo() {}\n",
        );
        write(root, "pkgb/b_test.go", "package pkgb_test\n\nfunc TestFoo() {}\n");
        dir
    }

    fn load(root: &Path) -> Vec<GoPackage> {
        let sources = discover_go_files(root, &ScanConfig::recursive()).unwrap();
        load_packages(&sources).unwrap()
    }

    #[test]
    fn groups_by_directory_and_package_clause() {
        let dir = sample_tree();
        let packages = load(dir.path());
        let keys: Vec<(&str, Option<&str>)> = packages
            .iter()
            .map(|p| (p.dir.as_str(), p.name.as_deref()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("pkga", Some("pkga")),
                ("pkgb", Some("pkgb")),
                ("pkgb", Some("pkgb_test")),
            ]
        );
    }

    #[test]
    fn catalogue_without_reverse_index() {
        let dir = sample_tree();
        let report = build_catalogue(&load(dir.path()), IndexOptions::default());
        let catalogue = report.catalogue;
        assert_eq!(catalogue.files.len(), 3);
        assert!(catalogue.index.is_none());
        assert!(report.collisions.is_empty());
        let shapes: Vec<&str> = catalogue.implementations["pkga.Shape"]
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(shapes, vec!["*pkgb.Square", "pkgb.Square"]);
    }

    #[test]
    fn reverse_index_reports_collisions() {
        let dir = sample_tree();
        let report = build_catalogue(
            &load(dir.path()),
            IndexOptions {
                with_reverse_index: true,
            },
        );
        let index = report.catalogue.index.unwrap();
        assert_eq!(index.variables.len(), 1);
        assert_eq!(index.variables["X"], "pkgb/b.go");
        assert_eq!(index.functions["Foo"], "pkgb/b.go");
        assert_eq!(index.functions["Area"], "pkgb/b.go");
        assert_eq!(index.interfaces["Shape"], "pkga/a.go");
        assert_eq!(report.collisions.len(), 1);
        assert_eq!(report.collisions[0].name, "X");
        assert_eq!(report.collisions[0].previous, "pkga/a.go");
    }

    #[test]
    fn unreadable_files_are_skipped() {
        let dir = sample_tree();
        let mut sources = discover_go_files(dir.path(), &ScanConfig::recursive()).unwrap();
        sources.push(SourceFile {
            path: dir.path().join("gone/missing.go"),
            relative: "gone/missing.go".to_string(),
        });
        let packages = load_packages(&sources).unwrap();
        assert!(packages.iter().all(|p| p.dir != "gone"));
    }

    #[test]
    fn files_without_package_clause_are_kept_but_unlabelled() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "odd/odd.go", "type Loose struct{}\n");
        let packages = load(dir.path());
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, None);
        let report = build_catalogue(&packages, IndexOptions::default());
        assert!(report.catalogue.files.contains_key("odd/odd.go"));
        assert!(report.catalogue.implementations.is_empty());
    }
}
