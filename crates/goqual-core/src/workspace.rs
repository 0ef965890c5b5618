//! Go source discovery.
//!
//! Files are found by walking a root directory (recursively or one level),
//! or by explicit enumeration. Results are sorted by relative path so every
//! consumer sees the same order for an unchanged tree.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::{DirEntry, WalkDir};

use crate::error::GoqualError;
use crate::text::to_slash_path;

/// Extension of Go source files.
pub const GO_EXTENSION: &str = "go";

/// Suffix marking Go test files.
pub const TEST_FILE_SUFFIX: &str = "_test.go";

/// Directories never scanned. Names starting with `.` or `_` are skipped too,
/// matching the go tool's own rules.
const DEFAULT_EXCLUDE_DIRS: &[&str] = &["vendor", "testdata", "node_modules"];

// ============================================================================
// Scan Configuration
// ============================================================================

/// How to discover source files.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Glob patterns (matched against the root-relative path) to skip.
    pub exclude_patterns: Vec<String>,
    /// Skip `_test.go` files.
    pub skip_tests: bool,
    /// Whether to follow symlinks.
    pub follow_symlinks: bool,
}

impl ScanConfig {
    /// Recursive scan with no extra filters.
    pub fn recursive() -> Self {
        ScanConfig {
            recursive: true,
            ..Default::default()
        }
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Self {
        self.exclude_patterns.push(pattern.to_string());
        self
    }

    fn exclude_set(&self) -> Result<GlobSet, GoqualError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_patterns {
            builder.add(Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }
}

// ============================================================================
// Source Files
// ============================================================================

/// A discovered Go source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path usable for reading (root joined with the relative path).
    pub path: PathBuf,
    /// Path relative to the scan root, forward slashes.
    pub relative: String,
}

impl SourceFile {
    /// Whether this is a `_test.go` file.
    pub fn is_test(&self) -> bool {
        self.relative.ends_with(TEST_FILE_SUFFIX)
    }

    /// Relative directory holding the file (`""` for the root).
    pub fn relative_dir(&self) -> String {
        Path::new(&self.relative)
            .parent()
            .map(to_slash_path)
            .unwrap_or_default()
    }
}

fn is_go_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(GO_EXTENSION)
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.starts_with('_') || DEFAULT_EXCLUDE_DIRS.contains(&&*name)
}

/// Discover Go files under `root`.
///
/// Walk failures (unreadable directories, broken roots) are fatal.
pub fn discover_go_files(root: &Path, config: &ScanConfig) -> Result<Vec<SourceFile>, GoqualError> {
    if !root.is_dir() {
        return Err(GoqualError::file_not_found(root.display().to_string()));
    }
    let excludes = config.exclude_set()?;
    let max_depth = if config.recursive { usize::MAX } else { 1 };

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e))
    {
        let entry = entry.map_err(|e| GoqualError::WalkFailed {
            root: root.display().to_string(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() || !is_go_file(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let source = SourceFile {
            path: entry.path().to_path_buf(),
            relative: to_slash_path(relative),
        };
        if config.skip_tests && source.is_test() {
            continue;
        }
        if excludes.is_match(&source.relative) {
            tracing::debug!("excluded by glob: {}", source.relative);
            continue;
        }
        files.push(source);
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

/// Collect sources from explicit inputs: files are taken as-is, directories
/// are scanned with `config`. Duplicates collapse to one entry.
pub fn collect_sources(
    root: &Path,
    inputs: &[PathBuf],
    config: &ScanConfig,
) -> Result<Vec<SourceFile>, GoqualError> {
    let excludes = config.exclude_set()?;
    let mut by_relative: BTreeMap<String, SourceFile> = BTreeMap::new();

    for input in inputs {
        let full = if input.is_absolute() {
            input.clone()
        } else {
            root.join(input)
        };
        if full.is_dir() {
            for source in discover_go_files(&full, config)? {
                let relative = match source.path.strip_prefix(root) {
                    Ok(rel) => to_slash_path(rel),
                    Err(_) => to_slash_path(&source.path),
                };
                if excludes.is_match(&relative) {
                    continue;
                }
                by_relative.insert(
                    relative.clone(),
                    SourceFile {
                        path: source.path,
                        relative,
                    },
                );
            }
        } else if full.is_file() {
            if !is_go_file(&full) {
                continue;
            }
            let relative = match full.strip_prefix(root) {
                Ok(rel) => to_slash_path(rel),
                Err(_) => to_slash_path(&full),
            };
            let source = SourceFile {
                path: full,
                relative,
            };
            if (config.skip_tests && source.is_test()) || excludes.is_match(&source.relative) {
                continue;
            }
            by_relative.insert(source.relative.clone(), source);
        } else {
            return Err(GoqualError::file_not_found(full.display().to_string()));
        }
    }

    Ok(by_relative.into_values().collect())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for (path, content) in [
            ("main.go", "package main\n"),
            ("main_test.go", "package main\n"),
            ("README.md", "# readme\n"),
            ("pkga/a.go", "package pkga\n"),
            ("pkga/gen.pb.go", "package pkga\n"),
            ("pkgb/nested/n.go", "package nested\n"),
            ("vendor/dep/d.go", "package dep\n"),
            ("testdata/t.go", "package t\n"),
            (".hidden/h.go", "package h\n"),
            ("_scratch/s.go", "package s\n"),
        ] {
            let full = root.join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        dir
    }

    fn relatives(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.relative.as_str()).collect()
    }

    #[test]
    fn recursive_scan_skips_default_dirs() {
        let dir = tree();
        let files = discover_go_files(dir.path(), &ScanConfig::recursive()).unwrap();
        assert_eq!(
            relatives(&files),
            vec![
                "main.go",
                "main_test.go",
                "pkga/a.go",
                "pkga/gen.pb.go",
                "pkgb/nested/n.go"
            ]
        );
    }

    #[test]
    fn single_directory_scan() {
        let dir = tree();
        let files = discover_go_files(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(relatives(&files), vec!["main.go", "main_test.go"]);
    }

    #[test]
    fn exclude_glob_and_skip_tests() {
        let dir = tree();
        let mut config = ScanConfig::recursive().exclude("**/*.pb.go");
        config.skip_tests = true;
        let files = discover_go_files(dir.path(), &config).unwrap();
        assert_eq!(relatives(&files), vec!["main.go", "pkga/a.go", "pkgb/nested/n.go"]);
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let dir = tree();
        let config = ScanConfig::recursive().exclude("[oops");
        let err = discover_go_files(dir.path(), &config).unwrap_err();
        assert!(matches!(err, GoqualError::InvalidArguments { .. }));
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = discover_go_files(Path::new("/definitely/not/here"), &ScanConfig::recursive())
            .unwrap_err();
        assert!(matches!(err, GoqualError::FileNotFound { .. }));
    }

    #[test]
    fn explicit_inputs_are_deduplicated() {
        let dir = tree();
        let inputs = vec![
            PathBuf::from("pkga"),
            PathBuf::from("pkga/a.go"),
            PathBuf::from("main.go"),
            PathBuf::from("README.md"),
        ];
        let files = collect_sources(dir.path(), &inputs, &ScanConfig::default()).unwrap();
        assert_eq!(relatives(&files), vec!["main.go", "pkga/a.go", "pkga/gen.pb.go"]);
        assert_eq!(files[1].relative_dir(), "pkga");
        assert_eq!(files[0].relative_dir(), "");
    }

    #[test]
    fn explicit_missing_input_is_an_error() {
        let dir = tree();
        let err = collect_sources(dir.path(), &[PathBuf::from("nope")], &ScanConfig::default())
            .unwrap_err();
        assert!(matches!(err, GoqualError::FileNotFound { .. }));
    }
}
