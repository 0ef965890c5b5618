//! CLI front door.
//!
//! - `run_index`: scan a tree and write the catalogue document as JSON
//! - `run_fix`: qualify undefined symbols using a catalogue
//!
//! Both take already-parsed arguments and a writer for stdout, and return
//! `GoqualError` for the fatal cases; the binary turns those into a JSON
//! error envelope and an exit code.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use goqual_core::catalogue::CatalogueFile;
use goqual_core::config::Config;
use goqual_core::error::GoqualError;
use goqual_core::output::{emit_response, emit_response_compact, FixMode, FixResponse};
use goqual_core::workspace::{collect_sources, discover_go_files, ScanConfig, SourceFile};
use goqual_go::{build_catalogue, load_packages, IndexOptions};

use crate::orchestrator::{run_fixes, FixOptions, FixRun, Toolchain};
use crate::tools::{resolve_checker, resolve_organizer};

// ============================================================================
// Arguments
// ============================================================================

/// Output format for `fix`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report (default).
    #[default]
    Text,
    /// JSON response.
    Json,
}

/// When to highlight inserted qualifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Highlight when stdout is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn enabled(self) -> bool {
        match self {
            ColorMode::Auto => std::io::stdout().is_terminal(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Arguments of `goqual index`.
#[derive(Debug, Clone, Default)]
pub struct IndexArgs {
    /// Scan root; catalogue paths are relative to it.
    pub root: PathBuf,
    /// Files or directories to index; empty means the root.
    pub paths: Vec<PathBuf>,
    pub recursive: bool,
    pub exclude: Vec<String>,
    pub skip_tests: bool,
    /// Include the reverse symbol index.
    pub with_index: bool,
    /// Single-line JSON.
    pub compact: bool,
}

/// Arguments of `goqual fix`.
#[derive(Debug, Clone, Default)]
pub struct FixArgs {
    pub catalogue: PathBuf,
    pub root: PathBuf,
    pub dry_run: bool,
    pub format: OutputFormat,
    pub color: ColorMode,
    /// Overrides the configured checker program.
    pub checker: Option<String>,
    /// Overrides the configured organizer program.
    pub organizer: Option<String>,
    pub exclude: Vec<String>,
}

// ============================================================================
// Index
// ============================================================================

/// Index a tree and write the catalogue to `out`.
pub fn run_index(args: &IndexArgs, out: &mut impl Write) -> Result<(), GoqualError> {
    let root = canonical_root(&args.root)?;
    let config = Config::load_from_project(&root)?;
    let scan = scan_config(
        args.recursive,
        &config,
        &args.exclude,
        args.skip_tests || config.scan.skip_tests,
    );

    let sources = if args.paths.is_empty() {
        discover_go_files(&root, &scan)?
    } else {
        collect_sources(&root, &args.paths, &scan)?
    };
    tracing::info!("indexing {} Go files under {}", sources.len(), root.display());

    let packages = load_packages(&sources)?;
    let report = build_catalogue(
        &packages,
        IndexOptions {
            with_reverse_index: args.with_index,
        },
    );

    let written = if args.compact {
        emit_response_compact(&report.catalogue, out)
    } else {
        emit_response(&report.catalogue, out)
    };
    written.map_err(|e| GoqualError::internal(format!("cannot write catalogue: {}", e)))
}

// ============================================================================
// Fix
// ============================================================================

/// Qualify undefined symbols across the tree at `args.root`.
pub fn run_fix(args: &FixArgs, out: &mut impl Write) -> Result<FixRun, GoqualError> {
    let catalogue = CatalogueFile::load(&args.catalogue)?;
    if catalogue.index.is_empty() {
        tracing::warn!(
            "{} has no reverse index; build it with `goqual index --index`",
            args.catalogue.display()
        );
    }
    let index = catalogue.index.flatten();
    tracing::info!(
        "loaded {} index entries ({} distinct symbols) from {}",
        catalogue.index.len(),
        index.len(),
        args.catalogue.display()
    );

    let root = canonical_root(&args.root)?;
    let config = Config::load_from_project(&root)?;

    let checker_program = args
        .checker
        .as_deref()
        .unwrap_or(&config.checker.program);
    let organizer_program = args
        .organizer
        .as_deref()
        .unwrap_or(&config.organizer.program);
    let tools = Toolchain {
        checker: resolve_checker(
            checker_program,
            config.checker.args.clone(),
            config.checker.timeout(),
        )?,
        organizer: if args.dry_run {
            None
        } else {
            resolve_organizer(
                organizer_program,
                config.organizer.args.clone(),
                config.organizer.timeout(),
            )
        },
    };

    let scan = scan_config(true, &config, &args.exclude, config.scan.skip_tests);
    let sources: Vec<SourceFile> = discover_go_files(&root, &scan)?;

    let mode = if args.dry_run {
        FixMode::DryRun
    } else {
        FixMode::Write
    };
    let options = FixOptions { root, mode };
    let run = run_fixes(&index, &sources, &options, &tools);

    let written = match args.format {
        OutputFormat::Json => {
            let response = FixResponse::new(
                mode,
                run.summary.clone(),
                run.proposals.clone(),
                run.skipped.clone(),
            );
            emit_response(&response, out)
        }
        OutputFormat::Text => write_text_report(&run, mode, args.color.enabled(), out),
    };
    written.map_err(|e| GoqualError::internal(format!("cannot write report: {}", e)))?;
    Ok(run)
}

/// The scan root as an absolute path; checker output is relativized against it.
fn canonical_root(root: &Path) -> Result<PathBuf, GoqualError> {
    match root.canonicalize() {
        Ok(root) if root.is_dir() => Ok(root),
        _ => Err(GoqualError::file_not_found(root.display().to_string())),
    }
}

fn scan_config(recursive: bool, config: &Config, extra: &[String], skip_tests: bool) -> ScanConfig {
    ScanConfig {
        recursive,
        exclude_patterns: config
            .scan
            .exclude
            .iter()
            .chain(extra)
            .cloned()
            .collect(),
        skip_tests,
        follow_symlinks: false,
    }
}

/// Human-readable report of a fix run.
fn write_text_report(
    run: &FixRun,
    mode: FixMode,
    highlight: bool,
    out: &mut impl Write,
) -> std::io::Result<()> {
    for proposal in &run.proposals {
        match mode {
            FixMode::DryRun => {
                writeln!(out, "{}:{}", proposal.file, proposal.line)?;
                writeln!(out, "- {}", proposal.original)?;
                writeln!(out, "+ {}", proposal.render(highlight))?;
            }
            FixMode::Write => writeln!(
                out,
                "{}:{}: qualified {} as {}.{}",
                proposal.file, proposal.line, proposal.symbol, proposal.qualifier, proposal.symbol
            )?,
        }
    }
    for skipped in &run.skipped {
        writeln!(out, "skipped {}: {}", skipped.file, skipped.reason)?;
    }

    let summary = &run.summary;
    writeln!(
        out,
        "Found {} undefined symbol diagnostic(s)",
        summary.diagnostics_found
    )?;
    let verb = match mode {
        FixMode::DryRun => "would fix",
        FixMode::Write => "fixed",
    };
    writeln!(
        out,
        "{} {} line(s) in {} file(s) ({} scanned)",
        verb, summary.fixes_applied, summary.files_changed, summary.files_scanned
    )?;
    if summary.checker_failures > 0 {
        writeln!(out, "checker failed without diagnostics on {} file(s)", summary.checker_failures)?;
    }
    if summary.organizer_failures > 0 {
        writeln!(out, "import organizer failed on {} file(s)", summary.organizer_failures)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use goqual_core::engine::FilePatch;
    use goqual_core::output::FixSummary;
    use std::fs;
    use tempfile::TempDir;

    mod index {
        use super::*;

        #[test]
        fn writes_catalogue_json() {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("pkgb")).unwrap();
            fs::write(dir.path().join("pkgb/file.go"), "package pkgb\n\nfunc Foo() {}\n").unwrap();

            let mut out = Vec::new();
            run_index(
                &IndexArgs {
                    root: dir.path().to_path_buf(),
                    recursive: true,
                    with_index: true,
                    ..Default::default()
                },
                &mut out,
            )
            .unwrap();
            let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
            assert_eq!(value["index"]["functions"]["Foo"], "pkgb/file.go");
            assert_eq!(value["files"]["pkgb/file.go"]["functions"][0]["kind"], "function");
        }

        #[test]
        fn bad_exclude_glob_is_invalid_arguments() {
            let dir = TempDir::new().unwrap();
            let err = run_index(
                &IndexArgs {
                    root: dir.path().to_path_buf(),
                    exclude: vec!["[".to_string()],
                    ..Default::default()
                },
                &mut Vec::new(),
            )
            .unwrap_err();
            assert_eq!(err.error_code().code(), 2);
        }
    }

    mod fix {
        use super::*;

        #[test]
        fn missing_catalogue_is_a_resolution_error() {
            let dir = TempDir::new().unwrap();
            let err = run_fix(
                &FixArgs {
                    catalogue: dir.path().join("missing.json"),
                    root: dir.path().to_path_buf(),
                    ..Default::default()
                },
                &mut Vec::new(),
            )
            .unwrap_err();
            assert!(matches!(err, GoqualError::CatalogueUnreadable { .. }));
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn malformed_catalogue_is_a_resolution_error() {
            let dir = TempDir::new().unwrap();
            let catalogue = dir.path().join("cat.json");
            fs::write(&catalogue, "{ not json").unwrap();
            let err = run_fix(
                &FixArgs {
                    catalogue,
                    root: dir.path().to_path_buf(),
                    ..Default::default()
                },
                &mut Vec::new(),
            )
            .unwrap_err();
            assert!(matches!(err, GoqualError::CatalogueMalformed { .. }));
        }

        #[test]
        fn missing_checker_is_invalid_arguments() {
            let dir = TempDir::new().unwrap();
            let catalogue = dir.path().join("cat.json");
            fs::write(&catalogue, "{}").unwrap();
            let err = run_fix(
                &FixArgs {
                    catalogue,
                    root: dir.path().to_path_buf(),
                    checker: Some("goqual-no-such-checker".to_string()),
                    ..Default::default()
                },
                &mut Vec::new(),
            )
            .unwrap_err();
            assert_eq!(err.error_code().code(), 2);
        }
    }

    mod text_report {
        use super::*;

        fn run_with_proposal() -> FixRun {
            let index = [("Foo".to_string(), "pkgb/file.go".to_string())]
                .into_iter()
                .collect();
            let mut patch = FilePatch::new("pkga/a.go", "package pkga\nx := Foo()\n", &index).unwrap();
            patch.apply_all(&[goqual_core::diagnostic::Diagnostic {
                file: "pkga/a.go".to_string(),
                line: 2,
                col_start: 6,
                col_end: 9,
                symbol: "Foo".to_string(),
            }]);
            FixRun {
                summary: FixSummary {
                    files_scanned: 2,
                    diagnostics_found: 1,
                    fixes_applied: 1,
                    files_changed: 1,
                    ..Default::default()
                },
                proposals: patch.into_proposals(),
                skipped: vec![],
            }
        }

        #[test]
        fn dry_run_shows_line_pairs() {
            let mut out = Vec::new();
            write_text_report(&run_with_proposal(), FixMode::DryRun, false, &mut out).unwrap();
            let text = String::from_utf8(out).unwrap();
            assert_eq!(
                text,
                "pkga/a.go:2\n- x := Foo()\n+ x := pkgb.Foo()\n\
                 Found 1 undefined symbol diagnostic(s)\n\
                 would fix 1 line(s) in 1 file(s) (2 scanned)\n"
            );
        }

        #[test]
        fn write_mode_lists_qualified_symbols() {
            let mut out = Vec::new();
            write_text_report(&run_with_proposal(), FixMode::Write, false, &mut out).unwrap();
            let text = String::from_utf8(out).unwrap();
            assert!(text.starts_with("pkga/a.go:2: qualified Foo as pkgb.Foo\n"));
            assert!(text.contains("fixed 1 line(s) in 1 file(s)"));
        }
    }
}
