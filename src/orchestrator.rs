//! The patcher's per-file loop.
//!
//! Files are processed one at a time, to completion, in path order:
//! run the checker, parse its report, qualify symbols, and in write mode
//! persist the file and run the import organizer on it. A failure inside one
//! file is recorded as that file's outcome and the loop moves on.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use goqual_core::catalogue::FlatIndex;
use goqual_core::diagnostic::{parse_report, Diagnostic};
use goqual_core::engine::{FilePatch, Proposal};
use goqual_core::error::GoqualError;
use goqual_core::output::{FixMode, FixSummary, SkippedFile};
use goqual_core::workspace::SourceFile;

use crate::tools::ToolCommand;

/// Settings for one patcher run.
#[derive(Debug, Clone)]
pub struct FixOptions {
    /// Scan root; the checker runs here and diagnostics are relative to it.
    pub root: PathBuf,
    pub mode: FixMode,
}

/// External tools used by the run.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub checker: ToolCommand,
    /// `None` when the organizer could not be found.
    pub organizer: Option<ToolCommand>,
}

/// How one file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// No diagnostics were reported.
    Clean,
    /// Diagnostics were reported but none produced a change.
    Unchanged { diagnostics: usize },
    /// At least one line was rewritten (or would be, in dry-run mode).
    Changed { diagnostics: usize, lines: usize },
    /// The file was given up on.
    Skipped { reason: String },
}

/// Everything a patcher run produced.
#[derive(Debug, Default)]
pub struct FixRun {
    pub summary: FixSummary,
    pub proposals: Vec<Proposal>,
    pub skipped: Vec<SkippedFile>,
}

/// Run the patcher over `sources`.
pub fn run_fixes(
    index: &FlatIndex,
    sources: &[SourceFile],
    options: &FixOptions,
    tools: &Toolchain,
) -> FixRun {
    let mut run = FixRun::default();

    for source in sources {
        run.summary.files_scanned += 1;
        let outcome = process_file(index, source, options, tools, &mut run);
        match &outcome {
            FileOutcome::Skipped { reason } => {
                warn!("skipping {}: {}", source.relative, reason);
                run.summary.files_skipped += 1;
                run.skipped.push(SkippedFile {
                    file: source.relative.clone(),
                    reason: reason.clone(),
                });
            }
            FileOutcome::Changed { .. } => run.summary.files_changed += 1,
            FileOutcome::Clean | FileOutcome::Unchanged { .. } => {}
        }
        debug!("{}: {:?}", source.relative, outcome);
    }

    info!(
        "processed {} files: {} diagnostics, {} lines fixed, {} files changed",
        run.summary.files_scanned,
        run.summary.diagnostics_found,
        run.summary.fixes_applied,
        run.summary.files_changed
    );
    run
}

fn skipped(reason: impl Into<String>) -> FileOutcome {
    FileOutcome::Skipped {
        reason: reason.into(),
    }
}

fn process_file(
    index: &FlatIndex,
    source: &SourceFile,
    options: &FixOptions,
    tools: &Toolchain,
    run: &mut FixRun,
) -> FileOutcome {
    let report = match tools.checker.run_on(&source.path, &options.root) {
        Ok(report) => report,
        Err(e) => return skipped(format!("cannot run checker: {}", e)),
    };
    if report.timed_out {
        return skipped("checker timed out");
    }

    let diagnostics: Vec<Diagnostic> = parse_report(&report.combined, &options.root)
        .into_iter()
        .filter(|d| belongs_to(d, source))
        .collect();
    if !report.success && diagnostics.is_empty() {
        warn!(
            "{}: checker exited with {:?} and no usable diagnostics; treating file as clean",
            source.relative, report.exit_code
        );
        run.summary.checker_failures += 1;
    }
    run.summary.diagnostics_found += diagnostics.len();
    if diagnostics.is_empty() {
        return FileOutcome::Clean;
    }

    let content = match fs::read_to_string(&source.path) {
        Ok(content) => content,
        Err(e) => return skipped(format!("cannot read file: {}", e)),
    };
    let mut patch = match FilePatch::new(source.relative.clone(), &content, index) {
        Ok(patch) => patch,
        Err(e) => return skipped(e.to_string()),
    };
    let lines = patch.apply_all(&diagnostics);
    if !patch.is_changed() {
        return FileOutcome::Unchanged {
            diagnostics: diagnostics.len(),
        };
    }

    if options.mode == FixMode::Write {
        if let Err(e) = fs::write(&source.path, patch.content()) {
            let err = GoqualError::ApplyError {
                message: e.to_string(),
                file: Some(source.relative.clone()),
            };
            return skipped(err.to_string());
        }
        debug!("{}: wrote {} qualified lines", source.relative, lines);
        if !organize_imports(source, options, tools) {
            run.summary.organizer_failures += 1;
        }
    }

    run.summary.fixes_applied += lines;
    run.proposals.extend(patch.into_proposals());
    FileOutcome::Changed {
        diagnostics: diagnostics.len(),
        lines,
    }
}

/// Run the organizer on a rewritten file; `false` on any failure.
fn organize_imports(source: &SourceFile, options: &FixOptions, tools: &Toolchain) -> bool {
    let Some(organizer) = &tools.organizer else {
        warn!("{}: no import organizer available; imports left as-is", source.relative);
        return false;
    };
    match organizer.run_on(&source.path, &options.root) {
        Ok(output) if output.success => true,
        Ok(output) => {
            warn!(
                "{}: import organizer failed ({:?}): {}",
                source.relative,
                output.exit_code,
                output.combined.trim()
            );
            false
        }
        Err(e) => {
            warn!("{}: cannot run import organizer: {}", source.relative, e);
            false
        }
    }
}

/// Whether a diagnostic refers to `source`.
fn belongs_to(diagnostic: &Diagnostic, source: &SourceFile) -> bool {
    diagnostic.file == source.relative || Path::new(&diagnostic.file) == source.path
}
