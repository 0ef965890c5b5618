//! External tool invocation.
//!
//! The checker and the import organizer are both run the same way: one
//! process per file, the file path appended to the configured arguments,
//! stdout and stderr captured together. A timeout is optional; without one
//! the call blocks until the tool exits.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::warn;
use wait_timeout::ChildExt;

use goqual_core::error::GoqualError;

/// A resolved external tool.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

/// What a tool run produced.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit status was success.
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
    /// Stdout followed by stderr; empty after a timeout.
    pub combined: String,
    /// The process was killed after exceeding the timeout.
    pub timed_out: bool,
}

impl ToolCommand {
    /// Use `program` as given, without a lookup.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        ToolCommand {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Find `program` on `PATH` (or as a path, if it contains a separator).
    pub fn resolve(program: &str, args: Vec<String>) -> Result<Self, which::Error> {
        let path = which::which(program)?;
        Ok(ToolCommand::new(path, args))
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the tool on `file` with `cwd` as working directory.
    pub fn run_on(&self, file: &Path, cwd: &Path) -> io::Result<ToolOutput> {
        let start = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(file)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Pipes are drained while waiting; a full pipe would stall the child.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let Some(status) = self.wait(&mut child)? else {
            warn!(
                "{} timed out after {:?} on {}",
                self.program.display(),
                start.elapsed(),
                file.display()
            );
            // Forked descendants may still hold the pipes, so the drain
            // threads are left detached instead of joined.
            return Ok(ToolOutput {
                success: false,
                exit_code: None,
                combined: String::new(),
                timed_out: true,
            });
        };

        let mut combined = String::from_utf8_lossy(&join(stdout)).into_owned();
        combined.push_str(&String::from_utf8_lossy(&join(stderr)));
        Ok(ToolOutput {
            success: status.success(),
            exit_code: status.code(),
            combined,
            timed_out: false,
        })
    }

    /// Wait for exit; `None` if the timeout fired and the child was killed.
    fn wait(&self, child: &mut Child) -> io::Result<Option<ExitStatus>> {
        let Some(timeout) = self.timeout else {
            return child.wait().map(Some);
        };
        match child.wait_timeout(timeout)? {
            Some(status) => Ok(Some(status)),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Ok(None)
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Resolve the checker; a missing checker makes the run impossible.
pub fn resolve_checker(
    program: &str,
    args: Vec<String>,
    timeout: Option<Duration>,
) -> Result<ToolCommand, GoqualError> {
    ToolCommand::resolve(program, args)
        .map(|tool| tool.with_timeout(timeout))
        .map_err(|e| GoqualError::invalid_args(format!("checker '{}' not found: {}", program, e)))
}

/// Resolve the organizer; a missing organizer only degrades the run.
pub fn resolve_organizer(
    program: &str,
    args: Vec<String>,
    timeout: Option<Duration>,
) -> Option<ToolCommand> {
    match ToolCommand::resolve(program, args) {
        Ok(tool) => Some(tool.with_timeout(timeout)),
        Err(e) => {
            warn!("import organizer '{}' not found: {}", program, e);
            None
        }
    }
}
