//! Binary entry point for the goqual CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Build a catalogue of a Go tree, with the reverse symbol index
//! goqual index --recursive --index > catalogue.json
//!
//! # Preview qualifications for undefined symbols
//! goqual fix catalogue.json --dry-run
//!
//! # Rewrite files in place and organize their imports
//! goqual fix catalogue.json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use goqual::cli::{run_fix, run_index, ColorMode, FixArgs, IndexArgs, OutputFormat};
use goqual_core::error::{GoqualError, OutputErrorCode};
use goqual_core::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Go symbol catalogue indexer and package qualifier.
#[derive(Parser, Debug)]
#[command(
    name = "goqual",
    version,
    about = "Index Go declarations and qualify undefined symbols"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan Go sources and print the catalogue as JSON.
    ///
    /// Paths are resolved against the current directory, and the
    /// catalogue's file keys are relative to it.
    Index {
        /// Files or directories to index (default: current directory).
        paths: Vec<PathBuf>,

        /// Descend into subdirectories.
        #[arg(long, short = 'r')]
        recursive: bool,

        /// Glob of paths to leave out (repeatable).
        #[arg(long)]
        exclude: Vec<String>,

        /// Leave out `_test.go` files.
        #[arg(long)]
        skip_tests: bool,

        /// Include the reverse symbol index.
        #[arg(long = "index")]
        with_index: bool,

        /// Print single-line JSON.
        #[arg(long)]
        compact: bool,
    },
    /// Qualify undefined symbols reported by the checker.
    Fix {
        /// Catalogue file written by `goqual index --index`.
        catalogue: PathBuf,

        /// Print proposed changes without writing files.
        #[arg(long)]
        dry_run: bool,

        /// Scan root.
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Report format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Highlight inserted qualifiers in the dry-run report.
        #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
        color: ColorMode,

        /// Checker program (overrides the config file).
        #[arg(long)]
        checker: Option<String>,

        /// Import organizer program (overrides the config file).
        #[arg(long)]
        organizer: Option<String>,

        /// Glob of paths to leave out (repeatable).
        #[arg(long)]
        exclude: Vec<String>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing; `RUST_LOG` wins over `--log-level`.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), GoqualError> {
    match cli.command {
        Command::Index {
            paths,
            recursive,
            exclude,
            skip_tests,
            with_index,
            compact,
        } => {
            let root = std::env::current_dir().map_err(|e| {
                GoqualError::internal(format!("cannot determine current directory: {}", e))
            })?;
            let args = IndexArgs {
                root,
                paths,
                recursive,
                exclude,
                skip_tests,
                with_index,
                compact,
            };
            let mut stdout = io::stdout().lock();
            run_index(&args, &mut stdout)?;
            let _ = stdout.flush();
            Ok(())
        }
        Command::Fix {
            catalogue,
            dry_run,
            root,
            format,
            color,
            checker,
            organizer,
            exclude,
        } => {
            let args = FixArgs {
                catalogue,
                root,
                dry_run,
                format,
                color,
                checker,
                organizer,
                exclude,
            };
            let mut stdout = io::stdout().lock();
            run_fix(&args, &mut stdout)?;
            let _ = stdout.flush();
            Ok(())
        }
    }
}
