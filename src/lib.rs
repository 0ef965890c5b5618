//! goqual: Go symbol catalogue indexer and diagnostic-driven package qualifier.
//!
//! `goqual index` catalogues the declarations of a Go tree and the interfaces
//! each named type implements. `goqual fix` runs a checker on every file,
//! reads its "undefined: X" diagnostics, and prefixes `X` with the package
//! the catalogue says declares it.

// Core infrastructure - re-exported from goqual-core
pub use goqual_core::catalogue;
pub use goqual_core::config;
pub use goqual_core::diagnostic;
pub use goqual_core::engine;
pub use goqual_core::error;
pub use goqual_core::output;
pub use goqual_core::patch;
pub use goqual_core::text;
pub use goqual_core::workspace;

// Language adapter
pub use goqual_go as go;

// Patcher plumbing
pub mod orchestrator;
pub mod tools;

// Front door
pub mod cli;
