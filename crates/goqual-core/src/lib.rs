//! Core infrastructure for goqual.
//!
//! This crate provides the language-agnostic pieces of the pipeline:
//! - Catalogue data model and the reverse symbol index
//! - Diagnostic parsing for "undefined symbol" reports
//! - Line-level fixes and the patch engine that applies them
//! - Workspace scanning and project configuration
//! - Error types, exit codes, and JSON output types

pub mod catalogue;
pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod output;
pub mod patch;
pub mod text;
pub mod workspace;
