//! Go language support for goqual.
//!
//! This crate turns Go source into catalogue data:
//! - tree-sitter parsing of individual files
//! - Declaration extraction per file
//! - Method-set computation behind the `TypeOracle` capability
//! - Interface implementation matching
//! - Package loading and catalogue assembly

pub mod error;
pub mod extract;
pub mod index;
pub mod matcher;
pub mod oracle;
pub mod parser;

pub use error::GoError;
pub use index::{build_catalogue, load_packages, GoPackage, IndexOptions, IndexReport};
