//! Configuration handling for goqual
//!
//! Settings live in `.goqual/config.toml` under the scan root. Every field is
//! optional; command-line flags override what the file says.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::GoqualError;

/// Directory holding project configuration, relative to the scan root.
pub const CONFIG_DIR: &str = ".goqual";

/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// goqual configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Semantic checker settings
    #[serde(default)]
    pub checker: CheckerConfig,

    /// Import organizer settings
    #[serde(default)]
    pub organizer: OrganizerConfig,

    /// Source discovery settings
    #[serde(default)]
    pub scan: ScanSettings,
}

/// The external checker run once per file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckerConfig {
    /// Checker executable
    #[serde(default = "default_checker_program")]
    pub program: String,

    /// Arguments placed before the file path
    #[serde(default = "default_checker_args")]
    pub args: Vec<String>,

    /// Kill the checker after this many seconds (no limit when absent)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// The external import organizer run after a file is rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrganizerConfig {
    /// Organizer executable
    #[serde(default = "default_organizer_program")]
    pub program: String,

    /// Arguments placed before the file path
    #[serde(default = "default_organizer_args")]
    pub args: Vec<String>,

    /// Kill the organizer after this many seconds (no limit when absent)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Source discovery settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ScanSettings {
    /// Extra exclusion globs
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Skip `_test.go` files
    #[serde(default)]
    pub skip_tests: bool,
}

fn default_checker_program() -> String {
    "gopls".to_string()
}

fn default_checker_args() -> Vec<String> {
    vec!["check".to_string()]
}

fn default_organizer_program() -> String {
    "goimports".to_string()
}

fn default_organizer_args() -> Vec<String> {
    vec!["-w".to_string()]
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            program: default_checker_program(),
            args: default_checker_args(),
            timeout_secs: None,
        }
    }
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            program: default_organizer_program(),
            args: default_organizer_args(),
            timeout_secs: None,
        }
    }
}

impl CheckerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl OrganizerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, GoqualError> {
        toml::from_str(content).map_err(|e| GoqualError::Config {
            message: format!("failed to parse config file: {}", e),
        })
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, GoqualError> {
        let content = fs::read_to_string(path).map_err(|e| GoqualError::Config {
            message: format!("failed to read config file: {}", e),
        })?;
        Self::parse(&content)
    }

    /// Load `.goqual/config.toml` under `root`, or defaults if absent
    pub fn load_from_project(root: &Path) -> Result<Self, GoqualError> {
        let config_path = config_path(root);
        if config_path.exists() {
            tracing::debug!("loading config from {}", config_path.display());
            Self::load(&config_path)
        } else {
            Ok(Config::default())
        }
    }
}

/// Location of the project configuration file under `root`
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}
