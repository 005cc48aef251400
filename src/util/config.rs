//! Configuration file support for slnpack.
//!
//! slnpack supports two configuration file locations:
//! - Global: `~/.slnpack/config.toml` - User-wide defaults
//! - Solution: `<solution dir>/.slnpack/config.toml` - Per-solution overrides
//!
//! Solution config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ops::package::ArchiveFormat;

/// Name of the per-user and per-solution configuration directory.
pub const CONFIG_DIR_NAME: &str = ".slnpack";

/// slnpack configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Archive output settings
    pub package: PackageConfig,

    /// Resolution settings
    pub resolve: ResolveConfig,
}

/// Archive output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Archive format (`tar` or `tar.gz`)
    pub format: Option<String>,

    /// Gzip compression level, 0-9
    pub compression: Option<u32>,

    /// Output directory, relative to the solution directory
    pub output_dir: Option<PathBuf>,
}

/// Resolution configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Number of worker threads resolving projects (None = auto-detect)
    pub jobs: Option<usize>,

    /// Files never packaged, relative to the solution directory
    #[serde(default)]
    pub exclude: Vec<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.package.format.is_some() {
            self.package.format = other.package.format;
        }
        if other.package.compression.is_some() {
            self.package.compression = other.package.compression;
        }
        if other.package.output_dir.is_some() {
            self.package.output_dir = other.package.output_dir;
        }

        if other.resolve.jobs.is_some() {
            self.resolve.jobs = other.resolve.jobs;
        }
        // Exclusions accumulate rather than override
        self.resolve.exclude.extend(other.resolve.exclude);
    }

    /// Parse the archive format from config string.
    pub fn format(&self) -> Option<ArchiveFormat> {
        self.package.format.as_ref().and_then(|s| s.parse().ok())
    }
}

/// Load merged configuration from global and solution locations.
///
/// Order of precedence (highest to lowest):
/// 1. Solution config (`<solution dir>/.slnpack/config.toml`)
/// 2. Global config (`~/.slnpack/config.toml`)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, solution_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if solution_path.exists() {
        config.merge(Config::load_or_default(solution_path));
    }

    config
}

/// Get the global slnpack config directory (`~/.slnpack`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR_NAME))
}

/// Get the global config path (`~/.slnpack/config.toml`).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the per-solution config path (`<solution dir>/.slnpack/config.toml`).
pub fn solution_config_path(solution_dir: &Path) -> PathBuf {
    solution_dir.join(CONFIG_DIR_NAME).join("config.toml")
}
