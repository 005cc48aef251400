//! Global context for slnpack operations.
//!
//! Provides centralized access to the working directory and configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{self, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Global config file (`~/.slnpack/config.toml`), if a home directory exists
    global_config: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        Ok(GlobalContext {
            cwd,
            global_config: config::global_config_path(),
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Use a different global config file.
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config = path;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resolve a user-supplied path against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        crate::util::path::resolve_path(&self.cwd, path)
    }

    /// Load the merged configuration for a solution living in `solution_dir`.
    pub fn load_config(&self, solution_dir: &Path) -> Config {
        config::load_config(
            self.global_config.as_deref(),
            &config::solution_config_path(solution_dir),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_against_cwd() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .unwrap()
            .with_global_config(None);

        assert_eq!(
            ctx.resolve(Path::new("app/app.sln")),
            crate::util::path::normalize(&tmp.path().join("app").join("app.sln"))
        );
    }

    #[test]
    fn test_load_config_without_global() {
        let tmp = TempDir::new().unwrap();
        let cfg_path = config::solution_config_path(tmp.path());
        std::fs::create_dir_all(cfg_path.parent().unwrap()).unwrap();
        std::fs::write(&cfg_path, "[resolve]\njobs = 3\n").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .unwrap()
            .with_global_config(None);
        assert_eq!(ctx.load_config(tmp.path()).resolve.jobs, Some(3));
    }
}
