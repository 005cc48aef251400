//! Command implementations

pub mod completions;
pub mod list;
pub mod pack;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use slnpack::util::{path, Config, GlobalContext};

/// A solution named on the command line, with its merged configuration.
pub struct SolutionTarget {
    pub solution: PathBuf,
    pub dir: PathBuf,
    pub config: Config,
}

impl SolutionTarget {
    pub fn load(ctx: &GlobalContext, solution: &Path) -> Result<Self> {
        let solution = ctx.resolve(solution);
        if !solution.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
                .with_context(|| format!("solution not found: {}", solution.display()));
        }

        let dir = solution.parent().unwrap_or(Path::new("")).to_path_buf();
        let config = ctx.load_config(&dir);
        Ok(SolutionTarget {
            solution,
            dir,
            config,
        })
    }

    /// Base name of the solution file, used as the archive root.
    pub fn stem(&self) -> String {
        self.solution
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// CLI excludes (relative to the working directory) followed by
    /// config excludes (relative to the solution directory).
    pub fn exclusions(&self, ctx: &GlobalContext, cli: &[PathBuf]) -> Vec<PathBuf> {
        cli.iter()
            .map(|p| ctx.resolve(p))
            .chain(
                self.config
                    .resolve
                    .exclude
                    .iter()
                    .map(|p| path::resolve_path(&self.dir, p)),
            )
            .collect()
    }
}
