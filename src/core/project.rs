//! Project input resolution.
//!
//! A project file claims its inputs in one of two ways:
//!
//! - **Explicit** projects (`.vcxproj`, classic `.csproj`) list every file in
//!   `ItemGroup` children via `Include`.
//! - **Implicit** (SDK-style) projects own every file under their directory,
//!   except top-level `bin`/`obj`, minus `Remove` entries, plus any extra
//!   `Include` entries.
//!
//! Resolution never fails on bad content: unparseable XML yields an empty
//! manifest and missing files are filtered out. Only an I/O error reading the
//! project file is reported.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::msbuild::{split_item_list, ProjectXml};
use crate::util::{fs, path};

/// Directories directly under an implicit project that are never packaged.
pub const IMPLICIT_SKIPPED_DIRS: &[&str] = &["bin", "obj"];

/// How a project declares its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Explicit,
    Implicit,
}

/// Resolved inputs of one project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectManifest {
    /// Project file this manifest was resolved from
    pub project: PathBuf,
    pub kind: ProjectKind,
    /// Absolute, existing input files in order of first appearance
    pub files: Vec<PathBuf>,
}

impl ProjectManifest {
    fn empty(project: PathBuf) -> Self {
        ProjectManifest {
            project,
            kind: ProjectKind::Explicit,
            files: Vec::new(),
        }
    }
}

/// Resolves project files into their input file lists.
#[derive(Debug, Clone, Default)]
pub struct ProjectResolver {
    /// Paths never returned; relative ones resolve against each project's directory
    exclusions: Vec<PathBuf>,
}

impl ProjectResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver that always drops `exclusions`.
    pub fn with_exclusions(exclusions: Vec<PathBuf>) -> Self {
        ProjectResolver { exclusions }
    }

    pub fn exclusions(&self) -> &[PathBuf] {
        &self.exclusions
    }

    /// Resolve the inputs of the project at `project`.
    pub fn resolve(&self, project: &Path) -> Result<ProjectManifest> {
        let project = path::normalize(project);
        let project_dir = project.parent().unwrap_or(Path::new("")).to_path_buf();

        let bytes = std::fs::read(&project)
            .with_context(|| format!("failed to read project file: {}", project.display()))?;

        let text = match fs::decode_text(&bytes) {
            Some(text) => text,
            None => {
                tracing::debug!("{} is not valid UTF-8 or UTF-16, skipping", project.display());
                return Ok(ProjectManifest::empty(project));
            }
        };

        let xml = match ProjectXml::parse(&text) {
            Ok(xml) => xml,
            Err(e) => {
                tracing::debug!("{} is not a valid project ({}), skipping", project.display(), e);
                return Ok(ProjectManifest::empty(project));
            }
        };

        let kind = if xml.is_sdk_style() {
            ProjectKind::Implicit
        } else {
            ProjectKind::Explicit
        };
        tracing::debug!("{} is {:?}", project.display(), kind);

        let mut candidates = match kind {
            ProjectKind::Explicit => Vec::new(),
            ProjectKind::Implicit => implicit_files(&xml, &project_dir),
        };

        for include in xml.includes() {
            for spec in split_item_list(include) {
                expand_include(&project_dir, spec, &mut candidates);
            }
        }

        candidates.retain(|candidate| {
            let keep = *candidate != project && candidate.is_file();
            if !keep {
                tracing::trace!("dropping {}", candidate.display());
            }
            keep
        });

        let exclusions: HashSet<PathBuf> = self
            .exclusions
            .iter()
            .map(|e| path::resolve_path(&project_dir, e))
            .collect();
        candidates.retain(|candidate| !exclusions.contains(candidate));

        let mut seen = HashSet::new();
        candidates.retain(|candidate| seen.insert(candidate.clone()));

        Ok(ProjectManifest {
            project,
            kind,
            files: candidates,
        })
    }
}

/// The implicit file set: the directory tree minus `Remove` entries.
fn implicit_files(xml: &ProjectXml<'_>, project_dir: &Path) -> Vec<PathBuf> {
    let mut files = fs::walk_files(project_dir, IMPLICIT_SKIPPED_DIRS);

    let removed: HashSet<PathBuf> = xml
        .removes()
        .flat_map(split_item_list)
        .map(|spec| path::resolve(project_dir, spec))
        .collect();

    files.retain(|file| !removed.contains(file));
    files
}

/// Add the files named by one `Include` spec, expanding wildcards.
fn expand_include(project_dir: &Path, spec: &str, out: &mut Vec<PathBuf>) {
    if path::has_wildcard(spec) {
        let pattern = path::from_manifest_str(spec);
        out.extend(
            fs::glob_files(project_dir, &pattern)
                .iter()
                .map(|file| path::normalize(file)),
        );
    } else {
        out.push(path::resolve(project_dir, spec));
    }
}
