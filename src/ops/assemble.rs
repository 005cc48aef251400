//! Whole-solution manifest assembly.
//!
//! Parses the solution, resolves every project, and registers each file
//! under an archive path of the form `<solution stem>/<path relative to the
//! solution directory>`, lexically normalized. Archive paths are unique; the
//! first registration of a path wins and later ones are recorded as skipped
//! duplicates.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use crate::core::{ProjectManifest, ProjectResolver, SolutionDocument};
use crate::util::path::{self, PathError};

/// Options for manifest resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Extra paths to leave out; relative ones resolve against the solution directory
    pub exclude: Vec<PathBuf>,

    /// Number of threads used to resolve projects (None = rayon default)
    pub jobs: Option<usize>,
}

/// Why a file is part of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryOrigin {
    Solution,
    SolutionItem,
    Project,
    ProjectInput { project: PathBuf },
}

/// One file to be written into the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileManifestEntry {
    pub absolute_path: PathBuf,
    pub archive_path: PathBuf,
    pub origin: EntryOrigin,
}

/// A registration that lost to an earlier entry with the same archive path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub absolute_path: PathBuf,
    pub archive_path: PathBuf,
}

/// The assembled manifest of one solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    pub solution: PathBuf,
    /// Leading archive directory, the solution's base name
    pub archive_root: PathBuf,
    pub entries: Vec<FileManifestEntry>,
    pub skipped: Vec<SkippedEntry>,
}

impl PackageManifest {
    pub fn archive_paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|e| e.archive_path.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects entries for one solution, deduplicating by archive path.
#[derive(Debug)]
pub struct ManifestAssembler {
    solution: PathBuf,
    solution_dir: PathBuf,
    archive_root: PathBuf,
    seen: HashSet<PathBuf>,
    entries: Vec<FileManifestEntry>,
    skipped: Vec<SkippedEntry>,
}

impl ManifestAssembler {
    /// Create an assembler for the solution at `solution` (absolute).
    pub fn new(solution: &Path) -> Self {
        let solution_dir = solution.parent().unwrap_or(Path::new("")).to_path_buf();
        let archive_root = PathBuf::from(solution.file_stem().unwrap_or_default());

        ManifestAssembler {
            solution: solution.to_path_buf(),
            solution_dir,
            archive_root,
            seen: HashSet::new(),
            entries: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Register a file. Returns `Ok(false)` if its archive path is already taken.
    pub fn register(&mut self, file: &Path, origin: EntryOrigin) -> Result<bool, PathError> {
        let relative = path::relative_path(file, &self.solution_dir)?;
        let archive_path = path::normalize(&self.archive_root.join(relative));

        if !self.seen.insert(archive_path.clone()) {
            tracing::info!("skipping duplicate {}", archive_path.display());
            self.skipped.push(SkippedEntry {
                absolute_path: file.to_path_buf(),
                archive_path,
            });
            return Ok(false);
        }

        self.entries.push(FileManifestEntry {
            absolute_path: file.to_path_buf(),
            archive_path,
            origin,
        });
        Ok(true)
    }

    /// Register a project file followed by its resolved inputs.
    pub fn register_project(&mut self, manifest: &ProjectManifest) -> Result<(), PathError> {
        self.register(&manifest.project, EntryOrigin::Project)?;
        for file in &manifest.files {
            self.register(
                file,
                EntryOrigin::ProjectInput {
                    project: manifest.project.clone(),
                },
            )?;
        }
        Ok(())
    }

    pub fn finish(self) -> PackageManifest {
        PackageManifest {
            solution: self.solution,
            archive_root: self.archive_root,
            entries: self.entries,
            skipped: self.skipped,
        }
    }
}

/// Resolve every file the solution at `solution` references.
pub fn resolve_manifest(solution: &Path, opts: &ResolveOptions) -> Result<PackageManifest> {
    let solution = path::absolutize(solution)
        .with_context(|| format!("failed to locate solution: {}", solution.display()))?;
    let doc = SolutionDocument::load(&solution)?;

    let user_excludes: HashSet<PathBuf> = opts
        .exclude
        .iter()
        .map(|p| path::resolve_path(doc.dir(), p))
        .collect();

    let mut assembler = ManifestAssembler::new(&solution);
    assembler.register(&solution, EntryOrigin::Solution)?;

    for item in doc.items() {
        if user_excludes.contains(&item.path) {
            tracing::debug!("excluding solution item {}", item.path.display());
            continue;
        }
        assembler.register(&item.path, EntryOrigin::SolutionItem)?;
    }

    let exclusions = doc
        .items()
        .iter()
        .map(|item| item.path.clone())
        .chain(user_excludes.iter().cloned())
        .collect();
    let resolver = ProjectResolver::with_exclusions(exclusions);

    let resolve_all = || {
        doc.projects()
            .par_iter()
            .map(|reference| resolver.resolve(&reference.path))
            .collect::<Vec<_>>()
    };
    let results = match opts.jobs {
        Some(jobs) => rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to start resolver threads")?
            .install(resolve_all),
        None => resolve_all(),
    };

    for result in results {
        let manifest = result?;
        assembler.register_project(&manifest)?;
    }

    let manifest = assembler.finish();
    tracing::info!(
        "resolved {}: {} file(s), {} duplicate(s) skipped",
        solution.display(),
        manifest.entries.len(),
        manifest.skipped.len()
    );
    Ok(manifest)
}
