//! Archive writer for assembled manifests.
//!
//! Entries are written in manifest order under their archive paths, using
//! `/` separators. The archive is built in a temporary file next to the
//! output and moved into place once complete.

use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use tar::{Builder, HeaderMode};
use tempfile::NamedTempFile;

use crate::ops::assemble::{FileManifestEntry, PackageManifest};
use crate::util::shell::{Progress, Shell, Status};
use crate::util::{fs, hash, path};

/// Default gzip compression level.
pub const DEFAULT_COMPRESSION: u32 = 6;

/// Archive container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ArchiveFormat {
    #[serde(rename = "tar")]
    Tar,
    #[default]
    #[serde(rename = "tar.gz")]
    TarGz,
}

impl ArchiveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }

    /// Infer the format from an output file name: `.tar` is plain, anything else is gzipped.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("tar") => ArchiveFormat::Tar,
            _ => ArchiveFormat::TarGz,
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ArchiveFormat {
    type Err = ArchiveFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tar" => Ok(ArchiveFormat::Tar),
            "tar.gz" | "tgz" | "gz" => Ok(ArchiveFormat::TarGz),
            _ => Err(ArchiveFormatParseError(s.to_string())),
        }
    }
}

/// Error parsing an archive format option.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid archive format '{0}', valid values: tar, tar.gz")]
pub struct ArchiveFormatParseError(pub String);

/// Options for writing an archive.
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    /// Output file (None = `<solution dir>/<stem>.<ext>`)
    pub output: Option<PathBuf>,

    /// Container format (None = inferred from `output`)
    pub format: Option<ArchiveFormat>,

    /// Gzip level 0-9 (None = 6)
    pub compression: Option<u32>,

    /// Report what would be written without writing anything
    pub dry_run: bool,
}

/// Outcome of [`pack`].
#[derive(Debug, Clone, Serialize)]
pub struct PackResult {
    pub output: PathBuf,
    pub format: ArchiveFormat,
    /// Number of files written
    pub entries: usize,
    /// Total size of the files written, before compression
    pub bytes: u64,
    /// SHA-256 of the archive; None for dry runs
    pub sha256: Option<String>,
    /// Archive paths left out because they escape the archive root
    pub skipped: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Where an archive goes when no output is given.
pub fn default_output(manifest: &PackageManifest, format: ArchiveFormat) -> PathBuf {
    let dir = manifest.solution.parent().unwrap_or(Path::new(""));
    dir.join(format!(
        "{}.{}",
        manifest.archive_root.display(),
        format.extension()
    ))
}

/// The tar member name of an archive path, or None if it escapes the archive root.
pub fn archive_member_name(archive_path: &Path) -> Option<String> {
    let normalized = path::normalize(archive_path);
    let mut parts = Vec::new();

    for component in normalized.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Write the files of `manifest` into an archive.
pub fn pack(manifest: &PackageManifest, opts: &PackOptions, shell: &Shell) -> Result<PackResult> {
    let format = opts.format.unwrap_or_else(|| {
        opts.output
            .as_deref()
            .map(ArchiveFormat::from_path)
            .unwrap_or_default()
    });
    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| default_output(manifest, format));

    let level = opts.compression.unwrap_or(DEFAULT_COMPRESSION);
    if level > 9 {
        bail!("invalid compression level {} (expected 0-9)", level);
    }

    let mut members = Vec::new();
    let mut names = HashSet::new();
    let mut skipped = Vec::new();
    for entry in &manifest.entries {
        match archive_member_name(&entry.archive_path) {
            Some(name) if names.contains(&name) => {
                tracing::warn!("duplicate archive member {}", name);
                shell.warn(format!(
                    "{} is already in the archive, skipping {}",
                    name,
                    entry.absolute_path.display()
                ));
                skipped.push(entry.archive_path.clone());
            }
            Some(name) => {
                names.insert(name.clone());
                members.push((entry, name));
            }
            None => {
                tracing::warn!("{} escapes the archive root", entry.archive_path.display());
                shell.status(
                    Status::Skipped,
                    format!("{} (outside the archive root)", entry.archive_path.display()),
                );
                skipped.push(entry.archive_path.clone());
            }
        }
    }

    if opts.dry_run {
        let mut bytes = 0;
        for (entry, name) in &members {
            bytes += file_len(&entry.absolute_path)?;
            shell.verbose(Status::Added, name);
        }
        return Ok(PackResult {
            output,
            format,
            entries: members.len(),
            bytes,
            sha256: None,
            skipped,
            dry_run: true,
        });
    }

    let out_dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::ensure_dir(&out_dir)?;

    let tmp = NamedTempFile::new_in(&out_dir)
        .with_context(|| format!("failed to create temporary file in {}", out_dir.display()))?;

    let progress = shell.progress(members.len() as u64, "Packing");
    let bytes = match format {
        ArchiveFormat::Tar => {
            let mut builder = Builder::new(tmp.as_file());
            let bytes = append_members(&mut builder, &members, shell, &progress)?;
            builder
                .into_inner()
                .and_then(|mut file| file.flush())
                .context("failed to finish archive")?;
            bytes
        }
        ArchiveFormat::TarGz => {
            let encoder = GzEncoder::new(tmp.as_file(), Compression::new(level));
            let mut builder = Builder::new(encoder);
            let bytes = append_members(&mut builder, &members, shell, &progress)?;
            builder
                .into_inner()
                .and_then(|encoder| encoder.finish())
                .context("failed to finish archive")?;
            bytes
        }
    };
    progress.finish();

    tmp.as_file()
        .sync_all()
        .context("failed to flush archive to disk")?;
    tmp.persist(&output)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to write archive: {}", output.display()))?;

    let sha256 = hash::sha256_file(&output)?;
    tracing::info!("wrote {} ({} files)", output.display(), members.len());

    Ok(PackResult {
        output,
        format,
        entries: members.len(),
        bytes,
        sha256: Some(sha256),
        skipped,
        dry_run: false,
    })
}

fn append_members<W: Write>(
    builder: &mut Builder<W>,
    members: &[(&FileManifestEntry, String)],
    shell: &Shell,
    progress: &Progress,
) -> Result<u64> {
    builder.mode(HeaderMode::Deterministic);

    let mut bytes = 0;
    for (entry, name) in members {
        builder
            .append_path_with_name(&entry.absolute_path, name)
            .with_context(|| format!("failed to add {} to archive", entry.absolute_path.display()))?;
        bytes += file_len(&entry.absolute_path)?;
        shell.verbose(Status::Added, name);
        progress.inc(1);
    }
    Ok(bytes)
}

fn file_len(path: &Path) -> Result<u64> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("failed to read metadata: {}", path.display()))?;
    Ok(meta.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::assemble::{resolve_manifest, EntryOrigin, ManifestAssembler, ResolveOptions};
    use crate::test_support::SolutionFixture;
    use crate::util::shell::ColorChoice;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn quiet() -> Shell {
        Shell::from_flags(true, false, ColorChoice::Never, false)
    }

    fn demo() -> SolutionFixture {
        SolutionFixture::new("demo")
            .file("app/a.cpp")
            .file("app/b.h")
            .explicit_project("app/app.vcxproj", &["a.cpp", "b.h"])
    }

    fn member_names<R: Read>(archive: R) -> Vec<String> {
        let mut archive = tar::Archive::new(archive);
        archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_archive_format_parse() {
        assert_eq!("tar".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::Tar);
        assert_eq!("TAR.GZ".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::TarGz);
        assert_eq!("tgz".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::TarGz);
        let err = "zip".parse::<ArchiveFormat>().unwrap_err();
        assert!(err.to_string().contains("zip"));
    }

    #[test]
    fn test_archive_format_from_path() {
        assert_eq!(ArchiveFormat::from_path(Path::new("out.tar")), ArchiveFormat::Tar);
        assert_eq!(ArchiveFormat::from_path(Path::new("out.tar.gz")), ArchiveFormat::TarGz);
        assert_eq!(ArchiveFormat::from_path(Path::new("out")), ArchiveFormat::TarGz);
    }

    #[test]
    fn test_archive_member_name() {
        assert_eq!(
            archive_member_name(Path::new("demo/app/a.cpp")).as_deref(),
            Some("demo/app/a.cpp")
        );
        assert_eq!(
            archive_member_name(Path::new("demo/../shared/x.h")).as_deref(),
            Some("shared/x.h")
        );
        assert_eq!(archive_member_name(Path::new("demo/../../x.h")), None);
        assert_eq!(archive_member_name(Path::new("demo/..")), None);
    }

    #[test]
    fn test_pack_tar_gz_default_output() {
        let fixture = demo();
        let sln = fixture.write();
        let manifest = resolve_manifest(&sln, &ResolveOptions::default()).unwrap();

        let result = pack(&manifest, &PackOptions::default(), &quiet()).unwrap();
        assert_eq!(result.output, fixture.path("demo.tar.gz"));
        assert_eq!(result.format, ArchiveFormat::TarGz);
        assert_eq!(result.entries, 4);
        assert_eq!(
            result.sha256.as_deref(),
            Some(hash::sha256_file(&result.output).unwrap().as_str())
        );

        let file = std::fs::File::open(&result.output).unwrap();
        assert_eq!(
            member_names(GzDecoder::new(file)),
            vec![
                "demo/demo.sln",
                "demo/app/app.vcxproj",
                "demo/app/a.cpp",
                "demo/app/b.h"
            ]
        );
    }

    #[test]
    fn test_pack_plain_tar_from_extension() {
        let fixture = demo();
        let sln = fixture.write();
        let manifest = resolve_manifest(&sln, &ResolveOptions::default()).unwrap();

        let opts = PackOptions {
            output: Some(fixture.path("dist/out.tar")),
            ..Default::default()
        };
        let result = pack(&manifest, &opts, &quiet()).unwrap();
        assert_eq!(result.format, ArchiveFormat::Tar);

        let file = std::fs::File::open(fixture.path("dist/out.tar")).unwrap();
        assert_eq!(member_names(file).len(), 4);
    }

    #[test]
    fn test_pack_replaces_existing_output() {
        let fixture = demo().file_with("out.tar", "stale");
        let sln = fixture.write();
        let manifest = resolve_manifest(&sln, &ResolveOptions::default()).unwrap();

        let opts = PackOptions {
            output: Some(fixture.path("out.tar")),
            ..Default::default()
        };
        pack(&manifest, &opts, &quiet()).unwrap();
        let file = std::fs::File::open(fixture.path("out.tar")).unwrap();
        assert_eq!(member_names(file).len(), 4);
    }

    #[test]
    fn test_pack_dry_run_writes_nothing() {
        let fixture = demo();
        let sln = fixture.write();
        let manifest = resolve_manifest(&sln, &ResolveOptions::default()).unwrap();

        let opts = PackOptions {
            dry_run: true,
            ..Default::default()
        };
        let result = pack(&manifest, &opts, &quiet()).unwrap();
        assert!(result.dry_run);
        assert_eq!(result.entries, 4);
        assert!(result.bytes > 0);
        assert!(result.sha256.is_none());
        assert!(!result.output.exists());
    }

    #[test]
    fn test_pack_skips_entries_outside_archive_root() {
        let fixture = SolutionFixture::new("demo").file("x.txt").file("a/b/inner.txt");
        let mut assembler = ManifestAssembler::new(&fixture.path("a/b/demo.sln"));
        assembler
            .register(&fixture.path("a/b/inner.txt"), EntryOrigin::SolutionItem)
            .unwrap();
        assembler
            .register(&fixture.path("x.txt"), EntryOrigin::SolutionItem)
            .unwrap();
        let manifest = assembler.finish();

        let opts = PackOptions {
            output: Some(fixture.path("out.tar")),
            ..Default::default()
        };
        let result = pack(&manifest, &opts, &quiet()).unwrap();
        assert_eq!(result.entries, 1);
        assert_eq!(result.skipped.len(), 1);

        let file = std::fs::File::open(fixture.path("out.tar")).unwrap();
        assert_eq!(member_names(file), vec!["demo/inner.txt"]);
    }

    #[test]
    fn test_pack_writes_each_member_name_once() {
        let fixture = SolutionFixture::new("demo")
            .file_with("proj/x.txt", "first")
            .file_with("demo/x.txt", "second");
        let manifest = PackageManifest {
            solution: fixture.path("proj/demo.sln"),
            archive_root: PathBuf::from("demo"),
            entries: vec![
                FileManifestEntry {
                    absolute_path: fixture.path("proj/x.txt"),
                    archive_path: PathBuf::from("demo/x.txt"),
                    origin: EntryOrigin::SolutionItem,
                },
                FileManifestEntry {
                    absolute_path: fixture.path("demo/x.txt"),
                    archive_path: PathBuf::from("demo/../demo/x.txt"),
                    origin: EntryOrigin::SolutionItem,
                },
            ],
            skipped: Vec::new(),
        };

        let opts = PackOptions {
            output: Some(fixture.path("out.tar")),
            ..Default::default()
        };
        let result = pack(&manifest, &opts, &quiet()).unwrap();
        assert_eq!(result.entries, 1);
        assert_eq!(result.skipped, vec![PathBuf::from("demo/../demo/x.txt")]);

        let file = std::fs::File::open(fixture.path("out.tar")).unwrap();
        assert_eq!(member_names(file), vec!["demo/x.txt"]);
    }

    #[test]
    fn test_pack_folds_solution_relative_duplicates() {
        let fixture = SolutionFixture::new("demo")
            .file("proj/x.txt")
            .file("demo/x.txt");
        let mut assembler = ManifestAssembler::new(&fixture.path("proj/demo.sln"));
        for rel in ["proj/x.txt", "demo/x.txt"] {
            assembler
                .register(&fixture.path(rel), EntryOrigin::SolutionItem)
                .unwrap();
        }
        let manifest = assembler.finish();

        let opts = PackOptions {
            output: Some(fixture.path("out.tar")),
            ..Default::default()
        };
        pack(&manifest, &opts, &quiet()).unwrap();

        let file = std::fs::File::open(fixture.path("out.tar")).unwrap();
        assert_eq!(member_names(file), vec!["demo/x.txt"]);
    }

    #[test]
    fn test_pack_rejects_bad_compression() {
        let fixture = demo();
        let sln = fixture.write();
        let manifest = resolve_manifest(&sln, &ResolveOptions::default()).unwrap();

        let opts = PackOptions {
            compression: Some(12),
            ..Default::default()
        };
        let err = pack(&manifest, &opts, &quiet()).unwrap_err();
        assert!(err.to_string().contains("compression level"));
    }
}
