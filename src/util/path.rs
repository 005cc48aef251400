//! Lexical path arithmetic for solution packaging.
//!
//! Solution and project files store paths relative to the file that declares
//! them, using `\` separators. Everything here is purely lexical: the only
//! filesystem access is reading the current directory in [`absolutize`].
//!
//! Identity comparisons between path segments are case-insensitive, which
//! matches how the IDE treats paths inside a solution.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Component, Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// Failure computing a path relative to another.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum PathError {
    #[error("path is not rooted: {}", .path.display())]
    #[diagnostic(code(slnpack::path::not_rooted))]
    NotRooted { path: PathBuf },

    #[error(
        "{} and {} do not share the same root",
        .path.display(),
        .base.display()
    )]
    #[diagnostic(
        code(slnpack::path::cross_root),
        help("Move the referenced files onto the same volume as the solution")
    )]
    CrossRoot { path: PathBuf, base: PathBuf },
}

/// Convert a path string read from a solution or project file into a native path.
pub fn from_manifest_str(raw: &str) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(raw)
    } else {
        PathBuf::from(raw.replace('\\', "/"))
    }
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent.
///
/// `..` directly under the root stays at the root. Leading `..` in a
/// relative path are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(part) => out.push(part),
        }
    }

    out
}

/// Make a path absolute against the current directory and normalize it.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&std::env::current_dir()?.join(path)))
    }
}

/// Resolve a path read from a manifest against the directory that declares it.
pub fn resolve(base_dir: &Path, raw: &str) -> PathBuf {
    resolve_path(base_dir, &from_manifest_str(raw))
}

/// Resolve an already-native path against `base_dir` unless it is absolute.
pub fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base_dir.join(path))
    }
}

/// Compare two path segments the way the IDE does.
pub fn segments_eq(a: &OsStr, b: &OsStr) -> bool {
    a == b || a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}

/// Split a normalized path into its root (prefix plus root dir) and the
/// remaining segments.
fn split_root(path: &Path) -> (OsString, Vec<&OsStr>) {
    let mut root = OsString::new();
    let mut parts = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => root.push(component.as_os_str()),
            other => parts.push(other.as_os_str()),
        }
    }

    (root, parts)
}

/// Compute `path` relative to the directory `base`.
///
/// Both paths must be rooted and share the same root. The longest common
/// prefix of segments is stripped, one `..` is emitted per remaining base
/// segment, then the remaining target segments are appended.
pub fn relative_path(path: &Path, base: &Path) -> Result<PathBuf, PathError> {
    if !path.has_root() {
        return Err(PathError::NotRooted {
            path: path.to_path_buf(),
        });
    }
    if !base.has_root() {
        return Err(PathError::NotRooted {
            path: base.to_path_buf(),
        });
    }

    let path = normalize(path);
    let base = normalize(base);
    let (path_root, path_parts) = split_root(&path);
    let (base_root, base_parts) = split_root(&base);

    if !segments_eq(&path_root, &base_root) {
        return Err(PathError::CrossRoot { path, base });
    }

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| segments_eq(a, b))
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part);
    }

    Ok(relative)
}

/// Does this item spec contain glob wildcards?
pub fn has_wildcard(raw: &str) -> bool {
    raw.contains(['*', '?'])
}
