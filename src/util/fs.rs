//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use walkdir::WalkDir;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Text encodings recognized by their byte-order mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

/// Detect the encoding from a leading byte-order mark and return the bytes after it.
fn sniff_bom(bytes: &[u8]) -> (Encoding, &[u8]) {
    if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        (Encoding::Utf8, rest)
    } else if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
        (Encoding::Utf16Le, rest)
    } else if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        (Encoding::Utf16Be, rest)
    } else {
        (Encoding::Utf8, bytes)
    }
}

fn utf16_units(bytes: &[u8], encoding: Encoding) -> impl Iterator<Item = u16> + '_ {
    bytes.chunks_exact(2).map(move |pair| match encoding {
        Encoding::Utf16Be => u16::from_be_bytes([pair[0], pair[1]]),
        _ => u16::from_le_bytes([pair[0], pair[1]]),
    })
}

/// Decode text as UTF-8, or UTF-16 when a UTF-16 byte-order mark is present.
///
/// Any byte-order mark is dropped. Returns None for malformed input.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    match sniff_bom(bytes) {
        (Encoding::Utf8, rest) => std::str::from_utf8(rest).ok().map(str::to_string),
        (encoding, rest) => {
            if rest.len() % 2 != 0 {
                return None;
            }
            char::decode_utf16(utf16_units(rest, encoding))
                .collect::<Result<String, _>>()
                .ok()
        }
    }
}

/// Read a text file, honoring a byte-order mark and replacing malformed sequences.
pub fn read_text_lossy(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))?;

    let text = match sniff_bom(&bytes) {
        (Encoding::Utf8, rest) => String::from_utf8_lossy(rest).into_owned(),
        (encoding, rest) => char::decode_utf16(utf16_units(rest, encoding))
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
    };
    Ok(text)
}

/// Recursively list every file under `root`.
///
/// Directories directly under `root` whose name matches one of `skip_top_level`
/// (case-insensitive) are not descended into. Deeper directories with the same
/// names are walked normally. Unreadable entries are skipped.
pub fn walk_files(root: &Path, skip_top_level: &[&str]) -> Vec<PathBuf> {
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.depth() == 1
                && entry.file_type().is_dir()
                && skip_top_level
                    .iter()
                    .any(|name| entry.file_name().to_string_lossy().eq_ignore_ascii_case(name)))
        });

    let mut files = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_dir() && entry.path().is_file() {
                    files.push(entry.into_path());
                }
            }
            Err(e) => {
                tracing::debug!("skipping unreadable entry under {}: {}", root.display(), e);
            }
        }
    }
    files
}

/// Find files matching a glob pattern relative to a base directory.
pub fn glob_files(base: &Path, pattern: &Path) -> Vec<PathBuf> {
    let full_pattern = base.join(pattern);
    let pattern_str = full_pattern.to_string_lossy();

    let mut results = Vec::new();
    match glob(&pattern_str) {
        Ok(paths) => {
            for entry in paths {
                match entry {
                    Ok(path) => {
                        if path.is_file() {
                            results.push(path);
                        }
                    }
                    Err(e) => {
                        tracing::debug!("glob error: {}", e);
                    }
                }
            }
        }
        Err(e) => {
            tracing::debug!("invalid glob pattern {}: {}", pattern_str, e);
        }
    }

    results.sort();
    results
}
