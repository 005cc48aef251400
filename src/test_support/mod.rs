//! Test utilities for slnpack unit tests.
//!
//! Resolution works against the real filesystem, so tests build small
//! solution trees in temporary directories instead of mocking I/O.
//!
//! # Example
//!
//! ```rust,ignore
//! use slnpack::test_support::SolutionFixture;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = SolutionFixture::new("demo")
//!         .file("app/main.cpp")
//!         .explicit_project("app/app.vcxproj", &["main.cpp"]);
//!     let sln = fixture.write();
//!     // Resolve `sln`...
//! }
//! ```

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};

use crate::util::path;

// Re-export fixtures for convenience
pub use fixtures::*;

/// Create `rel` (using `/`) under `dir`, including parent directories.
///
/// The file contains its own relative path so archives built from it have
/// distinct, non-empty members. Returns the normalized absolute path.
pub fn touch(dir: &Path, rel: &str) -> PathBuf {
    let path = path::normalize(&dir.join(rel));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create fixture dir");
    }
    fs::write(&path, rel).expect("failed to write fixture file");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_touch_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = touch(tmp.path(), "a/b/c.txt");
        assert!(path.is_file());
        assert_eq!(fs::read_to_string(&path).unwrap(), "a/b/c.txt");
    }
}
