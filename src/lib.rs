//! slnpack - Package a Visual Studio solution and every file it references
//!
//! This crate provides the library behind the `slnpack` CLI: solution
//! parsing, project input resolution, manifest assembly, and archive writing.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for slnpack unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It builds solution trees in temporary directories.
#[cfg(test)]
pub mod test_support;

pub use core::{ProjectManifest, ProjectResolver, SolutionDocument};
pub use ops::{pack, resolve_manifest, PackageManifest};
pub use util::context::GlobalContext;
