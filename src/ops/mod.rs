//! High-level operations.
//!
//! This module contains the implementation of slnpack commands.

pub mod assemble;
pub mod package;

pub use assemble::{
    resolve_manifest, EntryOrigin, FileManifestEntry, ManifestAssembler, PackageManifest,
    ResolveOptions, SkippedEntry,
};
pub use package::{
    archive_member_name, default_output, pack, ArchiveFormat, PackOptions, PackResult,
};
