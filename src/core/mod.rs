//! Core data structures for slnpack.
//!
//! This module contains the document models the resolver works on:
//! - Solution text tokenizing and parsing
//! - A typed view over MSBuild project XML
//! - Per-project input resolution

pub mod lexer;
pub mod msbuild;
pub mod project;
pub mod solution;

pub use lexer::SolutionLexer;
pub use msbuild::ProjectXml;
pub use project::{ProjectKind, ProjectManifest, ProjectResolver};
pub use solution::{
    ProjectReference, SectionState, SolutionDocument, SolutionItem, SolutionParser,
    SOLUTION_FOLDER_TYPE_ID,
};
