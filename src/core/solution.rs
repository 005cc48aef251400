//! Solution (`.sln`) parsing.
//!
//! A solution is read line by line. `Project(...)` lines declare either a real
//! project or a solution folder; folders may carry a `ProjectSection` whose
//! `key = value` lines name loose solution items.
//!
//! ```text
//! Project("{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}") = "app", "app\app.vcxproj", "{...}"
//! EndProject
//! Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "Solution Items", "Solution Items", "{...}"
//!     ProjectSection(SolutionItems) = preProject
//!         README.md = README.md
//!     EndProjectSection
//! EndProject
//! ```
//!
//! Malformed declarations are dropped line by line; only failing to read the
//! solution file itself is an error.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::core::lexer::{decode_dos_string, SolutionLexer};
use crate::util::{fs, path};

/// Type identifier of solution folders, which group items but are not projects.
pub const SOLUTION_FOLDER_TYPE_ID: &str = "{2150E333-8FDC-42A3-9474-1A3956D46DE8}";

/// A project declared in a solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReference {
    /// Absolute path of the project file
    pub path: PathBuf,
    /// Project type GUID, braces included
    pub type_id: String,
}

/// A loose file declared directly in the solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionItem {
    /// Absolute path of the file
    pub path: PathBuf,
}

/// The parse result of one solution file.
#[derive(Debug, Clone, Serialize)]
pub struct SolutionDocument {
    path: PathBuf,
    dir: PathBuf,
    projects: Vec<ProjectReference>,
    items: Vec<SolutionItem>,
}

impl SolutionDocument {
    /// Read and parse a solution file.
    ///
    /// `solution` should be absolute; relative references inside it resolve
    /// against its directory.
    pub fn load(solution: &Path) -> Result<Self> {
        let text = fs::read_text_lossy(solution)?;
        Ok(Self::parse(solution, &text))
    }

    /// Parse solution text as if it were read from `solution`.
    pub fn parse(solution: &Path, text: &str) -> Self {
        let dir = solution.parent().unwrap_or(Path::new("")).to_path_buf();

        let mut parser = SolutionParser::new(&dir);
        for line in text.lines() {
            parser.feed_line(line);
        }
        let (projects, items) = parser.finish();

        tracing::debug!(
            "parsed {}: {} project(s), {} solution item(s)",
            solution.display(),
            projects.len(),
            items.len()
        );

        SolutionDocument {
            path: solution.to_path_buf(),
            dir,
            projects,
            items,
        }
    }

    /// Path of the solution file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the solution file.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Project references in file order. May contain duplicates.
    pub fn projects(&self) -> &[ProjectReference] {
        &self.projects
    }

    /// Solution items in file order.
    pub fn items(&self) -> &[SolutionItem] {
        &self.items
    }
}

/// Where the parser is relative to solution-folder sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    /// Looking for `Project(` lines.
    Idle,
    /// Inside a solution folder, looking for its `ProjectSection`.
    SeekSection,
    /// Inside a folder's `ProjectSection`; lines are solution items.
    InSection,
    /// Past the section, waiting for the folder's `EndProject`.
    SeekEndProject,
}

/// What a `Project(` line declares.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Declaration {
    Folder,
    Project { type_id: String, path: String },
}

/// Line-driven solution parser.
#[derive(Debug)]
pub struct SolutionParser<'a> {
    dir: &'a Path,
    state: SectionState,
    projects: Vec<ProjectReference>,
    items: Vec<SolutionItem>,
}

impl<'a> SolutionParser<'a> {
    /// Create a parser resolving references against `dir`.
    pub fn new(dir: &'a Path) -> Self {
        SolutionParser {
            dir,
            state: SectionState::Idle,
            projects: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn state(&self) -> SectionState {
        self.state
    }

    /// Process one physical line.
    pub fn feed_line(&mut self, line: &str) {
        if self.state == SectionState::Idle {
            self.parse_project_line(line);
            return;
        }

        let trimmed = line.trim().to_ascii_lowercase();
        self.state = match self.state {
            SectionState::Idle => SectionState::Idle,
            SectionState::SeekSection => {
                if trimmed == "endproject" {
                    SectionState::Idle
                } else if trimmed.starts_with("projectsection") {
                    SectionState::InSection
                } else {
                    SectionState::SeekSection
                }
            }
            SectionState::InSection => {
                if trimmed == "endproject" {
                    SectionState::Idle
                } else if trimmed.starts_with("endprojectsection") {
                    SectionState::SeekEndProject
                } else {
                    self.parse_item_line(line);
                    SectionState::InSection
                }
            }
            SectionState::SeekEndProject => {
                if trimmed == "endproject" {
                    SectionState::Idle
                } else {
                    SectionState::SeekEndProject
                }
            }
        };
    }

    /// Consume the parser, returning the retained projects and items.
    pub fn finish(self) -> (Vec<ProjectReference>, Vec<SolutionItem>) {
        (self.projects, self.items)
    }

    fn parse_project_line(&mut self, line: &str) {
        match parse_declaration(line) {
            Some(Declaration::Folder) => {
                self.state = SectionState::SeekSection;
            }
            Some(Declaration::Project { type_id, path: raw }) => {
                let project = path::resolve(self.dir, &raw);
                if project.is_file() {
                    tracing::debug!("project {} ({})", project.display(), type_id);
                    self.projects.push(ProjectReference {
                        path: project,
                        type_id,
                    });
                } else {
                    tracing::trace!("project not found: {}", project.display());
                }
            }
            None => {}
        }
    }

    fn parse_item_line(&mut self, line: &str) {
        let mut lx = SolutionLexer::new(line);
        lx.skip_whitespace();
        lx.clear_capture();
        if !lx.read_until('=', false) {
            return;
        }

        let key = lx.capture().trim_end();
        if key.is_empty() {
            return;
        }

        let item = path::resolve(self.dir, key);
        if item.is_file() {
            tracing::debug!("solution item {}", item.display());
            self.items.push(SolutionItem { path: item });
        } else {
            tracing::trace!("solution item not found: {}", item.display());
        }
    }
}

/// Parse a `Project("{type}") = "name", "path", "{guid}"` line.
fn parse_declaration(line: &str) -> Option<Declaration> {
    if !line
        .get(..7)
        .is_some_and(|head| head.eq_ignore_ascii_case("project"))
    {
        return None;
    }

    let mut lx = SolutionLexer::new(line);
    lx.skip_letters();
    lx.skip_whitespace();
    if !lx.expect('(') {
        return None;
    }

    lx.clear_capture();
    if !lx.read_dos_string() {
        return None;
    }
    let type_id = decode_dos_string(lx.capture())?;

    lx.skip_whitespace();
    if !lx.expect(')') {
        return None;
    }

    if type_id.eq_ignore_ascii_case(SOLUTION_FOLDER_TYPE_ID) {
        return Some(Declaration::Folder);
    }

    lx.skip_whitespace();
    if !lx.expect('=') {
        return None;
    }

    // Display name, unused
    lx.skip_whitespace();
    if !lx.read_dos_string() {
        return None;
    }

    lx.skip_whitespace();
    if !lx.expect(',') {
        return None;
    }

    lx.skip_whitespace();
    lx.clear_capture();
    if !lx.read_dos_string() {
        return None;
    }
    let path = decode_dos_string(lx.capture())?;

    Some(Declaration::Project { type_id, path })
}
