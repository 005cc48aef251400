//! Solution fixtures for common test scenarios.
//!
//! A [`SolutionFixture`] owns a temporary directory that doubles as the
//! solution directory. Builder calls write files immediately; [`write`]
//! renders the `.sln` that references the declared projects and items.
//!
//! [`write`]: SolutionFixture::write

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::SOLUTION_FOLDER_TYPE_ID;
use crate::util::path;

/// Type GUID of a C++ project.
pub const CPP_PROJECT_TYPE_ID: &str = "{8BC9CEB8-8B4A-11D0-8D11-00A0C91942E3}";

/// Type GUID of an SDK-style C# project.
pub const CSHARP_PROJECT_TYPE_ID: &str = "{9A19103F-16F7-4668-BE54-9A1E7A4F7556}";

const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

/// A solution tree on disk.
pub struct SolutionFixture {
    dir: TempDir,
    name: String,
    /// (type id, path relative to the solution dir)
    projects: Vec<(String, String)>,
    items: Vec<String>,
}

impl SolutionFixture {
    /// Create an empty fixture whose solution is `<name>.sln`.
    pub fn new(name: impl Into<String>) -> Self {
        SolutionFixture {
            dir: TempDir::new().expect("failed to create temp dir"),
            name: name.into(),
            projects: Vec::new(),
            items: Vec::new(),
        }
    }

    /// The solution directory.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `rel` (using `/`) under the solution directory.
    pub fn path(&self, rel: &str) -> PathBuf {
        path::normalize(&self.root().join(rel))
    }

    pub fn solution_path(&self) -> PathBuf {
        self.path(&format!("{}.sln", self.name))
    }

    /// Write a placeholder file.
    pub fn file(self, rel: &str) -> Self {
        super::touch(self.root(), rel);
        self
    }

    /// Write a file with the given contents.
    pub fn file_with(self, rel: &str, contents: &str) -> Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        fs::write(&path, contents).expect("failed to write fixture file");
        self
    }

    /// Write a project file and reference it from the solution.
    pub fn project(mut self, rel: &str, type_id: &str, xml: &str) -> Self {
        self = self.file_with(rel, xml);
        self.projects.push((type_id.to_string(), rel.to_string()));
        self
    }

    /// A classic project listing `includes` as `ClCompile` items.
    pub fn explicit_project(self, rel: &str, includes: &[&str]) -> Self {
        let items: String = includes
            .iter()
            .map(|include| format!("    <ClCompile Include=\"{}\" />\n", include))
            .collect();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <Project DefaultTargets=\"Build\" xmlns=\"{}\">\n  <ItemGroup>\n{}  </ItemGroup>\n</Project>\n",
            MSBUILD_NAMESPACE, items
        );
        self.project(rel, CPP_PROJECT_TYPE_ID, &xml)
    }

    /// An SDK-style project with `Compile Remove` entries for `removes`.
    pub fn sdk_project(self, rel: &str, removes: &[&str]) -> Self {
        let items: String = removes
            .iter()
            .map(|remove| format!("    <Compile Remove=\"{}\" />\n", remove))
            .collect();
        let xml = format!(
            "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <ItemGroup>\n{}  </ItemGroup>\n</Project>\n",
            items
        );
        self.project(rel, CSHARP_PROJECT_TYPE_ID, &xml)
    }

    /// Declare a solution item. The file itself is not created.
    pub fn item(mut self, rel: &str) -> Self {
        self.items.push(rel.to_string());
        self
    }

    /// Render the solution text.
    pub fn solution_text(&self) -> String {
        let mut text = String::from(
            "\u{feff}\nMicrosoft Visual Studio Solution File, Format Version 12.00\n\
             # Visual Studio Version 17\n",
        );

        for (i, (type_id, rel)) in self.projects.iter().enumerate() {
            let name = Path::new(rel)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            text.push_str(&format!(
                "Project(\"{}\") = \"{}\", \"{}\", \"{{00000000-0000-0000-0000-{:012}}}\"\nEndProject\n",
                type_id,
                name,
                rel.replace('/', "\\"),
                i + 1
            ));
        }

        if !self.items.is_empty() {
            text.push_str(&format!(
                "Project(\"{}\") = \"Solution Items\", \"Solution Items\", \"{{FFFFFFFF-0000-0000-0000-000000000000}}\"\n\
                 \tProjectSection(SolutionItems) = preProject\n",
                SOLUTION_FOLDER_TYPE_ID
            ));
            for rel in &self.items {
                let rel = rel.replace('/', "\\");
                text.push_str(&format!("\t\t{} = {}\n", rel, rel));
            }
            text.push_str("\tEndProjectSection\nEndProject\n");
        }

        text.push_str("Global\nEndGlobal\n");
        text
    }

    /// Write the rendered solution and return its path.
    pub fn write(&self) -> PathBuf {
        self.write_raw(&self.solution_text())
    }

    /// Write `text` as the solution file and return its path.
    pub fn write_raw(&self, text: &str) -> PathBuf {
        let path = self.solution_path();
        fs::write(&path, text).expect("failed to write solution");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SolutionDocument;

    #[test]
    fn test_fixture_round_trips_through_parser() {
        let fixture = SolutionFixture::new("demo")
            .file("a.cpp")
            .file("notes.md")
            .explicit_project("app/app.vcxproj", &["..\\a.cpp"])
            .item("notes.md");
        let sln = fixture.write();

        let doc = SolutionDocument::load(&sln).unwrap();
        assert_eq!(doc.projects().len(), 1);
        assert_eq!(doc.projects()[0].path, fixture.path("app/app.vcxproj"));
        assert_eq!(doc.projects()[0].type_id, CPP_PROJECT_TYPE_ID);
        assert_eq!(doc.items().len(), 1);
        assert_eq!(doc.items()[0].path, fixture.path("notes.md"));
    }
}
