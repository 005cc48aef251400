//! Typed read-only view over an MSBuild project document.
//!
//! The resolver only needs a handful of queries: whether the project is
//! SDK-style, the children of top-level `ItemGroup` elements, and their
//! `Include`/`Remove` attributes.

use roxmltree::{Document, Node};

/// Item types that never name project input files.
const NON_FILE_ITEMS: &[&str] = &["Reference", "ProjectReference", "ProjectConfiguration"];

/// A parsed project file.
pub struct ProjectXml<'input> {
    doc: Document<'input>,
}

impl<'input> ProjectXml<'input> {
    /// Parse project XML. Fails for malformed XML or a document without a root element.
    pub fn parse(text: &'input str) -> Result<Self, roxmltree::Error> {
        Ok(ProjectXml {
            doc: Document::parse(text)?,
        })
    }

    /// Whether the root element carries a non-empty `Sdk` attribute.
    pub fn is_sdk_style(&self) -> bool {
        self.doc
            .root_element()
            .attribute("Sdk")
            .is_some_and(|sdk| !sdk.trim().is_empty())
    }

    /// Every element directly under a top-level `ItemGroup` of a `Project` root.
    ///
    /// `ItemGroup` must share the root's namespace; the items themselves may
    /// be in any namespace.
    pub fn items(&self) -> impl Iterator<Item = ProjectItem<'_, 'input>> + '_ {
        let root = self.doc.root_element();
        let is_project = root.tag_name().name() == "Project";
        let namespace = root.tag_name().namespace();

        root.children()
            .filter(move |group| {
                is_project
                    && group.is_element()
                    && group.tag_name().name() == "ItemGroup"
                    && group.tag_name().namespace() == namespace
            })
            .flat_map(|group| group.children().filter(Node::is_element))
            .map(|node| ProjectItem { node })
    }

    /// `Include` values of items that name input files.
    pub fn includes(&self) -> impl Iterator<Item = &'_ str> + '_ {
        self.items()
            .filter(ProjectItem::names_files)
            .filter_map(|item| item.include())
    }

    /// `Remove` values of every item.
    pub fn removes(&self) -> impl Iterator<Item = &'_ str> + '_ {
        self.items().filter_map(|item| item.remove())
    }
}

/// One child element of an `ItemGroup`.
#[derive(Clone, Copy)]
pub struct ProjectItem<'a, 'input> {
    node: Node<'a, 'input>,
}

impl<'a, 'input> ProjectItem<'a, 'input> {
    /// Item type, i.e. the element's local name (`ClCompile`, `None`, ...).
    pub fn item_type(&self) -> &'a str {
        self.node.tag_name().name()
    }

    pub fn include(&self) -> Option<&'a str> {
        self.node.attribute("Include")
    }

    pub fn remove(&self) -> Option<&'a str> {
        self.node.attribute("Remove")
    }

    /// Whether this item type can name an input file.
    pub fn names_files(&self) -> bool {
        !NON_FILE_ITEMS.contains(&self.item_type())
    }
}

/// Split an MSBuild item list (`a.cpp;b.cpp`) into trimmed, non-empty specs.
pub fn split_item_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|spec| !spec.is_empty())
}
