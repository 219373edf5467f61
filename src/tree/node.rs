//! Node, tag and collection types for the note tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::datetime::now_millis;

/// Glyph shown for files that have no icon chosen.
pub const DEFAULT_ICON: &str = "file";

/// Variant tag of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A document leaf.
    File,
    /// A container of other nodes.
    Folder,
}

impl NodeKind {
    /// Convert to the persisted string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Folder => "folder",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(NodeKind::File),
            "folder" | "directory" => Ok(NodeKind::Folder),
            _ => Err(format!("unknown node type: {s}")),
        }
    }
}

/// A label attached to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag ID.
    pub id: String,
    /// Free text label.
    pub label: String,
    /// Color value, from [`TAG_COLORS`](super::TAG_COLORS) or user-chosen.
    pub color: String,
}

impl Tag {
    /// Create a tag with a fresh ID.
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            label: label.into(),
            color: color.into(),
        }
    }
}

/// A file or folder entry in a collection's forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Opaque unique ID, stable across sessions.
    pub id: String,
    /// Display name. Files conventionally carry an extension.
    pub name: String,
    /// File or folder.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Ordered children. Folders only; `None` is equivalent to empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
    /// Extension derived from `name`. Files only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// Chosen display glyph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Saved text content. Files only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tags in display order. Files only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Owning collection (denormalized).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    /// Creation time, epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Last update time, epoch milliseconds.
    #[serde(default)]
    pub updated_at: i64,
}

impl Node {
    /// Create a node of the given kind with a fresh ID and current timestamps.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        let name = name.into();
        let now = now_millis();
        let extension = match kind {
            NodeKind::File => extension_of(&name).map(str::to_string),
            NodeKind::Folder => None,
        };
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            kind,
            children: match kind {
                NodeKind::File => None,
                NodeKind::Folder => Some(Vec::new()),
            },
            extension,
            icon: None,
            content: None,
            tags: Vec::new(),
            collection_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new file node.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::File)
    }

    /// Create a new, empty folder node.
    pub fn folder(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Folder)
    }

    /// Set the ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the icon.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the tags.
    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    /// Set the children. Ignored for files.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        if self.is_folder() {
            self.children = Some(children);
        }
        self
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Check if this node is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Children of a folder. Always empty for files, whatever they carry.
    pub fn children(&self) -> &[Node] {
        match (&self.kind, &self.children) {
            (NodeKind::Folder, Some(children)) => children,
            _ => &[],
        }
    }

    /// Mutable access to a folder's children, creating the list if absent.
    ///
    /// Returns `None` for files.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self.kind {
            NodeKind::Folder => Some(self.children.get_or_insert_with(Vec::new)),
            NodeKind::File => None,
        }
    }

    /// Icon to display, falling back to [`DEFAULT_ICON`].
    pub fn display_icon(&self) -> &str {
        self.icon.as_deref().unwrap_or(DEFAULT_ICON)
    }

    /// Bring the node in line with the model: files drop children and get
    /// their extension re-derived; folders drop file-only fields.
    ///
    /// Applied recursively.
    pub fn normalize(&mut self) {
        match self.kind {
            NodeKind::File => {
                self.children = None;
                self.extension = extension_of(&self.name).map(str::to_string);
            }
            NodeKind::Folder => {
                self.extension = None;
                self.content = None;
                self.tags.clear();
                for child in self.children.iter_mut().flatten() {
                    child.normalize();
                }
            }
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_size(&self) -> usize {
        1 + self.children().iter().map(Node::subtree_size).sum::<usize>()
    }
}

/// Extension of a file name: the text after the last `.`.
///
/// Returns `None` when the name has no dot or ends with one.
pub fn extension_of(name: &str) -> Option<&str> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// A named root-level container of nodes; the unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Collection ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Root-level forest.
    #[serde(default)]
    pub directories: Vec<Node>,
    /// Creation time, epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Last update time, epoch milliseconds.
    #[serde(default)]
    pub updated_at: i64,
}

impl Collection {
    /// Create an empty collection with a fresh ID.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            directories: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Resolve a path within this collection.
    ///
    /// A leading segment equal to the collection's name is treated as the
    /// root label and skipped.
    pub fn resolve(&self, path: &str) -> Option<&Node> {
        super::path::resolve_path_with_root(&self.directories, path, Some(&self.name))
    }

    /// Total number of nodes in the forest.
    pub fn node_count(&self) -> usize {
        super::ops::count_nodes(&self.directories)
    }
}
