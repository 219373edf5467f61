//! Request DTOs for the HTTP API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{hex_color, node_name};
use crate::tree::{NodeKind, Tag, TAG_COLORS};

/// Create collection request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCollectionRequest {
    /// Collection name.
    #[validate(length(min = 1, max = 255), custom(function = "node_name"))]
    pub name: String,
}

/// A tree location as sent by the UI: the selected node's ID and path.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NodeRef {
    /// ID of the selected node.
    #[validate(length(min = 1))]
    pub id: String,
    /// Path of the selected node.
    #[validate(length(min = 1))]
    pub path: String,
}

/// Insert node request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InsertNodeRequest {
    /// Name of the new node.
    #[validate(length(min = 1, max = 255), custom(function = "node_name"))]
    pub name: String,
    /// `file` or `folder`.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Initial content (files only).
    #[serde(default)]
    pub content: Option<String>,
    /// Icon identifier (files only).
    #[serde(default)]
    pub icon: Option<String>,
    /// Selected location; the node goes to the root when absent.
    #[serde(default)]
    #[validate(nested)]
    pub target: Option<NodeRef>,
}

/// Delete node request.
#[derive(Debug, Deserialize, Validate)]
pub struct DeleteNodeRequest {
    /// The node to delete.
    #[validate(nested)]
    pub target: NodeRef,
}

/// Query for path resolution.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    /// Slash-delimited path, optionally starting with the collection name.
    #[serde(default)]
    pub path: String,
}

/// A tag as sent by the UI. Missing IDs and colors are filled in.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TagInput {
    /// Existing tag ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Label.
    #[validate(length(min = 1, max = 64))]
    pub label: String,
    /// Hex color.
    #[serde(default)]
    #[validate(custom(function = "hex_color"))]
    pub color: Option<String>,
}

impl From<TagInput> for Tag {
    fn from(input: TagInput) -> Self {
        let color = input
            .color
            .unwrap_or_else(|| TAG_COLORS[0].to_string());
        let mut tag = Tag::new(input.label.trim(), color);
        if let Some(id) = input.id.filter(|id| !id.is_empty()) {
            tag.id = id;
        }
        tag
    }
}

/// Convert tag inputs, preserving order.
pub fn into_tags(inputs: Vec<TagInput>) -> Vec<Tag> {
    inputs.into_iter().map(Tag::from).collect()
}

/// Save file request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveFileRequest {
    /// File name.
    #[validate(length(min = 1, max = 255), custom(function = "node_name"))]
    pub name: String,
    /// Target collection; unknown or missing means the Default collection.
    #[serde(default)]
    pub collection_id: Option<String>,
    /// Content.
    #[serde(default)]
    pub content: Option<String>,
    /// Icon identifier.
    #[serde(default)]
    pub icon: Option<String>,
    /// Tags.
    #[serde(default)]
    #[validate(nested)]
    pub tags: Vec<TagInput>,
}

/// Update file request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFileRequest {
    /// New name.
    #[validate(length(min = 1, max = 255), custom(function = "node_name"))]
    pub name: Option<String>,
    /// New content.
    pub content: Option<String>,
}

/// Update icon request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateIconRequest {
    /// Icon identifier.
    #[validate(length(min = 1, max = 64))]
    pub icon: String,
}

/// Update tags request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTagsRequest {
    /// Replacement tags.
    #[validate(nested)]
    pub tags: Vec<TagInput>,
}

/// Query for tag suggestions.
#[derive(Debug, Deserialize)]
pub struct TagSuggestionQuery {
    /// Prefix typed so far.
    #[serde(default)]
    pub prefix: String,
}
