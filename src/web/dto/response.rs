//! Response DTOs for the HTTP API.

use serde::Serialize;

use crate::file::FileRecord;
use crate::tree::{extension_of, Collection, Node, Placement, Tag, DEFAULT_ICON};

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Collection DTOs
// ============================================================================

/// Collection list entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    /// Collection ID.
    pub id: String,
    /// Name.
    pub name: String,
    /// Total number of nodes.
    pub node_count: usize,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
    /// Last update time, epoch milliseconds.
    pub updated_at: i64,
}

impl From<&Collection> for CollectionSummary {
    fn from(c: &Collection) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            node_count: c.node_count(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// A collection with its forest.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResponse {
    /// Collection ID.
    pub id: String,
    /// Name.
    pub name: String,
    /// Root-level nodes.
    pub directories: Vec<Node>,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
    /// Last update time, epoch milliseconds.
    pub updated_at: i64,
}

impl From<&Collection> for CollectionResponse {
    fn from(c: &Collection) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            directories: c.directories.clone(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// A resolved path.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    /// Path that was resolved.
    pub path: String,
    /// The node at that path.
    pub node: Node,
}

/// Result of inserting a node.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertNodeResponse {
    /// The inserted node.
    pub node: Node,
    /// Folder the node went into; `None` for the root.
    pub parent_id: Option<String>,
    /// The collection after the insert.
    pub collection: CollectionResponse,
}

impl InsertNodeResponse {
    /// Build from the placement reported by the workspace.
    pub fn new(node: Node, placement: Placement, collection: &Collection) -> Self {
        let parent_id = match placement {
            Placement::Root => None,
            Placement::Folder(id) => Some(id),
        };
        Self {
            node,
            parent_id,
            collection: collection.into(),
        }
    }
}

/// Result of deleting a node.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNodeResponse {
    /// Whether anything was removed.
    pub removed: bool,
    /// Number of nodes removed, including descendants.
    pub removed_count: usize,
    /// IDs of removed files whose records could not be deleted.
    pub orphaned_records: Vec<String>,
    /// The collection after the delete.
    pub collection: CollectionResponse,
}

// ============================================================================
// File DTOs
// ============================================================================

/// File response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    /// File ID.
    pub id: String,
    /// Owning collection.
    pub collection_id: Option<String>,
    /// File name.
    pub name: String,
    /// Extension derived from the name.
    pub extension: Option<String>,
    /// Content.
    pub content: Option<String>,
    /// Icon, with the default applied.
    pub icon: String,
    /// Tags.
    pub tags: Vec<Tag>,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
    /// Last update time, epoch milliseconds.
    pub updated_at: i64,
}

impl From<FileRecord> for FileResponse {
    fn from(f: FileRecord) -> Self {
        Self {
            extension: extension_of(&f.name).map(str::to_string),
            icon: f.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
            id: f.id,
            collection_id: f.collection_id,
            name: f.name,
            content: f.content,
            tags: f.tags,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

/// Upload result.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Public path of the stored image.
    pub path: String,
}

/// Tag autocomplete data.
#[derive(Debug, Serialize)]
pub struct TagSuggestionsResponse {
    /// Suggested labels.
    pub suggestions: Vec<&'static str>,
    /// Preset colors.
    pub colors: &'static [&'static str],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_envelope() {
        let json = serde_json::to_value(ApiResponse::new(UploadResponse {
            path: "/uploads/x.png".to_string(),
        }))
        .unwrap();
        assert_eq!(json["data"]["path"], "/uploads/x.png");
    }

    #[test]
    fn test_collection_summary() {
        let mut collection = Collection::new("Work");
        collection.directories = vec![Node::folder("docs").with_children(vec![Node::file("a")])];
        collection.created_at = 1_705_314_600_000;

        let json = serde_json::to_value(CollectionSummary::from(&collection)).unwrap();
        assert_eq!(json["nodeCount"], 2);
        assert_eq!(json["createdAt"], 1_705_314_600_000i64);
    }

    #[test]
    fn test_file_response_defaults_icon() {
        let record = FileRecord {
            id: "f1".to_string(),
            collection_id: None,
            name: "notes.md".to_string(),
            content: None,
            icon: None,
            tags: vec![],
            created_at: 0,
            updated_at: 0,
        };
        let response = FileResponse::from(record);
        assert_eq!(response.icon, DEFAULT_ICON);
        assert_eq!(response.extension.as_deref(), Some("md"));
    }

    #[test]
    fn test_timestamps_match_node_format() {
        let mut collection = Collection::new("Work");
        collection.directories = vec![Node::file("a.md")];
        collection.updated_at = 1_705_314_600_000;
        collection.directories[0].updated_at = 1_705_314_600_000;

        let json = serde_json::to_value(CollectionResponse::from(&collection)).unwrap();
        assert_eq!(json["updatedAt"], json["directories"][0]["updatedAt"]);
    }

    #[test]
    fn test_delete_response_lists_orphans() {
        let response = DeleteNodeResponse {
            removed: true,
            removed_count: 2,
            orphaned_records: vec!["f1".to_string()],
            collection: (&Collection::new("Work")).into(),
        };
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["orphanedRecords"], serde_json::json!(["f1"]));
        assert_eq!(json["removedCount"], 2);
    }

    #[test]
    fn test_insert_response_parent() {
        let collection = Collection::new("Work");
        let response = InsertNodeResponse::new(
            Node::file("a.md"),
            Placement::Folder("f1".to_string()),
            &collection,
        );
        assert_eq!(response.parent_id.as_deref(), Some("f1"));
    }
}
