//! Collection tree model.
//!
//! A collection owns an ordered forest of files and folders. This module
//! provides:
//! - The node, tag and collection types
//! - Path resolution against a forest
//! - Pure insert/delete operations producing a new forest
//! - Encoding of the forest for its database column, tolerating legacy data

mod codec;
mod node;
mod ops;
mod path;

pub use codec::{
    assign_collection_id, assign_collection_id_in_place, decode_directories,
    decode_directories_str, encode_directories,
};
pub use node::{extension_of, Collection, Node, NodeKind, Tag, DEFAULT_ICON};
pub use ops::{
    count_nodes, delete_node, find_by_id, insert_node, insert_node_with_placement, sibling_names,
    update_node, DeleteOutcome, Placement, Target,
};
pub use path::{
    join, parent_path, path_of, relative_path, resolve_path, resolve_path_with_root, segments,
};

/// Maximum length for node and collection names (in characters).
pub const MAX_NAME_LENGTH: usize = 255;

/// Preset tag colors offered by the tag picker.
pub const TAG_COLORS: &[&str] = &[
    "#9e9e9e", "#f44336", "#ff9800", "#ffeb3b", "#4caf50", "#2196f3", "#9c27b0", "#795548",
];

/// Static tag suggestions for autocomplete.
pub const TAG_SUGGESTIONS: &[&str] = &[
    "draft", "todo", "idea", "important", "reference", "meeting", "personal", "work", "research",
    "archive",
];

/// Suggestions starting with `prefix`, case-insensitively, in list order.
pub fn suggest_tags(prefix: &str) -> Vec<&'static str> {
    let prefix = prefix.trim().to_lowercase();
    TAG_SUGGESTIONS
        .iter()
        .copied()
        .filter(|s| s.starts_with(&prefix))
        .collect()
}

/// Check a node or collection name.
///
/// Names must be non-blank, within [`MAX_NAME_LENGTH`], and must not contain
/// the path separator.
pub fn validate_name(name: &str) -> crate::Result<()> {
    if name.trim().is_empty() {
        return Err(crate::NoteError::Validation("name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(crate::NoteError::Validation(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    if name.contains('/') {
        return Err(crate::NoteError::Validation(
            "name must not contain '/'".to_string(),
        ));
    }
    Ok(())
}
