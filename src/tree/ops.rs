//! Mutation and lookup operations over a forest.
//!
//! Every mutation takes the current forest by reference and returns a new
//! one, leaving the input untouched so the caller can keep it as a rollback
//! snapshot.

use tracing::debug;

use super::node::Node;
use super::path::{self, locate, locate_by_id, node_at, node_at_mut, segments};

/// A selected location in the tree: the node the user picked and its path.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    /// The selected node.
    pub node: &'a Node,
    /// Path of the selected node.
    pub path: &'a str,
}

impl<'a> Target<'a> {
    /// Create a target.
    pub fn new(node: &'a Node, path: &'a str) -> Self {
        Self { node, path }
    }
}

/// Where an inserted node ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Appended to the forest root.
    Root,
    /// Appended to the children of the folder with this ID.
    Folder(String),
}

/// Result of [`delete_node`].
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    /// Forest after the deletion (unchanged on a no-op).
    pub forest: Vec<Node>,
    /// The removed node with its subtree, or `None` for a no-op.
    pub removed: Option<Node>,
}

impl DeleteOutcome {
    /// Whether nothing was removed.
    pub fn is_noop(&self) -> bool {
        self.removed.is_none()
    }
}

/// Insert `node` into a copy of `forest`.
///
/// - No target: appended at the root.
/// - Folder target: appended to that folder's children.
/// - File target: appended to the file's parent folder, or the root when the
///   file sits at the root or its parent cannot be resolved.
///
/// Never fails; anything unresolvable falls back to the root.
pub fn insert_node(forest: &[Node], node: Node, target: Option<Target<'_>>) -> Vec<Node> {
    insert_node_with_placement(forest, node, target).0
}

/// Like [`insert_node`], also reporting where the node was placed.
pub fn insert_node_with_placement(
    forest: &[Node],
    node: Node,
    target: Option<Target<'_>>,
) -> (Vec<Node>, Placement) {
    let mut next = forest.to_vec();
    let parent = target.and_then(|t| parent_indices(&next, t));

    if let Some(idx) = parent {
        if let Some(folder) = node_at_mut(&mut next, &idx) {
            let folder_id = folder.id.clone();
            if let Some(children) = folder.children_mut() {
                children.push(node);
                return (next, Placement::Folder(folder_id));
            }
        }
    }

    next.push(node);
    (next, Placement::Root)
}

/// Index chain of the folder an insert at `target` should go into.
fn parent_indices(forest: &[Node], target: Target<'_>) -> Option<Vec<usize>> {
    if target.node.is_folder() {
        let by_path = locate(forest, &segments(target.path))
            .filter(|idx| node_at(forest, idx).is_some_and(Node::is_folder));
        let found = by_path.or_else(|| {
            locate_by_id(forest, &target.node.id)
                .filter(|idx| node_at(forest, idx).is_some_and(Node::is_folder))
        });
        if found.is_none() {
            debug!(path = target.path, "Insert target folder not found, using root");
        }
        return found;
    }

    let parent = path::parent_path(target.path)?;
    let found = locate(forest, &segments(&parent))
        .filter(|idx| node_at(forest, idx).is_some_and(Node::is_folder));
    if found.is_none() {
        debug!(path = %parent, "Parent of target file not found, using root");
    }
    found
}

/// Remove the node at `target.path`, with its subtree, from a copy of `forest`.
///
/// A path that does not resolve, or resolves to a node with a different ID
/// than `target.node`, leaves the forest unchanged.
pub fn delete_node(forest: &[Node], target: Target<'_>) -> DeleteOutcome {
    let unchanged = || DeleteOutcome {
        forest: forest.to_vec(),
        removed: None,
    };

    let Some(indices) = locate(forest, &segments(target.path)) else {
        debug!(path = target.path, "Delete target not found");
        return unchanged();
    };

    match node_at(forest, &indices) {
        Some(found) if found.id == target.node.id => {}
        _ => {
            debug!(
                path = target.path,
                id = %target.node.id,
                "Delete target path resolves to a different node"
            );
            return unchanged();
        }
    }

    let mut next = forest.to_vec();
    let Some((last, parent)) = indices.split_last() else {
        return unchanged();
    };

    let removed = if parent.is_empty() {
        next.remove(*last)
    } else {
        match node_at_mut(&mut next, parent).and_then(Node::children_mut) {
            Some(children) => children.remove(*last),
            None => return unchanged(),
        }
    };

    DeleteOutcome {
        forest: next,
        removed: Some(removed),
    }
}

/// Apply `edit` to the node with the given ID in a copy of `forest`.
///
/// Returns `None` when no node has that ID. The node is re-normalized after
/// the edit, so a renamed file gets its extension re-derived.
pub fn update_node(
    forest: &[Node],
    id: &str,
    edit: impl FnOnce(&mut Node),
) -> Option<Vec<Node>> {
    let indices = locate_by_id(forest, id)?;
    let mut next = forest.to_vec();
    let node = node_at_mut(&mut next, &indices)?;
    edit(node);
    node.normalize();
    Some(next)
}

/// Find a node anywhere in the forest by ID.
pub fn find_by_id<'a>(forest: &'a [Node], id: &str) -> Option<&'a Node> {
    let indices = locate_by_id(forest, id)?;
    node_at(forest, &indices)
}

/// Total number of nodes in the forest.
pub fn count_nodes(forest: &[Node]) -> usize {
    forest.iter().map(Node::subtree_size).sum()
}

/// Names of the nodes a new node would sit beside when inserted at `target`.
///
/// Mirrors the placement rules of [`insert_node`].
pub fn sibling_names<'a>(forest: &'a [Node], target: Option<Target<'_>>) -> Vec<&'a str> {
    let level = target
        .and_then(|t| parent_indices(forest, t))
        .and_then(|idx| node_at(forest, &idx))
        .map(Node::children)
        .unwrap_or(forest);
    level.iter().map(|n| n.name.as_str()).collect()
}
