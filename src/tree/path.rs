//! Path addressing within a forest.
//!
//! A path is the `/`-joined sequence of node names from the forest root down
//! to a node. At each level the first sibling with a matching name wins, so
//! duplicate sibling names shadow each other.

use super::node::Node;

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// Split a path into its non-empty segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

/// Join segments into a path.
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/")
}

/// Path of the parent of `path`, or `None` when `path` names a root-level node.
pub fn parent_path(path: &str) -> Option<String> {
    let segs = segments(path);
    match segs.split_last() {
        Some((_, parent)) if !parent.is_empty() => Some(join(parent)),
        _ => None,
    }
}

/// Resolve a path to the node it denotes.
///
/// Returns `None` when any segment fails to match, when a file would need to
/// have children, or when the path is empty.
pub fn resolve_path<'a>(forest: &'a [Node], path: &str) -> Option<&'a Node> {
    resolve_path_with_root(forest, path, None)
}

/// Resolve a path, first discarding a leading segment equal to `root_label`.
pub fn resolve_path_with_root<'a>(
    forest: &'a [Node],
    path: &str,
    root_label: Option<&str>,
) -> Option<&'a Node> {
    let indices = locate(forest, &strip_root(segments(path), root_label))?;
    node_at(forest, &indices)
}

/// Normalize a path to be relative to the forest root, discarding a leading
/// `root_label` segment and empty segments.
pub fn relative_path(path: &str, root_label: Option<&str>) -> String {
    join(&strip_root(segments(path), root_label))
}

fn strip_root<'p>(mut segs: Vec<&'p str>, root_label: Option<&str>) -> Vec<&'p str> {
    if let (Some(label), Some(first)) = (root_label, segs.first()) {
        if *first == label {
            segs.remove(0);
        }
    }
    segs
}

/// Locate the node named by `segs` as a chain of child indices from the root.
pub(crate) fn locate(forest: &[Node], segs: &[&str]) -> Option<Vec<usize>> {
    if segs.is_empty() {
        return None;
    }

    let mut indices = Vec::with_capacity(segs.len());
    let mut level = forest;

    for (depth, seg) in segs.iter().enumerate() {
        let idx = level.iter().position(|n| n.name == *seg)?;
        let node = &level[idx];
        indices.push(idx);

        let more = depth + 1 < segs.len();
        if more {
            if node.is_file() {
                return None;
            }
            level = node.children();
        }
    }

    Some(indices)
}

/// Locate a node by ID, depth-first in display order.
pub(crate) fn locate_by_id(forest: &[Node], id: &str) -> Option<Vec<usize>> {
    for (idx, node) in forest.iter().enumerate() {
        if node.id == id {
            return Some(vec![idx]);
        }
        if let Some(mut rest) = locate_by_id(node.children(), id) {
            rest.insert(0, idx);
            return Some(rest);
        }
    }
    None
}

/// Follow an index chain to a node.
pub(crate) fn node_at<'a>(forest: &'a [Node], indices: &[usize]) -> Option<&'a Node> {
    let (first, rest) = indices.split_first()?;
    let mut node = forest.get(*first)?;
    for idx in rest {
        node = node.children().get(*idx)?;
    }
    Some(node)
}

/// Follow an index chain to a node, mutably.
pub(crate) fn node_at_mut<'a>(forest: &'a mut [Node], indices: &[usize]) -> Option<&'a mut Node> {
    let (first, rest) = indices.split_first()?;
    let mut node = forest.get_mut(*first)?;
    for idx in rest {
        node = node.children_mut()?.get_mut(*idx)?;
    }
    Some(node)
}

/// Compute the path of the node with the given ID.
pub fn path_of(forest: &[Node], id: &str) -> Option<String> {
    let indices = locate_by_id(forest, id)?;
    let mut names = Vec::with_capacity(indices.len());
    let mut level = forest;
    for idx in indices {
        let node = &level[idx];
        names.push(node.name.as_str());
        level = node.children();
    }
    Some(join(&names))
}
