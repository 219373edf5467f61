//! Tree mutations and the state of one in-flight mutation.

use crate::tree::{self, Node, Placement, Tag, Target};

/// An owned tree location: the selected node and its path.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// The selected node.
    pub node: Node,
    /// Path of the selected node.
    pub path: String,
}

impl Location {
    /// Create a location.
    pub fn new(node: Node, path: impl Into<String>) -> Self {
        Self {
            node,
            path: path.into(),
        }
    }

    /// Borrow as a tree target.
    pub fn as_target(&self) -> Target<'_> {
        Target::new(&self.node, &self.path)
    }
}

/// Field changes for a single node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    /// New name.
    pub name: Option<String>,
    /// New content.
    pub content: Option<Option<String>>,
    /// New icon.
    pub icon: Option<Option<String>>,
    /// Replacement tags.
    pub tags: Option<Vec<Tag>>,
    /// New modification time.
    pub updated_at: Option<i64>,
}

impl NodePatch {
    /// Apply the set fields to `node`.
    pub fn apply_to(&self, node: &mut Node) {
        if let Some(ref name) = self.name {
            node.name = name.clone();
        }
        if let Some(ref content) = self.content {
            node.content = content.clone();
        }
        if let Some(ref icon) = self.icon {
            node.icon = icon.clone();
        }
        if let Some(ref tags) = self.tags {
            node.tags = tags.clone();
        }
        if let Some(updated_at) = self.updated_at {
            node.updated_at = updated_at;
        }
    }
}

/// A change to one collection's forest.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Insert a node, optionally relative to a selected location.
    Insert {
        node: Node,
        target: Option<Location>,
    },
    /// Delete the node at a location.
    Delete { target: Location },
    /// Patch the node with the given ID.
    Update { id: String, patch: NodePatch },
}

/// What a mutation did to the forest.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// A node was inserted.
    Inserted { id: String, placement: Placement },
    /// A node was removed, or nothing was (stale or unresolved target).
    Deleted { removed: Option<Node> },
    /// A node was patched, or no node had the ID.
    Updated { id: String, found: bool },
}

impl Effect {
    /// Whether the forest changed.
    pub fn changed(&self) -> bool {
        match self {
            Effect::Inserted { .. } => true,
            Effect::Deleted { removed } => removed.is_some(),
            Effect::Updated { found, .. } => *found,
        }
    }
}

impl Mutation {
    /// Compute the next forest. The input is left untouched.
    pub fn apply(self, forest: &[Node]) -> (Vec<Node>, Effect) {
        match self {
            Mutation::Insert { node, target } => {
                let id = node.id.clone();
                let (next, placement) = tree::insert_node_with_placement(
                    forest,
                    node,
                    target.as_ref().map(Location::as_target),
                );
                (next, Effect::Inserted { id, placement })
            }
            Mutation::Delete { target } => {
                let outcome = tree::delete_node(forest, target.as_target());
                (
                    outcome.forest,
                    Effect::Deleted {
                        removed: outcome.removed,
                    },
                )
            }
            Mutation::Update { id, patch } => {
                match tree::update_node(forest, &id, |node| patch.apply_to(node)) {
                    Some(next) => (next, Effect::Updated { id, found: true }),
                    None => (forest.to_vec(), Effect::Updated { id, found: false }),
                }
            }
        }
    }
}

/// Lifecycle of one optimistic mutation.
///
/// `Idle -> Pending(snapshot) -> Committed | RolledBack`
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MutationState {
    /// Nothing applied yet.
    #[default]
    Idle,
    /// Applied locally; persistence outstanding. Holds the pre-mutation forest.
    Pending { snapshot: Vec<Node> },
    /// Persisted.
    Committed,
    /// Persistence failed and the snapshot was restored.
    RolledBack,
}

impl MutationState {
    /// Move from `Idle` to `Pending`, capturing the snapshot.
    ///
    /// Returns `false` (and stays put) from any other state.
    pub fn begin(&mut self, snapshot: Vec<Node>) -> bool {
        if *self != MutationState::Idle {
            return false;
        }
        *self = MutationState::Pending { snapshot };
        true
    }

    /// Move from `Pending` to `Committed`.
    pub fn commit(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        *self = MutationState::Committed;
        true
    }

    /// Move from `Pending` to `RolledBack`, handing back the snapshot.
    pub fn roll_back(&mut self) -> Option<Vec<Node>> {
        match std::mem::replace(self, MutationState::RolledBack) {
            MutationState::Pending { snapshot } => Some(snapshot),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Whether persistence is outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self, MutationState::Pending { .. })
    }

    /// Whether the mutation has finished, either way.
    pub fn is_settled(&self) -> bool {
        matches!(self, MutationState::Committed | MutationState::RolledBack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_commit() {
        let mut state = MutationState::default();
        assert!(state.begin(vec![Node::file("a.md")]));
        assert!(state.is_pending());
        assert!(!state.begin(vec![]));
        assert!(state.commit());
        assert_eq!(state, MutationState::Committed);
        assert!(state.is_settled());
        assert!(!state.commit());
        assert!(state.roll_back().is_none());
        assert_eq!(state, MutationState::Committed);
    }

    #[test]
    fn test_state_machine_roll_back() {
        let snapshot = vec![Node::file("a.md")];
        let mut state = MutationState::default();
        state.begin(snapshot.clone());

        assert_eq!(state.roll_back(), Some(snapshot));
        assert_eq!(state, MutationState::RolledBack);
        assert!(!state.commit());
    }

    #[test]
    fn test_cannot_settle_from_idle() {
        let mut state = MutationState::Idle;
        assert!(!state.commit());
        assert!(state.roll_back().is_none());
        assert_eq!(state, MutationState::Idle);
    }

    #[test]
    fn test_insert_mutation() {
        let folder = Node::folder("docs");
        let forest = vec![folder.clone()];
        let node = Node::file("a.md");

        let (next, effect) = Mutation::Insert {
            node: node.clone(),
            target: Some(Location::new(folder.clone(), "docs")),
        }
        .apply(&forest);

        assert_eq!(next[0].children()[0].id, node.id);
        assert_eq!(
            effect,
            Effect::Inserted {
                id: node.id,
                placement: Placement::Folder(folder.id),
            }
        );
        assert!(effect.changed());
    }

    #[test]
    fn test_ghost_delete_mutation() {
        let forest = vec![Node::file("a.md")];
        let ghost = Node::file("a.md");

        let (next, effect) = Mutation::Delete {
            target: Location::new(ghost, "a.md"),
        }
        .apply(&forest);

        assert_eq!(next, forest);
        assert!(!effect.changed());
    }

    #[test]
    fn test_update_mutation() {
        let file = Node::file("a.md");
        let forest = vec![file.clone()];
        let patch = NodePatch {
            icon: Some(Some("star".to_string())),
            updated_at: Some(42),
            ..NodePatch::default()
        };

        let (next, effect) = Mutation::Update {
            id: file.id.clone(),
            patch: patch.clone(),
        }
        .apply(&forest);
        assert_eq!(next[0].icon.as_deref(), Some("star"));
        assert_eq!(next[0].updated_at, 42);
        assert!(effect.changed());

        let (same, missing) = Mutation::Update {
            id: "nope".to_string(),
            patch,
        }
        .apply(&forest);
        assert_eq!(same, forest);
        assert!(!missing.changed());
    }
}
