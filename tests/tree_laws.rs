//! Property tests for the tree operations and the directories codec.

use marknote::tree::{
    assign_collection_id, count_nodes, decode_directories_str, delete_node, encode_directories,
    insert_node, insert_node_with_placement, path_of, resolve_path, Node, Placement, Target,
};
use proptest::prelude::*;

/// Name that the strategies below never generate.
const FRESH_NAME: &str = "__fresh__.md";

fn file_strategy() -> impl Strategy<Value = Node> {
    ("[a-z]{1,6}", prop::option::of("[a-z #]{0,16}")).prop_map(|(name, content)| {
        let mut node = Node::file(format!("{name}.md"));
        node.content = content;
        node
    })
}

fn node_strategy() -> impl Strategy<Value = Node> {
    file_strategy().prop_recursive(3, 24, 4, |inner| {
        ("[a-z]{1,6}", prop::collection::vec(inner, 0..4))
            .prop_map(|(name, children)| Node::folder(name).with_children(children))
    })
}

fn forest_strategy() -> impl Strategy<Value = Vec<Node>> {
    prop::collection::vec(node_strategy(), 0..5)
}

fn all_nodes(forest: &[Node]) -> Vec<&Node> {
    let mut out = Vec::new();
    let mut stack: Vec<&Node> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(node.children());
    }
    out
}

proptest! {
    #[test]
    fn insert_at_root_appends(forest in forest_strategy()) {
        let node = Node::file(FRESH_NAME);
        let (next, placement) = insert_node_with_placement(&forest, node.clone(), None);

        prop_assert_eq!(placement, Placement::Root);
        prop_assert_eq!(count_nodes(&next), count_nodes(&forest) + 1);
        prop_assert_eq!(next.last(), Some(&node));
        prop_assert_eq!(&next[..forest.len()], &forest[..]);
    }

    #[test]
    fn delete_undoes_root_insert(forest in forest_strategy()) {
        let node = Node::file(FRESH_NAME);
        let next = insert_node(&forest, node.clone(), None);

        let outcome = delete_node(&next, Target::new(&node, FRESH_NAME));
        prop_assert_eq!(outcome.removed.as_ref(), Some(&node));
        prop_assert_eq!(outcome.forest, forest);
    }

    #[test]
    fn delete_undoes_folder_insert(forest in forest_strategy()) {
        let folder = all_nodes(&forest).into_iter().find(|n| n.is_folder()).cloned();
        prop_assume!(folder.is_some());
        let folder = folder.unwrap();

        let folder_path = path_of(&forest, &folder.id).unwrap();
        // Sibling name collisions make the path ambiguous.
        prop_assume!(resolve_path(&forest, &folder_path).map(|n| &n.id) == Some(&folder.id));

        let node = Node::file(FRESH_NAME);
        let next = insert_node(&forest, node.clone(), Some(Target::new(&folder, &folder_path)));
        prop_assert_eq!(count_nodes(&next), count_nodes(&forest) + 1);

        let path = format!("{folder_path}/{FRESH_NAME}");
        let outcome = delete_node(&next, Target::new(&node, &path));
        prop_assert!(!outcome.is_noop());
        prop_assert_eq!(outcome.forest, forest);
    }

    #[test]
    fn ghost_delete_is_noop(forest in forest_strategy()) {
        let ghost = Node::file(FRESH_NAME);
        let outcome = delete_node(&forest, Target::new(&ghost, FRESH_NAME));
        prop_assert!(outcome.is_noop());
        prop_assert_eq!(outcome.forest, forest);
    }

    #[test]
    fn codec_round_trips(forest in forest_strategy()) {
        let encoded = encode_directories(&forest);
        prop_assert_eq!(decode_directories_str(&encoded), forest.clone());

        let double = serde_json::to_string(&encoded).unwrap();
        prop_assert_eq!(decode_directories_str(&double), forest);
    }

    #[test]
    fn garbage_decodes_to_empty(text in "[a-z]{1,20}") {
        prop_assert!(decode_directories_str(&text).is_empty());
    }

    #[test]
    fn assign_collection_id_covers_every_node(forest in forest_strategy()) {
        let assigned = assign_collection_id(&forest, "c1");
        prop_assert_eq!(count_nodes(&assigned), count_nodes(&forest));
        for node in all_nodes(&assigned) {
            prop_assert_eq!(node.collection_id.as_deref(), Some("c1"));
        }
    }
}
