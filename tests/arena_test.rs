//! Tests for the TreeArena engine operations

use rstest::{fixture, rstest};

use rstree::domain::{
    DomainError, ErrorKind, ForestView, NewNode, NodeUpdate, TreeArena,
};
use rstree::util::testing;

// root
// ├── a
// │   ├── a1
// │   │   └── a1x
// │   └── a2
// └── b
// other
#[fixture]
fn tree() -> TreeArena {
    testing::init_test_setup();
    let mut tree = TreeArena::new();
    for (id, parent, label) in [
        ("root", None, "root"),
        ("a", Some("root"), "A"),
        ("a1", Some("a"), "A1"),
        ("a1x", Some("a1"), "A1X"),
        ("a2", Some("a"), "A2"),
        ("b", Some("root"), "B"),
        ("other", None, "other"),
    ] {
        tree.add_node(NewNode {
            id: Some(id.to_string()),
            parent: parent.map(str::to_string),
            label: label.to_string(),
        })
        .unwrap();
    }
    tree
}

fn snapshot(tree: &TreeArena) -> serde_json::Value {
    serde_json::to_value(ForestView::new(tree)).unwrap()
}

// ============================================================
// addNode
// ============================================================

#[test]
fn given_new_tree_when_created_then_is_empty() {
    let tree = TreeArena::new();
    assert!(tree.is_empty());
    assert!(tree.roots().is_empty());
    assert_eq!(tree.depth(), 0);
}

#[test]
fn given_no_parent_when_adding_then_node_joins_forest() {
    let mut tree = TreeArena::new();

    let id = tree.add_node(NewNode::root("root").with_id("id")).unwrap();

    assert_eq!(id, "id");
    assert_eq!(tree.root_ids(), vec!["id"]);
    assert_eq!(tree.get_node("id").unwrap().label, "root");
    assert_eq!(tree.parent_id("id").unwrap(), None);
}

#[test]
fn given_two_roots_when_adding_then_forest_keeps_insertion_order() {
    let mut tree = TreeArena::new();
    tree.add_node(NewNode::root("root1").with_id("id1")).unwrap();
    tree.add_node(NewNode::root("root2").with_id("id2")).unwrap();

    assert_eq!(tree.root_ids(), vec!["id1", "id2"]);
    assert_eq!(tree.len(), 2);
}

#[test]
fn given_no_id_when_adding_then_generates_distinct_ids() {
    let mut tree = TreeArena::new();
    let id1 = tree.add_node(NewNode::root("root1")).unwrap();
    let id2 = tree.add_node(NewNode::root("root2")).unwrap();

    assert!(!id1.is_empty());
    assert_ne!(id1, id2);
    assert!(tree.contains(&id1) && tree.contains(&id2));
}

#[test]
fn given_empty_id_when_adding_then_treated_as_omitted() {
    let mut tree = TreeArena::new();
    let id = tree.add_node(NewNode::root("root").with_id("")).unwrap();
    assert!(!id.is_empty());
}

#[test]
fn given_parent_when_adding_children_then_appended_in_order() {
    let mut tree = TreeArena::new();
    let root = tree.add_node(NewNode::root("root")).unwrap();
    let c1 = tree.add_node(NewNode::child(root.clone(), "child1")).unwrap();
    let c2 = tree.add_node(NewNode::child(root.clone(), "child2")).unwrap();

    assert_eq!(tree.children_ids(&root).unwrap(), vec![c1.as_str(), c2.as_str()]);
    assert_eq!(tree.parent_id(&c1).unwrap(), Some(root.as_str()));
    assert_eq!(tree.len(), 3);
}

#[test]
fn given_nested_children_when_adding_then_depth_grows() {
    let mut tree = TreeArena::new();
    let root = tree.add_node(NewNode::root("root")).unwrap();
    let child = tree.add_node(NewNode::child(root, "child")).unwrap();
    let grandchild = tree.add_node(NewNode::child(child.clone(), "grandChild")).unwrap();

    assert_eq!(tree.depth(), 3);
    assert_eq!(tree.children_ids(&child).unwrap(), vec![grandchild.as_str()]);
}

#[rstest]
fn given_added_node_when_getting_then_label_and_no_children(mut tree: TreeArena) {
    let id = tree.add_node(NewNode::child("b", "fresh")).unwrap();

    let node = tree.get_node(&id).unwrap();
    assert_eq!(node.label, "fresh");
    assert!(node.children.is_empty());
}

#[rstest]
fn given_missing_parent_when_adding_then_not_found_and_unchanged(mut tree: TreeArena) {
    let before = snapshot(&tree);

    let err = tree.add_node(NewNode::child("bad", "child")).unwrap_err();

    assert_eq!(err, DomainError::ParentNotFound("bad".into()));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(snapshot(&tree), before);
    assert_eq!(tree.len(), 7);
}

#[rstest]
fn given_empty_label_when_adding_then_validation_and_unchanged(mut tree: TreeArena) {
    let before = snapshot(&tree);

    let err = tree.add_node(NewNode::root("")).unwrap_err();

    assert_eq!(err, DomainError::LabelRequired);
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(snapshot(&tree), before);
}

#[rstest]
fn given_existing_id_when_adding_then_duplicate_and_unchanged(mut tree: TreeArena) {
    let before = snapshot(&tree);

    let err = tree
        .add_node(NewNode::root("again").with_id("a"))
        .unwrap_err();

    assert_eq!(err, DomainError::DuplicateId("a".into()));
    assert_eq!(tree.get_node("a").unwrap().label, "A");
    assert_eq!(snapshot(&tree), before);
}

// ============================================================
// getNode
// ============================================================

#[rstest]
fn given_unknown_id_when_getting_then_not_found(tree: TreeArena) {
    let err = tree.get_node("nope").unwrap_err();
    assert_eq!(err, DomainError::NodeNotFound("nope".into()));
}

// ============================================================
// updateNode
// ============================================================

#[rstest]
fn given_label_when_updating_then_relabels_in_place(mut tree: TreeArena) {
    let id = tree.update_node("a1", NodeUpdate::label("renamed")).unwrap();

    assert_eq!(id, "a1");
    assert_eq!(tree.get_node("a1").unwrap().label, "renamed");
    assert_eq!(tree.parent_id("a1").unwrap(), Some("a"));
    assert_eq!(tree.children_ids("a1").unwrap(), vec!["a1x"]);
}

#[rstest]
fn given_empty_label_when_updating_then_validation_and_unchanged(mut tree: TreeArena) {
    let before = snapshot(&tree);

    let err = tree
        .update_node("a1", NodeUpdate {
            label: Some(String::new()),
            parent: Some(Some("b".into())),
        })
        .unwrap_err();

    assert_eq!(err, DomainError::LabelRequired);
    assert_eq!(snapshot(&tree), before);
}

#[rstest]
fn given_unknown_node_when_updating_then_not_found(mut tree: TreeArena) {
    let err = tree.update_node("nope", NodeUpdate::label("x")).unwrap_err();
    assert_eq!(err, DomainError::NodeNotFound("nope".into()));
}

#[rstest]
fn given_unknown_parent_when_updating_then_not_found_and_unchanged(mut tree: TreeArena) {
    let before = snapshot(&tree);

    let err = tree
        .update_node("a1", NodeUpdate {
            label: Some("renamed".into()),
            parent: Some(Some("bad".into())),
        })
        .unwrap_err();

    assert_eq!(err, DomainError::ParentNotFound("bad".into()));
    assert_eq!(tree.get_node("a1").unwrap().label, "A1");
    assert_eq!(snapshot(&tree), before);
}

#[rstest]
#[case::itself("a", "a")]
#[case::child("a", "a1")]
#[case::grandchild("a", "a1x")]
#[case::from_root("root", "a1x")]
fn given_descendant_target_when_reparenting_then_cycle_and_unchanged(
    mut tree: TreeArena,
    #[case] node: &str,
    #[case] target: &str,
) {
    let before = snapshot(&tree);

    let err = tree.update_node(node, NodeUpdate::move_to(target)).unwrap_err();

    assert_eq!(
        err,
        DomainError::CycleDetected {
            node: node.into(),
            parent: target.into()
        }
    );
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(snapshot(&tree), before);
    tree.check_invariants().unwrap();
}

#[rstest]
fn given_subtree_when_reparenting_then_moves_whole_subtree(mut tree: TreeArena) {
    let a1_before = serde_json::to_value(rstree::domain::NodeView::new(&tree, "a1").unwrap()).unwrap();

    tree.update_node("a1", NodeUpdate::move_to("b")).unwrap();

    assert_eq!(tree.parent_id("a1").unwrap(), Some("b"));
    assert_eq!(tree.children_ids("a").unwrap(), vec!["a2"]);
    assert_eq!(tree.children_ids("b").unwrap(), vec!["a1"]);
    assert_eq!(tree.parent_id("a1x").unwrap(), Some("a1"));
    let a1_after = serde_json::to_value(rstree::domain::NodeView::new(&tree, "a1").unwrap()).unwrap();
    assert_eq!(a1_before, a1_after);
    tree.check_invariants().unwrap();
}

#[rstest]
fn given_sibling_subtree_target_when_reparenting_then_no_cycle(mut tree: TreeArena) {
    tree.update_node("b", NodeUpdate::move_to("a1x")).unwrap();

    assert_eq!(tree.parent_id("b").unwrap(), Some("a1x"));
    assert_eq!(tree.depth(), 5);
    tree.check_invariants().unwrap();
}

#[rstest]
fn given_null_parent_when_updating_then_node_moves_to_forest_end(mut tree: TreeArena) {
    tree.update_node("a", NodeUpdate::move_to_root()).unwrap();

    assert_eq!(tree.root_ids(), vec!["root", "other", "a"]);
    assert_eq!(tree.parent_id("a").unwrap(), None);
    assert_eq!(tree.children_ids("root").unwrap(), vec!["b"]);
    tree.check_invariants().unwrap();
}

#[rstest]
fn given_root_when_moving_under_other_root_then_leaves_forest(mut tree: TreeArena) {
    tree.update_node("other", NodeUpdate::move_to("root")).unwrap();

    assert_eq!(tree.root_ids(), vec!["root"]);
    assert_eq!(tree.children_ids("root").unwrap(), vec!["a", "b", "other"]);
    tree.check_invariants().unwrap();
}

#[rstest]
#[case::same_parent(NodeUpdate::move_to("a"))]
#[case::nothing(NodeUpdate::default())]
fn given_current_parent_when_updating_then_no_op(mut tree: TreeArena, #[case] update: NodeUpdate) {
    let before = snapshot(&tree);

    let id = tree.update_node("a1", update).unwrap();

    assert_eq!(id, "a1");
    // a1 keeps its slot before a2
    assert_eq!(snapshot(&tree), before);
}

#[rstest]
fn given_root_when_moving_to_root_then_no_op(mut tree: TreeArena) {
    let before = snapshot(&tree);
    tree.update_node("root", NodeUpdate::move_to_root()).unwrap();
    assert_eq!(snapshot(&tree), before);
}

// ============================================================
// deleteNode
// ============================================================

#[rstest]
fn given_subtree_when_deleting_then_all_descendants_gone(mut tree: TreeArena) {
    let id = tree.delete_node("a", false).unwrap();

    assert_eq!(id, "a");
    for gone in ["a", "a1", "a1x", "a2"] {
        assert_eq!(
            tree.get_node(gone).unwrap_err(),
            DomainError::NodeNotFound(gone.into())
        );
    }
    assert_eq!(tree.children_ids("root").unwrap(), vec!["b"]);
    assert_eq!(tree.len(), 3);
    tree.check_invariants().unwrap();
}

#[rstest]
fn given_keep_children_when_deleting_then_children_promoted_to_parent(mut tree: TreeArena) {
    tree.delete_node("a", true).unwrap();

    assert!(!tree.contains("a"));
    assert_eq!(tree.children_ids("root").unwrap(), vec!["b", "a1", "a2"]);
    assert_eq!(tree.parent_id("a1").unwrap(), Some("root"));
    assert_eq!(tree.parent_id("a2").unwrap(), Some("root"));
    // grandchildren keep their parent
    assert_eq!(tree.parent_id("a1x").unwrap(), Some("a1"));
    assert_eq!(tree.get_node("a1").unwrap().label, "A1");
    tree.check_invariants().unwrap();
}

#[rstest]
fn given_keep_children_on_root_when_deleting_then_children_join_forest(mut tree: TreeArena) {
    tree.delete_node("root", true).unwrap();

    assert_eq!(tree.root_ids(), vec!["other", "a", "b"]);
    assert_eq!(tree.parent_id("a").unwrap(), None);
    assert_eq!(tree.children_ids("a").unwrap(), vec!["a1", "a2"]);
    tree.check_invariants().unwrap();
}

#[rstest]
fn given_unknown_node_when_deleting_then_not_found_and_unchanged(mut tree: TreeArena) {
    let before = snapshot(&tree);

    let err = tree.delete_node("nope", false).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(snapshot(&tree), before);
}

#[rstest]
fn given_deleted_id_when_re_adding_then_id_is_free_again(mut tree: TreeArena) {
    tree.delete_node("a1", false).unwrap();

    tree.add_node(NewNode::child("b", "back").with_id("a1x")).unwrap();

    assert_eq!(tree.parent_id("a1x").unwrap(), Some("b"));
    tree.check_invariants().unwrap();
}

// ============================================================
// Scenario
// ============================================================

#[test]
fn given_root_with_child_when_deleting_root_then_both_unreachable() {
    let mut tree = TreeArena::new();

    let root = tree.add_node(NewNode::root("root").with_id("root")).unwrap();
    assert_eq!(root, "root");
    let child = tree.add_node(NewNode::child("root", "child")).unwrap();

    assert_eq!(
        tree.add_node(NewNode::child("bad", "x")).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        tree.add_node(NewNode::root("")).unwrap_err().kind(),
        ErrorKind::Validation
    );

    tree.delete_node("root", false).unwrap();

    assert_eq!(tree.get_node("root").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(tree.get_node(&child).unwrap_err().kind(), ErrorKind::NotFound);
    assert!(tree.is_empty());
}

#[rstest]
fn given_mixed_mutations_when_done_then_views_stay_consistent(mut tree: TreeArena) {
    tree.update_node("a2", NodeUpdate::move_to("other")).unwrap();
    tree.add_node(NewNode::child("a2", "deep").with_id("d")).unwrap();
    tree.delete_node("a1", true).unwrap();
    tree.update_node("other", NodeUpdate::move_to("a1x")).unwrap();
    tree.delete_node("b", false).unwrap();

    tree.check_invariants().unwrap();
    assert_eq!(tree.root_ids(), vec!["root"]);
    assert_eq!(
        tree.iter().map(|(_, n)| n.id.as_str()).collect::<Vec<_>>(),
        vec!["root", "a", "a1x", "other", "a2", "d"]
    );
    assert_eq!(tree.leaf_ids(), vec!["d"]);
}
