//! INDEXING scheme end-to-end tests

mod common;

use aircast::index::{resolve_partial_path, ControlIndex, FlatTree, NodeLink, TreeNode};
use aircast::scheme::{resolve_indexing, IndexingQuery};
use aircast::AircastError;
use common::{standard_leaves, standard_tree};
use std::collections::HashSet;

#[test]
fn test_flatten_places_every_node_once() {
    let tree = standard_tree();
    assert_eq!(tree.len(), 81);

    let names: HashSet<&str> = tree.nodes().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names.len(), tree.len());

    let parent_of = |name: &str| match tree.node(tree.position(name).unwrap()).link {
        NodeLink::Root => None,
        NodeLink::Parent(p) => Some(tree.name(p).to_string()),
    };
    assert_eq!(parent_of("I"), None);
    assert_eq!(parent_of("a1").as_deref(), Some("I"));
    assert_eq!(parent_of("a2").as_deref(), Some("I"));
    assert_eq!(parent_of("b4").as_deref(), Some("a2"));
    assert_eq!(parent_of("c6").as_deref(), Some("b2"));
    assert_eq!(parent_of("53").as_deref(), Some("c18"));
}

#[test]
fn test_entire_path_to_first_level() {
    let tree = standard_tree();
    assert_eq!(tree.resolve_entire_path("a1").unwrap(), vec!["I", "a1"]);
}

#[test]
fn test_entire_path_length_is_depth_plus_one() {
    let tree = standard_tree();
    for node in tree.nodes() {
        let idx = tree.position(&node.name).unwrap();
        let path = tree.resolve_entire_path(&node.name).unwrap();
        assert_eq!(path.len(), tree.depth(idx).unwrap() + 1);
        assert_eq!(path.first().map(String::as_str), Some("I"));
        assert_eq!(path.last(), Some(&node.name));
    }
}

#[test]
fn test_control_ranges_partition_leaves_for_every_level() {
    let tree = standard_tree();
    for tag in tree.level_tags() {
        let index = ControlIndex::build(&tree, tag).unwrap();
        let entries = index.entries();

        assert_eq!(entries[0].start_range, 0, "level {tag}");
        for pair in entries.windows(2) {
            assert_eq!(pair[1].start_range, pair[0].end_range + 1, "level {tag}");
            assert_eq!(pair[1].local_index, pair[0].local_index + 1);
        }
        assert_eq!(entries.last().unwrap().end_range, 53, "level {tag}");

        for address in standard_leaves() {
            let owner = index.locate(address).unwrap();
            assert!(
                owner.path.contains(&address.to_string()),
                "row {} of level {tag} owns {address} but does not list it",
                owner.local_index
            );
        }
    }
}

#[test]
fn test_partial_paths_per_level() {
    let tree = standard_tree();

    let (_, path) = resolve_partial_path(&tree, 17, "a2").unwrap();
    assert_eq!(path.to_string(), "I1 -> a1 -> b2 -> c6 -> 17");

    let (_, path) = resolve_partial_path(&tree, 17, "b6").unwrap();
    assert_eq!(path.to_string(), "I2 -> a1 -> b2 -> c6 -> 17");

    let (_, path) = resolve_partial_path(&tree, 17, "c1").unwrap();
    assert_eq!(path.to_string(), "I6 -> a1 -> b2 -> c6 -> 17");
}

#[test]
fn test_uncovered_address_is_out_of_range() {
    let tree = standard_tree();
    let query = IndexingQuery {
        entry: None,
        destination: 54,
        level: Some("b1".to_string()),
        partial_destination: None,
    };
    // address 54 is not a leaf either, but range ownership is checked first
    let err = resolve_partial_path(&tree, 54, "b1").unwrap_err();
    assert_eq!(err, AircastError::OutOfRange { address: 54 });
    assert_eq!(
        resolve_indexing(&tree, &query).unwrap_err(),
        AircastError::OutOfRange { address: 54 }
    );

    let far = IndexingQuery {
        entry: None,
        destination: 60,
        level: Some("a1".to_string()),
        partial_destination: None,
    };
    assert_eq!(
        resolve_indexing(&tree, &far).unwrap_err(),
        AircastError::OutOfRange { address: 60 }
    );
}

#[test]
fn test_unknown_destination_without_level_is_not_found() {
    let tree = standard_tree();
    let query = IndexingQuery {
        entry: None,
        destination: 54,
        level: None,
        partial_destination: None,
    };
    assert_eq!(
        resolve_indexing(&tree, &query).unwrap_err(),
        AircastError::NotFound("54".to_string())
    );
}

#[test]
fn test_custom_tree_from_json() {
    let json = r#"{
        "name": "R",
        "children": [
            { "name": "x2", "children": [ { "name": "y1", "children": [ { "name": "0" }, { "name": "1" } ] } ] },
            { "name": "x7", "children": [ { "name": "y2", "children": [ { "name": "2" } ] } ] }
        ]
    }"#;
    let tree = FlatTree::flatten(&TreeNode::from_json(json).unwrap()).unwrap();
    let query = IndexingQuery {
        entry: Some(1),
        destination: 2,
        level: Some("x2".to_string()),
        partial_destination: None,
    };
    let report = resolve_indexing(&tree, &query).unwrap();

    assert_eq!(report.entire_path_display(), "R -> x7 -> y2 -> 2");
    let partial = report.partial.unwrap();
    assert_eq!(partial.path.to_string(), "R7 -> x7 -> y2 -> 2");
    assert_eq!(partial.global_summary.keys().copied().collect::<Vec<_>>(), vec![2, 7]);
}

#[test]
fn test_non_numeric_leaf_rejected() {
    let tree = FlatTree::flatten(&TreeNode::branch(
        "I",
        vec![TreeNode::branch("a1", vec![TreeNode::leaf("x")])],
    ))
    .unwrap();
    assert!(matches!(
        ControlIndex::build(&tree, "a1"),
        Err(AircastError::Configuration(_))
    ));
}

#[test]
fn test_cyclic_links_fail_instead_of_looping() {
    let tree = FlatTree::from_links(vec![
        ("I", None),
        ("a1", Some("I")),
        ("b1", Some("c1")),
        ("c1", Some("b1")),
    ])
    .unwrap();
    assert!(matches!(
        tree.resolve_entire_path("c1"),
        Err(AircastError::CycleDetected { .. })
    ));
    assert_eq!(tree.resolve_entire_path("a1").unwrap(), vec!["I", "a1"]);
}
