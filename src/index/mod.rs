//! Replication tree indexing for air-indexed broadcasts
//!
//! A nested replication tree is flattened once into a parent-linked list.
//! Paths are resolved by ascending parent links; a replication level splits
//! the leaf address space into numbered control-index ranges used to build
//! partial paths.

mod flatten;
mod path;

pub use flatten::{FlatNode, FlatTree, NodeLink};
pub use path::{resolve_partial_path, AddressRange, ControlIndex, ControlIndexEntry, PartialPath};

use crate::AircastError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Nested replication tree as supplied by callers
///
/// JSON shape: `{ "name": "I", "children": [ { "name": "a1", ... } ] }`.
/// Leaves carry numeric names (their broadcast addresses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Node name, unique within the tree
    pub name: String,

    /// Child subtrees in broadcast order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Leaf node
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Internal node with children
    pub fn branch(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// Standard three-level replication tree
    ///
    /// Root `I`; `a1..a2` each own three of `b1..b6`; each `b` owns three of
    /// `c1..c18`; each `c` owns three leaves, addresses `0..=53`.
    pub fn standard() -> Self {
        let a_nodes = (1..=2)
            .map(|a| {
                let b_nodes = (1..=3)
                    .map(|bi| {
                        let b = (a - 1) * 3 + bi;
                        let c_nodes = (1..=3)
                            .map(|ci| {
                                let c = (b - 1) * 3 + ci;
                                let leaves = (0..3)
                                    .map(|li| TreeNode::leaf(((c - 1) * 3 + li).to_string()))
                                    .collect();
                                TreeNode::branch(format!("c{c}"), leaves)
                            })
                            .collect();
                        TreeNode::branch(format!("b{b}"), c_nodes)
                    })
                    .collect();
                TreeNode::branch(format!("a{a}"), b_nodes)
            })
            .collect();
        TreeNode::branch("I", a_nodes)
    }

    /// Parse a nested tree from JSON text
    pub fn from_json(text: &str) -> Result<Self, AircastError> {
        serde_json::from_str(text)
            .map_err(|err| AircastError::Configuration(format!("malformed tree JSON: {err}")))
    }

    /// Load a nested tree from a JSON file
    pub fn load(path: &Path) -> Result<Self, AircastError> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            AircastError::Configuration(format!("cannot read tree {}: {err}", path.display()))
        })?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(node: &TreeNode) -> usize {
        1 + node.children.iter().map(count).sum::<usize>()
    }

    #[test]
    fn test_standard_tree_shape() {
        let tree = TreeNode::standard();
        assert_eq!(tree.name, "I");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[1].children[0].name, "b4");
        assert_eq!(tree.children[1].children[2].children[2].name, "c18");
        assert_eq!(
            tree.children[1].children[2].children[2].children[2].name,
            "53"
        );
        // root + 2 + 6 + 18 + 54
        assert_eq!(count(&tree), 81);
    }

    #[test]
    fn test_parse_small_tree() {
        let tree = TreeNode::from_json(r#"{"name":"I","children":[{"name":"a1","children":[{"name":"0"}]}]}"#)
            .unwrap();
        assert_eq!(tree.children[0].children[0], TreeNode::leaf("0"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            TreeNode::from_json("{\"children\": []}"),
            Err(AircastError::Configuration(_))
        ));
    }
}
