#![allow(dead_code)]

use aircast::index::{FlatTree, TreeNode};
use aircast::CachingConfig;

/// Broadcast `ABACAD` against requests `ABCBAA`.
pub fn classic_config(pages: usize) -> CachingConfig {
    CachingConfig::new("ABACAD", "ABCBAA", pages).expect("classic scenario is valid")
}

/// Standard 54-leaf replication tree, flattened.
pub fn standard_tree() -> FlatTree {
    FlatTree::flatten(&TreeNode::standard()).expect("standard tree flattens")
}

/// Leaf addresses of the standard tree.
pub fn standard_leaves() -> std::ops::RangeInclusive<u32> {
    0..=53
}
