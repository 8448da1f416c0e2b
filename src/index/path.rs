//! Control indexes and partial paths
//!
//! Choosing a replication level groups the subtree under every node of that
//! level into rows:
//!   [level node, child, internal descendants…, leaf addresses…]
//! Rows are numbered locally (position) and globally (level node suffix),
//! and own contiguous address ranges chained from 0.

use super::FlatTree;
use crate::AircastError;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use tracing::debug;

/// Inclusive leaf address range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressRange {
    /// First address
    pub start: u32,
    /// Last address
    pub end: u32,
}

impl AddressRange {
    /// Whether `address` falls in the range
    pub fn contains(&self, address: u32) -> bool {
        self.start <= address && address <= self.end
    }
}

/// One control index row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlIndexEntry {
    /// Numeric suffix of the level node
    pub global_index: u32,
    /// Row position within the level
    pub local_index: usize,
    /// Level node, child, internal descendants, then leaf addresses
    pub path: Vec<String>,
    /// First owned address
    pub start_range: u32,
    /// Last owned address
    pub end_range: u32,
}

impl ControlIndexEntry {
    /// Owned address range
    pub fn range(&self) -> AddressRange {
        AddressRange {
            start: self.start_range,
            end: self.end_range,
        }
    }
}

/// Control index table for one replication level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlIndex {
    prefix: String,
    depth: usize,
    entries: Vec<ControlIndexEntry>,
}

impl ControlIndex {
    /// Build the table for the level containing `level_tag`.
    pub fn build(tree: &FlatTree, level_tag: &str) -> Result<Self, AircastError> {
        let tagged = tree.position(level_tag)?;
        if tree.is_leaf(tagged) {
            return Err(AircastError::Configuration(format!(
                "`{level_tag}` is a leaf and cannot select a replication level"
            )));
        }
        let depth = tree.depth(tagged)?;

        let mut level_nodes = tree
            .nodes_at_depth(depth)?
            .into_iter()
            .filter(|&idx| !tree.is_leaf(idx))
            .map(|idx| Ok((numeric_suffix(tree.name(idx))?, idx)))
            .collect::<Result<Vec<_>, AircastError>>()?;
        level_nodes.sort_by_key(|&(global, _)| global);

        let mut entries = Vec::new();
        let mut start = 0u32;
        for (global_index, level_idx) in level_nodes {
            for &child in tree.children(level_idx) {
                let mut path = vec![tree.name(level_idx).to_string(), tree.name(child).to_string()];
                let leaves = if tree.is_leaf(child) {
                    vec![child]
                } else {
                    let (internal, leaves) = descendants(tree, child);
                    path.extend(internal.iter().map(|&i| tree.name(i).to_string()));
                    path.extend(leaves.iter().map(|&i| tree.name(i).to_string()));
                    leaves
                };

                let mut end = 0u32;
                for leaf in leaves {
                    end = end.max(leaf_address(tree.name(leaf))?);
                }
                if end < start {
                    return Err(AircastError::Configuration(format!(
                        "leaf addresses under `{}` are not ascending (max {end} < start {start})",
                        tree.name(child)
                    )));
                }

                entries.push(ControlIndexEntry {
                    global_index,
                    local_index: entries.len(),
                    path,
                    start_range: start,
                    end_range: end,
                });
                start = end.saturating_add(1);
            }
        }

        debug!(tag = level_tag, depth, rows = entries.len(), "control index built");

        Ok(Self {
            prefix: tree.name(tree.root()).to_string(),
            depth,
            entries,
        })
    }

    /// Rows ordered by local index
    pub fn entries(&self) -> &[ControlIndexEntry] {
        &self.entries
    }

    /// Depth of the replication level
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Row owning `address`
    pub fn locate(&self, address: u32) -> Result<&ControlIndexEntry, AircastError> {
        self.entries
            .iter()
            .find(|entry| entry.range().contains(address))
            .ok_or(AircastError::OutOfRange { address })
    }

    /// Identifier of a row's control index, e.g. `I1`
    pub fn identifier(&self, entry: &ControlIndexEntry) -> String {
        format!("{}{}", self.prefix, entry.global_index)
    }

    /// Address span per global index: first row's start to last row's end
    pub fn global_summary(&self) -> BTreeMap<u32, AddressRange> {
        let mut summary: BTreeMap<u32, AddressRange> = BTreeMap::new();
        for entry in &self.entries {
            summary
                .entry(entry.global_index)
                .and_modify(|range| range.end = entry.end_range)
                .or_insert(entry.range());
        }
        summary
    }
}

impl fmt::Display for ControlIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(
                f,
                "{}\tlocal {}\t[{}, {}]\t{}",
                self.identifier(entry),
                entry.local_index,
                entry.start_range,
                entry.end_range,
                entry.path.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Entire path with its root replaced by a control index identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialPath {
    /// Control index identifier followed by the non-root path nodes
    pub nodes: Vec<String>,
}

impl PartialPath {
    /// Control index the path enters through
    pub fn control_index(&self) -> &str {
        self.nodes.first().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for PartialPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nodes.join(" -> "))
    }
}

/// Build the control index for `level_tag` and the partial path to
/// `destination`.
///
/// Fails with `OutOfRange` when no row owns the address, before the path is
/// resolved.
pub fn resolve_partial_path(
    tree: &FlatTree,
    destination: u32,
    level_tag: &str,
) -> Result<(ControlIndex, PartialPath), AircastError> {
    let index = ControlIndex::build(tree, level_tag)?;
    let owner = index.locate(destination)?;
    let identifier = index.identifier(owner);

    let mut nodes = tree.resolve_entire_path(&destination.to_string())?;
    // root-first, so the root is replaced
    nodes[0] = identifier;

    Ok((index, PartialPath { nodes }))
}

/// Internal descendants and leaves below `idx`, each in breadth-first order
fn descendants(tree: &FlatTree, idx: usize) -> (Vec<usize>, Vec<usize>) {
    let mut internal = Vec::new();
    let mut leaves = Vec::new();
    let mut queue: VecDeque<usize> = tree.children(idx).iter().copied().collect();

    while let Some(current) = queue.pop_front() {
        if tree.is_leaf(current) {
            leaves.push(current);
        } else {
            internal.push(current);
            queue.extend(tree.children(current).iter().copied());
        }
    }
    (internal, leaves)
}

fn numeric_suffix(name: &str) -> Result<u32, AircastError> {
    let digits_at = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .ok_or_else(|| {
            AircastError::Configuration(format!("level node `{name}` has no numeric suffix"))
        })?;
    name[digits_at..]
        .parse()
        .map_err(|_| AircastError::Configuration(format!("level node `{name}` suffix overflows")))
}

fn leaf_address(name: &str) -> Result<u32, AircastError> {
    name.parse()
        .map_err(|_| AircastError::Configuration(format!("leaf `{name}` is not a numeric address")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::TreeNode;

    fn standard() -> FlatTree {
        FlatTree::flatten(&TreeNode::standard()).unwrap()
    }

    #[test]
    fn test_numeric_suffix() {
        assert_eq!(numeric_suffix("a1").unwrap(), 1);
        assert_eq!(numeric_suffix("c18").unwrap(), 18);
        assert!(numeric_suffix("I").is_err());
    }

    #[test]
    fn test_first_level_rows() {
        let index = ControlIndex::build(&standard(), "a2").unwrap();
        assert_eq!(index.depth(), 1);
        let entries = index.entries();
        assert_eq!(entries.len(), 6);

        let first = &entries[0];
        assert_eq!(first.global_index, 1);
        assert_eq!(first.local_index, 0);
        assert_eq!((first.start_range, first.end_range), (0, 8));
        assert_eq!(&first.path[..5], &["a1", "b1", "c1", "c2", "c3"]);
        assert_eq!(first.path.len(), 5 + 9);

        let last = &entries[5];
        assert_eq!(last.global_index, 2);
        assert_eq!((last.start_range, last.end_range), (45, 53));
    }

    #[test]
    fn test_leaf_parent_level_rows() {
        let index = ControlIndex::build(&standard(), "c7").unwrap();
        assert_eq!(index.depth(), 3);
        assert_eq!(index.entries().len(), 54);
        let row = &index.entries()[10];
        assert_eq!(row.path, vec!["c4", "10"]);
        assert_eq!(row.global_index, 4);
        assert_eq!((row.start_range, row.end_range), (10, 10));
    }

    #[test]
    fn test_rows_sorted_by_numeric_suffix() {
        let index = ControlIndex::build(&standard(), "b1").unwrap();
        let globals: Vec<u32> = index.entries().iter().map(|e| e.global_index).collect();
        let mut sorted = globals.clone();
        sorted.sort();
        assert_eq!(globals, sorted);
        // b4 owns c10..c12
        assert_eq!(index.entries()[9].path[1], "c10");
    }

    #[test]
    fn test_global_summary() {
        let index = ControlIndex::build(&standard(), "a1").unwrap();
        let summary = index.global_summary();
        assert_eq!(summary[&1], AddressRange { start: 0, end: 26 });
        assert_eq!(summary[&2], AddressRange { start: 27, end: 53 });
    }

    #[test]
    fn test_partial_path() {
        let (_, path) = resolve_partial_path(&standard(), 5, "a1").unwrap();
        assert_eq!(path.to_string(), "I1 -> a1 -> b1 -> c2 -> 5");
        assert_eq!(path.control_index(), "I1");

        let (_, path) = resolve_partial_path(&standard(), 40, "b3").unwrap();
        assert_eq!(path.control_index(), "I5");
    }

    #[test]
    fn test_partial_path_out_of_range() {
        assert_eq!(
            resolve_partial_path(&standard(), 54, "a1").unwrap_err(),
            AircastError::OutOfRange { address: 54 }
        );
    }

    #[test]
    fn test_leaf_tag_rejected() {
        assert!(matches!(
            ControlIndex::build(&standard(), "7"),
            Err(AircastError::Configuration(_))
        ));
    }
}
