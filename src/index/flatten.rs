//! Parent-linked representation of the replication tree

use super::TreeNode;
use crate::AircastError;
use serde::Serialize;
use std::collections::HashMap;

/// Link from a node to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeLink {
    /// Tree root
    Root,

    /// Index of the parent in the flat list
    Parent(usize),
}

/// Node in the flat list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatNode {
    /// Node name
    pub name: String,
    /// Parent link
    pub link: NodeLink,
}

/// Flattened replication tree
#[derive(Debug, Clone)]
pub struct FlatTree {
    nodes: Vec<FlatNode>,
    by_name: HashMap<String, usize>,
    children: Vec<Vec<usize>>,
}

impl FlatTree {
    /// Flatten a nested tree in depth-first pre-order.
    ///
    /// Node names are identifiers; duplicates are rejected.
    pub fn flatten(root: &TreeNode) -> Result<Self, AircastError> {
        let mut nodes = Vec::new();
        let mut stack: Vec<(&TreeNode, NodeLink)> = vec![(root, NodeLink::Root)];

        while let Some((node, link)) = stack.pop() {
            let idx = nodes.len();
            nodes.push(FlatNode {
                name: node.name.clone(),
                link,
            });
            for child in node.children.iter().rev() {
                stack.push((child, NodeLink::Parent(idx)));
            }
        }

        Self::index(nodes)
    }

    /// Build from `(name, parent name)` pairs; `None` marks the root.
    ///
    /// Links are not checked for cycles here; ascent detects them.
    pub fn from_links<I, S>(links: I) -> Result<Self, AircastError>
    where
        I: IntoIterator<Item = (S, Option<S>)>,
        S: Into<String>,
    {
        let pairs: Vec<(String, Option<String>)> = links
            .into_iter()
            .map(|(name, parent)| (name.into(), parent.map(Into::into)))
            .collect();

        let positions: HashMap<&str, usize> = pairs
            .iter()
            .enumerate()
            .map(|(idx, (name, _))| (name.as_str(), idx))
            .collect();

        let nodes = pairs
            .iter()
            .map(|(name, parent)| {
                let link = match parent {
                    None => NodeLink::Root,
                    Some(parent) => NodeLink::Parent(
                        *positions
                            .get(parent.as_str())
                            .ok_or_else(|| AircastError::NotFound(parent.clone()))?,
                    ),
                };
                Ok(FlatNode {
                    name: name.clone(),
                    link,
                })
            })
            .collect::<Result<Vec<_>, AircastError>>()?;

        Self::index(nodes)
    }

    fn index(nodes: Vec<FlatNode>) -> Result<Self, AircastError> {
        let roots = nodes.iter().filter(|n| n.link == NodeLink::Root).count();
        if roots != 1 {
            return Err(AircastError::Configuration(format!(
                "replication tree must have exactly one root, found {roots}"
            )));
        }

        let mut by_name = HashMap::with_capacity(nodes.len());
        let mut children = vec![Vec::new(); nodes.len()];
        for (idx, node) in nodes.iter().enumerate() {
            if by_name.insert(node.name.clone(), idx).is_some() {
                return Err(AircastError::Configuration(format!(
                    "duplicate node name `{}`",
                    node.name
                )));
            }
            if let NodeLink::Parent(parent) = node.link {
                children[parent].push(idx);
            }
        }

        Ok(Self {
            nodes,
            by_name,
            children,
        })
    }

    /// Flat nodes in pre-order
    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty (never true for a built tree)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at `idx`
    ///
    /// # Panics
    ///
    /// If `idx` is not an index of this tree (see [`FlatTree::position`]).
    pub fn node(&self, idx: usize) -> &FlatNode {
        &self.nodes[idx]
    }

    /// Name of the node at `idx`
    ///
    /// # Panics
    ///
    /// If `idx` is not an index of this tree.
    pub fn name(&self, idx: usize) -> &str {
        &self.nodes[idx].name
    }

    /// Index of the node called `name`
    pub fn position(&self, name: &str) -> Result<usize, AircastError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| AircastError::NotFound(name.to_string()))
    }

    /// Whether a node called `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Index of the root
    pub fn root(&self) -> usize {
        // `index` guarantees exactly one root
        self.nodes
            .iter()
            .position(|n| n.link == NodeLink::Root)
            .unwrap_or(0)
    }

    /// Children of `idx` in tree order
    ///
    /// # Panics
    ///
    /// If `idx` is not an index of this tree.
    pub fn children(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    /// Whether `idx` has no children
    ///
    /// # Panics
    ///
    /// If `idx` is not an index of this tree.
    pub fn is_leaf(&self, idx: usize) -> bool {
        self.children[idx].is_empty()
    }

    /// Indices from the root down to `idx`.
    ///
    /// Ascent is capped at the node count; a longer chain can only be a
    /// cycle. An index outside the tree is `NotFound`.
    pub fn ancestry(&self, idx: usize) -> Result<Vec<usize>, AircastError> {
        let start = self
            .nodes
            .get(idx)
            .ok_or_else(|| AircastError::NotFound(format!("index {idx}")))?;
        let limit = self.nodes.len();
        let mut chain = vec![idx];
        let mut current = idx;

        for _ in 0..limit {
            match self.nodes[current].link {
                NodeLink::Root => {
                    chain.reverse();
                    return Ok(chain);
                }
                NodeLink::Parent(parent) => {
                    chain.push(parent);
                    current = parent;
                }
            }
        }

        Err(AircastError::CycleDetected {
            start: start.name.clone(),
            limit,
        })
    }

    /// Depth of `idx` (root is 0)
    pub fn depth(&self, idx: usize) -> Result<usize, AircastError> {
        Ok(self.ancestry(idx)?.len() - 1)
    }

    /// Node names from the root down to `destination`
    pub fn resolve_entire_path(&self, destination: &str) -> Result<Vec<String>, AircastError> {
        let idx = self.position(destination)?;
        Ok(self
            .ancestry(idx)?
            .into_iter()
            .map(|i| self.nodes[i].name.clone())
            .collect())
    }

    /// All nodes at `depth`, in pre-order
    pub fn nodes_at_depth(&self, depth: usize) -> Result<Vec<usize>, AircastError> {
        let mut found = Vec::new();
        for idx in 0..self.nodes.len() {
            if self.depth(idx)? == depth {
                found.push(idx);
            }
        }
        Ok(found)
    }

    /// Names usable as replication-level tags: internal, non-root nodes
    pub fn level_tags(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(idx, node)| node.link != NodeLink::Root && !self.is_leaf(*idx))
            .map(|(_, node)| node.name.as_str())
            .collect()
    }
}
