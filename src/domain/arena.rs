//! Arena-backed forest: the tree mutation engine.
//!
//! Nodes live in a generational arena and reference each other through stable
//! `Index` handles. Two views are kept in sync over the same node set:
//! - the forest (`roots` plus each node's ordered `children`)
//! - the flat id index (`NodeId -> Index`, parent via `TreeNode::parent`)

use std::collections::{HashMap, HashSet};

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::entities::{NewNode, NodeId, NodeRecord, NodeUpdate};
use crate::domain::error::{DomainError, DomainResult};

/// Tree node in the arena-based forest.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Externally visible id, key of the flat index
    pub id: NodeId,
    pub label: String,
    /// Handle of the parent node, None for forest members
    pub parent: Option<Index>,
    /// Handles of child nodes, in insertion order
    pub children: Vec<Index>,
}

/// Labeled forest with an id index.
///
/// Every operation validates its input completely before touching the
/// structure, so a rejected call leaves the tree unchanged.
#[derive(Debug)]
pub struct TreeArena {
    arena: Arena<TreeNode>,
    index: HashMap<NodeId, Index>,
    roots: Vec<Index>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            index: HashMap::new(),
            roots: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Handles of the top-level nodes, in insertion order.
    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn root_ids(&self) -> Vec<&str> {
        self.roots
            .iter()
            .filter_map(|&idx| self.node(idx))
            .map(|node| node.id.as_str())
            .collect()
    }

    /// Resolve a handle obtained from `roots`, `children` or an iterator.
    pub fn node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.index.get(id).copied()
    }

    /// Add a node under `parent`, or to the forest when no parent is given.
    #[instrument(level = "debug", skip(self))]
    pub fn add_node(&mut self, new: NewNode) -> DomainResult<NodeId> {
        if new.label.is_empty() {
            return Err(DomainError::LabelRequired);
        }

        let id = match new.id.filter(|id| !id.is_empty()) {
            Some(id) if self.index.contains_key(&id) => return Err(DomainError::DuplicateId(id)),
            Some(id) => id,
            None => self.generate_id(),
        };

        let parent = match new.parent {
            Some(parent_id) => Some(
                self.index_of(&parent_id)
                    .ok_or(DomainError::ParentNotFound(parent_id))?,
            ),
            None => None,
        };

        let idx = self.arena.insert(TreeNode {
            id: id.clone(),
            label: new.label,
            parent,
            children: Vec::new(),
        });
        self.siblings_mut(parent)?.push(idx);
        self.index.insert(id.clone(), idx);

        debug!(%id, parented = parent.is_some(), "node added");
        Ok(id)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, id: &str) -> DomainResult<&TreeNode> {
        let idx = self.require(id)?;
        self.node_at(idx)
    }

    /// Relabel and/or re-parent a node in place.
    ///
    /// Re-parenting under the node itself or any of its descendants is
    /// rejected with `CycleDetected`. Moving to the current parent is a no-op.
    #[instrument(level = "debug", skip(self))]
    pub fn update_node(&mut self, id: &str, update: NodeUpdate) -> DomainResult<NodeId> {
        let idx = self.require(id)?;

        if matches!(update.label.as_deref(), Some("")) {
            return Err(DomainError::LabelRequired);
        }

        let current_parent = self.node_at(idx)?.parent;
        let relocation = match update.parent {
            None => None,
            Some(None) => Some(None),
            Some(Some(parent_id)) => {
                let parent_idx = self
                    .index_of(&parent_id)
                    .ok_or_else(|| DomainError::ParentNotFound(parent_id.clone()))?;
                if parent_idx == idx || self.is_ancestor(idx, parent_idx) {
                    return Err(DomainError::CycleDetected {
                        node: id.to_string(),
                        parent: parent_id,
                    });
                }
                Some(Some(parent_idx))
            }
        }
        .filter(|target| *target != current_parent);

        if let Some(label) = update.label {
            self.node_at_mut(idx)?.label = label;
            debug!(%id, "label updated");
        }

        if let Some(target) = relocation {
            self.detach(idx)?;
            self.attach(idx, target)?;
            debug!(%id, parented = target.is_some(), "node moved");
        }

        Ok(id.to_string())
    }

    /// Remove a node.
    ///
    /// With `keep_children` the direct children are appended to the former
    /// parent (or the forest); otherwise the whole subtree is purged.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_node(&mut self, id: &str, keep_children: bool) -> DomainResult<NodeId> {
        let idx = self.require(id)?;
        let parent = self.detach(idx)?;

        if keep_children {
            let children = std::mem::take(&mut self.node_at_mut(idx)?.children);
            debug!(%id, promoted = children.len(), "promoting children");
            for child in children {
                self.attach(child, parent)?;
            }
            self.remove_entry(idx);
        } else {
            let doomed: Vec<Index> = self.iter_postorder_from(idx).map(|(i, _)| i).collect();
            debug!(%id, removed = doomed.len(), "purging subtree");
            for i in doomed {
                self.remove_entry(i);
            }
        }

        Ok(id.to_string())
    }

    pub fn parent_id(&self, id: &str) -> DomainResult<Option<&str>> {
        let node = self.get_node(id)?;
        Ok(node
            .parent
            .and_then(|p| self.node(p))
            .map(|parent| parent.id.as_str()))
    }

    pub fn children_ids(&self, id: &str) -> DomainResult<Vec<&str>> {
        let node = self.get_node(id)?;
        Ok(node
            .children
            .iter()
            .filter_map(|&c| self.node(c))
            .map(|child| child.id.as_str())
            .collect())
    }

    /// Walk from the parent of `idx` up to its forest root.
    pub fn ancestors(&self, idx: Index) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            next: self.node(idx).and_then(|node| node.parent),
        }
    }

    /// Pre-order over the whole forest.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, &self.roots)
    }

    /// Pre-order over the subtree rooted at `idx`, including `idx`.
    pub fn iter_subtree(&self, idx: Index) -> TreeIterator<'_> {
        TreeIterator::new(self, &[idx])
    }

    /// Post-order over the whole forest.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, &self.roots)
    }

    pub fn iter_postorder_from(&self, idx: Index) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, &[idx])
    }

    /// Number of levels of the deepest tree in the forest.
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, idx: Index) -> usize {
        match self.node(idx) {
            Some(node) => {
                1 + node
                    .children
                    .iter()
                    .map(|&child| self.calculate_depth(child))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    /// Ids of childless nodes, in pre-order.
    pub fn leaf_ids(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.id.as_str())
            .collect()
    }

    /// Flat export in pre-order: every parent precedes its children.
    pub fn records(&self) -> Vec<NodeRecord> {
        self.iter()
            .map(|(_, node)| NodeRecord {
                id: node.id.clone(),
                parent: node
                    .parent
                    .and_then(|p| self.node(p))
                    .map(|parent| parent.id.clone()),
                label: node.label.clone(),
            })
            .collect()
    }

    /// Check that the forest and the id index describe the same node set.
    pub fn check_invariants(&self) -> DomainResult<()> {
        let mut seen = HashSet::new();
        for (idx, node) in self.iter() {
            if !seen.insert(idx) {
                return Err(DomainError::Corrupted(format!("{} reachable twice", node.id)));
            }
            if self.index_of(&node.id) != Some(idx) {
                return Err(DomainError::Corrupted(format!("{} not indexed", node.id)));
            }
            let siblings = match node.parent {
                Some(p) => &self.node_at(p)?.children,
                None => &self.roots,
            };
            if siblings.iter().filter(|&&s| s == idx).count() != 1 {
                return Err(DomainError::Corrupted(format!(
                    "{} not listed once by its parent",
                    node.id
                )));
            }
        }
        if seen.len() != self.index.len() || seen.len() != self.arena.len() {
            return Err(DomainError::Corrupted(format!(
                "{} reachable, {} indexed, {} stored",
                seen.len(),
                self.index.len(),
                self.arena.len()
            )));
        }
        Ok(())
    }

    fn generate_id(&self) -> NodeId {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    fn require(&self, id: &str) -> DomainResult<Index> {
        self.index_of(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))
    }

    fn node_at(&self, idx: Index) -> DomainResult<&TreeNode> {
        self.arena
            .get(idx)
            .ok_or_else(|| DomainError::Corrupted(format!("dangling handle {:?}", idx)))
    }

    fn node_at_mut(&mut self, idx: Index) -> DomainResult<&mut TreeNode> {
        self.arena
            .get_mut(idx)
            .ok_or_else(|| DomainError::Corrupted(format!("dangling handle {:?}", idx)))
    }

    fn is_ancestor(&self, ancestor: Index, idx: Index) -> bool {
        self.ancestors(idx).any(|a| a == ancestor)
    }

    /// The sequence holding the children of `parent`, or the forest.
    fn siblings_mut(&mut self, parent: Option<Index>) -> DomainResult<&mut Vec<Index>> {
        match parent {
            Some(p) => self
                .arena
                .get_mut(p)
                .map(|node| &mut node.children)
                .ok_or_else(|| DomainError::Corrupted(format!("dangling parent {:?}", p))),
            None => Ok(&mut self.roots),
        }
    }

    /// Unlink `idx` from its container; returns the former parent.
    fn detach(&mut self, idx: Index) -> DomainResult<Option<Index>> {
        let parent = self.node_at(idx)?.parent;
        let siblings = self.siblings_mut(parent)?;
        let pos = siblings
            .iter()
            .position(|&s| s == idx)
            .ok_or_else(|| DomainError::Corrupted(format!("{:?} missing from container", idx)))?;
        siblings.remove(pos);
        self.node_at_mut(idx)?.parent = None;
        Ok(parent)
    }

    fn attach(&mut self, idx: Index, parent: Option<Index>) -> DomainResult<()> {
        self.siblings_mut(parent)?.push(idx);
        self.node_at_mut(idx)?.parent = parent;
        Ok(())
    }

    fn remove_entry(&mut self, idx: Index) {
        if let Some(node) = self.arena.remove(idx) {
            self.index.remove(&node.id);
        }
    }
}

pub struct Ancestors<'a> {
    arena: &'a TreeArena,
    next: Option<Index>,
}

impl Iterator for Ancestors<'_> {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.arena.node(current).and_then(|node| node.parent);
        Some(current)
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena, starts: &[Index]) -> Self {
        Self {
            arena,
            stack: starts.iter().rev().copied().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena, starts: &[Index]) -> Self {
        Self {
            arena,
            stack: starts.iter().rev().map(|&idx| (idx, false)).collect(),
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
