//! Serializable views over a `TreeArena`.
//!
//! Nested JSON shapes:
//! - forest: `[{"<id>": {"label": ..., "children": [...]}}, ...]`
//! - node:   `{"label": ..., "children": [{"<childId>": {...}}, ...]}`

use generational_arena::Index;
use serde::ser::{Error as _, SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::domain::arena::TreeArena;
use crate::domain::error::{DomainError, DomainResult};

/// The whole forest as a sequence of self-keyed node references.
pub struct ForestView<'a> {
    tree: &'a TreeArena,
}

impl<'a> ForestView<'a> {
    pub fn new(tree: &'a TreeArena) -> Self {
        Self { tree }
    }
}

impl Serialize for ForestView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tree.roots().iter().map(|&idx| NodeRefView {
            tree: self.tree,
            idx,
        }))
    }
}

/// A single node without its id wrapper.
pub struct NodeView<'a> {
    tree: &'a TreeArena,
    idx: Index,
}

impl<'a> NodeView<'a> {
    pub fn new(tree: &'a TreeArena, id: &str) -> DomainResult<Self> {
        let idx = tree
            .index_of(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))?;
        Ok(Self { tree, idx })
    }
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self
            .tree
            .node(self.idx)
            .ok_or_else(|| S::Error::custom("dangling node handle"))?;
        let children: Vec<NodeRefView<'_>> = node
            .children
            .iter()
            .map(|&idx| NodeRefView {
                tree: self.tree,
                idx,
            })
            .collect();

        let mut state = serializer.serialize_struct("Node", 2)?;
        state.serialize_field("label", &node.label)?;
        state.serialize_field("children", &children)?;
        state.end()
    }
}

/// `{"<id>": node}`
pub struct NodeRefView<'a> {
    tree: &'a TreeArena,
    idx: Index,
}

impl Serialize for NodeRefView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self
            .tree
            .node(self.idx)
            .ok_or_else(|| S::Error::custom("dangling node handle"))?;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            &node.id,
            &NodeView {
                tree: self.tree,
                idx: self.idx,
            },
        )?;
        map.end()
    }
}
