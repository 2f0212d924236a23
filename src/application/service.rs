//! Tree service
//!
//! Owns the single live `TreeArena` and hands out the engine operations.
//! Callers serialize access; the service does no locking of its own.

use tracing::{debug, info};

use crate::application::ApplicationResult;
use crate::domain::{
    ForestView, NewNode, NodeId, NodeRecord, NodeUpdate, NodeView, TreeArena, TreeBuilder,
};

/// Service wrapping one tree instance.
#[derive(Debug, Default)]
pub struct TreeService {
    tree: TreeArena,
}

impl TreeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a flat record set instead of an empty tree.
    pub fn seeded(records: &[NodeRecord]) -> ApplicationResult<Self> {
        let mut service = Self::new();
        service.seed(records)?;
        Ok(service)
    }

    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    pub fn forest(&self) -> ForestView<'_> {
        ForestView::new(&self.tree)
    }

    pub fn add(&mut self, new: NewNode) -> ApplicationResult<NodeId> {
        Ok(self.tree.add_node(new)?)
    }

    pub fn get(&self, id: &str) -> ApplicationResult<NodeView<'_>> {
        Ok(NodeView::new(&self.tree, id)?)
    }

    pub fn update(&mut self, id: &str, update: NodeUpdate) -> ApplicationResult<NodeId> {
        Ok(self.tree.update_node(id, update)?)
    }

    pub fn delete(&mut self, id: &str, keep_children: bool) -> ApplicationResult<NodeId> {
        Ok(self.tree.delete_node(id, keep_children)?)
    }

    /// Replace the tree with a fresh, empty one.
    pub fn reset(&mut self) {
        info!(dropped = self.tree.len(), "tree reset");
        self.tree = TreeArena::new();
    }

    /// Replace the tree with one rebuilt from records.
    ///
    /// The current tree is kept if the records are rejected.
    pub fn seed(&mut self, records: &[NodeRecord]) -> ApplicationResult<()> {
        let tree = TreeBuilder::from_records(records)?;
        debug!(nodes = tree.len(), "tree seeded");
        self.tree = tree;
        Ok(())
    }
}
