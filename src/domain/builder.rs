//! Tree builder for rebuilding a forest from flat `{id, parent, label}` records.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::domain::arena::TreeArena;
use crate::domain::entities::{NewNode, NodeId, NodeRecord};
use crate::domain::error::{DomainError, DomainResult};

/// Constructs a `TreeArena` from records in any order.
pub struct TreeBuilder {
    relationship_cache: HashMap<NodeId, Vec<usize>>,
    visited_ids: HashSet<NodeId>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            relationship_cache: HashMap::new(),
            visited_ids: HashSet::new(),
        }
    }

    /// One-shot convenience around `build`.
    pub fn from_records(records: &[NodeRecord]) -> DomainResult<TreeArena> {
        Self::new().build(records)
    }

    /// Build a forest; sibling order follows record order.
    #[instrument(level = "debug", skip(self, records), fields(records = records.len()))]
    pub fn build(&mut self, records: &[NodeRecord]) -> DomainResult<TreeArena> {
        self.relationship_cache.clear();
        self.visited_ids.clear();

        self.scan_records(records)?;

        let mut tree = TreeArena::new();
        for (pos, record) in records.iter().enumerate() {
            if record.parent.is_none() {
                self.build_tree(&mut tree, records, pos)?;
            }
        }

        // Whatever was not reached from a root hangs off a parent loop
        if let Some(orphan) = records.iter().find(|r| !self.visited_ids.contains(&r.id)) {
            return Err(DomainError::CycleDetected {
                node: orphan.id.clone(),
                parent: orphan.parent.clone().unwrap_or_default(),
            });
        }

        debug!(nodes = tree.len(), "forest rebuilt");
        Ok(tree)
    }

    fn scan_records(&mut self, records: &[NodeRecord]) -> DomainResult<()> {
        let mut ids = HashSet::new();
        for record in records {
            // add_node would generate a fresh id for an empty one
            if record.id.is_empty() {
                return Err(DomainError::IdRequired);
            }
            if !ids.insert(record.id.as_str()) {
                return Err(DomainError::DuplicateId(record.id.clone()));
            }
        }

        for (pos, record) in records.iter().enumerate() {
            if let Some(parent) = &record.parent {
                if !ids.contains(parent.as_str()) {
                    return Err(DomainError::ParentNotFound(parent.clone()));
                }
                self.relationship_cache
                    .entry(parent.clone())
                    .or_default()
                    .push(pos);
            }
        }
        Ok(())
    }

    fn build_tree(
        &mut self,
        tree: &mut TreeArena,
        records: &[NodeRecord],
        root: usize,
    ) -> DomainResult<()> {
        let mut stack = vec![root];

        while let Some(pos) = stack.pop() {
            let record = &records[pos];
            self.visited_ids.insert(record.id.clone());

            tree.add_node(NewNode {
                id: Some(record.id.clone()),
                parent: record.parent.clone(),
                label: record.label.clone(),
            })?;

            // Reverse so the first child is popped, and appended, first
            if let Some(children) = self.relationship_cache.get(&record.id) {
                stack.extend(children.iter().rev());
            }
        }
        Ok(())
    }
}
