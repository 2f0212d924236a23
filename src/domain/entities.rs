//! Domain entities: inputs and records passed across the engine boundary

use serde::{Deserialize, Serialize};

/// Externally visible node identifier.
pub type NodeId = String;

/// Input for `TreeArena::add_node`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNode {
    /// Caller-supplied id; generated when `None` or empty
    pub id: Option<NodeId>,
    /// Parent id; `None` appends to the forest
    pub parent: Option<NodeId>,
    pub label: String,
}

impl NewNode {
    pub fn root(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn child(parent: impl Into<NodeId>, label: impl Into<String>) -> Self {
        Self {
            parent: Some(parent.into()),
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Input for `TreeArena::update_node`.
///
/// `parent` distinguishes "not supplied" (`None`) from "move to the forest"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeUpdate {
    pub label: Option<String>,
    pub parent: Option<Option<NodeId>>,
}

impl NodeUpdate {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            parent: None,
        }
    }

    pub fn move_to(parent: impl Into<NodeId>) -> Self {
        Self {
            label: None,
            parent: Some(Some(parent.into())),
        }
    }

    pub fn move_to_root() -> Self {
        Self {
            label: None,
            parent: Some(None),
        }
    }
}

/// Flat storage shape of a node: one row per node, parent by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(default)]
    pub parent: Option<NodeId>,
    pub label: String,
}
