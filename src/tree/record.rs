use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// Kind of change carried by a [`MutationRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// An attribute was set or removed
    AttributeChange,
    /// Children were inserted or removed
    ChildListChange,
    /// Character data of a text node changed
    TextChange,
}

/// A node that was added or removed, together with its stable id read at
/// observation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub node: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable_id: Option<String>,
}

/// One observed change to a node of the tree.
///
/// Records are immutable once delivered; batches keep their delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub target: NodeId,
    pub kind: MutationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added_nodes: Vec<NodeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_nodes: Vec<NodeRef>,
}

impl MutationRecord {
    pub fn attribute(target: NodeId, name: impl Into<String>) -> Self {
        Self {
            target,
            kind: MutationKind::AttributeChange,
            attribute_name: Some(name.into()),
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
        }
    }

    pub fn child_list(
        target: NodeId,
        added_nodes: Vec<NodeRef>,
        removed_nodes: Vec<NodeRef>,
    ) -> Self {
        Self {
            target,
            kind: MutationKind::ChildListChange,
            attribute_name: None,
            added_nodes,
            removed_nodes,
        }
    }

    pub fn text(target: NodeId) -> Self {
        Self {
            target,
            kind: MutationKind::TextChange,
            attribute_name: None,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
        }
    }

    /// True for attribute changes on the `class` attribute
    pub fn is_class_change(&self) -> bool {
        self.kind == MutationKind::AttributeChange
            && self.attribute_name.as_deref() == Some("class")
    }

    /// Attribute-kind records must name their attribute
    pub fn is_malformed(&self) -> bool {
        self.kind == MutationKind::AttributeChange
            && self.attribute_name.as_deref().map_or(true, str::is_empty)
    }
}
