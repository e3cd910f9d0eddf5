//! Tree capability layer
//!
//! The monitor never touches a concrete tree directly. Everything it needs
//! (identity, attributes, children, text, computed display, deep clones and
//! the batched change feed) goes through the [`Tree`] trait. [`Document`] is
//! the in-memory arena implementation used by the runtime, the scenario
//! player and the tests.

mod document;
mod locate;
mod node;
mod record;

use thiserror::Error;

pub use document::Document;
pub use locate::{FixedRoot, HeaderRootLocator, RootLocator};
pub use node::{NodeId, NodeSnapshot, Rect};
pub use record::{MutationKind, MutationRecord, NodeRef};

/// Errors from tree operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),
    #[error("Node {0} has no parent")]
    Detached(NodeId),
}

/// Capabilities the monitor needs from the observed tree.
pub trait Tree {
    /// Node the whole tree hangs from
    fn document_root(&self) -> NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn tag_name(&self, node: NodeId) -> Option<&str>;

    /// Descendants of `node` in document order, excluding `node` itself
    fn descendants(&self, node: NodeId) -> Vec<NodeId>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), TreeError>;

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), TreeError>;

    fn text_content(&self, node: NodeId) -> String;

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), TreeError>;

    /// Display value after applying inline style over the stylesheet value
    fn computed_display(&self, node: NodeId) -> String;

    /// Set (`Some`) or clear (`None`) the inline display property
    fn set_display(&mut self, node: NodeId, display: Option<&str>) -> Result<(), TreeError>;

    fn bounds(&self, node: NodeId) -> Option<Rect>;

    /// Deep copy of `node` including descendants and attributes
    fn snapshot(&self, node: NodeId) -> Result<NodeSnapshot, TreeError>;

    /// Materialize `snapshot` as the last child of `parent`
    fn append_snapshot(
        &mut self,
        parent: NodeId,
        snapshot: &NodeSnapshot,
    ) -> Result<NodeId, TreeError>;

    /// Remove `node` from its parent
    fn detach(&mut self, node: NodeId) -> Result<(), TreeError>;

    /// Drain the mutation records queued since the last call
    fn take_records(&mut self) -> Vec<MutationRecord>;

    /// Inclusive ancestry test
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|value| value.split_whitespace().any(|c| c == class))
    }

    /// Remove every class in `classes` from `node`. Leaves the attribute
    /// untouched when none of them is present.
    fn remove_classes(&mut self, node: NodeId, classes: &[String]) -> Result<(), TreeError> {
        let Some(current) = self.attribute(node, "class") else {
            return Ok(());
        };
        let kept: Vec<&str> = current
            .split_whitespace()
            .filter(|c| !classes.iter().any(|r| r == c))
            .collect();
        if kept.len() == current.split_whitespace().count() {
            return Ok(());
        }
        self.set_attribute(node, "class", &kept.join(" "))
    }

    /// First descendant of `node` (excluding itself) whose `attr` equals `value`
    fn find_descendant(&self, node: NodeId, attr: &str, value: &str) -> Option<NodeId> {
        self.descendants(node)
            .into_iter()
            .find(|candidate| self.attribute(*candidate, attr).as_deref() == Some(value))
    }

    /// Descendants of `node` with the given tag name
    fn elements_by_tag(&self, node: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .filter(|candidate| self.tag_name(*candidate) == Some(tag))
            .collect()
    }
}
