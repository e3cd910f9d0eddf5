use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Arena index of a node. Stable for the lifetime of the owning document,
/// including after the node is detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Border box of a node, used only to locate the stable header root
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Rect {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Detached deep copy of a node and its descendants.
///
/// Snapshots never alias live nodes: replay reads attribute values and text
/// from them and re-materializes subtrees by matching a stable id attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSnapshot {
    Element {
        tag: String,
        attrs: BTreeMap<String, String>,
        /// Display value coming from the stylesheet, before inline style
        sheet_display: String,
        children: Vec<NodeSnapshot>,
    },
    Text(String),
}

impl NodeSnapshot {
    pub fn element(tag: impl Into<String>) -> Self {
        NodeSnapshot::Element {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            sheet_display: "block".to_string(),
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            NodeSnapshot::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            NodeSnapshot::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[NodeSnapshot] {
        match self {
            NodeSnapshot::Element { children, .. } => children,
            NodeSnapshot::Text(_) => &[],
        }
    }

    pub fn text_content(&self) -> String {
        match self {
            NodeSnapshot::Text(text) => text.clone(),
            NodeSnapshot::Element { children, .. } => {
                let mut out = String::new();
                for child in children {
                    out.push_str(&child.text_content());
                }
                out
            }
        }
    }

    /// First descendant (excluding `self`) whose `attr` equals `value`, in
    /// document order.
    pub fn find_descendant(&self, attr: &str, value: &str) -> Option<&NodeSnapshot> {
        for child in self.children() {
            if child.attribute(attr) == Some(value) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(attr, value) {
                return Some(found);
            }
        }
        None
    }
}
