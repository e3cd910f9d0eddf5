//! Scripted scenarios: an initial document plus a list of steps
//!
//! Scenarios are JSON files. Nodes are referenced by their stable id, so a
//! scenario stays valid however the arena assigns indices.

mod player;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bus::BusSignal;
use crate::tree::{Document, NodeId, NodeSnapshot, Rect, Tree, TreeError};

pub use player::{apply_step, play, play_live};

/// Error while loading or playing a scenario
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unknown node reference: {0}")]
    UnknownNode(String),
    #[error("Node spec needs either a tag or text")]
    EmptyNode,
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
    #[error("No header root found in scenario document")]
    NoRoot,
    #[error("Monitor task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Declarative node used to build the scenario document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Element tag; omit for a text node
    #[serde(default)]
    pub tag: Option<String>,
    /// Text node content, or a text child appended to the element
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Stylesheet hides the element (`display: none`)
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub bounds: Option<Rect>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Build this spec under `parent`, returning the new node
    pub fn build(&self, doc: &mut Document, parent: NodeId) -> Result<NodeId, ScenarioError> {
        let Some(tag) = self.tag.as_deref() else {
            let text = self.text.as_deref().ok_or(ScenarioError::EmptyNode)?;
            return Ok(doc.append_text(parent, text)?);
        };

        let node = doc.append_element(parent, tag)?;
        for (name, value) in &self.attrs {
            doc.set_attribute(node, name, value)?;
        }
        if self.hidden {
            doc.set_sheet_display(node, "none")?;
        }
        if let Some(bounds) = self.bounds {
            doc.set_bounds(node, bounds)?;
        }
        if let Some(text) = self.text.as_deref() {
            doc.append_text(node, text)?;
        }
        for child in &self.children {
            child.build(doc, node)?;
        }
        Ok(node)
    }

    /// Detached form of this spec, for inserting a complete subtree in one
    /// mutation. Geometry is dropped.
    pub fn to_snapshot(&self) -> Result<NodeSnapshot, ScenarioError> {
        let Some(tag) = self.tag.as_deref() else {
            let text = self.text.as_deref().ok_or(ScenarioError::EmptyNode)?;
            return Ok(NodeSnapshot::Text(text.to_string()));
        };

        let mut children = Vec::new();
        if let Some(text) = self.text.as_deref() {
            children.push(NodeSnapshot::Text(text.to_string()));
        }
        for child in &self.children {
            children.push(child.to_snapshot()?);
        }
        Ok(NodeSnapshot::Element {
            tag: tag.to_string(),
            attrs: self.attrs.clone(),
            sheet_display: if self.hidden { "none" } else { "block" }.to_string(),
            children,
        })
    }
}

/// One scripted action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    SetAttribute { node: String, name: String, value: String },
    RemoveAttribute { node: String, name: String },
    AddClass { node: String, class: String },
    RemoveClass { node: String, class: String },
    SetText { node: String, text: String },
    SetDisplay {
        node: String,
        #[serde(default)]
        display: Option<String>,
    },
    Append { parent: String, spec: NodeSpec },
    Remove { node: String },
    PointerEnter { node: String },
    PointerLeave,
    /// Let virtual (or, when live, real) time pass
    Advance { ms: u64 },
    Signal { topic: BusSignal },
    ForceClose,
}

/// Scenario file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Overrides the configured hover duration
    #[serde(default)]
    pub hover_ms: Option<u64>,
    /// Children of the document root
    pub document: Vec<NodeSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Build the initial document. Records produced while building are
    /// dropped.
    pub fn build_document(&self, stable_id_attribute: &str) -> Result<Document, ScenarioError> {
        let mut doc = Document::with_stable_id_attribute(stable_id_attribute);
        let root = doc.document_root();
        for spec in &self.document {
            spec.build(&mut doc, root)?;
        }
        doc.clear_records();
        Ok(doc)
    }
}

/// Resolve a stable id reference against `doc`
pub fn resolve(doc: &Document, reference: &str) -> Result<NodeId, ScenarioError> {
    doc.by_stable_id(reference)
        .ok_or_else(|| ScenarioError::UnknownNode(reference.to_string()))
}
