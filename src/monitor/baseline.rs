//! Attachment-time baseline of hidden and closed nodes, and the deltas
//! observed against it when a menu is committed.

use crate::config::MonitorConfig;
use crate::tree::{NodeId, Tree};

/// Nodes that were hidden or closed when the monitor attached. Never
/// changes afterwards.
#[derive(Debug, Clone, Default)]
pub struct Baseline {
    hidden: Vec<NodeId>,
    disclosures: Vec<NodeId>,
}

impl Baseline {
    /// Hidden set: descendants of the first menu container under `root`
    /// whose computed display is `none`. Disclosure set: disclosure
    /// elements under `root` without an `open` attribute.
    pub fn capture<T: Tree>(tree: &T, root: NodeId, config: &MonitorConfig) -> Self {
        let hidden = tree
            .elements_by_tag(root, &config.menu_container_tag)
            .first()
            .map(|container| {
                tree.descendants(*container)
                    .into_iter()
                    .filter(|node| tree.tag_name(*node).is_some())
                    .filter(|node| tree.computed_display(*node) == "none")
                    .collect()
            })
            .unwrap_or_default();

        let disclosures = tree
            .elements_by_tag(root, &config.disclosure_tag)
            .into_iter()
            .filter(|node| tree.attribute(*node, "open").is_none())
            .collect();

        Self {
            hidden,
            disclosures,
        }
    }

    pub fn hidden(&self) -> &[NodeId] {
        &self.hidden
    }

    pub fn disclosures(&self) -> &[NodeId] {
        &self.disclosures
    }
}

/// Single-slot observations of baseline nodes that changed while a menu
/// was open. A later observation replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deltas {
    /// A hidden node that became visible, with its observed display
    pub visibility: Option<(NodeId, String)>,
    /// A closed disclosure that became open
    pub disclosure: Option<NodeId>,
}

impl Deltas {
    /// Observe the current tree against `baseline`
    pub fn observe<T: Tree>(tree: &T, baseline: &Baseline) -> Self {
        let mut deltas = Deltas::default();
        for node in baseline.hidden() {
            let display = tree.computed_display(*node);
            if display != "none" {
                deltas.visibility = Some((*node, display));
            }
        }
        for node in baseline.disclosures() {
            if tree.attribute(*node, "open").is_some() {
                deltas.disclosure = Some(*node);
            }
        }
        deltas
    }

    pub fn is_empty(&self) -> bool {
        self.visibility.is_none() && self.disclosure.is_none()
    }

    pub fn clear(&mut self) {
        self.visibility = None;
        self.disclosure = None;
    }
}
