use crate::tree::{NodeId, Tree};

use super::baseline::Baseline;
use super::recorder::is_open;

/// Strip every open marker from nodes under `root` (inclusive). Returns the
/// number of nodes touched.
pub fn strip_open_markers<T: Tree>(tree: &mut T, root: NodeId, open_markers: &[String]) -> usize {
    let mut nodes = vec![root];
    nodes.extend(tree.descendants(root));

    let mut touched = 0;
    for node in nodes {
        if !is_open(tree, node, open_markers) {
            continue;
        }
        match tree.remove_classes(node, open_markers) {
            Ok(()) => touched += 1,
            Err(e) => {
                tracing::warn!(target_node = %node, error = %e, "Failed to strip open marker")
            }
        }
    }
    touched
}

/// Put every baseline node back into its default state: inline display
/// cleared on hidden nodes, `open` removed from disclosures.
pub fn restore_baseline<T: Tree>(tree: &mut T, baseline: &Baseline) {
    for node in baseline.hidden() {
        if let Err(e) = tree.set_display(*node, None) {
            tracing::warn!(target_node = %node, error = %e, "Failed to reset display");
        }
    }
    for node in baseline.disclosures() {
        if let Err(e) = tree.remove_attribute(*node, "open") {
            tracing::warn!(target_node = %node, error = %e, "Failed to close disclosure");
        }
    }
}
