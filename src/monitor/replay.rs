//! Re-applies a committed session onto the live tree

use crate::tree::{MutationKind, MutationRecord, NodeSnapshot, Tree};

use super::baseline::Deltas;
use super::snapshot::SnapshotStore;

/// Outcome of one replay pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Records whose target had a snapshot
    pub applied: usize,
    /// Records skipped for lack of a snapshot
    pub skipped: usize,
}

/// Apply `buffer` in order, reading prior values from `snapshots`.
///
/// Added children already present under the target (matched by stable id)
/// are not appended again, so replaying the same buffer twice leaves the
/// tree unchanged the second time.
pub fn replay_mutations<T: Tree>(
    tree: &mut T,
    buffer: &[MutationRecord],
    snapshots: &SnapshotStore,
    stable_id_attribute: &str,
) -> ReplayReport {
    let mut report = ReplayReport::default();

    for record in buffer {
        let Some(snapshot) = snapshots.get(record.target) else {
            tracing::debug!(
                target_node = %record.target,
                "No snapshot for recorded node, skipping"
            );
            report.skipped += 1;
            continue;
        };
        report.applied += 1;

        let result = match record.kind {
            MutationKind::AttributeChange => replay_attribute(tree, record, snapshot),
            MutationKind::ChildListChange => {
                replay_child_list(tree, record, snapshot, stable_id_attribute)
            }
            MutationKind::TextChange => {
                tree.set_text_content(record.target, &snapshot.text_content())
            }
        };
        if let Err(e) = result {
            tracing::warn!(
                target_node = %record.target,
                kind = ?record.kind,
                error = %e,
                "Replay step failed"
            );
        }
    }

    report
}

fn replay_attribute<T: Tree>(
    tree: &mut T,
    record: &MutationRecord,
    snapshot: &NodeSnapshot,
) -> Result<(), crate::tree::TreeError> {
    let Some(name) = record.attribute_name.as_deref() else {
        return Ok(());
    };
    match snapshot.attribute(name) {
        Some(value) => tree.set_attribute(record.target, name, value),
        None => tree.remove_attribute(record.target, name),
    }
}

fn replay_child_list<T: Tree>(
    tree: &mut T,
    record: &MutationRecord,
    snapshot: &NodeSnapshot,
    stable_id_attribute: &str,
) -> Result<(), crate::tree::TreeError> {
    for added in &record.added_nodes {
        let Some(id) = added.stable_id.as_deref() else {
            continue;
        };
        if tree
            .find_descendant(record.target, stable_id_attribute, id)
            .is_some()
        {
            continue;
        }
        if let Some(clone) = snapshot.find_descendant(stable_id_attribute, id) {
            tree.append_snapshot(record.target, clone)?;
        }
    }

    for removed in &record.removed_nodes {
        let Some(id) = removed.stable_id.as_deref() else {
            continue;
        };
        if let Some(live) = tree.find_descendant(record.target, stable_id_attribute, id) {
            tree.detach(live)?;
        }
    }

    Ok(())
}

/// Restore the committed visibility and disclosure observations. Returns
/// whether anything was applied.
pub fn apply_deltas<T: Tree>(tree: &mut T, deltas: &Deltas) -> bool {
    let mut applied = false;

    if let Some((node, display)) = &deltas.visibility {
        if let Err(e) = tree.set_display(*node, Some(display)) {
            tracing::warn!(target_node = %node, error = %e, "Failed to restore display");
        }
        applied = true;
    }

    if let Some(node) = deltas.disclosure {
        let result = tree
            .set_attribute(node, "open", "true")
            .and_then(|()| tree.set_attribute(node, "aria-expanded", "true"));
        if let Err(e) = result {
            tracing::warn!(target_node = %node, error = %e, "Failed to restore disclosure");
        }
        applied = true;
    }

    applied
}
