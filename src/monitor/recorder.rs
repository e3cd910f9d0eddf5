//! Open/record/stop state machine over incoming mutation batches

use crate::tree::{MutationRecord, NodeId, Tree};

use super::snapshot::SnapshotStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
}

/// Whether the live class list of `node` carries any open marker
pub fn is_open<T: Tree>(tree: &T, node: NodeId, open_markers: &[String]) -> bool {
    open_markers.iter().any(|marker| tree.has_class(node, marker))
}

/// Captures the mutations of one menu session together with a snapshot of
/// every node they touch.
///
/// A session starts on a class change that leaves an open marker on a node
/// inside the root, and stops on a class change that leaves none. Both
/// checks read the *live* class list at processing time rather than the
/// value at mutation time, so an open followed by a close inside the same
/// batch never starts a session.
#[derive(Debug, Clone, Default)]
pub struct MutationRecorder {
    state: RecorderState,
    buffer: Vec<MutationRecord>,
    snapshots: SnapshotStore,
    session: u64,
}

impl MutationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Records of the current (or most recent) session
    pub fn buffer(&self) -> &[MutationRecord] {
        &self.buffer
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Number of sessions started so far
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Leave `Recording` without touching the buffer
    pub fn force_idle(&mut self) {
        if self.state == RecorderState::Recording {
            tracing::debug!(session = self.session, "Recording stopped by monitor");
        }
        self.state = RecorderState::Idle;
    }

    /// Process one batch in delivery order
    pub fn process<T: Tree>(
        &mut self,
        tree: &T,
        root: NodeId,
        open_markers: &[String],
        batch: impl IntoIterator<Item = MutationRecord>,
    ) {
        for record in batch {
            if record.is_malformed() {
                tracing::warn!(
                    target_node = %record.target,
                    "Ignoring attribute record without attribute name"
                );
                continue;
            }
            if !tree.contains(root, record.target) {
                continue;
            }

            match self.state {
                RecorderState::Idle => {
                    if record.is_class_change() && is_open(tree, record.target, open_markers) {
                        self.start_session(tree, record);
                    }
                }
                RecorderState::Recording => {
                    if record.is_class_change() && !is_open(tree, record.target, open_markers) {
                        tracing::debug!(
                            session = self.session,
                            target_node = %record.target,
                            captured = self.buffer.len(),
                            "Open marker cleared - stop recording"
                        );
                        self.state = RecorderState::Idle;
                        continue;
                    }
                    self.capture(tree, record);
                }
            }
        }
    }

    fn start_session<T: Tree>(&mut self, tree: &T, record: MutationRecord) {
        let snapshot = match tree.snapshot(record.target) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    target_node = %record.target,
                    error = %e,
                    "Cannot snapshot opening node"
                );
                return;
            }
        };

        self.session += 1;
        self.state = RecorderState::Recording;
        self.buffer.clear();
        self.snapshots.clear();
        self.snapshots.insert(record.target, snapshot);
        tracing::debug!(
            session = self.session,
            target_node = %record.target,
            "Open marker set - start recording"
        );
        self.buffer.push(record);
    }

    fn capture<T: Tree>(&mut self, tree: &T, record: MutationRecord) {
        match tree.snapshot(record.target) {
            Ok(snapshot) => {
                self.snapshots.insert(record.target, snapshot);
                tracing::debug!(
                    session = self.session,
                    target_node = %record.target,
                    kind = ?record.kind,
                    attribute = record.attribute_name.as_deref().unwrap_or(""),
                    "Captured mutation"
                );
                self.buffer.push(record);
            }
            Err(e) => {
                tracing::warn!(
                    target_node = %record.target,
                    error = %e,
                    "Skipping mutation on unsnapshottable node"
                );
            }
        }
    }
}
