use std::collections::HashMap;

use crate::tree::{NodeId, NodeSnapshot};

/// Deep clones keyed by the live node they were taken from
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    entries: HashMap<NodeId, NodeSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Store `snapshot` for `node`, replacing any earlier one
    pub fn insert(&mut self, node: NodeId, snapshot: NodeSnapshot) {
        self.entries.insert(node, snapshot);
    }

    pub fn get(&self, node: NodeId) -> Option<&NodeSnapshot> {
        self.entries.get(&node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
