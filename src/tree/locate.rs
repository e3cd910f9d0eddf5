//! Root discovery for the monitored header region

use super::{NodeId, Tree};

/// Finds the node the monitor attaches to
pub trait RootLocator {
    fn locate<T: Tree>(&self, tree: &T) -> Option<NodeId>;
}

/// Starts at the first element with the given tag and climbs while the
/// parent occupies exactly the same box. Sites often wrap their header in
/// layout containers; the outermost same-sized wrapper is the stable root
/// that survives re-renders of the header itself.
#[derive(Debug, Clone)]
pub struct HeaderRootLocator {
    pub tag: String,
}

impl Default for HeaderRootLocator {
    fn default() -> Self {
        Self {
            tag: "header".to_string(),
        }
    }
}

impl RootLocator for HeaderRootLocator {
    fn locate<T: Tree>(&self, tree: &T) -> Option<NodeId> {
        let header = tree
            .elements_by_tag(tree.document_root(), &self.tag)
            .into_iter()
            .next()?;

        let mut current = header;
        while let Some(parent) = tree.parent(current) {
            match (tree.bounds(current), tree.bounds(parent)) {
                (Some(a), Some(b)) if a == b => current = parent,
                _ => break,
            }
        }
        Some(current)
    }
}

/// Locator that always answers with a known node
#[derive(Debug, Clone, Copy)]
pub struct FixedRoot(pub NodeId);

impl RootLocator for FixedRoot {
    fn locate<T: Tree>(&self, _tree: &T) -> Option<NodeId> {
        Some(self.0)
    }
}
