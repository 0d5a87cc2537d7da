//! Structural addresses: child-index paths from the document root.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DocumentTree, NodeId};

/// Ordered child indices locating a node from the root of a tree.
///
/// Applying the same address to a structurally identical clone yields the
/// corresponding node. The empty address is the root itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StructuralAddress(pub Vec<usize>);

impl StructuralAddress {
    /// Computes the address of `target`, or `None` if it is not linked under the root.
    pub fn of(tree: &DocumentTree, target: NodeId) -> Option<Self> {
        let mut path = Vec::new();
        let mut current = target;
        while current != tree.root() {
            let parent = tree.parent(current)?;
            let index = tree.children(parent).iter().position(|&c| c == current)?;
            path.push(index);
            current = parent;
        }
        path.reverse();
        Some(Self(path))
    }

    /// Walks the address from the root of `tree`.
    pub fn resolve(&self, tree: &DocumentTree) -> Option<NodeId> {
        let mut current = tree.root();
        for &index in &self.0 {
            current = *tree.children(current).get(index)?;
        }
        Some(current)
    }
}

impl fmt::Display for StructuralAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "/{}", parts.join("/"))
    }
}
