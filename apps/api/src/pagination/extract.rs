//! Block Extractor: finds the atomic blocks of a rendered document.
//!
//! Blocks are returned in depth-first document order, each paired with the
//! container it lives in. Nodes flagged as page header are not descended into:
//! anything inside the header travels with the header.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::document::{DocumentTree, Element, NodeId, StructuralAddress};

// ────────────────────────────────────────────────────────────────────────────
// Atomicity policy
// ────────────────────────────────────────────────────────────────────────────

/// How a flagged node that contains further flagged nodes is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    /// The outermost flagged node is the block; nested flags are ignored.
    KeepTogether,
    /// The nested flagged nodes are the blocks; the group acts as their container.
    SplitChildren,
}

/// Group atomicity per block kind. Kinds without an entry use `default`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomicityPolicy {
    pub default: GroupMode,
    #[serde(default)]
    pub by_kind: HashMap<String, GroupMode>,
}

impl Default for AtomicityPolicy {
    fn default() -> Self {
        Self {
            default: GroupMode::KeepTogether,
            by_kind: HashMap::new(),
        }
    }
}

impl AtomicityPolicy {
    pub fn with_kind(mut self, kind: &str, mode: GroupMode) -> Self {
        self.by_kind.insert(kind.to_string(), mode);
        self
    }

    pub fn mode_for(&self, element: &Element) -> GroupMode {
        element
            .kind
            .as_deref()
            .and_then(|kind| self.by_kind.get(kind))
            .copied()
            .unwrap_or(self.default)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// An indivisible node and the container it must be poured back into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicBlock {
    pub node: NodeId,
    pub parent: NodeId,
    pub parent_address: StructuralAddress,
}

/// Returns the atomic blocks of `tree` in document order.
///
/// An empty result means the tree has no decomposable units and must be
/// paginated as a single page.
pub fn extract_blocks(tree: &DocumentTree, policy: &AtomicityPolicy) -> Vec<AtomicBlock> {
    let root = tree.root();
    if let Some(root_el) = tree.element(root) {
        if root_el.atomic && !splits(tree, root, root_el, policy) {
            return Vec::new();
        }
    }

    let mut blocks = Vec::new();
    let mut addresses: HashMap<NodeId, StructuralAddress> = HashMap::new();
    visit(tree, root, policy, &mut blocks, &mut addresses);
    blocks
}

fn visit(
    tree: &DocumentTree,
    container: NodeId,
    policy: &AtomicityPolicy,
    blocks: &mut Vec<AtomicBlock>,
    addresses: &mut HashMap<NodeId, StructuralAddress>,
) {
    for &child in tree.children(container) {
        let Some(element) = tree.element(child) else {
            continue;
        };
        if element.page_header {
            continue;
        }
        if element.atomic && !splits(tree, child, element, policy) {
            let parent_address = addresses
                .entry(container)
                .or_insert_with(|| StructuralAddress::of(tree, container).unwrap_or_default())
                .clone();
            blocks.push(AtomicBlock {
                node: child,
                parent: container,
                parent_address,
            });
        } else {
            visit(tree, child, policy, blocks, addresses);
        }
    }
}

/// True when a flagged node should give way to the flagged nodes it contains.
fn splits(tree: &DocumentTree, id: NodeId, element: &Element, policy: &AtomicityPolicy) -> bool {
    policy.mode_for(element) == GroupMode::SplitChildren
        && tree.descendants(id).into_iter().any(|d| tree.is_atomic(d))
}
