//! Page Shell Builder: empty page structures that atomic blocks are poured into.
//!
//! `ShellTemplate::build` clones the source tree twice: a primary shell (first
//! page) and a continuation shell whose page header is cleared and collapsed.
//! Both keep every `NodeId` and every child index of the source. Blocks stay
//! linked in their containers; a block not placed on a page is simply not
//! rendered. A structural address computed on the source therefore resolves to
//! the same node in either shell, and attaching a block never re-walks the tree.

use std::collections::{HashMap, HashSet};

use crate::document::{markup, DocumentTree, NodeData, NodeId};
use crate::pagination::extract::AtomicBlock;

/// Inline style applied to the page header on continuation pages.
pub const COLLAPSED_HEADER_STYLE: &str =
    "padding: 0; margin: 0; border: none; height: 0; overflow: hidden;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellVariant {
    /// First page: header present.
    Primary,
    /// Every later page: header emptied and collapsed.
    Continuation,
}

/// The two shell variants plus the bookkeeping shared by every page.
#[derive(Debug)]
pub struct ShellTemplate {
    primary: DocumentTree,
    continuation: DocumentTree,
    blocks: HashSet<NodeId>,
    /// Nodes whose subtree holds at least one block slot.
    slot_holders: HashSet<NodeId>,
    /// The page header and its ancestors; these are never omitted.
    header_path: HashSet<NodeId>,
    omit_empty_containers: bool,
}

impl ShellTemplate {
    pub fn build(source: &DocumentTree, blocks: &[AtomicBlock], omit_empty_containers: bool) -> Self {
        let mut slot_holders = HashSet::new();
        for block in blocks {
            let mut current = Some(block.parent);
            while let Some(id) = current {
                if !slot_holders.insert(id) {
                    break;
                }
                current = source.parent(id);
            }
        }

        let primary = source.clone();
        let mut continuation = source.clone();
        let mut header_path = HashSet::new();
        if let Some(header) = source.find_page_header() {
            continuation.clear_children(header);
            if let Some(element) = continuation.element_mut(header) {
                element.set_attr("style", COLLAPSED_HEADER_STYLE);
            }
            let mut current = Some(header);
            while let Some(id) = current {
                header_path.insert(id);
                current = source.parent(id);
            }
        }

        Self {
            primary,
            continuation,
            blocks: blocks.iter().map(|b| b.node).collect(),
            slot_holders,
            header_path,
            omit_empty_containers,
        }
    }

    /// A fresh, empty page of the given variant.
    pub fn page(&self, variant: ShellVariant) -> PageShell<'_> {
        let tree = match variant {
            ShellVariant::Primary => self.primary.clone(),
            ShellVariant::Continuation => self.continuation.clone(),
        };
        PageShell {
            template: self,
            tree,
            variant,
            placed: Vec::new(),
            placed_under: HashMap::new(),
        }
    }
}

/// One page under construction.
#[derive(Debug)]
pub struct PageShell<'t> {
    template: &'t ShellTemplate,
    tree: DocumentTree,
    variant: ShellVariant,
    /// Blocks on this page, in placement order.
    placed: Vec<NodeId>,
    /// Count of placed blocks below each slot holder.
    placed_under: HashMap<NodeId, usize>,
}

impl<'t> PageShell<'t> {
    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn variant(&self) -> ShellVariant {
        self.variant
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Shows `block` in its container, at its original position.
    pub fn attach(&mut self, block: &AtomicBlock) {
        self.placed.push(block.node);
        self.adjust_counts(block.parent, true);
    }

    /// Hides `block` again. Returns false if it was not on this page.
    pub fn detach(&mut self, block: &AtomicBlock) -> bool {
        let Some(pos) = self.placed.iter().rposition(|&n| n == block.node) else {
            return false;
        };
        self.placed.remove(pos);
        self.adjust_counts(block.parent, false);
        true
    }

    fn adjust_counts(&mut self, container: NodeId, added: bool) {
        let mut current = Some(container);
        while let Some(id) = current {
            let count = self.placed_under.entry(id).or_insert(0);
            if added {
                *count += 1;
            } else {
                *count = count.saturating_sub(1);
            }
            current = self.tree.parent(id);
        }
    }

    /// Whether `id` is part of this page's output.
    ///
    /// Blocks render only when placed on this page. With empty-container omission
    /// on, a subtree that can hold blocks but holds none on this page is dropped,
    /// headings included. The root and the header's ancestors always render.
    pub fn is_rendered(&self, id: NodeId) -> bool {
        if self.template.blocks.contains(&id) {
            return self.placed.contains(&id);
        }
        if !self.template.omit_empty_containers
            || id == self.tree.root()
            || self.template.header_path.contains(&id)
            || !self.template.slot_holders.contains(&id)
        {
            return true;
        }
        self.placed_under.get(&id).copied().unwrap_or(0) > 0
    }

    /// Linked, rendered children of `id`.
    pub fn rendered_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.tree
            .children(id)
            .iter()
            .copied()
            .filter(move |&c| self.is_rendered(c))
    }

    /// Serialized content of the page root (its inner markup).
    pub fn inner_markup(&self) -> String {
        markup::inner_html_filtered(&self.tree, self.tree.root(), &|id| self.is_rendered(id))
    }

    /// True if any rendered text on the page is non-blank.
    pub fn has_visible_content(&self) -> bool {
        let mut stack = vec![self.tree.root()];
        while let Some(id) = stack.pop() {
            if let NodeData::Text(text) = self.tree.data(id) {
                if !text.trim().is_empty() {
                    return true;
                }
            }
            stack.extend(self.rendered_children(id));
        }
        false
    }
}
