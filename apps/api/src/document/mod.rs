//! Document Tree: the rendered output of a resume template.
//!
//! The tree is arena-backed: every node lives in one `Vec` and is addressed by a
//! `NodeId`. Cloning a tree clones the arena, so a `NodeId` taken from a source tree
//! resolves to the corresponding node in every clone. Page shells rely on this to
//! move atomic blocks between containers without re-walking the tree.
//!
//! Unlinking a node from its parent keeps it in the arena (and keeps its `parent`
//! pointer), so a detached subtree can be linked back in later.

pub mod address;
pub mod builder;
pub mod markup;

use serde::{Deserialize, Serialize};

pub use address::StructuralAddress;
pub use builder::{el, El};

// ────────────────────────────────────────────────────────────────────────────
// Node types
// ────────────────────────────────────────────────────────────────────────────

/// Stable identifier of a node inside a `DocumentTree` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

/// An element node: tag, classes, attributes and the two pagination flags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    /// Ordered attributes (order is kept so serialization is deterministic).
    pub attrs: Vec<(String, String)>,
    /// Block kind used by the atomicity policy, e.g. `"experience"` or `"list-item"`.
    pub kind: Option<String>,
    /// Must never be split across a page boundary.
    pub atomic: bool,
    /// The running page header, shown on the first page only.
    pub page_header: bool,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn class_list(&self) -> String {
        self.classes.join(" ")
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

// ────────────────────────────────────────────────────────────────────────────
// Tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl DocumentTree {
    /// Creates a tree holding only the given root element.
    pub fn new(root: Element) -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Element(root),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, linked or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a new node as the last child of `parent` and returns its id.
    pub fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn append_element(&mut self, parent: NodeId, element: Element) -> NodeId {
        self.append(parent, NodeData::Element(element))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(parent, NodeData::Text(text.to_string()))
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    /// Linked children of `id`, in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// The node's parent. Detached nodes remember the parent they were unlinked from.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Replaces the linked children of `id`. Nodes dropped from the list stay in the arena.
    pub(crate) fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        for &child in &children {
            self.nodes[child.0].parent = Some(id);
        }
        self.nodes[id.0].children = children;
    }

    /// Unlinks every child of `id`.
    pub(crate) fn clear_children(&mut self, id: NodeId) {
        self.nodes[id.0].children.clear();
    }

    pub fn is_atomic(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|el| el.atomic)
    }

    pub fn is_page_header(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|el| el.page_header)
    }

    /// Linked nodes below `id` (excluding `id`) in depth-first document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of the linked subtree under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        if let NodeData::Text(t) = self.data(id) {
            text.push_str(t);
        }
        for node in self.descendants(id) {
            if let NodeData::Text(t) = self.data(node) {
                text.push_str(t);
            }
        }
        text
    }

    /// Finds the first linked element (document order) flagged as page header.
    pub fn find_page_header(&self) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&id| self.is_page_header(id))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DocumentTree, NodeId, NodeId, NodeId) {
        let mut tree = DocumentTree::new(Element::new("div"));
        let root = tree.root();
        let section = tree.append_element(root, Element::new("section"));
        let heading = tree.append_element(section, Element::new("h2"));
        tree.append_text(heading, "Experience");
        let entry = tree.append_element(section, Element::new("div"));
        tree.append_text(entry, "Acme");
        (tree, section, heading, entry)
    }

    #[test]
    fn test_descendants_are_in_document_order() {
        let (tree, section, heading, entry) = sample();
        let order = tree.descendants(tree.root());
        assert_eq!(order[0], section);
        assert_eq!(order[1], heading);
        assert_eq!(order[3], entry);
    }

    #[test]
    fn test_text_content_concatenates_linked_text() {
        let (tree, section, _, _) = sample();
        assert_eq!(tree.text_content(section), "ExperienceAcme");
    }

    #[test]
    fn test_cleared_children_stay_in_arena() {
        let (mut tree, section, _, entry) = sample();
        let before = tree.len();
        tree.clear_children(section);
        assert!(tree.children(section).is_empty());
        assert_eq!(tree.len(), before);
        assert_eq!(tree.parent(entry), Some(section));
        assert_eq!(tree.text_content(entry), "Acme");
    }

    #[test]
    fn test_clone_keeps_node_ids_valid() {
        let (tree, _, heading, _) = sample();
        let clone = tree.clone();
        assert_eq!(clone.text_content(heading), "Experience");
    }

    #[test]
    fn test_set_attr_replaces_existing_value() {
        let mut el = Element::new("header");
        el.set_attr("style", "color: red");
        el.set_attr("style", "height: 0");
        assert_eq!(el.attr("style"), Some("height: 0"));
        assert_eq!(el.attrs.len(), 1);
    }

    #[test]
    fn test_find_page_header() {
        let mut tree = DocumentTree::new(Element::new("div"));
        let root = tree.root();
        tree.append_element(root, Element::new("main"));
        let mut header = Element::new("header");
        header.page_header = true;
        let header_id = tree.append_element(root, header);
        assert_eq!(tree.find_page_header(), Some(header_id));
    }
}
