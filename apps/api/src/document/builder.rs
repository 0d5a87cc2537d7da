//! Declarative element builder used by the templates and by tests.
//!
//! ```text
//! el("section").class("mb-8").child(el("h2").text("Experience"))
//! ```

use super::{DocumentTree, Element, NodeData, NodeId};

enum Child {
    Element(El),
    Text(String),
}

/// An element under construction together with its children.
pub struct El {
    element: Element,
    children: Vec<Child>,
}

pub fn el(tag: &str) -> El {
    El {
        element: Element::new(tag),
        children: Vec::new(),
    }
}

impl El {
    /// Adds whitespace-separated classes.
    pub fn class(mut self, classes: &str) -> Self {
        self.element
            .classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.element.set_attr(name, value);
        self
    }

    /// Marks the element as an atomic block of the given kind.
    pub fn atomic(mut self, kind: &str) -> Self {
        self.element.atomic = true;
        self.element.kind = Some(kind.to_string());
        self
    }

    pub fn page_header(mut self) -> Self {
        self.element.page_header = true;
        self
    }

    pub fn child(mut self, child: El) -> Self {
        self.children.push(Child::Element(child));
        self
    }

    /// Adds the child only when present; keeps template code free of `if` ladders.
    pub fn child_opt(mut self, child: Option<El>) -> Self {
        if let Some(child) = child {
            self.children.push(Child::Element(child));
        }
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = El>) -> Self {
        self.children
            .extend(children.into_iter().map(Child::Element));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.children.push(Child::Text(text.to_string()));
        self
    }

    /// Builds a standalone tree rooted at this element.
    pub fn build(self) -> DocumentTree {
        let mut tree = DocumentTree::new(self.element);
        let root = tree.root();
        for child in self.children {
            attach(child, &mut tree, root);
        }
        tree
    }

    /// Appends this element (and its subtree) under `parent`.
    pub fn attach(self, tree: &mut DocumentTree, parent: NodeId) -> NodeId {
        let id = tree.append(parent, NodeData::Element(self.element));
        for child in self.children {
            attach(child, tree, id);
        }
        id
    }
}

fn attach(child: Child, tree: &mut DocumentTree, parent: NodeId) {
    match child {
        Child::Element(el) => {
            el.attach(tree, parent);
        }
        Child::Text(text) => {
            tree.append_text(parent, &text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_nested_tree() {
        let tree = el("div")
            .class("p-8 font-serif")
            .child(el("header").page_header().child(el("h1").text("Ada")))
            .child(el("div").atomic("education").text("Cambridge"))
            .build();

        let root = tree.element(tree.root()).expect("root element");
        assert_eq!(root.class_list(), "p-8 font-serif");
        assert_eq!(tree.children(tree.root()).len(), 2);

        let block = tree.children(tree.root())[1];
        let element = tree.element(block).expect("block element");
        assert!(element.atomic);
        assert_eq!(element.kind.as_deref(), Some("education"));
        assert_eq!(tree.text_content(tree.root()), "AdaCambridge");
    }

    #[test]
    fn test_child_opt_skips_none() {
        let tree = el("div").child_opt(None).child_opt(Some(el("p"))).build();
        assert_eq!(tree.children(tree.root()).len(), 1);
    }
}
