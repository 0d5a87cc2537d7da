//! HTML serialization of document trees.
//!
//! Pagination flags are written as data attributes (`data-atomic`, `data-kind`,
//! `data-page-header`) so a serialized page can be inspected after the fact.
//! Serialization is deterministic: identical trees always produce identical markup.

use super::{DocumentTree, Element, NodeData, NodeId};

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

/// Serializes `id` and its linked subtree.
pub fn outer_html(tree: &DocumentTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &|_| true, &mut out);
    out
}

/// Serializes the linked children of `id` (not `id` itself).
pub fn inner_html(tree: &DocumentTree, id: NodeId) -> String {
    inner_html_filtered(tree, id, &|_| true)
}

/// Serializes the children of `id`, skipping every node for which `visible` is false.
pub fn inner_html_filtered(
    tree: &DocumentTree,
    id: NodeId,
    visible: &dyn Fn(NodeId) -> bool,
) -> String {
    let mut out = String::new();
    for &child in tree.children(id) {
        write_node(tree, child, visible, &mut out);
    }
    out
}

fn write_node(
    tree: &DocumentTree,
    id: NodeId,
    visible: &dyn Fn(NodeId) -> bool,
    out: &mut String,
) {
    if !visible(id) {
        return;
    }
    match tree.data(id) {
        NodeData::Text(text) => out.push_str(&escape_text(text)),
        NodeData::Element(element) => {
            write_open_tag(element, out);
            if VOID_TAGS.contains(&element.tag.as_str()) {
                return;
            }
            for &child in tree.children(id) {
                write_node(tree, child, visible, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

fn write_open_tag(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    if !element.classes.is_empty() {
        push_attr(out, "class", &element.class_list());
    }
    for (name, value) in &element.attrs {
        push_attr(out, name, value);
    }
    if let Some(kind) = &element.kind {
        push_attr(out, "data-kind", kind);
    }
    if element.atomic {
        out.push_str(" data-atomic");
    }
    if element.page_header {
        out.push_str(" data-page-header");
    }
    out.push('>');
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}

pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::el;

    #[test]
    fn test_outer_html_writes_flags_and_classes() {
        let tree = el("div")
            .class("mb-6")
            .atomic("experience")
            .child(el("h3").text("Acme & Co"))
            .build();
        assert_eq!(
            outer_html(&tree, tree.root()),
            "<div class=\"mb-6\" data-kind=\"experience\" data-atomic><h3>Acme &amp; Co</h3></div>"
        );
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let tree = el("p")
            .text("line one")
            .child(el("br"))
            .text("line two")
            .build();
        assert_eq!(inner_html(&tree, tree.root()), "line one<br>line two");
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let tree = el("a").attr("href", "https://x.dev/?a=\"1\"").build();
        assert_eq!(
            outer_html(&tree, tree.root()),
            "<a href=\"https://x.dev/?a=&quot;1&quot;\"></a>"
        );
    }

    #[test]
    fn test_filtered_serialization_skips_hidden_nodes() {
        let tree = el("div")
            .child(el("p").text("kept"))
            .child(el("p").text("hidden"))
            .build();
        let hidden = tree.children(tree.root())[1];
        let html = inner_html_filtered(&tree, tree.root(), &|id| id != hidden);
        assert_eq!(html, "<p>kept</p>");
    }
}
