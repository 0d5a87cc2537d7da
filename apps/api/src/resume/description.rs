//! Rich-text descriptions: paragraphs, bullet lists and `**bold**` spans.
//!
//! Consecutive non-list lines join one paragraph (rendered with line breaks);
//! consecutive `- ` / `* ` lines form one list. Blank lines are dropped. Every
//! list item is atomic, so a long bullet list may continue on the next page.

use crate::document::{el, El};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionBlock {
    /// Lines of one paragraph, without their line breaks.
    Paragraph(Vec<String>),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline<'a> {
    Text(&'a str),
    Bold(&'a str),
}

pub fn parse_description(text: &str) -> Vec<DescriptionBlock> {
    let mut blocks: Vec<DescriptionBlock> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let item = line.strip_prefix("- ").or_else(|| line.strip_prefix("* "));
        match (item, blocks.last_mut()) {
            (Some(item), Some(DescriptionBlock::List(items))) => items.push(item.to_string()),
            (Some(item), _) => blocks.push(DescriptionBlock::List(vec![item.to_string()])),
            (None, Some(DescriptionBlock::Paragraph(lines))) => lines.push(line.to_string()),
            (None, _) => blocks.push(DescriptionBlock::Paragraph(vec![line.to_string()])),
        }
    }
    blocks
}

/// Splits a line into plain and bold runs. An unmatched `**` is kept literally.
pub fn parse_inline(line: &str) -> Vec<Inline<'_>> {
    let mut spans = Vec::new();
    let mut rest = line;
    while let Some(open) = rest.find("**") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("**") else {
            break;
        };
        if open > 0 {
            spans.push(Inline::Text(&rest[..open]));
        }
        spans.push(Inline::Bold(&after[..close]));
        rest = &after[close + 2..];
    }
    if !rest.is_empty() {
        spans.push(Inline::Text(rest));
    }
    spans
}

fn inline_children(line: &str) -> Vec<El> {
    parse_inline(line)
        .into_iter()
        .map(|span| match span {
            Inline::Text(t) => el("span").text(t),
            Inline::Bold(t) => el("strong").text(t),
        })
        .collect()
}

/// Renders `text` as a description block. `extra_class` is appended to the wrapper.
pub fn render_description(text: &str, extra_class: &str) -> El {
    let mut wrapper = el("div")
        .class("text-sm text-gray-700 leading-relaxed")
        .class(extra_class);
    for block in parse_description(text) {
        wrapper = wrapper.child(match block {
            DescriptionBlock::List(items) => el("ul")
                .class("list-disc list-outside ml-5 space-y-1 my-2")
                .children(items.iter().map(|item| {
                    el("li")
                        .atomic("list-item")
                        .class("break-inside-avoid")
                        .children(inline_children(item))
                })),
            DescriptionBlock::Paragraph(lines) => {
                let mut p = el("p").class("mb-1");
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        p = p.child(el("br"));
                    }
                    p = p.children(inline_children(line));
                }
                p
            }
        });
    }
    wrapper
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::markup::inner_html;

    #[test]
    fn test_paragraphs_and_lists_are_grouped() {
        let blocks = parse_description("Led the team.\nShipped v2.\n\n- Cut costs\n* Hired 4\nClosing note");
        assert_eq!(
            blocks,
            vec![
                DescriptionBlock::Paragraph(vec!["Led the team.".into(), "Shipped v2.".into()]),
                DescriptionBlock::List(vec!["Cut costs".into(), "Hired 4".into()]),
                DescriptionBlock::Paragraph(vec!["Closing note".into()]),
            ]
        );
    }

    #[test]
    fn test_blank_description_has_no_blocks() {
        assert!(parse_description("  \n\n ").is_empty());
    }

    #[test]
    fn test_dash_without_space_is_not_a_bullet() {
        let blocks = parse_description("-5% churn");
        assert_eq!(blocks, vec![DescriptionBlock::Paragraph(vec!["-5% churn".into()])]);
    }

    #[test]
    fn test_bold_spans() {
        assert_eq!(
            parse_inline("Grew **revenue** by **40%**"),
            vec![
                Inline::Text("Grew "),
                Inline::Bold("revenue"),
                Inline::Text(" by "),
                Inline::Bold("40%"),
            ]
        );
        assert_eq!(
            parse_inline("a **dangling"),
            vec![Inline::Text("a **dangling")]
        );
    }

    #[test]
    fn test_rendered_list_items_are_atomic() {
        let tree = render_description("Intro\n- **Rust** services\n- Go tooling", "mt-1").build();
        let html = inner_html(&tree, tree.root());
        assert_eq!(html.matches("data-atomic").count(), 2);
        assert!(html.contains("<strong>Rust</strong>"));
        assert!(html.contains("data-kind=\"list-item\""));
        let root = tree.element(tree.root()).expect("wrapper element");
        assert!(root.has_class("mt-1"));
    }

    #[test]
    fn test_paragraph_lines_are_joined_with_breaks() {
        let tree = render_description("one\ntwo", "").build();
        let html = inner_html(&tree, tree.root());
        assert_eq!(html, "<p class=\"mb-1\"><span>one</span><br><span>two</span></p>");
    }
}
