//! Page Renderer: stacks finalized fragments as fixed-size, clipped pages.

use crate::document::markup::escape_attr;
use crate::pagination::page::PageFormat;
use crate::pagination::paginator::PageFragment;

const STACK_CLASSES: &str = "flex flex-col items-center gap-4";
const PAGE_CLASSES: &str = "a4-width bg-white shadow-lg";
const SPINNER_CLASSES: &str =
    "w-8 h-8 border-4 border-slate-300 border-t-indigo-500 rounded-full animate-spin";

fn page_style(format: &PageFormat) -> String {
    format!(
        "width: {}mm; height: {}mm; overflow: hidden;",
        format.width_mm, format.height_mm
    )
}

fn page_classes(class_list: &str) -> String {
    if class_list.trim().is_empty() {
        PAGE_CLASSES.to_string()
    } else {
        format!("{} {}", class_list.trim(), PAGE_CLASSES)
    }
}

/// Renders `fragments` in reading order. With no fragments, renders the placeholder.
pub fn render_pages(fragments: &[PageFragment], class_list: &str, format: &PageFormat) -> String {
    if fragments.is_empty() {
        return render_placeholder(class_list, format);
    }
    let class = escape_attr(&page_classes(class_list));
    let style = page_style(format);
    let mut html = format!("<div class=\"{STACK_CLASSES}\">");
    for fragment in fragments {
        html.push_str(&format!(
            "<div class=\"{class}\" style=\"{style}\" data-page=\"{}\"{}>{}</div>",
            fragment.index + 1,
            if fragment.oversized { " data-oversized" } else { "" },
            fragment.markup,
        ));
    }
    html.push_str("</div>");
    html
}

/// A single blank page with a busy indicator, shown before the first pass completes.
pub fn render_placeholder(class_list: &str, format: &PageFormat) -> String {
    format!(
        "<div class=\"{STACK_CLASSES}\"><div class=\"{class}\" style=\"{style}\">\
         <div class=\"flex items-center justify-center h-full\">\
         <div class=\"{SPINNER_CLASSES}\" role=\"status\"></div></div></div></div>",
        class = escape_attr(&page_classes(class_list)),
        style = page_style(format),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(index: usize, markup: &str) -> PageFragment {
        PageFragment {
            index,
            markup: markup.to_string(),
            blocks: Vec::new(),
            block_parents: Vec::new(),
            has_header: index == 0,
            oversized: false,
            measured_height_px: None,
        }
    }

    #[test]
    fn test_pages_render_in_order_with_root_classes() {
        let html = render_pages(
            &[fragment(0, "<p>one</p>"), fragment(1, "<p>two</p>")],
            "p-8 font-serif",
            &PageFormat::A4,
        );
        let one = html.find("one").expect("first page");
        let two = html.find("two").expect("second page");
        assert!(one < two);
        assert_eq!(html.matches("class=\"p-8 font-serif a4-width").count(), 2);
        assert_eq!(html.matches("height: 297mm; overflow: hidden;").count(), 2);
        assert!(html.contains("data-page=\"2\""));
        assert!(!html.contains("animate-spin"));
    }

    #[test]
    fn test_no_fragments_renders_placeholder() {
        let html = render_pages(&[], "p-8", &PageFormat::A4);
        assert!(html.contains("animate-spin"));
        assert_eq!(html, render_placeholder("p-8", &PageFormat::A4));
    }

    #[test]
    fn test_oversized_page_is_marked() {
        let mut page = fragment(0, "<p>huge</p>");
        page.oversized = true;
        let html = render_pages(&[page], "", &PageFormat::A4);
        assert!(html.contains("data-oversized"));
        assert!(html.contains("class=\"a4-width bg-white shadow-lg\""));
    }
}
