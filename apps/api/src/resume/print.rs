//! Print pipeline: one continuous document for the browser's print dialog.
//!
//! The print document is not paginated by us. The resume is laid out at page
//! width and the user agent breaks pages itself, honoring `break-inside-avoid`
//! on the atomic blocks. All print settings arrive as explicit `PrintOptions`.

use serde::{Deserialize, Serialize};

use crate::document::markup::{escape_attr, escape_text, outer_html};
use crate::pagination::page::PageFormat;
use crate::resume::model::ResumeData;
use crate::resume::templates::Template;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    pub fn format(&self) -> PageFormat {
        match self {
            PageSize::A4 => PageFormat::A4,
            PageSize::Letter => PageFormat {
                width_mm: 215.9,
                height_mm: 279.4,
            },
        }
    }

    fn css_name(&self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "letter",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptions {
    pub page_size: PageSize,
    /// Page margin applied by the print engine, in millimetres.
    pub margin_mm: f32,
    /// Document title; defaults to the person's name.
    pub title: Option<String>,
    /// Stylesheet URL with the utility classes used by the templates.
    pub stylesheet: Option<String>,
}

pub fn render_print_document(data: &ResumeData, template: Template, options: &PrintOptions) -> String {
    let tree = template.render(data);
    let body = outer_html(&tree, tree.root());

    let title = options
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| Some(data.personal_info.name.trim()).filter(|n| !n.is_empty()))
        .unwrap_or("Resume");
    let stylesheet = options
        .stylesheet
        .as_deref()
        .map(|href| format!("<link rel=\"stylesheet\" href=\"{}\">", escape_attr(href)))
        .unwrap_or_default();
    let format = options.page_size.format();

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title>{stylesheet}\
         <style>@page {{ size: {size}; margin: {margin}mm; }} \
         body {{ margin: 0; -webkit-print-color-adjust: exact; print-color-adjust: exact; }} \
         #resume-print {{ width: {width}mm; margin: 0 auto; }} \
         [data-atomic] {{ break-inside: avoid; }}</style></head>\
         <body><div id=\"resume-print\" data-template=\"{template}\">{body}</div></body></html>",
        title = escape_text(title),
        size = options.page_size.css_name(),
        margin = options.margin_mm.max(0.0),
        width = format.width_mm - 2.0 * options.margin_mm.max(0.0),
        template = template.name(),
    )
}
