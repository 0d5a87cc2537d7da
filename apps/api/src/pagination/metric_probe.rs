//! Offline height estimation from font metrics and utility classes.
//!
//! `MetricProbe` is the fallback `HeightProbe` used when no headless renderer is
//! configured. It walks the rendered part of a page shell and approximates the
//! box model of the utility classes the resume templates emit: text sizes and
//! leading, padding, vertical margins, borders, fixed sizes, flex rows, grids and
//! `space-y`/`gap` spacing. Text height comes from greedy word-wrap against the
//! static font tables. Responsive `sm:`/`md:`/`lg:` classes are treated as active
//! (the preview is a desktop-width page); other variants are ignored.
//!
//! The estimate is deterministic, so identical pages always measure identically.

use crate::document::{Element, NodeData, NodeId};
use crate::pagination::font_metrics::{get_metrics, FontFamily};
use crate::pagination::probe::{HeightProbe, ProbeError, ProbeFactory, ProbeRequest};
use crate::pagination::shell::PageShell;

const INLINE_TAGS: &[&str] = &["span", "a", "strong", "em", "b", "i", "small", "code", "br"];
const ACTIVE_VARIANTS: &[&str] = &["sm:", "md:", "lg:"];

#[derive(Debug, Default, Clone, Copy)]
pub struct MetricProbe;

impl HeightProbe for MetricProbe {
    fn measure(&mut self, request: &ProbeRequest<'_>) -> Result<f32, ProbeError> {
        let shell = request.shell;
        let root = shell.tree().root();
        Ok(measure_node(shell, root, request.width_px, &TextStyle::default()))
    }
}

pub struct MetricProbeFactory;

impl ProbeFactory for MetricProbeFactory {
    fn create(&self) -> Result<Box<dyn HeightProbe>, ProbeError> {
        Ok(Box::new(MetricProbe))
    }

    fn name(&self) -> &'static str {
        "metric"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Inherited text style
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    family: FontFamily,
    font_px: f32,
    line_px: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: FontFamily::Sans,
            font_px: 16.0,
            line_px: 24.0,
        }
    }
}

impl TextStyle {
    fn derive(&self, classes: &[&str]) -> Self {
        let mut style = *self;
        let mut leading: Option<f32> = None;
        for &class in classes {
            match class {
                "font-serif" => style.family = FontFamily::Serif,
                "font-sans" => style.family = FontFamily::Sans,
                "leading-tight" => leading = Some(1.25),
                "leading-snug" => leading = Some(1.375),
                "leading-normal" => leading = Some(1.5),
                "leading-relaxed" => leading = Some(1.625),
                "leading-loose" => leading = Some(2.0),
                _ => {
                    if let Some((font, line)) = text_size(class) {
                        style.font_px = font;
                        style.line_px = line;
                    }
                }
            }
        }
        if let Some(factor) = leading {
            style.line_px = style.font_px * factor;
        }
        style
    }
}

/// Tailwind font size and default line height, in px.
fn text_size(class: &str) -> Option<(f32, f32)> {
    Some(match class {
        "text-xs" => (12.0, 16.0),
        "text-sm" => (14.0, 20.0),
        "text-base" | "text-md" => (16.0, 24.0),
        "text-lg" => (18.0, 28.0),
        "text-xl" => (20.0, 28.0),
        "text-2xl" => (24.0, 32.0),
        "text-3xl" => (30.0, 36.0),
        "text-4xl" => (36.0, 40.0),
        "text-5xl" => (48.0, 48.0),
        _ => return None,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Box metrics
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum WidthSpec {
    Auto,
    Fraction(f32),
    Fixed(f32),
}

#[derive(Debug, Clone, Copy)]
struct BoxMetrics {
    padding_top: f32,
    padding_bottom: f32,
    padding_left: f32,
    padding_right: f32,
    margin_top: f32,
    margin_bottom: f32,
    border_top: f32,
    border_bottom: f32,
    fixed_height: Option<f32>,
    width: WidthSpec,
    /// Vertical gap between stacked children (`space-y-*`, `gap-*`).
    gap: f32,
    /// Horizontal gap between row children (`gap-*`).
    column_gap: f32,
}

impl BoxMetrics {
    fn parse(classes: &[&str]) -> Self {
        let mut m = BoxMetrics {
            padding_top: 0.0,
            padding_bottom: 0.0,
            padding_left: 0.0,
            padding_right: 0.0,
            margin_top: 0.0,
            margin_bottom: 0.0,
            border_top: 0.0,
            border_bottom: 0.0,
            fixed_height: None,
            width: WidthSpec::Auto,
            gap: 0.0,
            column_gap: 0.0,
        };
        for &class in classes {
            let (negative, class) = match class.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, class),
            };
            let Some((prefix, value)) = class.split_once('-') else {
                continue;
            };
            if prefix == "border" {
                m.apply_border(value);
                continue;
            }
            if prefix == "w" {
                m.width = width_spec(value).unwrap_or(m.width);
                continue;
            }
            let Some(mut px) = spacing(value) else {
                continue;
            };
            if negative {
                px = -px;
            }
            match prefix {
                "p" => {
                    m.padding_top = px;
                    m.padding_bottom = px;
                    m.padding_left = px;
                    m.padding_right = px;
                }
                "py" => {
                    m.padding_top = px;
                    m.padding_bottom = px;
                }
                "px" => {
                    m.padding_left = px;
                    m.padding_right = px;
                }
                "pt" => m.padding_top = px,
                "pb" => m.padding_bottom = px,
                "pl" => m.padding_left = px,
                "pr" => m.padding_right = px,
                "m" | "my" => {
                    m.margin_top = px;
                    m.margin_bottom = px;
                }
                "mt" => m.margin_top = px,
                "mb" => m.margin_bottom = px,
                "h" => m.fixed_height = Some(px),
                "gap" => {
                    m.gap = px;
                    m.column_gap = px;
                }
                _ => {}
            }
        }
        for &class in classes {
            if let Some(px) = class.strip_prefix("space-y-").and_then(spacing) {
                m.gap = px;
            }
        }
        m
    }

    fn apply_border(&mut self, value: &str) {
        // border-b, border-b-2, border-y-2, border-t-4 ...
        let (side, width) = match value.split_once('-') {
            Some((side, w)) => (side, w.parse::<f32>().ok()),
            None => (value, Some(1.0)),
        };
        let Some(width) = width else {
            return;
        };
        match side {
            "t" => self.border_top = width,
            "b" => self.border_bottom = width,
            "y" => {
                self.border_top = width;
                self.border_bottom = width;
            }
            _ => {}
        }
    }

    fn horizontal_padding(&self) -> f32 {
        self.padding_left + self.padding_right
    }

    fn vertical_extent(&self) -> f32 {
        self.padding_top
            + self.padding_bottom
            + self.margin_top
            + self.margin_bottom
            + self.border_top
            + self.border_bottom
    }
}

/// Tailwind spacing scale: `4` is 16px, `0.5` is 2px, `px` is 1px.
fn spacing(value: &str) -> Option<f32> {
    if value == "px" {
        return Some(1.0);
    }
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v * 4.0)
}

fn width_spec(value: &str) -> Option<WidthSpec> {
    if value == "full" {
        return Some(WidthSpec::Fraction(1.0));
    }
    if let Some((num, den)) = value.split_once('/') {
        let num: f32 = num.parse().ok()?;
        let den: f32 = den.parse().ok()?;
        return (den > 0.0).then(|| WidthSpec::Fraction(num / den));
    }
    spacing(value).map(WidthSpec::Fixed)
}

/// Base classes followed by the active responsive variants, so later entries win.
fn active_classes(element: &Element) -> Vec<&str> {
    let mut classes: Vec<&str> = element
        .classes
        .iter()
        .map(String::as_str)
        .filter(|c| !c.contains(':'))
        .collect();
    for variant in ACTIVE_VARIANTS {
        classes.extend(element.classes.iter().filter_map(|c| c.strip_prefix(variant)));
    }
    classes
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

enum Flow {
    Column,
    Row,
    Grid(usize),
}

fn flow_of(classes: &[&str]) -> Flow {
    let mut flex = false;
    let mut row = true;
    let mut grid = false;
    let mut columns = 1usize;
    for &class in classes {
        match class {
            "flex" => flex = true,
            "flex-col" => row = false,
            "flex-row" => row = true,
            "grid" => grid = true,
            _ => {
                if let Some(n) = class.strip_prefix("grid-cols-").and_then(|n| n.parse().ok()) {
                    columns = n;
                }
            }
        }
    }
    if grid {
        Flow::Grid(columns.max(1))
    } else if flex && row {
        Flow::Row
    } else {
        Flow::Column
    }
}

fn measure_node(shell: &PageShell<'_>, id: NodeId, width: f32, style: &TextStyle) -> f32 {
    match shell.tree().data(id) {
        NodeData::Text(text) => text_height(text, width, style),
        NodeData::Element(element) => measure_element(shell, id, element, width, style),
    }
}

fn measure_element(
    shell: &PageShell<'_>,
    id: NodeId,
    element: &Element,
    width: f32,
    inherited: &TextStyle,
) -> f32 {
    if is_collapsed(element) {
        return 0.0;
    }
    let classes = active_classes(element);
    let style = inherited.derive(&classes);
    let metrics = BoxMetrics::parse(&classes);
    let inner_width = (width - metrics.horizontal_padding()).max(1.0);

    let content = match metrics.fixed_height {
        Some(height) => height,
        None => {
            let children: Vec<NodeId> = shell.rendered_children(id).collect();
            let has_blocks = children.iter().any(|&c| !is_inline(shell, c));
            match flow_of(&classes) {
                Flow::Row if has_blocks => row_height(shell, &children, inner_width, &style, &metrics),
                Flow::Grid(columns) if has_blocks => {
                    grid_height(shell, &children, columns, inner_width, &style, &metrics)
                }
                _ => column_height(shell, &children, inner_width, &style, metrics.gap),
            }
        }
    };
    content + metrics.vertical_extent()
}

fn is_collapsed(element: &Element) -> bool {
    element.has_class("hidden")
        || element.attr("style").is_some_and(|style| {
            style
                .split(';')
                .filter_map(|decl| decl.split_once(':'))
                .any(|(prop, value)| prop.trim() == "height" && value.trim().trim_end_matches("px") == "0")
        })
}

fn is_inline(shell: &PageShell<'_>, id: NodeId) -> bool {
    match shell.tree().data(id) {
        NodeData::Text(_) => true,
        NodeData::Element(element) => INLINE_TAGS.contains(&element.tag.as_str()),
    }
}

/// Stacks children vertically; consecutive inline children form one text run.
fn column_height(
    shell: &PageShell<'_>,
    children: &[NodeId],
    width: f32,
    style: &TextStyle,
    gap: f32,
) -> f32 {
    let mut total = 0.0;
    let mut items = 0usize;
    let mut run = String::new();

    for &child in children {
        if is_inline(shell, child) {
            collect_inline_text(shell, child, &mut run);
            continue;
        }
        if !run.trim().is_empty() {
            total += text_height(&run, width, style);
            items += 1;
        }
        run.clear();
        total += measure_node(shell, child, width, style);
        items += 1;
    }
    if !run.trim().is_empty() {
        total += text_height(&run, width, style);
        items += 1;
    }
    total + gap * items.saturating_sub(1) as f32
}

/// Side-by-side children; the row is as tall as its tallest child.
fn row_height(
    shell: &PageShell<'_>,
    children: &[NodeId],
    width: f32,
    style: &TextStyle,
    metrics: &BoxMetrics,
) -> f32 {
    let gaps = metrics.column_gap * children.len().saturating_sub(1) as f32;
    let available = (width - gaps).max(1.0);

    let specs: Vec<WidthSpec> = children
        .iter()
        .map(|&c| match shell.tree().element(c) {
            Some(el) => BoxMetrics::parse(&active_classes(el)).width,
            None => WidthSpec::Auto,
        })
        .collect();
    let claimed: f32 = specs
        .iter()
        .map(|spec| match spec {
            WidthSpec::Fraction(f) => available * f,
            WidthSpec::Fixed(px) => *px,
            WidthSpec::Auto => 0.0,
        })
        .sum();
    let autos = specs.iter().filter(|s| **s == WidthSpec::Auto).count();
    let auto_width = if autos > 0 {
        ((available - claimed) / autos as f32).max(1.0)
    } else {
        0.0
    };

    children
        .iter()
        .zip(specs)
        .map(|(&child, spec)| {
            let child_width = match spec {
                WidthSpec::Fraction(f) => available * f,
                WidthSpec::Fixed(px) => px,
                WidthSpec::Auto => auto_width,
            };
            measure_node(shell, child, child_width.max(1.0), style)
        })
        .fold(0.0, f32::max)
}

fn grid_height(
    shell: &PageShell<'_>,
    children: &[NodeId],
    columns: usize,
    width: f32,
    style: &TextStyle,
    metrics: &BoxMetrics,
) -> f32 {
    let column_width =
        ((width - metrics.column_gap * (columns - 1) as f32) / columns as f32).max(1.0);
    let rows: Vec<f32> = children
        .chunks(columns)
        .map(|row| {
            row.iter()
                .map(|&c| measure_node(shell, c, column_width, style))
                .fold(0.0, f32::max)
        })
        .collect();
    rows.iter().sum::<f32>() + metrics.gap * rows.len().saturating_sub(1) as f32
}

fn collect_inline_text(shell: &PageShell<'_>, id: NodeId, out: &mut String) {
    match shell.tree().data(id) {
        NodeData::Text(text) => out.push_str(text),
        NodeData::Element(element) => {
            if element.tag == "br" {
                out.push('\n');
                return;
            }
            for child in shell.rendered_children(id) {
                collect_inline_text(shell, child, out);
            }
            if matches!(element.tag.as_str(), "span" | "a") {
                out.push(' ');
            }
        }
    }
}

fn text_height(text: &str, width: f32, style: &TextStyle) -> f32 {
    let metrics = get_metrics(style.family);
    let lines = metrics.wrapped_lines(text, width / style.font_px);
    lines as f32 * style.line_px
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{el, DocumentTree};
    use crate::pagination::extract::{extract_blocks, AtomicityPolicy};
    use crate::pagination::shell::{ShellTemplate, ShellVariant};

    fn measure_full(tree: &DocumentTree, variant: ShellVariant) -> f32 {
        let blocks = extract_blocks(tree, &AtomicityPolicy::default());
        let template = ShellTemplate::build(tree, &blocks, true);
        let mut shell = template.page(variant);
        for block in &blocks {
            shell.attach(block);
        }
        let markup = shell.inner_markup();
        let request = ProbeRequest {
            shell: &shell,
            markup: &markup,
            class_list: "",
            width_px: 793.7,
        };
        MetricProbe.measure(&request).expect("metric probe never fails")
    }

    #[test]
    fn test_single_line_paragraph_height() {
        let tree = el("div")
            .child(el("p").atomic("summary").class("text-sm").text("Short line"))
            .build();
        assert_eq!(measure_full(&tree, ShellVariant::Primary), 20.0);
    }

    #[test]
    fn test_padding_and_margins_are_counted() {
        let tree = el("div")
            .class("p-8")
            .child(el("p").atomic("summary").class("mb-2").text("Line"))
            .build();
        // 24 line + 8 margin + 2 * 32 padding
        assert_eq!(measure_full(&tree, ShellVariant::Primary), 96.0);
    }

    #[test]
    fn test_row_uses_tallest_child() {
        let tree = el("div")
            .child(
                el("div")
                    .atomic("education")
                    .class("flex")
                    .child(el("h3").class("text-lg").text("Degree"))
                    .child(el("p").class("text-sm").text("2020")),
            )
            .build();
        assert_eq!(measure_full(&tree, ShellVariant::Primary), 28.0);
    }

    #[test]
    fn test_space_y_adds_gaps_between_children() {
        let tree = el("div")
            .child(
                el("ul")
                    .atomic("skills")
                    .class("space-y-1")
                    .child(el("li").text("Rust"))
                    .child(el("li").text("Go"))
                    .child(el("li").text("SQL")),
            )
            .build();
        assert_eq!(measure_full(&tree, ShellVariant::Primary), 3.0 * 24.0 + 2.0 * 4.0);
    }

    #[test]
    fn test_collapsed_header_measures_zero() {
        let tree = el("div")
            .child(el("header").page_header().class("pb-4 mb-6").child(el("h1").text("Ada")))
            .child(el("p").atomic("summary").text("Body"))
            .build();
        let primary = measure_full(&tree, ShellVariant::Primary);
        let continuation = measure_full(&tree, ShellVariant::Continuation);
        assert_eq!(primary, 24.0 + 16.0 + 24.0 + 24.0);
        assert_eq!(continuation, 24.0);
    }

    #[test]
    fn test_responsive_grid_columns_are_active() {
        let cell = |t: &str| el("section").child(el("p").atomic("education").text(t));
        let tree = el("div")
            .child(
                el("div")
                    .class("grid grid-cols-1 md:grid-cols-2")
                    .child(cell("A"))
                    .child(cell("B")),
            )
            .build();
        assert_eq!(measure_full(&tree, ShellVariant::Primary), 24.0);
    }

    #[test]
    fn test_line_breaks_inside_paragraph_add_lines() {
        let tree = el("div")
            .child(
                el("p")
                    .atomic("summary")
                    .text("first")
                    .child(el("br"))
                    .text("second"),
            )
            .build();
        assert_eq!(measure_full(&tree, ShellVariant::Primary), 48.0);
    }

    #[test]
    fn test_spacing_scale() {
        assert_eq!(spacing("4"), Some(16.0));
        assert_eq!(spacing("0.5"), Some(2.0));
        assert_eq!(spacing("px"), Some(1.0));
        assert_eq!(spacing("auto"), None);
        assert_eq!(width_spec("1/3"), Some(WidthSpec::Fraction(1.0 / 3.0)));
        assert_eq!(width_spec("32"), Some(WidthSpec::Fixed(128.0)));
    }
}
