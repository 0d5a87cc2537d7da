//! Paginator: distributes atomic blocks over pages by measuring as it goes.
//!
//! # Algorithm
//! Blocks are poured one at a time into the current page shell. After each attach
//! the page is serialized and measured:
//! - fits the budget: keep it and continue;
//! - overflows an empty page: keep it anyway (the page is flagged `oversized`);
//! - overflows a page that already holds blocks: take it back out, finalize the
//!   page, and start a continuation page holding just this block.
//!
//! The pass is synchronous and CPU-bound. Async callers run it through
//! `tokio::task::spawn_blocking` (see `scheduler`).

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::document::{markup, DocumentTree, Element, NodeId, StructuralAddress};
use crate::pagination::extract::{extract_blocks, AtomicBlock};
use crate::pagination::page::PaginationConfig;
use crate::pagination::probe::{HeightProbe, ProbeError, ProbeRequest};
use crate::pagination::shell::{PageShell, ShellTemplate, ShellVariant};

#[derive(Debug, Error)]
pub enum PaginateError {
    /// The pass is aborted; no partial pages are returned.
    #[error("height measurement unavailable: {0}")]
    MeasurementUnavailable(#[from] ProbeError),
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// One finalized page. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFragment {
    pub index: usize,
    /// Inner markup of the page root.
    pub markup: String,
    /// Blocks on this page, in document order.
    pub blocks: Vec<NodeId>,
    /// Address of each block's container, parallel to `blocks`.
    pub block_parents: Vec<StructuralAddress>,
    /// The page header is shown (first page only).
    pub has_header: bool,
    /// A single block taller than the budget overflows this page.
    pub oversized: bool,
    /// Last measured height of the page; `None` when nothing was measured.
    pub measured_height_px: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationOutcome {
    pub fragments: Vec<PageFragment>,
    /// Class list of the source root, reused on every rendered page.
    pub class_list: String,
    pub block_count: usize,
    pub measurements: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Pass
// ────────────────────────────────────────────────────────────────────────────

/// Paginates `tree` into page fragments.
///
/// A tree without atomic blocks becomes exactly one fragment holding the whole
/// document, whatever its height.
pub fn paginate(
    tree: &DocumentTree,
    config: &PaginationConfig,
    probe: &mut dyn HeightProbe,
) -> Result<PaginationOutcome, PaginateError> {
    let root = tree.root();
    let class_list = tree
        .element(root)
        .map(Element::class_list)
        .unwrap_or_default();
    let blocks = extract_blocks(tree, &config.policy);

    if blocks.is_empty() {
        debug!("no atomic blocks, emitting the document as a single page");
        return Ok(PaginationOutcome {
            fragments: vec![PageFragment {
                index: 0,
                markup: markup::inner_html(tree, root),
                blocks: Vec::new(),
                block_parents: Vec::new(),
                has_header: tree.find_page_header().is_some(),
                oversized: false,
                measured_height_px: None,
            }],
            class_list,
            block_count: 0,
            measurements: 0,
        });
    }

    let budget = config.budget();
    let template = ShellTemplate::build(tree, &blocks, config.omit_empty_containers);
    let has_header = tree.find_page_header().is_some();
    let mut meter = Meter {
        probe,
        class_list: &class_list,
        width_px: config.format.width_px(),
        count: 0,
    };

    let mut fragments = Vec::new();
    let mut page = OpenPage::new(template.page(ShellVariant::Primary));

    for block in &blocks {
        page.push(block);
        let height = meter.measure(&page.shell)?;

        if budget.fits(height) {
            page.height = Some(height);
            continue;
        }

        if page.placed.len() == 1 {
            warn!(
                height,
                budget = budget.max_height_px,
                parent = %block.parent_address,
                "atomic block exceeds the page budget, page will overflow"
            );
            page.oversized = true;
            page.height = Some(height);
            continue;
        }

        page.pop(block);
        fragments.push(page.finalize(fragments.len(), has_header));
        debug!(page = fragments.len(), "page cut");

        page = OpenPage::new(template.page(ShellVariant::Continuation));
        page.push(block);
        let height = meter.measure(&page.shell)?;
        if !budget.fits(height) {
            warn!(
                height,
                budget = budget.max_height_px,
                parent = %block.parent_address,
                "atomic block exceeds the page budget, page will overflow"
            );
            page.oversized = true;
        }
        page.height = Some(height);
    }

    // The last page always carries at least one block here, so the visible-text
    // check only matters for blocks that render no text (e.g. images).
    if !page.placed.is_empty() || page.shell.has_visible_content() {
        fragments.push(page.finalize(fragments.len(), has_header));
    }

    let measurements = meter.count;
    Ok(PaginationOutcome {
        fragments,
        class_list,
        block_count: blocks.len(),
        measurements,
    })
}

struct Meter<'p, 'c> {
    probe: &'p mut dyn HeightProbe,
    class_list: &'c str,
    width_px: f32,
    count: usize,
}

impl Meter<'_, '_> {
    fn measure(&mut self, shell: &PageShell<'_>) -> Result<f32, ProbeError> {
        let markup = shell.inner_markup();
        let request = ProbeRequest {
            shell,
            markup: &markup,
            class_list: self.class_list,
            width_px: self.width_px,
        };
        self.count += 1;
        self.probe.measure(&request)
    }
}

/// The page currently being filled.
struct OpenPage<'t, 'b> {
    shell: PageShell<'t>,
    placed: Vec<&'b AtomicBlock>,
    oversized: bool,
    height: Option<f32>,
}

impl<'t, 'b> OpenPage<'t, 'b> {
    fn new(shell: PageShell<'t>) -> Self {
        Self {
            shell,
            placed: Vec::new(),
            oversized: false,
            height: None,
        }
    }

    fn push(&mut self, block: &'b AtomicBlock) {
        self.shell.attach(block);
        self.placed.push(block);
    }

    fn pop(&mut self, block: &AtomicBlock) {
        if self.shell.detach(block) {
            self.placed.pop();
        }
    }

    fn finalize(&self, index: usize, has_header: bool) -> PageFragment {
        PageFragment {
            index,
            markup: self.shell.inner_markup(),
            blocks: self.placed.iter().map(|b| b.node).collect(),
            block_parents: self.placed.iter().map(|b| b.parent_address.clone()).collect(),
            has_header: has_header && self.shell.variant() == ShellVariant::Primary,
            oversized: self.oversized,
            measured_height_px: self.height,
        }
    }
}
