//! Paged preview: splits a rendered resume into A4 pages without breaking
//! atomic blocks.
//!
//! Pipeline: `extract` finds the atomic blocks, `shell` builds the empty page
//! structures, `paginator` pours blocks into pages using a `HeightProbe` for every
//! size decision, and `renderer` stacks the resulting fragments. `scheduler` runs
//! passes in the background, debounced, for the live preview.

pub mod extract;
pub mod font_metrics;
pub mod handlers;
pub mod metric_probe;
pub mod page;
pub mod paginator;
pub mod probe;
pub mod renderer;
pub mod scheduler;
pub mod shell;

#[cfg(test)]
pub(crate) mod testing;

pub use page::{default_pagination_config, PaginationConfig};
pub use paginator::{paginate, PageFragment, PaginateError, PaginationOutcome};
pub use probe::{select_probe_factory, ProbeBackend, ProbeFactory};
pub use renderer::render_pages;
pub use scheduler::PreviewScheduler;
