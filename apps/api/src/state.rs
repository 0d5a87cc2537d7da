use std::sync::Arc;
use std::time::Duration;

use crate::assist::Assistant;
use crate::config::Config;
use crate::pagination::{default_pagination_config, PaginationConfig, PreviewScheduler, ProbeFactory};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when no API key is configured.
    pub assistant: Option<Arc<dyn Assistant>>,
    pub pagination: Arc<PaginationConfig>,
    /// Creates one height probe per pagination pass.
    pub probes: Arc<dyn ProbeFactory>,
    /// Debounced background pagination for the live preview.
    pub preview: PreviewScheduler,
}

impl AppState {
    /// Must be called inside a Tokio runtime: starts the preview scheduler task.
    pub fn new(
        config: Config,
        assistant: Option<Arc<dyn Assistant>>,
        probes: Arc<dyn ProbeFactory>,
    ) -> Self {
        let pagination = Arc::new(default_pagination_config(
            config.page_padding_px,
            config.split_company_groups,
            config.omit_empty_sections,
        ));
        let preview = PreviewScheduler::spawn(
            pagination.clone(),
            probes.clone(),
            Duration::from_millis(config.preview_debounce_ms),
        );
        Self {
            config: Arc::new(config),
            assistant,
            pagination,
            probes,
            preview,
        }
    }
}
