//! Preview Scheduler: debounced background pagination.
//!
//! Every submitted draft restarts the quiet period; only the most recent draft is
//! paginated once the period elapses. Each pass gets a fresh probe from the
//! factory and runs inside `spawn_blocking`. Completed passes replace the
//! published page set atomically through a `watch` channel. A failed pass
//! publishes nothing, so subscribers keep the last good pages.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

use crate::document::DocumentTree;
use crate::pagination::page::PaginationConfig;
use crate::pagination::paginator::{paginate, PageFragment, PaginateError, PaginationOutcome};
use crate::pagination::probe::ProbeFactory;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

#[derive(Debug, Error)]
#[error("preview scheduler has shut down")]
pub struct SchedulerClosed;

/// The pages currently on display.
#[derive(Debug, Clone, Serialize)]
pub struct PageSet {
    /// Pass number that produced these pages; 0 before the first completed pass.
    pub generation: u64,
    pub fragments: Vec<PageFragment>,
    pub class_list: String,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PageSet {
    fn empty() -> Self {
        Self {
            generation: 0,
            fragments: Vec::new(),
            class_list: String::new(),
            completed_at: None,
        }
    }
}

#[derive(Clone)]
pub struct PreviewScheduler {
    updates: mpsc::UnboundedSender<DocumentTree>,
    pages: watch::Receiver<Arc<PageSet>>,
}

impl PreviewScheduler {
    /// Starts the scheduler task on the current runtime.
    pub fn spawn(
        config: Arc<PaginationConfig>,
        probes: Arc<dyn ProbeFactory>,
        quiet: Duration,
    ) -> Self {
        let (updates, drafts) = mpsc::unbounded_channel();
        let (publish, pages) = watch::channel(Arc::new(PageSet::empty()));
        tokio::spawn(run(drafts, publish, config, probes, quiet));
        Self { updates, pages }
    }

    /// Queues a new draft, cancelling any pass that has not started yet.
    pub fn submit(&self, tree: DocumentTree) -> Result<(), SchedulerClosed> {
        self.updates.send(tree).map_err(|_| SchedulerClosed)
    }

    pub fn latest(&self) -> Arc<PageSet> {
        self.pages.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<PageSet>> {
        self.pages.clone()
    }
}

async fn run(
    mut drafts: mpsc::UnboundedReceiver<DocumentTree>,
    publish: watch::Sender<Arc<PageSet>>,
    config: Arc<PaginationConfig>,
    probes: Arc<dyn ProbeFactory>,
    quiet: Duration,
) {
    let mut generation = 0u64;

    while let Some(first) = drafts.recv().await {
        let mut latest = first;
        let mut superseded = 0usize;
        let deadline = sleep(quiet);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                update = drafts.recv() => match update {
                    Some(tree) => {
                        latest = tree;
                        superseded += 1;
                        deadline.as_mut().reset(Instant::now() + quiet);
                    }
                    None => break,
                },
                _ = &mut deadline => break,
            }
        }

        generation += 1;
        let config = config.clone();
        let factory = probes.clone();
        let pass = tokio::task::spawn_blocking(move || -> Result<PaginationOutcome, PaginateError> {
            let mut probe = factory.create()?;
            paginate(&latest, &config, probe.as_mut())
        })
        .await;

        match pass {
            Ok(Ok(outcome)) => {
                info!(
                    generation,
                    pages = outcome.fragments.len(),
                    blocks = outcome.block_count,
                    measurements = outcome.measurements,
                    superseded,
                    probe = probes.name(),
                    "preview pagination pass complete"
                );
                publish.send_replace(Arc::new(PageSet {
                    generation,
                    fragments: outcome.fragments,
                    class_list: outcome.class_list,
                    completed_at: Some(Utc::now()),
                }));
            }
            Ok(Err(e)) => {
                warn!(generation, error = %e, "pagination pass failed, keeping previous pages");
            }
            Err(e) => {
                error!(generation, "pagination task panicked: {e}");
            }
        }
    }

    info!("preview scheduler stopped");
}
