//! Deterministic probes for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::document::NodeId;
use crate::pagination::probe::{HeightProbe, ProbeError, ProbeFactory, ProbeRequest};
use crate::pagination::shell::PageShell;

/// Sums the `data-height` attributes of the rendered elements on a page.
///
/// An element carrying `data-height` counts as that many pixels and is not
/// descended into. An emptied element (such as a collapsed header) counts zero.
#[derive(Debug, Default)]
pub struct FixtureProbe {
    pub calls: usize,
}

impl HeightProbe for FixtureProbe {
    fn measure(&mut self, request: &ProbeRequest<'_>) -> Result<f32, ProbeError> {
        self.calls += 1;
        let shell = request.shell;
        Ok(height_of(shell, shell.tree().root()))
    }
}

fn height_of(shell: &PageShell<'_>, id: NodeId) -> f32 {
    let tree = shell.tree();
    if let Some(height) = tree.element(id).and_then(|el| el.attr("data-height")) {
        if tree.children(id).is_empty() {
            return 0.0;
        }
        return height.parse().unwrap_or(0.0);
    }
    shell.rendered_children(id).map(|c| height_of(shell, c)).sum()
}

pub struct FailingProbe;

impl HeightProbe for FailingProbe {
    fn measure(&mut self, _request: &ProbeRequest<'_>) -> Result<f32, ProbeError> {
        Err(ProbeError::BadOutput("renderer unavailable".to_string()))
    }
}

/// Hands out `FixtureProbe`s and counts how many passes asked for one.
#[derive(Debug, Default, Clone)]
pub struct CountingFactory {
    pub passes: Arc<AtomicUsize>,
    pub fail: Arc<AtomicBool>,
}

impl CountingFactory {
    pub fn passes(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl ProbeFactory for CountingFactory {
    fn create(&self) -> Result<Box<dyn HeightProbe>, ProbeError> {
        let fail = self.fail.load(Ordering::SeqCst);
        self.passes.fetch_add(1, Ordering::SeqCst);
        if fail {
            Ok(Box::new(FailingProbe))
        } else {
            Ok(Box::new(FixtureProbe::default()))
        }
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
