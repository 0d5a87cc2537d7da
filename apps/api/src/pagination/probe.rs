//! Height Prober: the only source of size information during pagination.
//!
//! `HeightProbe` is the measurement seam: the paginator hands it an assembled
//! candidate page and gets back the page's natural content height in CSS pixels.
//! Probes are created per pass by a `ProbeFactory` and never reused across passes.
//!
//! Backends:
//! - `CommandProbe` renders the candidate with an external headless renderer.
//! - `MetricProbe` (see `metric_probe`) estimates offline from font metrics.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::document::markup::escape_attr;
use crate::pagination::metric_probe::MetricProbeFactory;
use crate::pagination::shell::PageShell;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe surface could not be created: {0}")]
    Surface(#[from] std::io::Error),

    #[error("renderer exited with status {status}: {stderr}")]
    Renderer { status: i32, stderr: String },

    #[error("renderer output is not a height: {0:?}")]
    BadOutput(String),

    #[error("no rendering surface is configured")]
    NotConfigured,
}

/// A fully assembled candidate page.
pub struct ProbeRequest<'a> {
    pub shell: &'a PageShell<'a>,
    /// Inner markup of the page root, exactly as it would be displayed.
    pub markup: &'a str,
    /// Class list of the source root, applied to the probe container.
    pub class_list: &'a str,
    pub width_px: f32,
}

pub trait HeightProbe {
    /// Natural rendered height of the candidate, in CSS pixels.
    fn measure(&mut self, request: &ProbeRequest<'_>) -> Result<f32, ProbeError>;
}

/// Creates one probe per pagination pass.
pub trait ProbeFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn HeightProbe>, ProbeError>;

    /// Backend name, for logs.
    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// CommandProbe: external headless renderer
// ────────────────────────────────────────────────────────────────────────────

/// Measures with an external renderer command.
///
/// Each measurement writes a standalone HTML document to a scratch file, runs
/// `program [args..] <file>` and parses stdout as a pixel height. The file is
/// removed when the measurement ends, successful or not.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    program: PathBuf,
    args: Vec<String>,
    stylesheet: Option<String>,
}

impl CommandProbe {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stylesheet: None,
        }
    }

    /// Parses a whitespace-separated command line, e.g. `"node measure.js"`.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts.map(str::to_string).collect()))
    }

    /// Stylesheet URL linked into every probe document.
    pub fn with_stylesheet(mut self, href: &str) -> Self {
        self.stylesheet = Some(href.to_string());
        self
    }

    /// The document the renderer loads: one hidden, fixed-width container.
    pub(crate) fn candidate_document(&self, request: &ProbeRequest<'_>) -> String {
        let stylesheet = self
            .stylesheet
            .as_deref()
            .map(|href| format!("<link rel=\"stylesheet\" href=\"{}\">", escape_attr(href)))
            .unwrap_or_default();
        format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\">{stylesheet}</head>\
             <body style=\"margin: 0\"><div id=\"probe\" class=\"{class}\" \
             style=\"position: absolute; visibility: hidden; pointer-events: none; width: {width:.2}px\">\
             {markup}</div></body></html>",
            class = escape_attr(request.class_list),
            width = request.width_px,
            markup = request.markup,
        )
    }
}

impl HeightProbe for CommandProbe {
    fn measure(&mut self, request: &ProbeRequest<'_>) -> Result<f32, ProbeError> {
        let mut scratch = tempfile::Builder::new()
            .prefix("mimir-probe-")
            .suffix(".html")
            .tempfile()?;
        scratch.write_all(self.candidate_document(request).as_bytes())?;
        scratch.flush()?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(scratch.path())
            .output()?;

        if !output.status.success() {
            return Err(ProbeError::Renderer {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let height = parse_height(&stdout)?;
        debug!(height, "probe measured candidate page");
        Ok(height)
    }
}

/// Parses the renderer's reply, e.g. `"1042.5"` or `"1042.5px"`.
fn parse_height(stdout: &str) -> Result<f32, ProbeError> {
    let trimmed = stdout.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    match number.parse::<f32>() {
        Ok(h) if h.is_finite() && h >= 0.0 => Ok(h),
        _ => Err(ProbeError::BadOutput(trimmed.to_string())),
    }
}

pub struct CommandProbeFactory {
    probe: CommandProbe,
}

impl CommandProbeFactory {
    pub fn new(probe: CommandProbe) -> Self {
        Self { probe }
    }
}

impl ProbeFactory for CommandProbeFactory {
    fn create(&self) -> Result<Box<dyn HeightProbe>, ProbeError> {
        Ok(Box::new(self.probe.clone()))
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// Stands in when no renderer is configured: every pass fails with
/// `MeasurementUnavailable` instead of producing unmeasured pages.
pub struct UnavailableProbeFactory;

impl ProbeFactory for UnavailableProbeFactory {
    fn create(&self) -> Result<Box<dyn HeightProbe>, ProbeError> {
        Err(ProbeError::NotConfigured)
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Backend selection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeBackend {
    /// External renderer from `PROBE_COMMAND`.
    #[default]
    Command,
    /// Offline font-metric estimate. Opt-in only.
    Metric,
}

#[derive(Debug, Error)]
#[error("unknown probe backend {0:?} (expected \"command\" or \"metric\")")]
pub struct UnknownProbeBackend(String);

impl FromStr for ProbeBackend {
    type Err = UnknownProbeBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "command" => Ok(ProbeBackend::Command),
            "metric" => Ok(ProbeBackend::Metric),
            other => Err(UnknownProbeBackend(other.to_string())),
        }
    }
}

/// Picks the probe factory for a backend.
///
/// The command backend without a usable command yields `UnavailableProbeFactory`,
/// so pagination reports the missing renderer rather than guessing heights.
pub fn select_probe_factory(
    backend: ProbeBackend,
    command: Option<&str>,
    stylesheet: Option<&str>,
) -> Arc<dyn ProbeFactory> {
    match backend {
        ProbeBackend::Metric => {
            warn!("PROBE_BACKEND=metric: page heights are estimated from font metrics, not rendered");
            Arc::new(MetricProbeFactory)
        }
        ProbeBackend::Command => match command.and_then(CommandProbe::from_command_line) {
            Some(mut probe) => {
                if let Some(href) = stylesheet {
                    probe = probe.with_stylesheet(href);
                }
                Arc::new(CommandProbeFactory::new(probe))
            }
            None => {
                warn!("PROBE_COMMAND is not set; pagination is unavailable until a renderer is configured");
                Arc::new(UnavailableProbeFactory)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::el;
    use crate::pagination::extract::{extract_blocks, AtomicityPolicy};
    use crate::pagination::shell::{ShellTemplate, ShellVariant};

    #[test]
    fn test_parse_height_accepts_plain_and_px() {
        assert_eq!(parse_height("1042.5\n").unwrap(), 1042.5);
        assert_eq!(parse_height(" 300px ").unwrap(), 300.0);
    }

    #[test]
    fn test_parse_height_rejects_garbage() {
        assert!(matches!(parse_height("tall"), Err(ProbeError::BadOutput(_))));
        assert!(matches!(parse_height("-4"), Err(ProbeError::BadOutput(_))));
        assert!(matches!(parse_height(""), Err(ProbeError::BadOutput(_))));
    }

    #[test]
    fn test_from_command_line_splits_args() {
        let probe = CommandProbe::from_command_line("node scripts/measure.js --dpi 96")
            .expect("non-empty command");
        assert_eq!(probe.program, PathBuf::from("node"));
        assert_eq!(probe.args, vec!["scripts/measure.js", "--dpi", "96"]);
        assert!(CommandProbe::from_command_line("   ").is_none());
    }

    #[test]
    fn test_candidate_document_wraps_markup_at_page_width() {
        let tree = el("div")
            .class("p-8 font-serif")
            .child(el("p").atomic("summary").text("Hello"))
            .build();
        let blocks = extract_blocks(&tree, &AtomicityPolicy::default());
        let template = ShellTemplate::build(&tree, &blocks, true);
        let mut shell = template.page(ShellVariant::Primary);
        shell.attach(&blocks[0]);
        let markup = shell.inner_markup();

        let probe = CommandProbe::new("true", vec![]).with_stylesheet("/app.css");
        let request = ProbeRequest {
            shell: &shell,
            markup: &markup,
            class_list: "p-8 font-serif",
            width_px: 793.7,
        };
        let doc = probe.candidate_document(&request);
        assert!(doc.contains("class=\"p-8 font-serif\""));
        assert!(doc.contains("width: 793.70px"));
        assert!(doc.contains("Hello"));
        assert!(doc.contains("href=\"/app.css\""));
    }

    #[test]
    fn test_missing_renderer_is_a_surface_error() {
        let tree = el("div").build();
        let template = ShellTemplate::build(&tree, &[], true);
        let shell = template.page(ShellVariant::Primary);
        let mut probe = CommandProbe::new("/nonexistent/mimir-renderer", vec![]);
        let request = ProbeRequest {
            shell: &shell,
            markup: "",
            class_list: "",
            width_px: 793.7,
        };
        assert!(matches!(
            probe.measure(&request),
            Err(ProbeError::Surface(_))
        ));
    }

    #[test]
    fn test_backend_names_parse() {
        assert_eq!("metric".parse::<ProbeBackend>().unwrap(), ProbeBackend::Metric);
        assert_eq!(" Command ".parse::<ProbeBackend>().unwrap(), ProbeBackend::Command);
        assert!("chrome".parse::<ProbeBackend>().is_err());
    }

    #[test]
    fn test_command_backend_without_command_is_unavailable() {
        let factory = select_probe_factory(ProbeBackend::Command, None, None);
        assert_eq!(factory.name(), "unavailable");
        assert!(matches!(factory.create(), Err(ProbeError::NotConfigured)));

        let blank = select_probe_factory(ProbeBackend::Command, Some("  "), None);
        assert_eq!(blank.name(), "unavailable");
    }

    #[test]
    fn test_backend_selection() {
        let command = select_probe_factory(ProbeBackend::Command, Some("node measure.js"), Some("/app.css"));
        assert_eq!(command.name(), "command");
        assert!(command.create().is_ok());

        let metric = select_probe_factory(ProbeBackend::Metric, None, None);
        assert_eq!(metric.name(), "metric");
    }
}
