//! Session replay - drive a layout engine from a TOML script
//!
//! A script names a page count, a viewport and an ordered list of host
//! events. Replaying it against a [`SyntheticSource`] yields one
//! [`StepReport`] per event, describing the engine state after it.
//!
//! ```toml
//! pages = 5
//! viewport = { width = 300.0, height = 500.0 }
//!
//! [[step]]
//! op = "scroll"
//! offset = 310.0
//!
//! [[step]]
//! op = "begin_rotation"
//! duration_ms = 300
//! ```
//!
//! # Module Structure
//!
//! - `synthetic`: SyntheticSource - numbered text and image cards

pub mod synthetic;

pub use synthetic::{CardKind, CardView, SourceStats, SyntheticSource};

use crate::config::ResolvedConfig;
use crate::paging::{Axis, LiveWindow, PageChange, PageIndex, PageLayoutEngine, PagingError, Size};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors loading a replay script.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Script file could not be read.
    #[error("Failed to read script at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Script is not valid TOML or has an unknown step.
    #[error("Invalid script {path}: {reason}")]
    ParseError {
        /// Path with invalid contents.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// A replay script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Initial page count.
    pub pages: usize,
    /// Every n-th page (1-based) is an image card. `0` means text only.
    #[serde(default)]
    pub image_every: usize,
    /// Pages the source produces no view for.
    #[serde(default)]
    pub missing: Vec<PageIndex>,
    /// Initial viewport size.
    pub viewport: Size,
    /// Events, in order.
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// One host event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Host scrolled to `offset`.
    Scroll {
        /// New scroll offset along the axis.
        offset: f64,
    },
    /// Leading-align a page.
    ScrollToPage {
        /// 0-based page index.
        page: PageIndex,
    },
    /// Viewport resized.
    Resize {
        /// New width.
        width: f64,
        /// New height.
        height: f64,
    },
    /// Geometry transition starts.
    BeginRotation {
        /// Animation duration hint.
        #[serde(default)]
        duration_ms: Option<u64>,
    },
    /// Geometry transition ends.
    EndRotation,
    /// Re-read the page count, optionally changing it first.
    Reload {
        /// New page count for the source.
        #[serde(default)]
        pages: Option<usize>,
    },
    /// Change the inter-page gap.
    SetGap {
        /// Requested gap, normalized by the engine.
        gap: f64,
    },
    /// Switch the scroll axis.
    SetAxis {
        /// New axis.
        axis: Axis,
    },
    /// Change the preload margin.
    SetPreloadMargin {
        /// Pages kept live beyond the visible range on each side.
        margin: usize,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Scroll { offset } => write!(f, "scroll {offset}"),
            Step::ScrollToPage { page } => write!(f, "scroll_to_page {page}"),
            Step::Resize { width, height } => write!(f, "resize {width}x{height}"),
            Step::BeginRotation {
                duration_ms: Some(ms),
            } => write!(f, "begin_rotation {ms}ms"),
            Step::BeginRotation { duration_ms: None } => f.write_str("begin_rotation"),
            Step::EndRotation => f.write_str("end_rotation"),
            Step::Reload { pages: Some(pages) } => write!(f, "reload pages={pages}"),
            Step::Reload { pages: None } => f.write_str("reload"),
            Step::SetGap { gap } => write!(f, "set_gap {gap}"),
            Step::SetAxis { axis } => match axis {
                Axis::Horizontal => f.write_str("set_axis horizontal"),
                Axis::Vertical => f.write_str("set_axis vertical"),
            },
            Step::SetPreloadMargin { margin } => write!(f, "set_preload_margin {margin}"),
        }
    }
}

/// Inclusive live window, as reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowReport {
    /// First live page.
    pub first: PageIndex,
    /// Last live page.
    pub last: PageIndex,
}

impl From<LiveWindow> for WindowReport {
    fn from(window: LiveWindow) -> Self {
        Self {
            first: window.first,
            last: window.last,
        }
    }
}

/// Engine state after one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    /// Step number. `0` is the initial reload.
    pub step: usize,
    /// Rendered step.
    pub op: String,
    /// Scroll offset after the step.
    pub offset: f64,
    /// Live window, if any.
    pub window: Option<WindowReport>,
    /// Current page, if any.
    pub current: Option<PageIndex>,
    /// Number of live slots.
    pub live: usize,
    /// Pooled views per kind.
    pub pooled: BTreeMap<CardKind, usize>,
    /// Page changes observed during the step.
    pub changes: Vec<PageChange>,
    /// Whether a rotation is in progress.
    pub rotating: bool,
    /// Contract violation reported by the engine.
    pub error: Option<String>,
}

impl StepReport {
    /// Single-line human rendering.
    pub fn render_line(&self) -> String {
        let window = self
            .window
            .map_or_else(|| "-".to_string(), |w| format!("{}..={}", w.first, w.last));
        let current = self
            .current
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        let pooled = self
            .pooled
            .iter()
            .map(|(kind, count)| format!("{}:{count}", kind_name(*kind)))
            .collect::<Vec<_>>()
            .join(",");

        let mut line = format!(
            "{}: {} | offset={} window={window} current={current} live={} pooled={pooled}",
            self.step, self.op, self.offset, self.live
        );
        if !self.changes.is_empty() {
            let changes = self
                .changes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            line.push_str(&format!(" changed=[{changes}]"));
        }
        if self.rotating {
            line.push_str(" rotating");
        }
        if let Some(error) = &self.error {
            line.push_str(&format!(" error={error}"));
        }
        line
    }
}

fn kind_name(kind: CardKind) -> &'static str {
    match kind {
        CardKind::Text => "text",
        CardKind::Image => "image",
    }
}

/// Totals over a whole replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Steps run, including the initial reload.
    pub steps: usize,
    /// Source counters at the end.
    pub source: SourceStats,
    /// Page changes observed.
    pub changes: usize,
    /// Steps that reported a contract violation.
    pub errors: usize,
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "summary: steps={} requests={} fresh={} reused={} missing={} changes={} errors={}",
            self.steps,
            self.source.requests,
            self.source.fresh,
            self.source.reused,
            self.source.missing,
            self.changes,
            self.errors
        )
    }
}

/// Output of [`run_script`].
#[derive(Debug, Clone, PartialEq)]
pub struct Replay {
    /// One report per step.
    pub reports: Vec<StepReport>,
    /// Totals.
    pub summary: ReplaySummary,
}

impl Replay {
    /// All report lines followed by the summary line.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for report in &self.reports {
            out.push_str(&report.render_line());
            out.push('\n');
        }
        out.push_str(&self.summary.to_string());
        out
    }
}

/// Load a script from disk.
///
/// # Errors
///
/// Returns `ScriptError` if the file cannot be read or parsed.
pub fn load_script(path: &Path) -> Result<Script, ScriptError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ScriptError::ReadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Script::from_toml(&contents).map_err(|e| ScriptError::ParseError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Replay `script` under `config`.
///
/// Step 0 is the initial reload. Contract violations are recorded in the
/// step's report and do not stop the replay.
pub fn run_script(script: &Script, config: &ResolvedConfig) -> Replay {
    let mut source = SyntheticSource::new(script.pages).with_image_every(script.image_every);
    for page in &script.missing {
        source = source.with_missing_page(*page);
    }

    let mut engine = PageLayoutEngine::new(source, config.layout_params(script.viewport))
        .with_preload_margin(config.preload_margin);

    let observed: Rc<RefCell<Vec<PageChange>>> = Rc::default();
    let sink = Rc::clone(&observed);
    engine.subscribe(move |change| sink.borrow_mut().push(*change));

    info!(
        pages = script.pages,
        steps = script.steps.len(),
        axis = ?config.axis,
        "replay started"
    );

    let initial = Step::Reload { pages: None };
    let mut reports = Vec::with_capacity(script.steps.len() + 1);
    for (number, step) in std::iter::once(&initial).chain(&script.steps).enumerate() {
        let error = apply_step(&mut engine, *step).err();
        let changes = std::mem::take(&mut *observed.borrow_mut());
        let report = snapshot(&engine, number, step, changes, error);
        debug!(step = number, op = %report.op, offset = report.offset, "step applied");
        reports.push(report);
    }

    let summary = ReplaySummary {
        steps: reports.len(),
        source: engine.source().stats(),
        changes: reports.iter().map(|r| r.changes.len()).sum(),
        errors: reports.iter().filter(|r| r.error.is_some()).count(),
    };
    info!(%summary, "replay finished");

    Replay { reports, summary }
}

fn apply_step(
    engine: &mut PageLayoutEngine<SyntheticSource>,
    step: Step,
) -> Result<(), PagingError> {
    match step {
        Step::Scroll { offset } => engine.on_scroll(offset),
        Step::ScrollToPage { page } => {
            engine.scroll_to_page(page)?;
        }
        Step::Resize { width, height } => engine.set_viewport_size(Size::new(width, height)),
        Step::BeginRotation { duration_ms } => {
            engine.begin_rotation(duration_ms.map(Duration::from_millis))?;
        }
        Step::EndRotation => {
            engine.end_rotation()?;
        }
        Step::Reload { pages } => {
            if let Some(pages) = pages {
                engine.source_mut().set_pages(pages);
            }
            engine.reload();
        }
        Step::SetGap { gap } => engine.set_gap(gap),
        Step::SetAxis { axis } => engine.set_axis(axis),
        Step::SetPreloadMargin { margin } => engine.set_preload_margin(margin),
    }
    Ok(())
}

fn snapshot(
    engine: &PageLayoutEngine<SyntheticSource>,
    step: usize,
    op: &Step,
    changes: Vec<PageChange>,
    error: Option<PagingError>,
) -> StepReport {
    StepReport {
        step,
        op: op.to_string(),
        offset: engine.scroll_offset(),
        window: engine.live_window().map(WindowReport::from),
        current: engine.current_page_index(),
        live: engine.live_count(),
        pooled: CardKind::ALL
            .iter()
            .map(|kind| (*kind, engine.pool().available(*kind)))
            .collect(),
        changes,
        rotating: engine.is_rotating(),
        error: error.map(|e| e.to_string()),
    }
}
