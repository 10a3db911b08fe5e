//! Report page
//!
//! Owns the document, the timer queue and every controller. All events and
//! clock movement enter through here.

use crate::collection::CollectionView;
use crate::config::ResolvedConfig;
use crate::document::{Document, ElementId};
use crate::event::{EventResult, UiEvent};
use crate::heatmap::ExtensionFilter;
use crate::presets::CollectionKind;
use crate::progress::ProgressBars;
use crate::tabs::TabSwitcher;
use crate::timers::{Task, TimerQueue};
use crate::tooltip::HoverTooltip;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, trace};

/// Element ids and classes of the page-level widgets
pub const HEATMAP_CELL_CLASS: &str = "heatmap-cell";
pub const HEATMAP_FILTER_ID: &str = "heatmap-extension-filter";
pub const HEATMAP_TOOLTIP_ID: &str = "heatmap-tooltip";
pub const EXTENSION_ATTRIBUTE: &str = "extension";
pub const TAB_CLASS: &str = "tab";
pub const TAB_PANE_CLASS: &str = "tab-pane";
pub const PROGRESS_CLASS: &str = "progress-fill";

pub struct ReportPage {
    doc: Document,
    timers: TimerQueue,
    vulnerabilities: CollectionView,
    complexity: CollectionView,
    priority: CollectionView,
    heatmap: ExtensionFilter,
    tooltip: HoverTooltip,
    tabs: TabSwitcher,
    progress: ProgressBars,
}

impl ReportPage {
    /// Initialize every controller against `doc`
    pub fn new(mut doc: Document, config: &ResolvedConfig) -> Self {
        let mut timers = TimerQueue::new();

        let tabs = TabSwitcher::new(&mut doc, TAB_CLASS, TAB_PANE_CLASS);
        let mut view = |kind: CollectionKind| {
            let settings = config.collection(kind);
            CollectionView::new(
                &mut doc,
                kind.config(settings.page_size, &settings.default_sort),
            )
        };
        let vulnerabilities = view(CollectionKind::Vulnerabilities);
        let complexity = view(CollectionKind::Complexity);
        let priority = view(CollectionKind::Priority);

        let heatmap = ExtensionFilter::new(
            &mut doc,
            HEATMAP_CELL_CLASS,
            EXTENSION_ATTRIBUTE,
            HEATMAP_FILTER_ID,
        );
        let tooltip = HoverTooltip::new(
            &mut doc,
            HEATMAP_TOOLTIP_ID,
            HEATMAP_CELL_CLASS,
            config.tooltip,
        );
        let progress = ProgressBars::mount(
            &doc,
            PROGRESS_CLASS,
            &mut timers,
            config.animation_delay_ms,
        );

        debug!(
            vulnerabilities = vulnerabilities.len(),
            complexity = complexity.len(),
            priority = priority.len(),
            progress_bars = progress.len(),
            "report page ready"
        );

        ReportPage {
            doc,
            timers,
            vulnerabilities,
            complexity,
            priority,
            heatmap,
            tooltip,
            tabs,
            progress,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn view(&self, kind: CollectionKind) -> &CollectionView {
        match kind {
            CollectionKind::Vulnerabilities => &self.vulnerabilities,
            CollectionKind::Complexity => &self.complexity,
            CollectionKind::Priority => &self.priority,
        }
    }

    /// Mutable view together with the document it renders into
    pub fn view_mut(&mut self, kind: CollectionKind) -> (&mut CollectionView, &mut Document) {
        let view = match kind {
            CollectionKind::Vulnerabilities => &mut self.vulnerabilities,
            CollectionKind::Complexity => &mut self.complexity,
            CollectionKind::Priority => &mut self.priority,
        };
        (view, &mut self.doc)
    }

    pub fn heatmap(&self) -> &ExtensionFilter {
        &self.heatmap
    }

    pub fn tooltip(&self) -> &HoverTooltip {
        &self.tooltip
    }

    pub fn tabs(&self) -> &TabSwitcher {
        &self.tabs
    }

    pub fn progress(&self) -> &ProgressBars {
        &self.progress
    }

    /// Look up an element by id
    pub fn resolve(&self, dom_id: &str) -> Result<ElementId> {
        self.doc
            .by_id(dom_id)
            .with_context(|| format!("no element with id {:?}", dom_id))
    }

    /// Route an event to the first controller that accepts it
    pub fn dispatch(&mut self, event: &UiEvent) -> EventResult {
        if let UiEvent::Input { target, value } | UiEvent::Change { target, value } = event {
            self.doc.set_value(*target, value);
        }

        let result = self
            .tabs
            .handle(&mut self.doc, event)
            .or_else(|| self.vulnerabilities.handle(&mut self.doc, event))
            .or_else(|| self.complexity.handle(&mut self.doc, event))
            .or_else(|| self.priority.handle(&mut self.doc, event))
            .or_else(|| self.heatmap.handle(&mut self.doc, event))
            .or_else(|| self.tooltip.handle(&mut self.doc, &mut self.timers, event));

        if !result.is_consumed() {
            trace!(element = event.target().index(), "event ignored");
        }
        result
    }

    /// Move the clock forward, running every task that comes due
    pub fn advance(&mut self, ms: u64) {
        let until = self.timers.now().saturating_add(ms);
        while let Some((id, task)) = self.timers.pop_due(until) {
            trace!(?id, ?task, at = self.timers.now(), "timer fired");
            match task {
                Task::HideTooltip => {
                    self.tooltip.on_timer(&mut self.doc, id);
                }
                Task::AnimateProgress => {
                    self.progress.on_timer(&mut self.doc, id);
                }
            }
        }
        self.timers.settle(until);
    }

    /// Resolve and apply one scripted step
    pub fn apply(&mut self, step: &ScriptStep) -> Result<EventResult> {
        let event = match step {
            ScriptStep::Wait { ms } => {
                self.advance(*ms);
                return Ok(EventResult::Consumed);
            }
            ScriptStep::Input { target, value } => UiEvent::Input {
                target: self.resolve(target)?,
                value: value.clone(),
            },
            ScriptStep::Change { target, value } => UiEvent::Change {
                target: self.resolve(target)?,
                value: value.clone(),
            },
            ScriptStep::Click { target } => UiEvent::Click {
                target: self.resolve(target)?,
            },
            ScriptStep::Enter { target } => UiEvent::PointerEnter {
                target: self.resolve(target)?,
            },
            ScriptStep::Leave { target } => UiEvent::PointerLeave {
                target: self.resolve(target)?,
            },
        };
        Ok(self.dispatch(&event))
    }

    /// Apply every step in order, stopping at the first unresolvable target
    pub fn run_script(&mut self, steps: &[ScriptStep]) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            self.apply(step)
                .with_context(|| format!("script step {} failed", index + 1))?;
        }
        Ok(())
    }
}

/// One step of a replay script, targeting elements by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum ScriptStep {
    Input { target: String, value: String },
    Change { target: String, value: String },
    Click { target: String },
    Enter { target: String },
    Leave { target: String },
    Wait { ms: u64 },
}

/// Load a replay script: a JSON array of steps
pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse script: {}", path.display()))
}
