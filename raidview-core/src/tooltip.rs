//! Hover-intent tooltip for the commit heatmap
//!
//! One floating tooltip is shared by every heatmap cell. Leaving a cell or
//! the tooltip arms a short hide timer instead of hiding at once, so the
//! pointer can cross the gap between them (to follow the file link) without
//! the tooltip flickering away.
//!
//! States:
//! - Idle: no target, tooltip hidden
//! - Shown(target): tooltip populated for `target`, optionally with a pending hide
//!
//! Global invariants enforced:
//! - At most one pending hide timer exists
//! - Showing always cancels a pending hide
//! - A hide timer only acts if it is still the armed one

use crate::document::{Document, ElementId};
use crate::event::{EventResult, UiEvent};
use crate::timers::{Task, TimerId, TimerQueue};
use tracing::debug;

/// Default delay before a left tooltip hides
pub const DEFAULT_HIDE_DELAY_MS: u64 = 100;

/// Default horizontal gap between trigger and tooltip
pub const DEFAULT_OFFSET_PX: f64 = 10.0;

/// Labelled fields shown under the title: (attribute, label)
const FIELDS: &[(&str, &str)] = &[
    ("commits", "Commits"),
    ("authors", "Authors"),
    ("lastModified", "Last modified"),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipSettings {
    pub hide_delay_ms: u64,
    pub offset_px: f64,
}

impl Default for TooltipSettings {
    fn default() -> Self {
        TooltipSettings {
            hide_delay_ms: DEFAULT_HIDE_DELAY_MS,
            offset_px: DEFAULT_OFFSET_PX,
        }
    }
}

/// Hover-intent controller for a shared tooltip
#[derive(Debug, Clone)]
pub struct HoverTooltip {
    tooltip: Option<ElementId>,
    triggers: Vec<ElementId>,
    target: Option<ElementId>,
    pending_hide: Option<TimerId>,
    settings: TooltipSettings,
}

impl HoverTooltip {
    pub fn new(
        doc: &mut Document,
        tooltip_id: &str,
        trigger_class: &str,
        settings: TooltipSettings,
    ) -> Self {
        let tooltip = doc.by_id(tooltip_id);
        match tooltip {
            Some(el) => doc.set_hidden(el, true),
            None => debug!(control = tooltip_id, "tooltip element missing; hover disabled"),
        }
        HoverTooltip {
            tooltip,
            triggers: doc.by_class(trigger_class),
            target: None,
            pending_hide: None,
            settings,
        }
    }

    pub fn target(&self) -> Option<ElementId> {
        self.target
    }

    pub fn is_shown(&self) -> bool {
        self.target.is_some()
    }

    pub fn pending_hide(&self) -> Option<TimerId> {
        self.pending_hide
    }

    pub fn element(&self) -> Option<ElementId> {
        self.tooltip
    }

    pub fn is_trigger(&self, id: ElementId) -> bool {
        self.triggers.contains(&id)
    }

    fn cancel_hide(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.pending_hide.take() {
            timers.cancel(id);
        }
    }

    /// Pointer entered a trigger or the tooltip
    pub fn pointer_enter(
        &mut self,
        doc: &mut Document,
        timers: &mut TimerQueue,
        element: ElementId,
    ) -> EventResult {
        let Some(tooltip) = self.tooltip else {
            return EventResult::Ignored;
        };
        if element == tooltip {
            self.cancel_hide(timers);
            return EventResult::Consumed;
        }
        if !self.is_trigger(element) {
            return EventResult::Ignored;
        }
        self.cancel_hide(timers);
        self.populate(doc, tooltip, element);
        self.position(doc, tooltip, element);
        self.target = Some(element);
        doc.set_hidden(tooltip, false);
        doc.add_class(tooltip, "visible");
        EventResult::Consumed
    }

    /// Pointer left a trigger or the tooltip
    pub fn pointer_leave(&mut self, timers: &mut TimerQueue, element: ElementId) -> EventResult {
        let Some(tooltip) = self.tooltip else {
            return EventResult::Ignored;
        };
        if element != tooltip && !self.is_trigger(element) {
            return EventResult::Ignored;
        }
        if self.target.is_some() {
            self.cancel_hide(timers);
            let id = timers.schedule(self.settings.hide_delay_ms, Task::HideTooltip);
            self.pending_hide = Some(id);
        }
        EventResult::Consumed
    }

    /// Hide timer fired; stale timers are ignored
    pub fn on_timer(&mut self, doc: &mut Document, id: TimerId) -> bool {
        if self.pending_hide != Some(id) {
            debug!(?id, "stale tooltip timer ignored");
            return false;
        }
        self.pending_hide = None;
        self.target = None;
        if let Some(tooltip) = self.tooltip {
            doc.set_hidden(tooltip, true);
            doc.remove_class(tooltip, "visible");
        }
        true
    }

    pub fn handle(
        &mut self,
        doc: &mut Document,
        timers: &mut TimerQueue,
        event: &UiEvent,
    ) -> EventResult {
        match event {
            UiEvent::PointerEnter { target } => self.pointer_enter(doc, timers, *target),
            UiEvent::PointerLeave { target } => self.pointer_leave(timers, *target),
            _ => EventResult::Ignored,
        }
    }

    fn populate(&self, doc: &mut Document, tooltip: ElementId, trigger: ElementId) {
        doc.remove_children(tooltip);

        let title_text = doc
            .attr(trigger, "path")
            .unwrap_or_else(|| doc.text(trigger))
            .to_string();
        let url = doc
            .attr(trigger, "url")
            .filter(|u| !u.is_empty() && *u != "null")
            .map(str::to_string);

        let title = match url {
            Some(url) => {
                let link = doc.create_element("a");
                doc.set_attr(link, "href", &url);
                doc.set_attr(link, "target", "_blank");
                link
            }
            None => doc.create_element("strong"),
        };
        doc.add_class(title, "tooltip-title");
        doc.set_text(title, &title_text);
        doc.append_child(tooltip, title);

        for (attribute, label) in FIELDS {
            let Some(value) = doc.attr(trigger, attribute).map(str::to_string) else {
                continue;
            };
            let row = doc.create_element("div");
            doc.add_class(row, "tooltip-field");
            doc.set_text(row, &format!("{}: {}", label, value));
            doc.append_child(tooltip, row);
        }
    }

    fn position(&self, doc: &mut Document, tooltip: ElementId, trigger: ElementId) {
        let rect = doc.rect(trigger);
        doc.set_style(
            tooltip,
            "left",
            &format!("{}px", rect.right() + self.settings.offset_px),
        );
        doc.set_style(tooltip, "top", &format!("{}px", rect.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Rect;

    fn build() -> (Document, ElementId, ElementId, ElementId) {
        let mut doc = Document::new();
        let root = doc.root();
        let tip = doc.create_element("div");
        doc.set_dom_id(tip, "heatmap-tooltip");
        doc.append_child(root, tip);
        let mut cells = Vec::new();
        for (i, url) in ["https://example.com/a.rs", "null"].iter().enumerate() {
            let cell = doc.create_element("div");
            doc.add_class(cell, "heatmap-cell");
            doc.set_attr(cell, "path", &format!("src/file{}.rs", i));
            doc.set_attr(cell, "url", url);
            doc.set_attr(cell, "commits", "12");
            doc.append_child(root, cell);
            cells.push(cell);
        }
        (doc, tip, cells[0], cells[1])
    }

    fn tooltip(doc: &mut Document) -> HoverTooltip {
        HoverTooltip::new(doc, "heatmap-tooltip", "heatmap-cell", TooltipSettings::default())
    }

    #[test]
    fn test_enter_shows_with_link() {
        let (mut doc, tip, a, _) = build();
        let mut timers = TimerQueue::new();
        let mut hover = tooltip(&mut doc);
        assert!(doc.is_hidden(tip));

        hover.pointer_enter(&mut doc, &mut timers, a);
        assert_eq!(hover.target(), Some(a));
        assert!(!doc.is_hidden(tip));
        let title = doc.children(tip)[0];
        assert_eq!(doc.element(title).tag, "a");
        assert_eq!(doc.attr(title, "href"), Some("https://example.com/a.rs"));
        assert_eq!(doc.text(title), "src/file0.rs");
        assert_eq!(doc.text(doc.children(tip)[1]), "Commits: 12");
    }

    #[test]
    fn test_null_url_renders_plain_title() {
        let (mut doc, tip, _, b) = build();
        let mut timers = TimerQueue::new();
        let mut hover = tooltip(&mut doc);
        hover.pointer_enter(&mut doc, &mut timers, b);
        let title = doc.children(tip)[0];
        assert_eq!(doc.element(title).tag, "strong");
        assert_eq!(doc.attr(title, "href"), None);
    }

    #[test]
    fn test_positioned_right_of_trigger() {
        let json = r#"{"root": {"children": [
            {"id": "heatmap-tooltip"},
            {"class": ["heatmap-cell"], "data": {"path": "x"},
             "rect": {"x": 40, "y": 25, "width": 20, "height": 20}}
        ]}}"#;
        let mut doc = Document::from_json(json).unwrap();
        let cell = doc.by_class("heatmap-cell")[0];
        assert_eq!(
            doc.rect(cell),
            Rect {
                x: 40.0,
                y: 25.0,
                width: 20.0,
                height: 20.0
            }
        );
        let mut timers = TimerQueue::new();
        let mut hover = tooltip(&mut doc);
        hover.pointer_enter(&mut doc, &mut timers, cell);
        let tip = doc.by_id("heatmap-tooltip").unwrap();
        assert_eq!(doc.style(tip, "left"), Some("70px"));
        assert_eq!(doc.style(tip, "top"), Some("25px"));
    }

    #[test]
    fn test_leave_hides_after_delay() {
        let (mut doc, tip, a, _) = build();
        let mut timers = TimerQueue::new();
        let mut hover = tooltip(&mut doc);
        hover.pointer_enter(&mut doc, &mut timers, a);
        hover.pointer_leave(&mut timers, a);
        assert!(hover.is_shown());

        for (id, _) in timers.advance(99) {
            hover.on_timer(&mut doc, id);
        }
        assert!(hover.is_shown());
        for (id, _) in timers.advance(1) {
            hover.on_timer(&mut doc, id);
        }
        assert!(!hover.is_shown());
        assert!(doc.is_hidden(tip));
    }

    #[test]
    fn test_crossing_into_tooltip_keeps_it_open() {
        let (mut doc, tip, a, _) = build();
        let mut timers = TimerQueue::new();
        let mut hover = tooltip(&mut doc);
        hover.pointer_enter(&mut doc, &mut timers, a);
        hover.pointer_leave(&mut timers, a);
        timers.advance(50);
        hover.pointer_enter(&mut doc, &mut timers, tip);
        assert!(hover.pending_hide().is_none());
        assert_eq!(timers.pending_count(), 0);
        for (id, _) in timers.advance(500) {
            hover.on_timer(&mut doc, id);
        }
        assert!(hover.is_shown());
    }

    #[test]
    fn test_switching_triggers_repopulates() {
        let (mut doc, tip, a, b) = build();
        let mut timers = TimerQueue::new();
        let mut hover = tooltip(&mut doc);
        hover.pointer_enter(&mut doc, &mut timers, a);
        hover.pointer_leave(&mut timers, a);
        hover.pointer_enter(&mut doc, &mut timers, b);
        assert_eq!(hover.target(), Some(b));
        assert!(hover.pending_hide().is_none());
        assert_eq!(doc.text(doc.children(tip)[0]), "src/file1.rs");
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let (mut doc, _, a, _) = build();
        let mut timers = TimerQueue::new();
        let mut hover = tooltip(&mut doc);
        hover.pointer_enter(&mut doc, &mut timers, a);
        hover.pointer_leave(&mut timers, a);
        let stale = hover.pending_hide().unwrap();
        hover.pointer_enter(&mut doc, &mut timers, a);
        assert!(!hover.on_timer(&mut doc, stale));
        assert!(hover.is_shown());
    }

    #[test]
    fn test_missing_tooltip_element_is_inert() {
        let mut doc = Document::new();
        let root = doc.root();
        let cell = doc.create_element("div");
        doc.add_class(cell, "heatmap-cell");
        doc.append_child(root, cell);
        let mut timers = TimerQueue::new();
        let mut hover = tooltip(&mut doc);
        assert_eq!(
            hover.pointer_enter(&mut doc, &mut timers, cell),
            EventResult::Ignored
        );
        assert!(!hover.is_shown());
    }
}
