//! Tab switcher

use crate::document::{Document, ElementId};
use crate::event::{EventResult, UiEvent};
use tracing::debug;

const ACTIVE: &str = "active";

#[derive(Debug, Clone)]
pub struct TabSwitcher {
    tabs: Vec<ElementId>,
    panes: Vec<ElementId>,
    active: Option<ElementId>,
}

impl TabSwitcher {
    /// Capture tabs and panes, then activate the first tab
    pub fn new(doc: &mut Document, tab_class: &str, pane_class: &str) -> Self {
        let mut switcher = TabSwitcher {
            tabs: doc.by_class(tab_class),
            panes: doc.by_class(pane_class),
            active: None,
        };
        if let Some(&first) = switcher.tabs.first() {
            switcher.activate(doc, first);
        }
        switcher
    }

    pub fn tabs(&self) -> &[ElementId] {
        &self.tabs
    }

    pub fn active(&self) -> Option<ElementId> {
        self.active
    }

    /// Pane shown by the active tab
    pub fn active_pane(&self, doc: &Document) -> Option<ElementId> {
        self.panes
            .iter()
            .copied()
            .find(|pane| doc.has_class(*pane, ACTIVE))
    }

    /// Make `tab` the only active tab and show its target pane
    pub fn activate(&mut self, doc: &mut Document, tab: ElementId) -> bool {
        if !self.tabs.contains(&tab) {
            return false;
        }
        for &other in self.tabs.iter().chain(&self.panes) {
            doc.remove_class(other, ACTIVE);
        }
        doc.add_class(tab, ACTIVE);

        let target = doc.attr(tab, "target").unwrap_or("").to_string();
        match self
            .panes
            .iter()
            .copied()
            .find(|pane| doc.element(*pane).id.as_deref() == Some(target.as_str()))
        {
            Some(pane) => doc.add_class(pane, ACTIVE),
            None => debug!(pane = %target, "tab pane missing"),
        }
        self.active = Some(tab);
        true
    }

    pub fn handle(&mut self, doc: &mut Document, event: &UiEvent) -> EventResult {
        match event {
            UiEvent::Click { target } if self.activate(doc, *target) => EventResult::Consumed,
            _ => EventResult::Ignored,
        }
    }
}
