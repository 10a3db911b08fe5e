//! Heatmap extension filter
//!
//! Visibility toggling only: cells keep their position and there is no
//! pagination.

use crate::document::{Document, ElementId};
use crate::event::{EventResult, UiEvent};
use std::collections::BTreeSet;
use tracing::debug;

/// Option value that selects every cell
pub const ALL: &str = "all";

#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    control: Option<ElementId>,
    cells: Vec<(ElementId, String)>,
    options: Vec<String>,
    selected: String,
}

impl ExtensionFilter {
    /// Scan cells once and populate the dropdown with the distinct values of `attribute`
    pub fn new(doc: &mut Document, cell_class: &str, attribute: &str, control_id: &str) -> Self {
        let cells: Vec<(ElementId, String)> = doc
            .by_class(cell_class)
            .into_iter()
            .map(|id| (id, doc.attr(id, attribute).unwrap_or("").to_string()))
            .collect();
        let options: Vec<String> = cells
            .iter()
            .map(|(_, value)| value.clone())
            .filter(|value| !value.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let control = doc.by_id(control_id);
        match control {
            Some(select) => {
                doc.remove_children(select);
                for value in std::iter::once(ALL).chain(options.iter().map(String::as_str)) {
                    let option = doc.create_element("option");
                    doc.set_attr(option, "value", value);
                    doc.set_text(option, value);
                    doc.append_child(select, option);
                }
                doc.set_value(select, ALL);
            }
            None => debug!(control = control_id, "heatmap filter control missing"),
        }

        ExtensionFilter {
            control,
            cells,
            options,
            selected: ALL.to_string(),
        }
    }

    /// Distinct values, sorted
    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// Show cells matching `value`; `all` or empty shows everything
    pub fn select(&mut self, doc: &mut Document, value: &str) {
        let show_all = value.is_empty() || value == ALL;
        for (id, cell_value) in &self.cells {
            doc.set_hidden(*id, !show_all && cell_value != value);
        }
        self.selected = if show_all { ALL } else { value }.to_string();
    }

    pub fn visible_cells(&self, doc: &Document) -> Vec<ElementId> {
        self.cells
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| !doc.is_hidden(*id))
            .collect()
    }

    pub fn handle(&mut self, doc: &mut Document, event: &UiEvent) -> EventResult {
        match event {
            UiEvent::Change { target, value } | UiEvent::Input { target, value }
                if self.control == Some(*target) =>
            {
                self.select(doc, value);
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(with_control: bool) -> Document {
        let mut doc = Document::new();
        let root = doc.root();
        if with_control {
            let select = doc.create_element("select");
            doc.set_dom_id(select, "heatmap-extension-filter");
            doc.append_child(root, select);
        }
        for ext in ["rs", "toml", "rs", "md", ""] {
            let cell = doc.create_element("div");
            doc.add_class(cell, "heatmap-cell");
            doc.set_attr(cell, "extension", ext);
            doc.append_child(root, cell);
        }
        doc
    }

    fn extension_filter(doc: &mut Document) -> ExtensionFilter {
        ExtensionFilter::new(
            doc,
            "heatmap-cell",
            "extension",
            "heatmap-extension-filter",
        )
    }

    #[test]
    fn test_options_sorted_and_distinct() {
        let mut doc = build(true);
        let filter = extension_filter(&mut doc);
        assert_eq!(filter.options(), &["md", "rs", "toml"]);
        let select = doc.by_id("heatmap-extension-filter").unwrap();
        let labels: Vec<&str> = doc.children(select).iter().map(|o| doc.text(*o)).collect();
        assert_eq!(labels, vec!["all", "md", "rs", "toml"]);
    }

    #[test]
    fn test_select_toggles_visibility() {
        let mut doc = build(true);
        let mut filter = extension_filter(&mut doc);
        filter.select(&mut doc, "rs");
        assert_eq!(filter.visible_cells(&doc).len(), 2);
        filter.select(&mut doc, "all");
        assert_eq!(filter.visible_cells(&doc).len(), 5);
        filter.select(&mut doc, "");
        assert_eq!(filter.selected(), "all");
    }

    #[test]
    fn test_change_event_routing() {
        let mut doc = build(true);
        let mut filter = extension_filter(&mut doc);
        let select = doc.by_id("heatmap-extension-filter").unwrap();
        let result = filter.handle(
            &mut doc,
            &UiEvent::Change {
                target: select,
                value: "toml".to_string(),
            },
        );
        assert_eq!(result, EventResult::Consumed);
        assert_eq!(filter.visible_cells(&doc).len(), 1);
    }

    #[test]
    fn test_missing_control_still_filters() {
        let mut doc = build(false);
        let mut filter = extension_filter(&mut doc);
        filter.select(&mut doc, "md");
        assert_eq!(filter.visible_cells(&doc).len(), 1);
    }
}
