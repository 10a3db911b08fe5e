//! Collection view controller
//!
//! One parameterized engine behind every paginated list in the report. Each
//! instance snapshots its items once, then answers user interactions with a
//! full filter → sort → paginate → render pass over that snapshot.
//!
//! Global invariants enforced:
//! - The item snapshot is fixed after construction
//! - Filtered items keep snapshot order until the stable sort is applied
//! - `current_page` is always within `[1, total_pages]`
//! - Rendering only toggles visibility and reorders; items are never recreated
//! - A collection with no items is inert: every operation is a no-op

use crate::document::{Document, ElementId};
use crate::event::{EventResult, UiEvent};
use crate::item::{CaptureSpec, Item};
use crate::pagination::{self, PageSize};
use crate::sorting::{self, SortSpec};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// A categorical filter bound to a dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub attribute: String,
    /// Element id of the dropdown
    pub control: String,
    /// Populate the dropdown from the distinct values observed on items
    pub derive_options: bool,
}

/// Per-instance configuration
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Collection name, e.g. `vulnerabilities`
    pub name: String,
    /// Noun used in the results-count status
    pub noun: String,
    /// Prefix of the control element ids (`{prefix}-search`, `{prefix}-next`, ...)
    pub control_prefix: String,
    /// Class carried by every item of the collection
    pub item_class: String,
    /// Attribute used to label items in reports
    pub label_attribute: String,
    pub page_size: PageSize,
    pub searchable_fields: Vec<String>,
    /// Classes of nested elements whose text is also searchable
    pub searchable_classes: Vec<String>,
    /// Class of the element holding the displayed score text
    pub score_class: Option<String>,
    pub filters: Vec<FilterSpec>,
    pub sorts: Vec<SortSpec>,
    pub default_sort: String,
}

impl ViewConfig {
    pub fn sort(&self, key: &str) -> Option<&SortSpec> {
        self.sorts.iter().find(|s| s.key == key)
    }

    pub fn sort_keys(&self) -> Vec<&str> {
        self.sorts.iter().map(|s| s.key.as_str()).collect()
    }
}

/// Control elements captured at initialization; any of them may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewControls {
    pub results: Option<ElementId>,
    pub search: Option<ElementId>,
    pub sort: Option<ElementId>,
    pub prev: Option<ElementId>,
    pub next: Option<ElementId>,
    pub page_numbers: Option<ElementId>,
    pub page_info: Option<ElementId>,
    pub page_size: Option<ElementId>,
    pub pagination: Option<ElementId>,
    pub results_count: Option<ElementId>,
    pub range_status: Option<ElementId>,
}

impl ViewControls {
    pub fn capture(doc: &Document, prefix: &str) -> Self {
        let find = |suffix: &str| {
            let dom_id = format!("{}-{}", prefix, suffix);
            let found = doc.by_id(&dom_id);
            if found.is_none() {
                debug!(control = %dom_id, "control missing; feature disabled");
            }
            found
        };
        ViewControls {
            results: find("results"),
            search: find("search"),
            sort: find("sort"),
            prev: find("prev"),
            next: find("next"),
            page_numbers: find("page-numbers"),
            page_info: find("page-info"),
            page_size: find("page-size"),
            pagination: find("pagination"),
            results_count: find("results-count"),
            range_status: find("range-status"),
        }
    }
}

#[derive(Debug, Clone)]
struct BoundFilter {
    attribute: String,
    control: Option<ElementId>,
    value: String,
}

/// Filter/sort/paginate controller over a fixed item snapshot
#[derive(Debug, Clone)]
pub struct CollectionView {
    config: ViewConfig,
    controls: ViewControls,
    filters: Vec<BoundFilter>,
    items: Vec<Item>,
    /// Indices into `items`, filtered then sorted
    filtered: Vec<usize>,
    current_page: usize,
    page_size: PageSize,
    search_term: String,
    sort_key: String,
    page_buttons: Vec<(ElementId, usize)>,
}

impl CollectionView {
    /// Snapshot the collection's items and render the first page
    pub fn new(doc: &mut Document, config: ViewConfig) -> Self {
        let controls = ViewControls::capture(doc, &config.control_prefix);
        let capture = CaptureSpec {
            searchable_fields: &config.searchable_fields,
            searchable_classes: &config.searchable_classes,
            score_class: config.score_class.as_deref(),
        };
        let items: Vec<Item> = doc
            .by_class(&config.item_class)
            .into_iter()
            .map(|id| Item::capture(doc, id, &capture))
            .collect();

        let filters = config
            .filters
            .iter()
            .map(|spec| {
                let control = doc.by_id(&spec.control);
                if control.is_none() {
                    debug!(control = %spec.control, "filter control missing; filter disabled");
                }
                BoundFilter {
                    attribute: spec.attribute.clone(),
                    control,
                    value: String::new(),
                }
            })
            .collect();

        let mut view = CollectionView {
            page_size: config.page_size,
            sort_key: config.default_sort.clone(),
            config,
            controls,
            filters,
            items,
            filtered: Vec::new(),
            current_page: 1,
            search_term: String::new(),
            page_buttons: Vec::new(),
        };

        if view.is_inert() {
            debug!(view = %view.config.name, "no items; view is inert");
            return view;
        }

        view.populate_filter_options(doc);
        if let Some(sort) = view.controls.sort {
            doc.set_value(sort, &view.sort_key);
        }
        if let Some(size) = view.controls.page_size {
            doc.set_value(size, &view.page_size.to_string());
        }
        view.refresh(doc);
        view
    }

    fn populate_filter_options(&self, doc: &mut Document) {
        for (spec, bound) in self.config.filters.iter().zip(&self.filters) {
            let Some(control) = bound.control else {
                continue;
            };
            if !spec.derive_options {
                continue;
            }
            let values: BTreeSet<&str> = self
                .items
                .iter()
                .map(|item| item.attrs.string(&spec.attribute))
                .filter(|v| !v.is_empty())
                .collect();
            for value in values {
                let option = doc.create_element("option");
                doc.set_attr(option, "value", value);
                doc.set_text(option, value);
                doc.append_child(control, option);
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn controls(&self) -> &ViewControls {
        &self.controls
    }

    pub fn is_inert(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Filtered items in sorted order
    pub fn filtered_items(&self) -> Vec<ElementId> {
        self.filtered.iter().map(|&i| self.items[i].id).collect()
    }

    /// Items of the current page, in display order
    pub fn visible_items(&self) -> Vec<ElementId> {
        self.filtered[self.slice()]
            .iter()
            .map(|&i| self.items[i].id)
            .collect()
    }

    pub fn item(&self, id: ElementId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.filtered.len(), self.page_size)
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }

    pub fn filter_value(&self, attribute: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.attribute == attribute)
            .map(|f| f.value.as_str())
    }

    /// Page-number buttons created by the last render
    pub fn page_buttons(&self) -> &[(ElementId, usize)] {
        &self.page_buttons
    }

    pub fn is_filter_active(&self) -> bool {
        !self.search_term.is_empty() || self.filters.iter().any(|f| !f.value.is_empty())
    }

    pub fn pagination_visible(&self) -> bool {
        !self.page_size.is_unbounded() && self.total_pages() > 1
    }

    /// `Page {current} of {total}`
    pub fn page_info_text(&self) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages())
    }

    /// Range of the current page within the filtered set
    pub fn range_status(&self) -> String {
        let filtered = self.filtered.len();
        if filtered == 0 {
            return "No results found".to_string();
        }
        if !self.pagination_visible() {
            return format!("Showing all {} results", filtered);
        }
        let range = self.slice();
        format!(
            "Showing {}-{} of {} results",
            range.start + 1,
            range.end,
            filtered
        )
    }

    /// Size of the filtered set relative to the whole collection
    pub fn count_status(&self) -> String {
        if self.is_filter_active() {
            format!(
                "Showing {} of {} {}",
                self.filtered.len(),
                self.items.len(),
                self.config.noun
            )
        } else {
            format!("Showing all {} {}", self.items.len(), self.config.noun)
        }
    }

    fn slice(&self) -> std::ops::Range<usize> {
        pagination::slice_bounds(self.filtered.len(), self.current_page, self.page_size)
    }

    /// Set the search term; resets to page 1 when it changes
    pub fn set_search(&mut self, doc: &mut Document, term: &str) {
        if self.is_inert() {
            return;
        }
        let term = term.trim().to_lowercase();
        if term != self.search_term {
            self.search_term = term;
            self.current_page = 1;
        }
        self.refresh(doc);
    }

    /// Select a categorical filter value (empty selects everything)
    pub fn set_filter(&mut self, doc: &mut Document, attribute: &str, value: &str) {
        if self.is_inert() {
            return;
        }
        let Some(filter) = self.filters.iter_mut().find(|f| f.attribute == attribute) else {
            debug!(view = %self.config.name, attribute, "no such filter; ignored");
            return;
        };
        if filter.value != value {
            filter.value = value.to_string();
            self.current_page = 1;
        }
        self.refresh(doc);
    }

    /// Switch the sort order; unknown keys are ignored
    pub fn sort_by(&mut self, doc: &mut Document, key: &str) {
        if self.is_inert() {
            return;
        }
        if self.config.sort(key).is_none() {
            debug!(view = %self.config.name, key, "unknown sort key; ignored");
            return;
        }
        self.sort_key = key.to_string();
        self.refresh(doc);
    }

    /// Jump to page `n`; returns false (and does nothing) when out of range
    pub fn go_to_page(&mut self, doc: &mut Document, page: usize) -> bool {
        if self.is_inert() || page < 1 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        self.render(doc);
        if let Some(container) = self.scroll_target(doc) {
            doc.scroll_into_view(container);
        }
        true
    }

    pub fn next_page(&mut self, doc: &mut Document) -> bool {
        self.go_to_page(doc, self.current_page + 1)
    }

    pub fn prev_page(&mut self, doc: &mut Document) -> bool {
        self.go_to_page(doc, self.current_page.saturating_sub(1))
    }

    pub fn change_page_size(&mut self, doc: &mut Document, size: PageSize) {
        if self.is_inert() {
            return;
        }
        self.page_size = size;
        self.current_page = 1;
        self.render(doc);
    }

    fn scroll_target(&self, doc: &Document) -> Option<ElementId> {
        self.controls
            .results
            .or_else(|| self.items.first().and_then(|item| doc.parent(item.id)))
    }

    /// Recompute the filtered set from the snapshot, sort it, then render
    fn refresh(&mut self, doc: &mut Document) {
        self.apply_filters();
        self.apply_sort();
        self.render(doc);
    }

    fn apply_filters(&mut self) {
        let needle = self.search_term.as_str();
        let filters = &self.filters;
        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                item.matches_search(needle)
                    && filters
                        .iter()
                        .all(|f| f.value.is_empty() || item.attrs.string(&f.attribute) == f.value)
            })
            .map(|(i, _)| i)
            .collect();
    }

    fn apply_sort(&mut self) {
        let Some(spec) = self.config.sort(&self.sort_key) else {
            return;
        };
        let items = &self.items;
        sorting::merge_sort_by(&mut self.filtered, |&a, &b| spec.compare(&items[a], &items[b]));
    }

    /// Apply the current page to the document and resync the controls
    pub fn render(&mut self, doc: &mut Document) {
        if self.is_inert() {
            return;
        }
        self.current_page = pagination::clamp_page(self.current_page, self.total_pages());
        trace!(
            view = %self.config.name,
            page = self.current_page,
            filtered = self.filtered.len(),
            "render"
        );

        for item in &self.items {
            doc.set_hidden(item.id, true);
        }
        for &index in &self.filtered[self.slice()] {
            let id = self.items[index].id;
            doc.set_hidden(id, false);
            if let Some(container) = doc.parent(id) {
                doc.append_child(container, id);
            }
        }

        self.render_controls(doc);
    }

    fn render_controls(&mut self, doc: &mut Document) {
        let total = self.total_pages();
        let page = self.current_page;

        if let Some(prev) = self.controls.prev {
            doc.set_disabled(prev, page <= 1);
        }
        if let Some(next) = self.controls.next {
            doc.set_disabled(next, page >= total);
        }

        self.page_buttons.clear();
        if let Some(container) = self.controls.page_numbers {
            doc.remove_children(container);
            for n in pagination::page_window(page, total) {
                let button = doc.create_element("button");
                doc.set_dom_id(button, &format!("{}-page-{}", self.config.control_prefix, n));
                doc.add_class(button, "page-btn");
                if n == page {
                    doc.add_class(button, "active");
                }
                doc.set_attr(button, "page", &n.to_string());
                doc.set_text(button, &n.to_string());
                doc.append_child(container, button);
                self.page_buttons.push((button, n));
            }
        }

        if let Some(info) = self.controls.page_info {
            doc.set_text(info, &self.page_info_text());
        }
        if let Some(status) = self.controls.range_status {
            doc.set_text(status, &self.range_status());
        }
        if let Some(count) = self.controls.results_count {
            doc.set_text(count, &self.count_status());
        }
        if let Some(pagination) = self.controls.pagination {
            doc.set_hidden(pagination, !self.pagination_visible());
        }
    }

    /// Route an event to this view
    pub fn handle(&mut self, doc: &mut Document, event: &UiEvent) -> EventResult {
        if self.is_inert() {
            return EventResult::Ignored;
        }
        match event {
            UiEvent::Input { target, value } | UiEvent::Change { target, value } => {
                self.handle_value_change(doc, *target, value)
            }
            UiEvent::Click { target } => self.handle_click(doc, *target),
            _ => EventResult::Ignored,
        }
    }

    fn handle_value_change(
        &mut self,
        doc: &mut Document,
        target: ElementId,
        value: &str,
    ) -> EventResult {
        let target = Some(target);
        if target == self.controls.search {
            self.set_search(doc, value);
        } else if target == self.controls.sort {
            self.sort_by(doc, value);
        } else if target == self.controls.page_size {
            match PageSize::parse(value) {
                Some(size) => self.change_page_size(doc, size),
                None => debug!(view = %self.config.name, value, "invalid page size; ignored"),
            }
        } else if let Some(attribute) = self
            .filters
            .iter()
            .find(|f| f.control.is_some() && f.control == target)
            .map(|f| f.attribute.clone())
        {
            self.set_filter(doc, &attribute, value);
        } else {
            return EventResult::Ignored;
        }
        EventResult::Consumed
    }

    fn handle_click(&mut self, doc: &mut Document, target: ElementId) -> EventResult {
        let target_opt = Some(target);
        if target_opt == self.controls.prev {
            self.prev_page(doc);
        } else if target_opt == self.controls.next {
            self.next_page(doc);
        } else if let Some(&(_, page)) = self.page_buttons.iter().find(|(b, _)| *b == target) {
            self.go_to_page(doc, page);
        } else {
            return EventResult::Ignored;
        }
        EventResult::Consumed
    }
}
