//! View state reports
//!
//! Global invariants enforced:
//! - Items are listed in display order
//! - Byte-for-byte identical output for identical view state

use crate::collection::CollectionView;
use crate::document::{Document, ElementId};
use crate::page::ReportPage;
use crate::pagination::PageSize;
use crate::presets::CollectionKind;
use serde::{Deserialize, Serialize};

/// Snapshot of one collection view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ViewReport {
    pub collection: String,
    pub page: usize,
    pub total_pages: usize,
    pub page_size: String,
    pub sort: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub search: String,
    pub filtered: usize,
    pub total: usize,
    pub page_info: String,
    pub range_status: String,
    pub count_status: String,
    pub pagination_visible: bool,
    pub items: Vec<ItemRow>,
}

/// One visible item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemRow {
    /// 1-based position within the filtered set
    pub position: usize,
    pub element: String,
    pub label: String,
}

/// Tooltip and heatmap state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeatmapReport {
    pub tooltip_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip_target: Option<String>,
    pub extension: String,
    pub visible_cells: usize,
}

/// Snapshot of a whole page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageReport {
    pub time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_tab: Option<String>,
    pub views: Vec<ViewReport>,
    pub heatmap: HeatmapReport,
}

/// Element id, or its arena index when it has none
fn element_name(doc: &Document, id: ElementId) -> String {
    doc.element(id)
        .id
        .clone()
        .unwrap_or_else(|| format!("#{}", id.index()))
}

impl ViewReport {
    pub fn from_view(view: &CollectionView, doc: &Document) -> Self {
        let label_attribute = &view.config().label_attribute;
        let offset = match view.page_size() {
            PageSize::Limited(n) => (view.current_page() - 1) * n,
            PageSize::Unbounded => 0,
        };
        let items = view
            .visible_items()
            .into_iter()
            .enumerate()
            .map(|(i, id)| ItemRow {
                position: offset + i + 1,
                element: element_name(doc, id),
                label: doc.attr(id, label_attribute).unwrap_or("").to_string(),
            })
            .collect();

        ViewReport {
            collection: view.name().to_string(),
            page: view.current_page(),
            total_pages: view.total_pages(),
            page_size: view.page_size().to_string(),
            sort: view.sort_key().to_string(),
            search: view.search_term().to_string(),
            filtered: view.filtered_len(),
            total: view.len(),
            page_info: view.page_info_text(),
            range_status: view.range_status(),
            count_status: view.count_status(),
            pagination_visible: view.pagination_visible(),
            items,
        }
    }
}

impl PageReport {
    pub fn from_page(page: &ReportPage) -> Self {
        let doc = page.document();
        let views = CollectionKind::ALL
            .iter()
            .map(|kind| ViewReport::from_view(page.view(*kind), doc))
            .collect();
        let tooltip = page.tooltip();
        let heatmap = page.heatmap();
        PageReport {
            time_ms: page.timers().now(),
            active_tab: page.tabs().active().map(|id| element_name(doc, id)),
            views,
            heatmap: HeatmapReport {
                tooltip_visible: tooltip.is_shown(),
                tooltip_target: tooltip.target().map(|id| element_name(doc, id)),
                extension: heatmap.selected().to_string(),
                visible_cells: heatmap.visible_cells(doc).len(),
            },
        }
    }
}

/// Render one view as text
pub fn render_text(report: &ViewReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} | {} | sort: {} | per page: {}\n",
        report.collection, report.page_info, report.sort, report.page_size
    ));
    output.push_str(&format!("{}\n", report.count_status));
    output.push_str(&format!("{}\n", report.range_status));

    if report.items.is_empty() {
        return output;
    }

    output.push('\n');
    output.push_str(&format!("{:<6} {:<24} {}\n", "#", "ELEMENT", "LABEL"));
    for row in &report.items {
        output.push_str(&format!(
            "{:<6} {:<24} {}\n",
            row.position,
            truncate_or_pad(&row.element, 24),
            row.label
        ));
    }

    output
}

/// Render a whole page as text
pub fn render_page_text(report: &PageReport) -> String {
    let mut output = String::new();
    for view in &report.views {
        output.push_str(&render_text(view));
        output.push('\n');
    }

    let tooltip = match (report.heatmap.tooltip_visible, &report.heatmap.tooltip_target) {
        (true, Some(target)) => format!("visible ({})", target),
        _ => "hidden".to_string(),
    };
    output.push_str(&format!(
        "heatmap | extension: {} | cells: {} | tooltip: {}\n",
        report.heatmap.extension, report.heatmap.visible_cells, tooltip
    ));
    if let Some(ref tab) = report.active_tab {
        output.push_str(&format!("active tab: {}\n", tab));
    }
    output
}

/// Render a view as JSON output
pub fn render_json(report: &ViewReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Render a whole page as JSON output
pub fn render_page_json(report: &PageReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
