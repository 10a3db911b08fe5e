//! End-to-end scenarios over the sample report
//!
//! Drives a full ReportPage through its event router, the same path the
//! CLI uses.

use raidview_core::document::ElementId;
use raidview_core::{
    open_report, CollectionKind, CollectionView, Document, EventResult, PageSize, ReportPage,
    UiEvent, ViewReport,
};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn sample_page() -> ReportPage {
    open_report(&fixture_path("sample-report.json"), None).expect("sample report should load")
}

fn element(page: &ReportPage, dom_id: &str) -> ElementId {
    page.resolve(dom_id).unwrap()
}

fn input(page: &mut ReportPage, dom_id: &str, value: &str) -> EventResult {
    let target = element(page, dom_id);
    page.dispatch(&UiEvent::Input {
        target,
        value: value.to_string(),
    })
}

fn change(page: &mut ReportPage, dom_id: &str, value: &str) -> EventResult {
    let target = element(page, dom_id);
    page.dispatch(&UiEvent::Change {
        target,
        value: value.to_string(),
    })
}

fn click(page: &mut ReportPage, dom_id: &str) -> EventResult {
    let target = element(page, dom_id);
    page.dispatch(&UiEvent::Click { target })
}

/// Dom ids of the elements, in order
fn ids(doc: &Document, elements: &[ElementId]) -> Vec<String> {
    elements
        .iter()
        .map(|id| doc.element(*id).id.clone().unwrap_or_default())
        .collect()
}

fn vuln_ids(numbers: &[usize]) -> Vec<String> {
    numbers
        .iter()
        .map(|n| format!("vuln-item-{}", n))
        .collect()
}

fn text(page: &ReportPage, dom_id: &str) -> String {
    page.document().text(element(page, dom_id)).to_string()
}

#[test]
fn test_sample_report_loads() {
    let page = sample_page();
    assert_eq!(page.view(CollectionKind::Vulnerabilities).len(), 23);
    assert_eq!(page.view(CollectionKind::Complexity).len(), 12);
    assert_eq!(page.view(CollectionKind::Priority).len(), 3);
    assert_eq!(page.progress().len(), 2);
}

#[test]
fn test_first_page_of_twenty_three() {
    let page = sample_page();
    let view = page.view(CollectionKind::Vulnerabilities);

    assert_eq!(view.total_pages(), 3);
    assert_eq!(view.current_page(), 1);
    assert_eq!(view.page_info_text(), "Page 1 of 3");
    assert_eq!(view.range_status(), "Showing 1-10 of 23 results");
    assert_eq!(view.count_status(), "Showing all 23 vulnerabilities");
    assert!(view.pagination_visible());

    assert_eq!(text(&page, "vuln-page-info"), "Page 1 of 3");
    assert_eq!(text(&page, "vuln-range-status"), "Showing 1-10 of 23 results");
    assert_eq!(text(&page, "vuln-results-count"), "Showing all 23 vulnerabilities");

    // risk-desc; item 2 has a zero score displayed as 7.5
    assert_eq!(
        ids(page.document(), &view.visible_items()),
        vuln_ids(&[13, 3, 16, 6, 19, 9, 2, 22, 12, 15])
    );

    let results = element(&page, "vuln-results");
    assert_eq!(page.document().visible_children(results).len(), 10);
    assert!(page.document().is_disabled(element(&page, "vuln-prev")));
    assert!(!page.document().is_disabled(element(&page, "vuln-next")));
    let buttons: Vec<usize> = view.page_buttons().iter().map(|(_, n)| *n).collect();
    assert_eq!(buttons, vec![1, 2, 3]);
}

#[test]
fn test_last_page_is_partial() {
    let mut page = sample_page();
    assert_eq!(click(&mut page, "vuln-next"), EventResult::Consumed);
    assert_eq!(click(&mut page, "vuln-page-3"), EventResult::Consumed);

    let view = page.view(CollectionKind::Vulnerabilities);
    assert_eq!(view.current_page(), 3);
    assert_eq!(view.visible_items().len(), 3);
    assert_eq!(view.range_status(), "Showing 21-23 of 23 results");
    assert!(page.document().is_disabled(element(&page, "vuln-next")));

    // next on the last page is a no-op
    click(&mut page, "vuln-next");
    assert_eq!(page.view(CollectionKind::Vulnerabilities).current_page(), 3);
}

#[test]
fn test_pages_do_not_overlap() {
    let mut page = sample_page();
    let mut seen = Vec::new();
    for n in 1..=3 {
        let (view, doc) = page.view_mut(CollectionKind::Vulnerabilities);
        assert!(view.go_to_page(doc, n));
        seen.extend(view.visible_items());
    }
    let mut unique = seen.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(seen.len(), 23);
    assert_eq!(unique.len(), 23);
}

#[test]
fn test_search_narrows_and_hides_pagination() {
    let mut page = sample_page();
    assert_eq!(input(&mut page, "vuln-search", "SQL"), EventResult::Consumed);

    let view = page.view(CollectionKind::Vulnerabilities);
    assert_eq!(view.filtered_len(), 4);
    assert_eq!(view.count_status(), "Showing 4 of 23 vulnerabilities");
    assert_eq!(view.range_status(), "Showing all 4 results");
    assert!(!view.pagination_visible());
    assert!(page.document().is_hidden(element(&page, "vuln-pagination")));
    for id in view.visible_items() {
        let message = page.document().attr(id, "message").unwrap().to_lowercase();
        assert!(message.contains("sql"));
    }
}

#[test]
fn test_search_without_matches() {
    let mut page = sample_page();
    input(&mut page, "vuln-search", "no such finding");
    let view = page.view(CollectionKind::Vulnerabilities);
    assert_eq!(view.filtered_len(), 0);
    assert_eq!(view.range_status(), "No results found");
    assert_eq!(view.page_info_text(), "Page 1 of 1");
    let results = element(&page, "vuln-results");
    assert!(page.document().visible_children(results).is_empty());
}

#[test]
fn test_search_reset_restores_everything() {
    let mut page = sample_page();
    input(&mut page, "vuln-search", "sql");
    input(&mut page, "vuln-search", "   ");
    let view = page.view(CollectionKind::Vulnerabilities);
    assert_eq!(view.filtered_len(), 23);
    assert_eq!(view.count_status(), "Showing all 23 vulnerabilities");
}

#[test]
fn test_risk_sort_directions_are_reversed() {
    let mut page = sample_page();
    change(&mut page, "vuln-page-size", "all");
    let descending = page.view(CollectionKind::Vulnerabilities).filtered_items();

    change(&mut page, "vuln-sort", "risk-asc");
    let mut ascending = page.view(CollectionKind::Vulnerabilities).filtered_items();
    ascending.reverse();

    assert_eq!(descending, ascending);
}

#[test]
fn test_zero_score_sorts_by_displayed_text() {
    let page = sample_page();
    let view = page.view(CollectionKind::Vulnerabilities);
    let order = ids(page.document(), &view.filtered_items());
    let position = order.iter().position(|id| id == "vuln-item-2").unwrap();
    // between 7.8 (item 9) and 7.4 (item 22)
    assert_eq!(order[position - 1], "vuln-item-9");
    assert_eq!(order[position + 1], "vuln-item-22");
}

#[test]
fn test_sort_keeps_current_page() {
    let mut page = sample_page();
    click(&mut page, "vuln-next");
    change(&mut page, "vuln-sort", "date-desc");
    let view = page.view(CollectionKind::Vulnerabilities);
    assert_eq!(view.current_page(), 2);
    assert_eq!(
        ids(page.document(), &view.visible_items()),
        vuln_ids(&[13, 12, 11, 10, 9, 8, 7, 6, 5, 4])
    );
}

#[test]
fn test_date_sort_falls_back_to_index() {
    let mut page = sample_page();
    change(&mut page, "vuln-sort", "date-asc");
    let view = page.view(CollectionKind::Vulnerabilities);
    assert_eq!(
        ids(page.document(), &view.visible_items()),
        vuln_ids(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10])
    );
}

#[test]
fn test_unknown_sort_key_is_ignored() {
    let mut page = sample_page();
    let before = page.view(CollectionKind::Vulnerabilities).filtered_items();
    change(&mut page, "vuln-sort", "severity-desc");
    let view = page.view(CollectionKind::Vulnerabilities);
    assert_eq!(view.sort_key(), "risk-desc");
    assert_eq!(view.filtered_items(), before);
}

#[test]
fn test_author_sort_is_alphabetical() {
    let mut page = sample_page();
    change(&mut page, "vuln-sort", "author");
    let view = page.view(CollectionKind::Vulnerabilities);
    let authors: Vec<String> = view
        .filtered_items()
        .iter()
        .map(|id| page.document().attr(*id, "author").unwrap().to_string())
        .collect();
    let mut sorted = authors.clone();
    sorted.sort();
    assert_eq!(authors, sorted);
    assert_eq!(authors[0], "alice");
}

#[test]
fn test_categorical_filters_combine() {
    let mut page = sample_page();
    click(&mut page, "vuln-next");
    change(&mut page, "vuln-severity-filter", "critical");
    {
        let view = page.view(CollectionKind::Vulnerabilities);
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.filtered_len(), 5);
        assert_eq!(view.count_status(), "Showing 5 of 23 vulnerabilities");
    }

    change(&mut page, "vuln-author-filter", "bob");
    let view = page.view(CollectionKind::Vulnerabilities);
    assert_eq!(view.filtered_len(), 2);
    assert_eq!(
        ids(page.document(), &view.visible_items()),
        vuln_ids(&[16, 4])
    );
}

#[test]
fn test_author_options_derived_from_items() {
    let page = sample_page();
    let doc = page.document();
    let select = element(&page, "vuln-author-filter");
    let options: Vec<&str> = doc.children(select).iter().map(|o| doc.text(*o)).collect();
    assert_eq!(options, vec!["All authors", "alice", "bob", "carol"]);
}

#[test]
fn test_page_size_all() {
    let mut page = sample_page();
    click(&mut page, "vuln-next");
    change(&mut page, "vuln-page-size", "all");

    let view = page.view(CollectionKind::Vulnerabilities);
    assert_eq!(view.page_size(), PageSize::Unbounded);
    assert_eq!(view.current_page(), 1);
    assert_eq!(view.visible_items().len(), 23);
    assert!(!view.pagination_visible());
    assert_eq!(view.range_status(), "Showing all 23 results");
    assert!(page.document().is_hidden(element(&page, "vuln-pagination")));
}

#[test]
fn test_render_is_idempotent() {
    let mut page = sample_page();
    input(&mut page, "vuln-search", "in");
    let results = element(&page, "vuln-results");
    let snapshot = |page: &ReportPage| {
        let doc = page.document();
        (
            ids(doc, &doc.visible_children(results)),
            doc.text(element(page, "vuln-range-status")).to_string(),
            doc.children(element(page, "vuln-page-numbers")).len(),
        )
    };
    let first = snapshot(&page);
    {
        let (view, doc) = page.view_mut(CollectionKind::Vulnerabilities);
        view.render(doc);
        view.render(doc);
    }
    assert_eq!(snapshot(&page), first);
}

#[test]
fn test_page_navigation_scrolls_results() {
    let mut page = sample_page();
    assert_eq!(page.document().scroll_count(), 0);
    click(&mut page, "vuln-next");
    assert_eq!(
        page.document().last_scrolled(),
        page.resolve("vuln-results").ok()
    );
}

#[test]
fn test_complexity_single_page() {
    let page = sample_page();
    let view = page.view(CollectionKind::Complexity);
    assert_eq!(view.total_pages(), 1);
    assert_eq!(view.range_status(), "Showing all 12 results");
    assert_eq!(view.count_status(), "Showing all 12 files");
    assert!(page.document().is_hidden(element(&page, "complexity-pagination")));
    let first = view.visible_items()[0];
    assert_eq!(page.document().attr(first, "filename"), Some("src/module_05.rs"));
}

#[test]
fn test_priority_search_covers_findings() {
    let mut page = sample_page();
    input(&mut page, "priority-search", "sql");
    let view = page.view(CollectionKind::Priority);
    assert_eq!(
        ids(page.document(), &view.visible_items()),
        vec!["priority-item-2"]
    );
    assert_eq!(text(&page, "priority-results-count"), "Showing 1 of 3 priority areas");
}

#[test]
fn test_collections_are_independent() {
    let mut page = sample_page();
    input(&mut page, "complexity-search", "module_1");
    assert_eq!(page.view(CollectionKind::Complexity).filtered_len(), 3);
    assert_eq!(page.view(CollectionKind::Vulnerabilities).filtered_len(), 23);
    assert_eq!(page.view(CollectionKind::Priority).filtered_len(), 3);
}

#[test]
fn test_tabs_switch_panes() {
    let mut page = sample_page();
    let doc = page.document();
    assert!(doc.has_class(element(&page, "tab-overview"), "active"));
    assert!(doc.has_class(element(&page, "overview-pane"), "active"));

    assert_eq!(click(&mut page, "tab-security"), EventResult::Consumed);
    let doc = page.document();
    assert!(!doc.has_class(element(&page, "tab-overview"), "active"));
    assert!(!doc.has_class(element(&page, "overview-pane"), "active"));
    assert!(doc.has_class(element(&page, "security-pane"), "active"));
}

#[test]
fn test_heatmap_extension_filter() {
    let mut page = sample_page();
    assert_eq!(page.heatmap().options(), &["md", "rs", "toml"]);
    change(&mut page, "heatmap-extension-filter", "rs");
    assert_eq!(page.heatmap().visible_cells(page.document()).len(), 3);
    change(&mut page, "heatmap-extension-filter", "all");
    assert_eq!(page.heatmap().visible_cells(page.document()).len(), 6);
}

#[test]
fn test_progress_bars_fill_after_delay() {
    let mut page = sample_page();
    let coverage = element(&page, "progress-coverage");
    let risk = element(&page, "progress-risk");

    page.advance(99);
    assert_eq!(page.document().style(coverage, "width"), None);
    page.advance(1);
    let doc = page.document();
    assert_eq!(doc.style(coverage, "width"), Some("45%"));
    assert_eq!(
        doc.style(coverage, "background"),
        Some("linear-gradient(90deg, #10b981 0%, #f59e0b 25%)")
    );
    assert_eq!(doc.style(risk, "width"), Some("80%"));
    assert_eq!(
        doc.style(risk, "background"),
        Some("linear-gradient(90deg, #10b981 0%, #f59e0b 30%, #ef4444 65%)")
    );
}

#[test]
fn test_view_report_matches_view() {
    let page = sample_page();
    let report = ViewReport::from_view(
        page.view(CollectionKind::Vulnerabilities),
        page.document(),
    );
    assert_eq!(report.page, 1);
    assert_eq!(report.total_pages, 3);
    assert_eq!(report.page_size, "10");
    assert_eq!(report.items.len(), 10);
    assert_eq!(report.items[0].element, "vuln-item-13");
    assert_eq!(report.items[0].position, 1);
    assert!(report.items[0].label.starts_with("SQL injection"));
}

/// Vulnerability list where about a third of the items carry no date and
/// `index` order disagrees with date order
fn mixed_date_document(count: u64) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    let list = doc.create_element("div");
    doc.set_dom_id(list, "vuln-results");
    doc.append_child(root, list);
    let mut seed: u64 = 0;
    for n in 1..=count {
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let item = doc.create_element("div");
        doc.set_dom_id(item, &format!("vuln-item-{}", n));
        doc.add_class(item, "vulnerability-item");
        doc.set_attr(item, "index", &((seed >> 40) % 1000).to_string());
        if (seed >> 20) % 3 != 0 {
            let month = (seed >> 8) % 12 + 1;
            let day = (seed >> 4) % 28 + 1;
            doc.set_attr(item, "date", &format!("2024-{:02}-{:02}", month, day));
        }
        doc.append_child(list, item);
    }
    doc
}

#[test]
fn test_date_sort_with_undated_items_keeps_every_item() {
    for (count, key) in [(40, "date-asc"), (500, "date-desc"), (64, "date-asc")] {
        let mut doc = mixed_date_document(count);
        let config = CollectionKind::Vulnerabilities.config(PageSize::Unbounded, "risk-desc");
        let mut view = CollectionView::new(&mut doc, config);
        view.sort_by(&mut doc, key);
        assert_eq!(view.sort_key(), key);

        let mut shown = ids(&doc, &view.visible_items());
        assert_eq!(shown.len() as u64, count);
        shown.sort();
        shown.dedup();
        assert_eq!(shown.len() as u64, count);
    }
}

#[test]
fn test_date_default_sort_with_undated_items() {
    let mut doc = mixed_date_document(120);
    let config = CollectionKind::Vulnerabilities.config(PageSize::Limited(10), "date-desc");
    let view = CollectionView::new(&mut doc, config);
    assert_eq!(view.total_pages(), 12);
    assert_eq!(view.visible_items().len(), 10);
}

#[test]
fn test_date_sort_when_every_item_is_dated() {
    let mut doc = Document::new();
    let root = doc.root();
    let list = doc.create_element("div");
    doc.append_child(root, list);
    for n in 1..=12 {
        let item = doc.create_element("div");
        doc.set_dom_id(item, &format!("vuln-item-{}", n));
        doc.add_class(item, "vulnerability-item");
        // index runs opposite to date
        doc.set_attr(item, "index", &(100 - n).to_string());
        doc.set_attr(item, "date", &format!("2024-03-{:02}", 13 - n));
        doc.append_child(list, item);
    }
    let config = CollectionKind::Vulnerabilities.config(PageSize::Unbounded, "date-asc");
    let view = CollectionView::new(&mut doc, config);
    let expected: Vec<String> = (1..=12)
        .rev()
        .map(|n| format!("vuln-item-{}", n))
        .collect();
    assert_eq!(ids(&doc, &view.visible_items()), expected);
}

#[test]
fn test_repeated_navigation_does_not_grow_document() {
    let mut page = sample_page();
    let cell = element(&page, "heatmap-cell-1");
    let cycle = |page: &mut ReportPage| {
        click(page, "vuln-next");
        click(page, "vuln-prev");
        page.dispatch(&UiEvent::PointerEnter { target: cell });
    };

    cycle(&mut page);
    let slots = page.document().len();
    for _ in 0..1000 {
        cycle(&mut page);
    }
    assert_eq!(page.document().len(), slots);
    assert_eq!(page.document().scroll_count(), 2002);
    assert_eq!(
        page.document().last_scrolled(),
        page.resolve("vuln-results").ok()
    );
    assert_eq!(page.view(CollectionKind::Vulnerabilities).current_page(), 1);
    let buttons = element(&page, "vuln-page-numbers");
    assert_eq!(page.document().children(buttons).len(), 3);
}
