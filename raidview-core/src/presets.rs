//! The three collections of a security report
//!
//! Each preset is the same [`CollectionView`](crate::collection::CollectionView)
//! engine with its own items, controls, searchable fields and sort options.

use crate::collection::{FilterSpec, ViewConfig};
use crate::pagination::PageSize;
use crate::sorting::{Comparator, Direction, SortSpec};
use std::fmt;
use std::str::FromStr;

/// Which collection of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Vulnerabilities,
    Complexity,
    Priority,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Vulnerabilities,
        CollectionKind::Complexity,
        CollectionKind::Priority,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Vulnerabilities => "vulnerabilities",
            CollectionKind::Complexity => "complexity",
            CollectionKind::Priority => "priority",
        }
    }

    pub fn default_page_size(&self) -> PageSize {
        match self {
            CollectionKind::Vulnerabilities => PageSize::Limited(10),
            CollectionKind::Complexity => PageSize::Limited(50),
            CollectionKind::Priority => PageSize::Limited(25),
        }
    }

    pub fn default_sort(&self) -> &'static str {
        match self {
            CollectionKind::Vulnerabilities => "risk-desc",
            CollectionKind::Complexity => "complexity-desc",
            CollectionKind::Priority => "findings-desc",
        }
    }

    /// Sort keys offered by this collection
    pub fn sort_keys(&self) -> Vec<String> {
        sorts(*self).into_iter().map(|s| s.key).collect()
    }

    /// Build the view configuration for this collection
    pub fn config(&self, page_size: PageSize, default_sort: &str) -> ViewConfig {
        let strings = |values: &[&str]| -> Vec<String> {
            values.iter().map(|s| s.to_string()).collect()
        };
        match self {
            CollectionKind::Vulnerabilities => ViewConfig {
                name: self.as_str().to_string(),
                noun: "vulnerabilities".to_string(),
                control_prefix: "vuln".to_string(),
                item_class: "vulnerability-item".to_string(),
                label_attribute: "message".to_string(),
                page_size,
                searchable_fields: strings(&["message", "author", "files"]),
                searchable_classes: Vec::new(),
                score_class: Some("risk-score".to_string()),
                filters: vec![
                    FilterSpec {
                        attribute: "severity".to_string(),
                        control: "vuln-severity-filter".to_string(),
                        derive_options: false,
                    },
                    FilterSpec {
                        attribute: "author".to_string(),
                        control: "vuln-author-filter".to_string(),
                        derive_options: true,
                    },
                ],
                sorts: sorts(*self),
                default_sort: default_sort.to_string(),
            },
            CollectionKind::Complexity => ViewConfig {
                name: self.as_str().to_string(),
                noun: "files".to_string(),
                control_prefix: "complexity".to_string(),
                item_class: "complexity-row".to_string(),
                label_attribute: "filename".to_string(),
                page_size,
                searchable_fields: strings(&["filename"]),
                searchable_classes: Vec::new(),
                score_class: None,
                filters: Vec::new(),
                sorts: sorts(*self),
                default_sort: default_sort.to_string(),
            },
            CollectionKind::Priority => ViewConfig {
                name: self.as_str().to_string(),
                noun: "priority areas".to_string(),
                control_prefix: "priority".to_string(),
                item_class: "priority-item".to_string(),
                label_attribute: "filename".to_string(),
                page_size,
                searchable_fields: strings(&["filename"]),
                searchable_classes: strings(&["finding-item"]),
                score_class: None,
                filters: Vec::new(),
                sorts: sorts(*self),
                default_sort: default_sort.to_string(),
            },
        }
    }
}

fn sorts(kind: CollectionKind) -> Vec<SortSpec> {
    use Direction::{Ascending, Descending};
    match kind {
        CollectionKind::Vulnerabilities => vec![
            SortSpec::new("risk-desc", Comparator::risk_score("riskScore"), Descending),
            SortSpec::new("risk-asc", Comparator::risk_score("riskScore"), Ascending),
            SortSpec::new("date-desc", Comparator::date("date", "index"), Descending),
            SortSpec::new("date-asc", Comparator::date("date", "index"), Ascending),
            SortSpec::new("author", Comparator::text("author"), Ascending),
        ],
        CollectionKind::Complexity => vec![
            SortSpec::new("complexity-desc", Comparator::numeric("complexity"), Descending),
            SortSpec::new("complexity-asc", Comparator::numeric("complexity"), Ascending),
            SortSpec::new("cognitive-desc", Comparator::numeric("cognitive"), Descending),
            SortSpec::new(
                "maintainability-asc",
                Comparator::numeric("maintainability"),
                Ascending,
            ),
            SortSpec::new("functions-desc", Comparator::numeric("functions"), Descending),
            SortSpec::new("lines-desc", Comparator::numeric("lines"), Descending),
            SortSpec::new("filename", Comparator::text("filename"), Ascending),
        ],
        CollectionKind::Priority => vec![
            SortSpec::new("findings-desc", Comparator::numeric("totalFindings"), Descending),
            SortSpec::new(
                "critical-desc",
                Comparator::numeric("criticalFindings"),
                Descending,
            ),
            SortSpec::new("filename", Comparator::text("filename"), Ascending),
        ],
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vulnerabilities" | "vuln" => Ok(CollectionKind::Vulnerabilities),
            "complexity" => Ok(CollectionKind::Complexity),
            "priority" => Ok(CollectionKind::Priority),
            other => anyhow::bail!("unknown collection: {}", other),
        }
    }
}
