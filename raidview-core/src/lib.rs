//! raidview core library - interactive views over pre-rendered security report items

#![deny(warnings)]

// Global invariants enforced in this crate:
// - No global mutable state; a ReportPage owns every controller
// - Item snapshots are taken once and never re-read from the document
// - Sorting is stable and deterministic
// - Time only moves through the virtual timer queue
// - Missing controls disable features, never fail
// - Identical event sequences yield identical documents

pub mod attrs;
pub mod collection;
pub mod config;
pub mod document;
pub mod event;
pub mod heatmap;
pub mod item;
pub mod page;
pub mod pagination;
pub mod presets;
pub mod progress;
pub mod report;
pub mod sorting;
pub mod tabs;
pub mod timers;
pub mod tooltip;

pub use collection::{CollectionView, ViewConfig};
pub use config::ResolvedConfig;
pub use document::{Document, ElementId};
pub use event::{EventResult, UiEvent};
pub use page::{load_script, ReportPage, ScriptStep};
pub use pagination::PageSize;
pub use presets::CollectionKind;
pub use report::{render_json, render_text, PageReport, ViewReport};

use anyhow::Result;
use std::path::Path;

/// Load a report document and initialize its page with discovered configuration
///
/// Configuration is looked up next to the document unless `config_path` is given.
pub fn open_report(document: &Path, config_path: Option<&Path>) -> Result<ReportPage> {
    let doc = Document::load(document)?;
    let dir = document.parent().unwrap_or_else(|| Path::new("."));
    let resolved = config::load_and_resolve(dir, config_path)?;
    Ok(ReportPage::new(doc, &resolved))
}
