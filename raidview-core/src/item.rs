//! Item snapshots
//!
//! A collection captures every item once at initialization. Filtering and
//! sorting read only from these snapshots, never from the live document.

use crate::attrs::AttributeSet;
use crate::document::{Document, ElementId};

/// Frozen view of one renderable item
#[derive(Debug, Clone)]
pub struct Item {
    pub id: ElementId,
    pub attrs: AttributeSet,
    /// Displayed score text, used when the numeric score is absent
    pub score_text: Option<String>,
    /// Lowercased search haystack
    pub haystack: String,
}

/// What to capture from each item
#[derive(Debug, Clone, Default)]
pub struct CaptureSpec<'a> {
    pub searchable_fields: &'a [String],
    pub searchable_classes: &'a [String],
    pub score_class: Option<&'a str>,
}

impl Item {
    pub fn capture(doc: &Document, id: ElementId, spec: &CaptureSpec<'_>) -> Self {
        let attrs = AttributeSet::new(doc.element(id).attrs.clone());

        let mut parts: Vec<String> = spec
            .searchable_fields
            .iter()
            .map(|field| attrs.string(field).to_string())
            .collect();
        for class in spec.searchable_classes {
            for nested in doc.descendants_by_class(id, class) {
                parts.push(doc.text_content(nested));
            }
        }

        let score_text = spec.score_class.and_then(|class| {
            doc.descendants_by_class(id, class)
                .first()
                .map(|el| doc.text_content(*el))
        });

        Item {
            id,
            attrs,
            score_text,
            haystack: parts.join(" ").to_lowercase(),
        }
    }

    /// Case-insensitive substring match; `needle` must already be lowercase
    pub fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty() || self.haystack.contains(needle)
    }
}
