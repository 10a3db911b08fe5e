//! Item comparators
//!
//! Global invariants enforced:
//! - Malformed values never produce NaN orderings
//! - Descending order is the exact reverse of ascending order
//! - Callers sort with `merge_sort_by`, so equal items keep their snapshot order
//! - The date fallback is not transitive across dated and undated items;
//!   sorting still terminates and yields a permutation

use crate::attrs::parse_float;
use crate::item::Item;
use std::cmp::Ordering;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// How two items are compared (ascending sense)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparator {
    /// Float attribute; missing or unparsable reads as 0
    Numeric { attribute: String },
    /// Float attribute, falling back to the displayed score text when it reads as exactly 0
    RiskScore { attribute: String },
    /// ISO date attribute when both sides have one, else an integer fallback attribute
    Date { attribute: String, fallback: String },
    /// Locale-aware string ordering; empty sorts first
    Text { attribute: String },
}

/// A named sort option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub comparator: Comparator,
    pub direction: Direction,
}

impl SortSpec {
    pub fn new(key: &str, comparator: Comparator, direction: Direction) -> Self {
        SortSpec {
            key: key.to_string(),
            comparator,
            direction,
        }
    }

    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        let ordering = self.comparator.compare(a, b);
        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

impl Comparator {
    pub fn numeric(attribute: &str) -> Self {
        Comparator::Numeric {
            attribute: attribute.to_string(),
        }
    }

    pub fn risk_score(attribute: &str) -> Self {
        Comparator::RiskScore {
            attribute: attribute.to_string(),
        }
    }

    pub fn date(attribute: &str, fallback: &str) -> Self {
        Comparator::Date {
            attribute: attribute.to_string(),
            fallback: fallback.to_string(),
        }
    }

    pub fn text(attribute: &str) -> Self {
        Comparator::Text {
            attribute: attribute.to_string(),
        }
    }

    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        match self {
            Comparator::Numeric { attribute } => {
                compare_f64(a.attrs.number(attribute), b.attrs.number(attribute))
            }
            Comparator::RiskScore { attribute } => {
                compare_f64(risk_value(a, attribute), risk_value(b, attribute))
            }
            Comparator::Date {
                attribute,
                fallback,
            } => match (a.attrs.date_millis(attribute), b.attrs.date_millis(attribute)) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => a.attrs.integer(fallback).cmp(&b.attrs.integer(fallback)),
            },
            Comparator::Text { attribute } => {
                locale_compare(a.attrs.string(attribute), b.attrs.string(attribute))
            }
        }
    }
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Effective risk score of an item.
///
/// A numeric attribute of exactly 0 is treated as absent and the displayed
/// score text is parsed instead. A genuine zero score therefore takes the
/// text path too; both normally agree.
pub fn risk_value(item: &Item, attribute: &str) -> f64 {
    let value = item.attrs.number(attribute);
    if value != 0.0 {
        return value;
    }
    item.score_text
        .as_deref()
        .and_then(parse_float)
        .unwrap_or(0.0)
}

/// Case-insensitive ordering with a code point tiebreak
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

/// Stable bottom-up merge sort that accepts any comparator.
///
/// Unlike `slice::sort_by` it never panics when `compare` is not a total
/// order; the result is always a permutation of the input. For a consistent
/// comparator the result matches `sort_by`.
pub fn merge_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len < 2 {
        return;
    }
    let mut buffer = items.to_vec();
    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            merge(
                &items[start..mid],
                &items[mid..end],
                &mut buffer[start..end],
                &mut compare,
            );
            start = end;
        }
        items.copy_from_slice(&buffer);
        width *= 2;
    }
}

fn merge<T, F>(left: &[T], right: &[T], out: &mut [T], compare: &mut F)
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    let (mut i, mut j) = (0, 0);
    for slot in out.iter_mut() {
        // ties take from the left run
        let take_right = j < right.len()
            && (i >= left.len() || compare(&right[j], &left[i]) == Ordering::Less);
        if take_right {
            *slot = right[j];
            j += 1;
        } else {
            *slot = left[i];
            i += 1;
        }
    }
}
