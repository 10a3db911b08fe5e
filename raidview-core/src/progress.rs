//! Progress bar gradients
//!
//! Bars fill green, blend to amber past 30% and to red past 60%. The fill is
//! applied once, a short delay after mount, so the width change animates.

use crate::attrs::parse_float;
use crate::document::{Document, ElementId};
use crate::timers::{Task, TimerId, TimerQueue};
use std::fmt;
use tracing::{debug, trace};

pub const GREEN: &str = "#10b981";
pub const AMBER: &str = "#f59e0b";
pub const RED: &str = "#ef4444";

/// Default delay between mount and fill
pub const DEFAULT_ANIMATION_DELAY_MS: u64 = 100;

/// Background of a bar at a given percentage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gradient {
    /// `p <= 30`
    Uniform,
    /// `30 < p <= 60`, amber stop position
    Amber(f64),
    /// `p > 60`, red stop position
    Red(f64),
}

impl Gradient {
    pub fn for_percentage(p: f64) -> Self {
        if p <= 30.0 {
            Gradient::Uniform
        } else if p <= 60.0 {
            let shift = ((p - 30.0) / 30.0 * 50.0).max(0.0);
            Gradient::Amber(50.0 - shift)
        } else {
            let stop = ((p - 60.0) / 40.0 * 50.0 + 50.0).max(50.0);
            Gradient::Red(stop - 10.0)
        }
    }

    pub fn css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Gradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gradient::Uniform => write!(f, "linear-gradient(90deg, {GREEN} 0%, {GREEN} 100%)"),
            Gradient::Amber(s) => write!(f, "linear-gradient(90deg, {GREEN} 0%, {AMBER} {s}%)"),
            Gradient::Red(r) => write!(
                f,
                "linear-gradient(90deg, {GREEN} 0%, {AMBER} 30%, {RED} {r}%)"
            ),
        }
    }
}

/// CSS background for a percentage
pub fn gradient(p: f64) -> String {
    Gradient::for_percentage(p).css()
}

/// Bar width, clamped to `[0, 100]`
pub fn width(p: f64) -> String {
    format!("{}%", p.clamp(0.0, 100.0))
}

/// Progress bars mounted on a page, filled once by a single timer
#[derive(Debug, Clone)]
pub struct ProgressBars {
    bars: Vec<(ElementId, f64)>,
    timer: Option<TimerId>,
    applied: bool,
}

impl ProgressBars {
    /// Read each bar's percentage and schedule the fill
    pub fn mount(doc: &Document, class: &str, timers: &mut TimerQueue, delay_ms: u64) -> Self {
        let bars: Vec<(ElementId, f64)> = doc
            .by_class(class)
            .into_iter()
            .map(|id| {
                let p = doc
                    .attr(id, "percentage")
                    .and_then(parse_float)
                    .unwrap_or(0.0);
                (id, p)
            })
            .collect();
        let timer = if bars.is_empty() {
            debug!(class, "no progress bars");
            None
        } else {
            Some(timers.schedule(delay_ms, Task::AnimateProgress))
        };
        ProgressBars {
            bars,
            timer,
            applied: false,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Fill timer fired; applies width and gradient at most once
    pub fn on_timer(&mut self, doc: &mut Document, id: TimerId) -> bool {
        if self.applied || self.timer != Some(id) {
            return false;
        }
        for &(bar, p) in &self.bars {
            trace!(percentage = p, "fill progress bar");
            doc.set_style(bar, "width", &width(p));
            doc.set_style(bar, "background", &gradient(p));
        }
        self.timer = None;
        self.applied = true;
        true
    }
}
