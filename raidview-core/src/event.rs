//! UI events routed to view components

use crate::document::ElementId;

/// A discrete user interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Text typed into an input
    Input { target: ElementId, value: String },
    /// Selection changed on a dropdown
    Change { target: ElementId, value: String },
    Click { target: ElementId },
    PointerEnter { target: ElementId },
    PointerLeave { target: ElementId },
}

impl UiEvent {
    pub fn target(&self) -> ElementId {
        match self {
            UiEvent::Input { target, .. }
            | UiEvent::Change { target, .. }
            | UiEvent::Click { target }
            | UiEvent::PointerEnter { target }
            | UiEvent::PointerLeave { target } => *target,
        }
    }
}

/// Whether a component acted on an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Consumed,
    Ignored,
}

impl EventResult {
    pub fn is_consumed(self) -> bool {
        self == EventResult::Consumed
    }

    /// Offer the event to the next handler unless already consumed
    pub fn or_else(self, next: impl FnOnce() -> EventResult) -> EventResult {
        match self {
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => next(),
        }
    }
}
