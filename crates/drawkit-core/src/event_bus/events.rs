//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so consumers such as an undo
//! history can store them as they arrive.

use serde::{Deserialize, Serialize};

use crate::data::{GestureKind, NodeId, NodeTransform, SelectionKind};

/// Root event enum for all engine events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Selection membership changes
    Selection(SelectionEvent),
    /// Transform gestures applied to the selection
    Transform(TransformEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Selection(_) => EventCategory::Selection,
            AppEvent::Transform(_) => EventCategory::Transform,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Selection(e) => e.description(),
            AppEvent::Transform(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Selection change events.
    Selection,
    /// Transform lifecycle events.
    Transform,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Transform => write!(f, "Transform"),
        }
    }
}

/// Selection-related events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionEvent {
    /// The selected set changed.
    Changed {
        /// Selected objects in selection order.
        ids: Vec<NodeId>,
        /// Derived kind of the selection.
        kind: SelectionKind,
    },
    /// The selection became empty.
    Cleared,
}

impl SelectionEvent {
    fn description(&self) -> String {
        match self {
            SelectionEvent::Changed { ids, kind } => {
                format!("Selection changed: {} object(s), {}", ids.len(), kind)
            }
            SelectionEvent::Cleared => "Selection cleared".to_string(),
        }
    }
}

/// Snapshot of one object's transform at a gesture boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    /// The object.
    pub id: NodeId,
    /// Its transform at the time of the snapshot.
    pub transform: NodeTransform,
}

/// Transform lifecycle events, used by history collaborators to record
/// before/after state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransformEvent {
    /// Objects are about to be transformed.
    Started {
        /// Gesture being applied.
        gesture: GestureKind,
        /// State before the gesture.
        before: Vec<TransformSnapshot>,
    },
    /// Objects were transformed and the gesture committed.
    Finished {
        /// Gesture that was applied.
        gesture: GestureKind,
        /// State before the gesture.
        before: Vec<TransformSnapshot>,
        /// State after the gesture.
        after: Vec<TransformSnapshot>,
    },
    /// The gesture was abandoned and objects were restored.
    Cancelled {
        /// Gesture that was abandoned.
        gesture: GestureKind,
    },
}

impl TransformEvent {
    fn description(&self) -> String {
        match self {
            TransformEvent::Started { gesture, before } => {
                format!("Starting {} of {} object(s)", gesture, before.len())
            }
            TransformEvent::Finished { gesture, after, .. } => {
                format!("Finished {} of {} object(s)", gesture, after.len())
            }
            TransformEvent::Cancelled { gesture } => format!("Cancelled {}", gesture),
        }
    }
}
