//! Pointer input and cursor feedback.

use drawkit_core::Point;
use serde::{Deserialize, Serialize};

use crate::selection_frame::HandlePosition;

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        alt: false,
        ctrl: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    /// Scale about the frame centre instead of the opposite handle.
    pub fn center_anchor(&self) -> bool {
        self.alt
    }

    /// Keep the aspect ratio while scaling.
    pub fn aspect_lock(&self) -> bool {
        self.shift
    }

    /// Quantize rotation to the configured step.
    pub fn snap_rotation(&self) -> bool {
        self.shift
    }

    /// Cycle through stacked objects instead of picking the topmost.
    pub fn cycle_stack(&self) -> bool {
        self.alt || self.ctrl
    }
}

/// A pointer event in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub position: Point,
    pub modifiers: Modifiers,
    /// False when no button is held; used to recover from a missed release.
    pub buttons_pressed: bool,
    pub timestamp_ms: u64,
}

impl PointerEvent {
    /// A pressed-button event with no modifiers.
    pub fn new(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
            buttons_pressed: true,
            timestamp_ms,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn released(mut self) -> Self {
        self.buttons_pressed = false;
        self
    }
}

/// Cursor the host should show while hovering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorHint {
    #[default]
    Default,
    /// Over the selection frame body.
    Move,
    /// Over a scale handle.
    Resize(HandlePosition),
    /// Over the rotation hotspot of a corner.
    Rotate(HandlePosition),
}
