//! Data model shared between the scene, the engine, and event consumers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Affine2, Point};

/// Identifier of a node in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of drawable a scene node is.
///
/// Attached to each node when it is created, so capability checks are a
/// single typed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Brush,
    Pen,
    Shape,
    Text,
    Group,
    Image,
    Table,
}

impl ShapeKind {
    /// Whether double-clicking the object should hand off to a text editor.
    pub fn is_text(&self) -> bool {
        matches!(self, ShapeKind::Text)
    }

    /// Whether the object carries a resizable text area instead of glyph scale.
    pub fn has_text_area(&self) -> bool {
        matches!(self, ShapeKind::Text | ShapeKind::Table)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Brush => write!(f, "brush"),
            Self::Pen => write!(f, "pen"),
            Self::Shape => write!(f, "shape"),
            Self::Text => write!(f, "text"),
            Self::Group => write!(f, "group"),
            Self::Image => write!(f, "image"),
            Self::Table => write!(f, "table"),
        }
    }
}

/// Position, scale, rotation and pivot of a node.
///
/// The three components stay orthogonal: the local matrix is composed only
/// when geometry is queried, as `T(position) · R(rotation) · S(scale) · T(-pivot)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    pub position: Point,
    pub scale: Point,
    /// Rotation in radians.
    pub rotation: f64,
    pub pivot: Point,
}

impl NodeTransform {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            ..Self::default()
        }
    }

    /// Local-to-parent matrix.
    pub fn local_matrix(&self) -> Affine2 {
        Affine2::translation(self.position.x, self.position.y)
            * Affine2::rotation(self.rotation)
            * Affine2::scale(self.scale.x, self.scale.y)
            * Affine2::translation(-self.pivot.x, -self.pivot.y)
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: Point::ORIGIN,
            scale: Point::new(1.0, 1.0),
            rotation: 0.0,
            pivot: Point::ORIGIN,
        }
    }
}

/// Derived description of what is selected, for UI panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionKind {
    Single(ShapeKind),
    Mixed,
    Unknown,
}

impl SelectionKind {
    /// Derives the selection kind from the kinds of the selected objects.
    pub fn from_kinds<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = Option<ShapeKind>>,
    {
        let mut found: Option<ShapeKind> = None;
        let mut mixed = false;
        for kind in kinds {
            match (kind, found) {
                (None, _) => return SelectionKind::Unknown,
                (Some(k), None) => found = Some(k),
                (Some(k), Some(prev)) if k != prev => mixed = true,
                _ => {}
            }
        }
        match (found, mixed) {
            (None, _) => SelectionKind::Unknown,
            (Some(_), true) => SelectionKind::Mixed,
            (Some(k), false) => SelectionKind::Single(k),
        }
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(kind) => write!(f, "{}", kind),
            Self::Mixed => write!(f, "mixed"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Kind of transform gesture applied to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureKind {
    Move,
    Scale,
    Rotate,
    Flip,
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move => write!(f, "move"),
            Self::Scale => write!(f, "scale"),
            Self::Rotate => write!(f, "rotate"),
            Self::Flip => write!(f, "flip"),
        }
    }
}
