//! Oriented selection frame and its scale handles.
//!
//! A frame is stored as centre, size and rotation. Corners and handle
//! centres are always derived from those four values, so repeated
//! rebuilds cannot drift.

use drawkit_core::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::geometry::normalize_angle;

/// Where a handle sits on the frame.
///
/// The declaration order is the handle index order: corners clockwise from
/// top-left, then edges clockwise from top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlePosition {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
    Top,
    Right,
    Bottom,
    Left,
}

/// Corner handles scale both axes, edge handles one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandleKind {
    Corner,
    Edge,
}

impl HandlePosition {
    pub const ALL: [HandlePosition; 8] = [
        HandlePosition::TopLeft,
        HandlePosition::TopRight,
        HandlePosition::BottomRight,
        HandlePosition::BottomLeft,
        HandlePosition::Top,
        HandlePosition::Right,
        HandlePosition::Bottom,
        HandlePosition::Left,
    ];

    pub const CORNERS: [HandlePosition; 4] = [
        HandlePosition::TopLeft,
        HandlePosition::TopRight,
        HandlePosition::BottomRight,
        HandlePosition::BottomLeft,
    ];

    pub fn index(self) -> usize {
        match self {
            HandlePosition::TopLeft => 0,
            HandlePosition::TopRight => 1,
            HandlePosition::BottomRight => 2,
            HandlePosition::BottomLeft => 3,
            HandlePosition::Top => 4,
            HandlePosition::Right => 5,
            HandlePosition::Bottom => 6,
            HandlePosition::Left => 7,
        }
    }

    pub fn opposite(self) -> HandlePosition {
        match self {
            HandlePosition::TopLeft => HandlePosition::BottomRight,
            HandlePosition::TopRight => HandlePosition::BottomLeft,
            HandlePosition::BottomRight => HandlePosition::TopLeft,
            HandlePosition::BottomLeft => HandlePosition::TopRight,
            HandlePosition::Top => HandlePosition::Bottom,
            HandlePosition::Right => HandlePosition::Left,
            HandlePosition::Bottom => HandlePosition::Top,
            HandlePosition::Left => HandlePosition::Right,
        }
    }

    pub fn kind(self) -> HandleKind {
        if self.index() < 4 {
            HandleKind::Corner
        } else {
            HandleKind::Edge
        }
    }

    /// Position on the unit frame, each component in `-1, 0, 1`.
    pub fn unit_offset(self) -> Point {
        match self {
            HandlePosition::TopLeft => Point::new(-1.0, -1.0),
            HandlePosition::TopRight => Point::new(1.0, -1.0),
            HandlePosition::BottomRight => Point::new(1.0, 1.0),
            HandlePosition::BottomLeft => Point::new(-1.0, 1.0),
            HandlePosition::Top => Point::new(0.0, -1.0),
            HandlePosition::Right => Point::new(1.0, 0.0),
            HandlePosition::Bottom => Point::new(0.0, 1.0),
            HandlePosition::Left => Point::new(-1.0, 0.0),
        }
    }

    /// Whether dragging this handle scales the frame's X axis.
    pub fn scales_x(self) -> bool {
        self.unit_offset().x != 0.0
    }

    /// Whether dragging this handle scales the frame's Y axis.
    pub fn scales_y(self) -> bool {
        self.unit_offset().y != 0.0
    }
}

/// The four frame corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameCorners {
    pub tl: Point,
    pub tr: Point,
    pub br: Point,
    pub bl: Point,
}

impl FrameCorners {
    pub fn to_array(&self) -> [Point; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }
}

/// One scale handle of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformHandle {
    pub kind: HandleKind,
    pub position: HandlePosition,
    /// Hit box in frame-local (unrotated, centre-origin) coordinates.
    pub bounds_local: Rect,
    /// Handle centre in the reference frame.
    pub center: Point,
}

/// Oriented bounding rectangle of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionFrame {
    pub center: Point,
    pub width: f64,
    pub height: f64,
    /// Radians, in `(-PI, PI]`.
    pub rotation: f64,
}

impl SelectionFrame {
    pub fn build(center: Point, width: f64, height: f64, rotation: f64) -> Self {
        Self {
            center,
            width: width.abs(),
            height: height.abs(),
            rotation: normalize_angle(rotation),
        }
    }

    /// Axis-aligned frame around `rect`.
    pub fn from_rect(rect: &Rect) -> Self {
        Self::build(rect.center(), rect.width, rect.height, 0.0)
    }

    /// Re-derives a frame from its corners.
    ///
    /// Exact inverse of [`SelectionFrame::corners`] for frames with a
    /// non-zero width.
    pub fn from_corners(corners: &FrameCorners) -> Self {
        let top = corners.tr - corners.tl;
        let side = corners.bl - corners.tl;
        let center = Point::new(
            (corners.tl.x + corners.tr.x + corners.br.x + corners.bl.x) / 4.0,
            (corners.tl.y + corners.tr.y + corners.br.y + corners.bl.y) / 4.0,
        );
        let rotation = if top.length() > f64::EPSILON {
            top.angle()
        } else {
            0.0
        };
        Self::build(center, top.length(), side.length(), rotation)
    }

    /// Unit vectors of the frame's X and Y axes.
    pub fn axes(&self) -> (Point, Point) {
        let (s, c) = self.rotation.sin_cos();
        (Point::new(c, s), Point::new(-s, c))
    }

    pub fn corners(&self) -> FrameCorners {
        FrameCorners {
            tl: self.from_frame_local(Point::new(-self.width / 2.0, -self.height / 2.0)),
            tr: self.from_frame_local(Point::new(self.width / 2.0, -self.height / 2.0)),
            br: self.from_frame_local(Point::new(self.width / 2.0, self.height / 2.0)),
            bl: self.from_frame_local(Point::new(-self.width / 2.0, self.height / 2.0)),
        }
    }

    /// Maps a reference-frame point into frame-local coordinates (origin at
    /// the centre, axes along the frame).
    pub fn to_frame_local(&self, point: Point) -> Point {
        (point - self.center).rotate(-self.rotation)
    }

    pub fn from_frame_local(&self, local: Point) -> Point {
        self.center + local.rotate(self.rotation)
    }

    pub fn is_rotated(&self) -> bool {
        self.rotation.abs() > 1e-9
    }

    /// Axis-aligned bounds of the (possibly rotated) frame.
    pub fn axis_aligned_bounds(&self) -> Rect {
        Rect::bounding(self.corners().to_array()).unwrap_or(Rect::ZERO)
    }

    /// Point containment in the frame's own axes.
    pub fn contains(&self, point: Point) -> bool {
        if !self.is_rotated() {
            let half = Point::new(self.width / 2.0, self.height / 2.0);
            return Rect::from_points(self.center - half, self.center + half).contains_point(&point);
        }
        let local = self.to_frame_local(point);
        local.x.abs() <= self.width / 2.0 && local.y.abs() <= self.height / 2.0
    }

    /// Location of a handle in the reference frame.
    pub fn handle_point(&self, position: HandlePosition) -> Point {
        let unit = position.unit_offset();
        self.from_frame_local(Point::new(unit.x * self.width / 2.0, unit.y * self.height / 2.0))
    }

    /// The eight handles in [`HandlePosition::ALL`] order.
    pub fn handles(&self, handle_size: f64) -> Vec<TransformHandle> {
        HandlePosition::ALL
            .iter()
            .map(|position| self.handle(*position, handle_size))
            .collect()
    }

    pub fn handle(&self, position: HandlePosition, handle_size: f64) -> TransformHandle {
        let unit = position.unit_offset();
        let local_center = Point::new(unit.x * self.width / 2.0, unit.y * self.height / 2.0);
        let half = handle_size / 2.0;
        TransformHandle {
            kind: position.kind(),
            position,
            bounds_local: Rect::new(local_center.x - half, local_center.y - half, handle_size, handle_size),
            center: self.from_frame_local(local_center),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_opposites() {
        for position in HandlePosition::ALL {
            assert_eq!(position.opposite().opposite(), position);
            assert_eq!(position.opposite().kind(), position.kind());
            assert_eq!(HandlePosition::ALL[position.index()], position);
        }
        assert!(HandlePosition::Top.scales_y() && !HandlePosition::Top.scales_x());
    }

    #[test]
    fn test_axis_aligned_corners() {
        let frame = SelectionFrame::from_rect(&Rect::new(10.0, 20.0, 100.0, 50.0));
        let corners = frame.corners();
        assert!(corners.tl.approx_eq(&Point::new(10.0, 20.0), 1e-9));
        assert!(corners.br.approx_eq(&Point::new(110.0, 70.0), 1e-9));
        assert_eq!(frame.axis_aligned_bounds(), Rect::new(10.0, 20.0, 100.0, 50.0));
    }

    #[test]
    fn test_rotated_frame_round_trip() {
        let frame = SelectionFrame::build(Point::new(5.0, -3.0), 40.0, 10.0, 0.7);
        let rebuilt = SelectionFrame::from_corners(&frame.corners());
        assert!(rebuilt.center.approx_eq(&frame.center, 1e-9));
        assert!((rebuilt.width - 40.0).abs() < 1e-9);
        assert!((rebuilt.height - 10.0).abs() < 1e-9);
        assert!((rebuilt.rotation - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_quarter_turn_contains() {
        let frame = SelectionFrame::build(Point::ORIGIN, 100.0, 10.0, FRAC_PI_2);
        assert!(frame.contains(Point::new(0.0, 45.0)));
        assert!(!frame.contains(Point::new(45.0, 0.0)));
    }

    #[test]
    fn test_handles_follow_rotation() {
        let frame = SelectionFrame::build(Point::ORIGIN, 100.0, 50.0, FRAC_PI_2);
        let handles = frame.handles(8.0);
        assert_eq!(handles.len(), 8);
        // Rotating a quarter turn clockwise moves the right edge to the bottom.
        let right = handles[HandlePosition::Right.index()];
        assert!(right.center.approx_eq(&Point::new(0.0, 50.0), 1e-9));
        assert_eq!(right.bounds_local, Rect::new(46.0, -4.0, 8.0, 8.0));
    }
}
