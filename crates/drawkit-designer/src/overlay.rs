//! Selection overlay: the frame, its handles and rotation hotspots.
//!
//! # Frame inference
//!
//! When every selected object's local axes agree (within a small angular
//! tolerance), the frame adopts that shared orientation and wraps the
//! projected extents of all objects along it, so a rotated object keeps a
//! tight, rotated frame. Objects with disagreeing orientations fall back to
//! an axis-aligned frame around their combined bounds.

use drawkit_core::{GeometryResult, NodeId, Point, Rect};
use drawkit_settings::HandleSettings;

use crate::geometry::try_combined_local_bounds;
use crate::scene::SceneGraph;
use crate::selection_frame::{HandlePosition, SelectionFrame, TransformHandle};

/// Minimum dot product between two objects' X axes to share an orientation.
const AXIS_DOT_TOLERANCE: f64 = 0.985;
/// Maximum cross product between two objects' X axes to share an orientation.
const AXIS_CROSS_TOLERANCE: f64 = 0.015;

/// What a point over the overlay hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandleHit {
    /// One of the eight scale handles.
    Scale(TransformHandle),
    /// The rotation hotspot outside a corner.
    Rotate { corner: HandlePosition },
}

#[derive(Debug, Clone)]
pub struct SelectionOverlay {
    settings: HandleSettings,
    frame: Option<SelectionFrame>,
    handles: Vec<TransformHandle>,
    objects: Vec<NodeId>,
}

impl SelectionOverlay {
    pub fn new(settings: HandleSettings) -> Self {
        Self {
            settings,
            frame: None,
            handles: Vec::new(),
            objects: Vec::new(),
        }
    }

    pub fn frame(&self) -> Option<&SelectionFrame> {
        self.frame.as_ref()
    }

    /// Axis-aligned bounds of the frame in the reference space.
    pub fn bounds(&self) -> Option<Rect> {
        self.frame.map(|f| f.axis_aligned_bounds())
    }

    pub fn handles(&self) -> &[TransformHandle] {
        &self.handles
    }

    pub fn objects(&self) -> &[NodeId] {
        &self.objects
    }

    /// Rebuilds the frame and handles for `objects`.
    ///
    /// Leaves no frame when `objects` is empty or none of them can be measured.
    pub fn refresh(&mut self, scene: &dyn SceneGraph, objects: &[NodeId], reference: NodeId) {
        self.clear();
        self.objects = objects.to_vec();
        self.frame = Self::compute(scene, objects, reference);
        if let Some(frame) = &self.frame {
            self.handles = frame.handles(self.settings.handle_size);
        }
    }

    /// Recomputes the frame for the current objects, updating handles in place.
    pub fn refresh_bounds_only(&mut self, scene: &dyn SceneGraph, reference: NodeId) {
        self.frame = Self::compute(scene, &self.objects, reference);
        self.sync_handles();
    }

    /// Shows the frame at a preview rotation without consulting the objects.
    pub fn set_rotation_preview(&mut self, center: Point, base_size: (f64, f64), angle: f64) {
        self.frame = Some(SelectionFrame::build(center, base_size.0, base_size.1, angle));
        self.sync_handles();
    }

    pub fn clear(&mut self) {
        self.frame = None;
        self.handles.clear();
        self.objects.clear();
    }

    fn sync_handles(&mut self) {
        let Some(frame) = self.frame else {
            self.handles.clear();
            return;
        };
        if self.handles.len() != HandlePosition::ALL.len() {
            self.handles = frame.handles(self.settings.handle_size);
            return;
        }
        for handle in self.handles.iter_mut() {
            *handle = frame.handle(handle.position, self.settings.handle_size);
        }
    }

    fn compute(scene: &dyn SceneGraph, objects: &[NodeId], reference: NodeId) -> Option<SelectionFrame> {
        if objects.is_empty() {
            return None;
        }
        infer_oriented_frame(scene, objects, reference).or_else(|| {
            try_combined_local_bounds(scene, objects, reference).map(|r| SelectionFrame::from_rect(&r))
        })
    }

    /// Finds the handle (or, optionally, rotation hotspot) under `point`.
    ///
    /// Scale handles take priority. Hotspots are bands along each corner's
    /// outward diagonal.
    pub fn find_handle_at_point(&self, point: Point, include_rotation: bool) -> Option<HandleHit> {
        let frame = self.frame?;
        let local = frame.to_frame_local(point);

        if let Some(handle) = self
            .handles
            .iter()
            .find(|h| h.bounds_local.contains_point(&local))
        {
            return Some(HandleHit::Scale(*handle));
        }

        if !include_rotation {
            return None;
        }

        let reach = self.settings.rotation_hotspot_reach;
        let width = self.settings.rotation_hotspot_width;
        HandlePosition::CORNERS.iter().find_map(|corner| {
            let unit = corner.unit_offset();
            let corner_local = Point::new(unit.x * frame.width / 2.0, unit.y * frame.height / 2.0);
            let diagonal = unit.normalized()?;
            let offset = local - corner_local;
            let along = offset.dot(&diagonal);
            let across = offset.cross(&diagonal).abs();
            (along > 0.0 && along <= reach && across <= width)
                .then_some(HandleHit::Rotate { corner: *corner })
        })
    }

    /// Whether `point` lies inside the frame, in the frame's own axes.
    pub fn point_in_rect(&self, point: Point) -> bool {
        self.frame.is_some_and(|f| f.contains(point))
    }
}

/// Oriented frame for objects that share a rotation, or `None` if their
/// axes disagree or nothing can be measured.
pub fn infer_oriented_frame(
    scene: &dyn SceneGraph,
    objects: &[NodeId],
    reference: NodeId,
) -> Option<SelectionFrame> {
    let mut axes: Vec<(Point, bool)> = Vec::with_capacity(objects.len());
    let mut points = Vec::with_capacity(objects.len() * 4);

    for id in objects {
        let corners = match object_corners_in(scene, *id, reference) {
            Ok(corners) => corners,
            Err(e) => {
                tracing::debug!("Skipping {} in frame inference: {}", id, e);
                continue;
            }
        };
        let Some(u) = (corners[1] - corners[0]).normalized() else {
            tracing::debug!("Skipping degenerate {} in frame inference", id);
            continue;
        };
        let mirrored = (corners[1] - corners[0]).cross(&(corners[3] - corners[0])) < 0.0;
        axes.push((u, mirrored));
        points.extend_from_slice(&corners);
    }

    // A mirrored object's X axis runs against its visual orientation, so
    // unmirrored objects decide the shared axis.
    let shared = match axes.iter().find(|(_, mirrored)| !mirrored) {
        Some((u, _)) => *u,
        None => canonical_axis(axes.first()?.0),
    };
    for (u, mirrored) in &axes {
        let u = if *mirrored && shared.dot(u) < 0.0 { -*u } else { *u };
        if shared.dot(&u) < AXIS_DOT_TOLERANCE || shared.cross(&u).abs() > AXIS_CROSS_TOLERANCE {
            return None;
        }
    }

    let u = shared;
    let n = Point::new(-u.y, u.x);
    let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_n, mut max_n) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in &points {
        let pu = p.dot(&u);
        let pn = p.dot(&n);
        min_u = min_u.min(pu);
        max_u = max_u.max(pu);
        min_n = min_n.min(pn);
        max_n = max_n.max(pn);
    }

    let center = u * ((min_u + max_u) / 2.0) + n * ((min_n + max_n) / 2.0);
    Some(SelectionFrame::build(center, max_u - min_u, max_n - min_n, u.angle()))
}

/// Picks the direction of `u` whose angle lies in (-π/2, π/2].
fn canonical_axis(u: Point) -> Point {
    if u.x < -1e-12 || (u.x.abs() <= 1e-12 && u.y < 0.0) {
        -u
    } else {
        u
    }
}

/// Corners of an object's local bounds mapped into `reference`, in
/// `tl, tr, br, bl` order.
fn object_corners_in(scene: &dyn SceneGraph, id: NodeId, reference: NodeId) -> GeometryResult<[Point; 4]> {
    let local = scene.local_bounds(id)?;
    let mut out = [Point::ORIGIN; 4];
    for (slot, corner) in out.iter_mut().zip(local.corners()) {
        let world = scene.to_global(id, corner)?;
        *slot = scene.to_local(reference, world)?;
    }
    Ok(out)
}
