//! Handle-driven scale and rotate gestures.
//!
//! # Pivot protocol
//!
//! At the start of a gesture every object's pivot is moved to the gesture
//! anchor (expressed in the object's local space) and its position is
//! re-solved so nothing moves on screen. Scale and rotation then act about
//! the anchor with no further position bookkeeping. When the gesture ends
//! the pivot is either restored (again re-solving position) or kept,
//! according to the gesture's [`PivotPolicy`].
//!
//! Translation is not handled here; the selection tool moves objects
//! directly after guide snapping.

use drawkit_core::{
    GestureKind, GeometryResult, NodeId, NodeTransform, Point, Rect, TransformSnapshot,
};
use drawkit_settings::TransformSettings;

use crate::geometry::normalize_angle;
use crate::input::Modifiers;
use crate::scene::SceneGraph;
use crate::selection_frame::{HandleKind, HandlePosition, SelectionFrame, TransformHandle};

/// Drag distances below this along an axis do not scale that axis.
const MIN_DRAG_EXTENT: f64 = 1e-9;

/// What happens to an object's pivot when a gesture ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotPolicy {
    /// Put the pre-gesture pivot back, re-solving position.
    Restore,
    /// Leave the pivot at the gesture anchor.
    Keep,
}

impl PivotPolicy {
    pub fn for_gesture(gesture: GestureKind) -> Self {
        match gesture {
            GestureKind::Rotate => PivotPolicy::Keep,
            GestureKind::Move | GestureKind::Scale | GestureKind::Flip => PivotPolicy::Restore,
        }
    }
}

/// Gesture started from the selection frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Scale(HandlePosition),
    Rotate,
}

impl TransformKind {
    pub fn gesture(&self) -> GestureKind {
        match self {
            TransformKind::Scale(_) => GestureKind::Scale,
            TransformKind::Rotate => GestureKind::Rotate,
        }
    }
}

/// Per-object state for the duration of one gesture.
#[derive(Debug, Clone)]
pub struct ObjectTransformState {
    pub id: NodeId,
    /// Transform before the gesture touched the object.
    pub start: NodeTransform,
    /// The gesture anchor in the object's local space.
    pub anchor_local: Point,
    text_area_start: Option<Rect>,
}

impl ObjectTransformState {
    /// Snapshots the object and re-pivots it about `anchor_world` without
    /// moving it on screen.
    pub fn begin_transform(
        scene: &mut dyn SceneGraph,
        id: NodeId,
        anchor_world: Point,
    ) -> GeometryResult<Self> {
        let start = scene.transform(id)?;
        let anchor_local = scene.to_local(id, anchor_world)?;
        let state = Self {
            id,
            start,
            anchor_local,
            text_area_start: scene.text_area(id),
        };

        match scene.parent(id) {
            Some(parent) => {
                let position = scene.to_local(parent, anchor_world)?;
                let mut transform = start;
                transform.pivot = anchor_local;
                transform.position = position;
                scene.set_transform(id, transform)?;
            }
            None => tracing::warn!("{} has no parent, keeping its pivot", id),
        }

        Ok(state)
    }

    /// Commits text resizing and applies the pivot policy.
    pub fn end_transform(&self, scene: &mut dyn SceneGraph, policy: PivotPolicy) -> GeometryResult<()> {
        self.normalize_text(scene)?;
        if policy == PivotPolicy::Keep {
            return Ok(());
        }

        let Some(parent) = scene.parent(self.id) else {
            tracing::warn!("{} has no parent, leaving pivot at the anchor", self.id);
            return Ok(());
        };
        let world = scene.to_global(self.id, self.start.pivot)?;
        let position = scene.to_local(parent, world)?;

        let mut transform = scene.transform(self.id)?;
        transform.pivot = self.start.pivot;
        transform.position = position;
        scene.set_transform(self.id, transform)
    }

    /// Puts the object back exactly as it was before the gesture.
    pub fn restore(&self, scene: &mut dyn SceneGraph) -> GeometryResult<()> {
        scene.set_transform(self.id, self.start)?;
        if let Some(area) = self.text_area_start {
            scene.set_text_area(self.id, area)?;
        }
        scene.redraw(self.id);
        Ok(())
    }

    /// Scales by `(fx, fy)` relative to the start scale, about the pivot.
    ///
    /// Text objects keep a unit scale: the factor resizes their text area
    /// instead so glyphs are never stretched.
    pub fn apply_scale(&self, scene: &mut dyn SceneGraph, fx: f64, fy: f64) -> GeometryResult<()> {
        let mut transform = scene.transform(self.id)?;
        let scale = Point::new(self.start.scale.x * fx, self.start.scale.y * fy);

        match self.text_area_start {
            Some(area) => {
                scene.set_text_area(self.id, scale_about(&area, transform.pivot, scale))?;
                transform.scale = Point::new(1.0, 1.0);
            }
            None => transform.scale = scale,
        }

        scene.set_transform(self.id, transform)?;
        scene.redraw(self.id);
        Ok(())
    }

    /// Sets rotation to the start rotation plus `delta`.
    pub fn apply_rotation(&self, scene: &mut dyn SceneGraph, delta: f64) -> GeometryResult<()> {
        let mut transform = scene.transform(self.id)?;
        transform.rotation = self.start.rotation + delta;
        scene.set_transform(self.id, transform)?;
        scene.redraw(self.id);
        Ok(())
    }

    fn normalize_text(&self, scene: &mut dyn SceneGraph) -> GeometryResult<()> {
        if self.text_area_start.is_none() {
            return Ok(());
        }
        let Some(area) = scene.text_area(self.id) else {
            return Ok(());
        };
        let mut transform = scene.transform(self.id)?;
        if transform.scale == Point::new(1.0, 1.0) {
            return Ok(());
        }
        scene.set_text_area(self.id, scale_about(&area, transform.pivot, transform.scale))?;
        transform.scale = Point::new(1.0, 1.0);
        scene.set_transform(self.id, transform)?;
        scene.redraw(self.id);
        Ok(())
    }

    pub fn snapshot(&self) -> TransformSnapshot {
        TransformSnapshot {
            id: self.id,
            transform: self.start,
        }
    }
}

fn scale_about(rect: &Rect, pivot: Point, scale: Point) -> Rect {
    let map = |p: Point| {
        Point::new(
            pivot.x + (p.x - pivot.x) * scale.x,
            pivot.y + (p.y - pivot.y) * scale.y,
        )
    };
    Rect::from_points(
        map(Point::new(rect.left(), rect.top())),
        map(Point::new(rect.right(), rect.bottom())),
    )
}

/// Keeps a scale factor away from zero without changing its sign.
fn clamp_magnitude(factor: f64, min: f64) -> f64 {
    if factor.abs() >= min {
        factor
    } else if factor < 0.0 {
        -min
    } else {
        min
    }
}

/// Result of a committed gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTransform {
    pub gesture: GestureKind,
    pub objects: Vec<NodeId>,
    pub before: Vec<TransformSnapshot>,
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    kind: TransformKind,
    reference: NodeId,
    frame: SelectionFrame,
    /// Opposite-handle anchor, used when not scaling from the centre.
    handle_anchor: Point,
    anchor: Point,
    center_anchor: bool,
    drag_start: Point,
    start_angle: f64,
    rotation_delta: f64,
    scale: (f64, f64),
    states: Vec<ObjectTransformState>,
}

/// Idle/active state machine for scale and rotate gestures.
///
/// All points are in the local space of the reference container the
/// selection frame lives in.
#[derive(Debug, Clone)]
pub struct TransformController {
    settings: TransformSettings,
    active: Option<ActiveGesture>,
}

impl TransformController {
    pub fn new(settings: TransformSettings) -> Self {
        Self {
            settings,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn kind(&self) -> Option<TransformKind> {
        self.active.as_ref().map(|a| a.kind)
    }

    /// Current anchor in the reference space.
    pub fn anchor(&self) -> Option<Point> {
        self.active.as_ref().map(|a| a.anchor)
    }

    /// The frame as it was when the gesture began.
    pub fn start_frame(&self) -> Option<&SelectionFrame> {
        self.active.as_ref().map(|a| &a.frame)
    }

    /// Rotation applied so far, in radians.
    pub fn rotation_delta(&self) -> f64 {
        self.active.as_ref().map_or(0.0, |a| a.rotation_delta)
    }

    /// Scale factors applied so far along the frame axes.
    pub fn scale_factors(&self) -> (f64, f64) {
        self.active.as_ref().map_or((1.0, 1.0), |a| a.scale)
    }

    /// Start transforms of every object in the gesture.
    pub fn snapshots(&self) -> Vec<TransformSnapshot> {
        self.active
            .as_ref()
            .map(|a| a.states.iter().map(|s| s.snapshot()).collect())
            .unwrap_or_default()
    }

    pub fn objects(&self) -> Vec<NodeId> {
        self.active
            .as_ref()
            .map(|a| a.states.iter().map(|s| s.id).collect())
            .unwrap_or_default()
    }

    /// Starts a gesture. Any previous gesture state is discarded.
    ///
    /// Scale anchors at the handle opposite `kind`'s handle, or at the
    /// frame centre when the centre modifier is held. Rotation pivots each
    /// object about its own centre and measures the pointer angle about the
    /// frame centre. Returns false (and stays idle) when no object could
    /// take part.
    #[allow(clippy::too_many_arguments)]
    pub fn begin(
        &mut self,
        scene: &mut dyn SceneGraph,
        objects: &[NodeId],
        frame: &SelectionFrame,
        handles: &[TransformHandle],
        kind: TransformKind,
        pointer: Point,
        modifiers: Modifiers,
        reference: NodeId,
    ) -> bool {
        self.active = None;
        if objects.is_empty() {
            return false;
        }

        let (handle_anchor, anchor, center_anchor, states) = match kind {
            TransformKind::Scale(handle) => {
                let handle_anchor = opposite_anchor(frame, handles, handle);
                let center_anchor = modifiers.center_anchor();
                let anchor = if center_anchor { frame.center } else { handle_anchor };
                let Some(states) = begin_about(scene, objects, anchor, reference) else {
                    return false;
                };
                (handle_anchor, anchor, center_anchor, states)
            }
            TransformKind::Rotate => {
                let states = objects
                    .iter()
                    .filter_map(|id| match begin_about_own_center(scene, *id) {
                        Ok(state) => Some(state),
                        Err(e) => {
                            tracing::debug!("Skipping {} in rotate: {}", id, e);
                            None
                        }
                    })
                    .collect();
                (frame.center, frame.center, true, states)
            }
        };

        if states.is_empty() {
            tracing::debug!("No object could start a {}", kind.gesture());
            return false;
        }

        tracing::debug!(
            "Begin {} of {} object(s) about ({:.2}, {:.2})",
            kind.gesture(),
            states.len(),
            anchor.x,
            anchor.y
        );

        self.active = Some(ActiveGesture {
            kind,
            reference,
            frame: *frame,
            handle_anchor,
            anchor,
            center_anchor,
            drag_start: pointer,
            start_angle: (pointer - anchor).angle(),
            rotation_delta: 0.0,
            scale: (1.0, 1.0),
            states,
        });
        true
    }

    /// Applies the pointer's current position. Returns false when idle.
    pub fn update(&mut self, scene: &mut dyn SceneGraph, pointer: Point, modifiers: Modifiers) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        match active.kind {
            TransformKind::Rotate => {
                let raw = normalize_angle((pointer - active.anchor).angle() - active.start_angle);
                let delta = if modifiers.snap_rotation() {
                    let step = self.settings.rotation_snap_step();
                    (raw / step).round() * step
                } else {
                    raw
                };
                active.rotation_delta = delta;
                for state in &active.states {
                    if let Err(e) = state.apply_rotation(scene, delta) {
                        tracing::debug!("Skipping {} this tick: {}", state.id, e);
                    }
                }
            }
            TransformKind::Scale(handle) => {
                let center_anchor = modifiers.center_anchor();
                if center_anchor != active.center_anchor {
                    reanchor(scene, active, center_anchor);
                }

                let (fx, fy) = scale_factors(
                    &active.frame,
                    handle,
                    active.anchor,
                    active.drag_start,
                    pointer,
                    modifiers.aspect_lock(),
                    self.settings.min_scale,
                );
                active.scale = (fx, fy);
                for state in &active.states {
                    if let Err(e) = state.apply_scale(scene, fx, fy) {
                        tracing::debug!("Skipping {} this tick: {}", state.id, e);
                    }
                }
            }
        }
        true
    }

    /// Commits the gesture and returns to idle.
    pub fn end(&mut self, scene: &mut dyn SceneGraph) -> Option<CompletedTransform> {
        let active = self.active.take()?;
        let gesture = active.kind.gesture();
        let policy = PivotPolicy::for_gesture(gesture);

        for state in &active.states {
            if let Err(e) = state.end_transform(scene, policy) {
                tracing::debug!("Could not finish {} for {}: {}", gesture, state.id, e);
            }
        }
        tracing::debug!("End {} of {} object(s)", gesture, active.states.len());

        Some(CompletedTransform {
            gesture,
            objects: active.states.iter().map(|s| s.id).collect(),
            before: active.states.iter().map(|s| s.snapshot()).collect(),
        })
    }

    /// Abandons the gesture, restoring every object.
    pub fn cancel(&mut self, scene: &mut dyn SceneGraph) -> Option<GestureKind> {
        let active = self.active.take()?;
        for state in &active.states {
            if let Err(e) = state.restore(scene) {
                tracing::debug!("Could not restore {}: {}", state.id, e);
            }
        }
        let gesture = active.kind.gesture();
        tracing::debug!("Cancelled {}", gesture);
        Some(gesture)
    }
}

/// Anchor opposite `handle`, taken from the handle set when it is complete
/// so rotated frames use their rotated centres.
fn opposite_anchor(frame: &SelectionFrame, handles: &[TransformHandle], handle: HandlePosition) -> Point {
    let opposite = handle.opposite();
    if handles.len() == HandlePosition::ALL.len() {
        return handles[opposite.index()].center;
    }
    let bounds = frame.axis_aligned_bounds();
    let unit = opposite.unit_offset();
    Point::new(
        bounds.center_x() + unit.x * bounds.width / 2.0,
        bounds.center_y() + unit.y * bounds.height / 2.0,
    )
}

fn begin_about(
    scene: &mut dyn SceneGraph,
    objects: &[NodeId],
    anchor: Point,
    reference: NodeId,
) -> Option<Vec<ObjectTransformState>> {
    let anchor_world = match scene.to_global(reference, anchor) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Reference frame {} cannot map the anchor: {}", reference, e);
            return None;
        }
    };
    Some(
        objects
            .iter()
            .filter_map(|id| match ObjectTransformState::begin_transform(scene, *id, anchor_world) {
                Ok(state) => Some(state),
                Err(e) => {
                    tracing::debug!("Skipping {} in scale: {}", id, e);
                    None
                }
            })
            .collect(),
    )
}

fn begin_about_own_center(scene: &mut dyn SceneGraph, id: NodeId) -> GeometryResult<ObjectTransformState> {
    let center = scene.local_bounds(id)?.center();
    let world = scene.to_global(id, center)?;
    ObjectTransformState::begin_transform(scene, id, world)
}

/// Switches a live scale gesture between centre and opposite-handle anchors.
fn reanchor(scene: &mut dyn SceneGraph, active: &mut ActiveGesture, center_anchor: bool) {
    for state in &active.states {
        if let Err(e) = state.restore(scene) {
            tracing::debug!("Could not restore {} while re-anchoring: {}", state.id, e);
        }
    }

    let anchor = if center_anchor {
        active.frame.center
    } else {
        active.handle_anchor
    };
    let ids: Vec<NodeId> = active.states.iter().map(|s| s.id).collect();
    if let Some(states) = begin_about(scene, &ids, anchor, active.reference) {
        active.states = states;
        active.anchor = anchor;
        active.center_anchor = center_anchor;
    }
}

/// Scale factors along the frame axes for a pointer at `pointer`.
fn scale_factors(
    frame: &SelectionFrame,
    handle: HandlePosition,
    anchor: Point,
    drag_start: Point,
    pointer: Point,
    aspect_lock: bool,
    min_scale: f64,
) -> (f64, f64) {
    let current = (pointer - anchor).rotate(-frame.rotation);
    let start = (drag_start - anchor).rotate(-frame.rotation);

    let mut fx = if handle.scales_x() && start.x.abs() > MIN_DRAG_EXTENT {
        current.x / start.x
    } else {
        1.0
    };
    let mut fy = if handle.scales_y() && start.y.abs() > MIN_DRAG_EXTENT {
        current.y / start.y
    } else {
        1.0
    };

    if aspect_lock {
        match handle.kind() {
            HandleKind::Corner => {
                let magnitude = fx.abs().max(fy.abs());
                fx = magnitude.copysign(fx);
                fy = magnitude.copysign(fy);
            }
            HandleKind::Edge if handle.scales_x() => fy = fx.abs(),
            HandleKind::Edge => fx = fy.abs(),
        }
    }

    (clamp_magnitude(fx, min_scale), clamp_magnitude(fy, min_scale))
}
