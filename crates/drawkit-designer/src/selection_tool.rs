//! Selection tool: routes pointer gestures to the selection components and
//! exposes selection-preserving edit commands.
//!
//! Exactly one interaction is active at a time, tracked by [`ToolMode`].
//! Pointer-down picks, in order of priority: a frame handle or rotation
//! hotspot, the inside of the current frame (group drag), an object
//! (click), or empty space (marquee).

use std::sync::Arc;

use drawkit_core::{
    AppEvent, EventBus, GestureKind, NodeId, Point, Rect, SelectionEvent, SelectionKind,
    TransformEvent, TransformSnapshot,
};
use drawkit_settings::Config;
use serde::{Deserialize, Serialize};

use crate::corner_radius::CornerRadiusDrag;
use crate::geometry::translate_across_frames;
use crate::guides::{SiblingSnapCandidates, SmartGuides, SnapCandidateProvider};
use crate::hit_test::{selectable_nodes, selection_action, ClickResolver, ClickResult};
use crate::input::{CursorHint, PointerEvent};
use crate::marquee::MarqueeSelector;
use crate::overlay::{HandleHit, SelectionOverlay};
use crate::scene::{parent_to_local, SceneEditor, ZOrder};
use crate::selection_frame::SelectionFrame;
use crate::transform::{TransformController, TransformKind};

/// The interaction currently owning the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolMode {
    #[default]
    Idle,
    Drag,
    Scale,
    Rotate,
    Marquee,
    CornerRadius,
}

/// Mirror axis for [`SelectionTool::flip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone)]
struct DragState {
    start: Point,
    start_bounds: Rect,
    applied: Point,
    before: Vec<TransformSnapshot>,
    announced: bool,
}

/// Selection tool for a scene implementing [`SceneEditor`].
///
/// The scene is passed into every call; the tool only keeps ids. All
/// positions handed to the tool are world coordinates; internally the
/// frame, guides and marquee work in the local space of the reference
/// container.
pub struct SelectionTool<S: SceneEditor> {
    config: Config,
    reference: NodeId,
    selection: Vec<NodeId>,
    overlay: SelectionOverlay,
    guides: SmartGuides,
    controller: TransformController,
    clicks: ClickResolver,
    marquee: MarqueeSelector,
    corner_radius: CornerRadiusDrag,
    snap_candidates: Box<dyn SnapCandidateProvider>,
    bus: Arc<EventBus>,
    mode: ToolMode,
    drag: Option<DragState>,
    rotation_base: Option<SelectionFrame>,
    cursor: CursorHint,
    clipboard: Vec<S::Snapshot>,
    paste_count: u32,
}

impl<S: SceneEditor> std::fmt::Debug for SelectionTool<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionTool")
            .field("reference", &self.reference)
            .field("selection", &self.selection)
            .field("mode", &self.mode)
            .field("clipboard", &self.clipboard.len())
            .finish()
    }
}

impl<S: SceneEditor> SelectionTool<S> {
    /// Creates a tool drawing its frame in the space of `reference`, snapping
    /// to its siblings.
    pub fn new(config: Config, reference: NodeId, bus: Arc<EventBus>) -> Self {
        Self::with_snap_candidates(config, reference, bus, Box::new(SiblingSnapCandidates))
    }

    pub fn with_snap_candidates(
        config: Config,
        reference: NodeId,
        bus: Arc<EventBus>,
        snap_candidates: Box<dyn SnapCandidateProvider>,
    ) -> Self {
        Self {
            overlay: SelectionOverlay::new(config.handles.clone()),
            guides: SmartGuides::new(&config.guides),
            controller: TransformController::new(config.transform.clone()),
            clicks: ClickResolver::new(config.clicks.clone()),
            marquee: MarqueeSelector::new(),
            corner_radius: CornerRadiusDrag::new(&config.corner_radius),
            config,
            reference,
            selection: Vec::new(),
            snap_candidates,
            bus,
            mode: ToolMode::Idle,
            drag: None,
            rotation_base: None,
            cursor: CursorHint::Default,
            clipboard: Vec::new(),
            paste_count: 0,
        }
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    pub fn reference(&self) -> NodeId {
        self.reference
    }

    /// Current selection frame, for overlay-positioning consumers.
    pub fn frame(&self) -> Option<&SelectionFrame> {
        self.overlay.frame()
    }

    /// Axis-aligned bounds of the selection frame in the reference space.
    pub fn selection_bounds(&self) -> Option<Rect> {
        self.overlay.bounds()
    }

    pub fn overlay(&self) -> &SelectionOverlay {
        &self.overlay
    }

    pub fn guides(&self) -> &SmartGuides {
        &self.guides
    }

    pub fn marquee_rect(&self) -> Option<Rect> {
        self.marquee.rect()
    }

    /// Derived kind of the current selection.
    pub fn selection_kind(&self, scene: &S) -> SelectionKind {
        SelectionKind::from_kinds(self.selection.iter().map(|id| scene.kind(*id)))
    }

    fn to_reference(&self, scene: &S, world: Point) -> Option<Point> {
        match scene.to_local(self.reference, world) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!("Reference frame {} cannot map pointer: {}", self.reference, e);
                None
            }
        }
    }

    fn emit(&self, event: AppEvent) {
        if let Err(e) = self.bus.publish(event) {
            tracing::trace!("Event not delivered: {}", e);
        }
    }

    /// Replaces the selection, notifying listeners when it changed.
    pub fn set_selection(&mut self, scene: &S, ids: Vec<NodeId>) {
        let mut next: Vec<NodeId> = Vec::with_capacity(ids.len());
        for id in ids {
            if scene.contains(id) && !next.contains(&id) {
                next.push(id);
            }
        }

        let changed = next != self.selection;
        self.selection = next;
        self.refresh_overlay(scene);

        if !changed {
            return;
        }
        if self.selection.is_empty() {
            self.emit(AppEvent::Selection(SelectionEvent::Cleared));
        } else {
            let kind = self.selection_kind(scene);
            tracing::debug!("Selected {} object(s), {}", self.selection.len(), kind);
            self.emit(AppEvent::Selection(SelectionEvent::Changed {
                ids: self.selection.clone(),
                kind,
            }));
        }
    }

    pub fn clear_selection(&mut self, scene: &S) {
        self.set_selection(scene, Vec::new());
    }

    pub fn select_all(&mut self, scene: &S) {
        let all = selectable_nodes(scene, self.reference);
        self.set_selection(scene, all);
    }

    /// Re-derives the frame from the selected objects.
    pub fn refresh_overlay(&mut self, scene: &S) {
        self.overlay.refresh(scene, &self.selection, self.reference);
    }

    fn snapshots(&self, scene: &S) -> Vec<TransformSnapshot> {
        self.selection
            .iter()
            .filter_map(|id| {
                scene.transform(*id).ok().map(|transform| TransformSnapshot {
                    id: *id,
                    transform,
                })
            })
            .collect()
    }

    fn snapshots_of(scene: &S, ids: &[NodeId]) -> Vec<TransformSnapshot> {
        ids.iter()
            .filter_map(|id| {
                scene.transform(*id).ok().map(|transform| TransformSnapshot {
                    id: *id,
                    transform,
                })
            })
            .collect()
    }

    // Pointer handling

    /// Handles a pointer press. Returns the click resolution when the press
    /// landed on (or inside) the selection rather than on a handle; a text
    /// double-click is reported there for hand-off to a text editor.
    pub fn pointer_down(&mut self, scene: &mut S, event: PointerEvent) -> Option<ClickResult> {
        if self.mode != ToolMode::Idle {
            tracing::debug!("Pointer down during {:?}, finishing it first", self.mode);
            self.pointer_up(scene, event);
        }
        let point = self.to_reference(scene, event.position)?;

        if let Some(hit) = self.overlay.find_handle_at_point(point, true) {
            self.begin_handle_gesture(scene, hit, point, event);
            return None;
        }

        let click = self.clicks.resolve(
            &*scene,
            event.position,
            self.reference,
            event.timestamp_ms,
            event.modifiers,
        );

        let inside = self.overlay.point_in_rect(point);
        let keeps_selection = click.target.is_none_or(|t| self.selection.contains(&t));
        if inside && !event.modifiers.shift && (!click.cycled || keeps_selection) {
            self.begin_drag(scene, point);
            return Some(click);
        }

        match click.target {
            Some(target) => {
                let mut next = self.selection.clone();
                selection_action(Some(target), &self.selection, event.modifiers.shift).apply(&mut next);
                self.set_selection(scene, next);
                if !event.modifiers.shift && self.overlay.point_in_rect(point) {
                    self.begin_drag(scene, point);
                }
            }
            None => {
                self.marquee.start(point, event.modifiers.shift);
                self.mode = ToolMode::Marquee;
            }
        }
        Some(click)
    }

    fn begin_handle_gesture(&mut self, scene: &mut S, hit: HandleHit, point: Point, event: PointerEvent) {
        let Some(frame) = self.overlay.frame().copied() else {
            return;
        };
        let (kind, mode) = match hit {
            HandleHit::Scale(handle) => (TransformKind::Scale(handle.position), ToolMode::Scale),
            HandleHit::Rotate { .. } => (TransformKind::Rotate, ToolMode::Rotate),
        };

        let handles = self.overlay.handles().to_vec();
        let selection = self.selection.clone();
        let started = self.controller.begin(
            scene,
            &selection,
            &frame,
            &handles,
            kind,
            point,
            event.modifiers,
            self.reference,
        );
        if !started {
            return;
        }

        self.mode = mode;
        self.rotation_base = (mode == ToolMode::Rotate).then_some(frame);
        if mode == ToolMode::Scale {
            self.guides
                .refresh_candidates(&*scene, self.reference, &selection, self.snap_candidates.as_ref());
        }
        self.emit(AppEvent::Transform(TransformEvent::Started {
            gesture: kind.gesture(),
            before: self.controller.snapshots(),
        }));
    }

    fn begin_drag(&mut self, scene: &S, point: Point) {
        let Some(start_bounds) = self.overlay.bounds() else {
            return;
        };
        self.guides
            .refresh_candidates(scene, self.reference, &self.selection, self.snap_candidates.as_ref());
        self.drag = Some(DragState {
            start: point,
            start_bounds,
            applied: Point::ORIGIN,
            before: self.snapshots(scene),
            announced: false,
        });
        self.mode = ToolMode::Drag;
        tracing::debug!("Begin move of {} object(s)", self.selection.len());
    }

    /// Handles pointer motion.
    pub fn pointer_move(&mut self, scene: &mut S, event: PointerEvent) {
        if self.mode != ToolMode::Idle && !event.buttons_pressed {
            tracing::debug!("Missed pointer release during {:?}", self.mode);
            self.pointer_up(scene, event);
            return;
        }

        if self.mode == ToolMode::CornerRadius {
            self.corner_radius.update(scene, event.position, event.timestamp_ms);
            return;
        }

        let Some(point) = self.to_reference(scene, event.position) else {
            return;
        };

        match self.mode {
            ToolMode::Idle => self.cursor = self.hover_cursor(point),
            ToolMode::Scale => {
                self.controller.update(scene, point, event.modifiers);
                self.overlay.refresh_bounds_only(&*scene, self.reference);
                if let Some(bounds) = self.overlay.bounds() {
                    self.guides.update(bounds);
                }
            }
            ToolMode::Rotate => {
                self.controller.update(scene, point, event.modifiers);
                if let Some(base) = self.rotation_base {
                    let angle = base.rotation + self.controller.rotation_delta();
                    self.overlay
                        .set_rotation_preview(base.center, (base.width, base.height), angle);
                }
            }
            ToolMode::Drag => self.drag_to(scene, point),
            ToolMode::Marquee => {
                self.marquee.update(point);
            }
            ToolMode::CornerRadius => {}
        }
    }

    fn drag_to(&mut self, scene: &mut S, point: Point) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };

        let total = point - drag.start;
        let snap = self
            .guides
            .compute_snap_adjustments(drag.start_bounds, total.x, total.y);
        let step = Point::new(snap.dx, snap.dy) - drag.applied;
        if step == Point::ORIGIN {
            return;
        }

        if !drag.announced {
            drag.announced = true;
            let before = drag.before.clone();
            self.emit(AppEvent::Transform(TransformEvent::Started {
                gesture: GestureKind::Move,
                before,
            }));
        }

        for id in &self.selection {
            translate_across_frames(scene, *id, step.x, step.y, self.reference);
        }
        if let Some(drag) = self.drag.as_mut() {
            drag.applied = Point::new(snap.dx, snap.dy);
        }

        self.overlay.refresh_bounds_only(&*scene, self.reference);
        if let Some(bounds) = self.overlay.bounds() {
            self.guides.update(bounds);
        }
    }

    fn hover_cursor(&self, point: Point) -> CursorHint {
        match self.overlay.find_handle_at_point(point, true) {
            Some(HandleHit::Scale(handle)) => CursorHint::Resize(handle.position),
            Some(HandleHit::Rotate { corner }) => CursorHint::Rotate(corner),
            None if self.overlay.point_in_rect(point) => CursorHint::Move,
            None => CursorHint::Default,
        }
    }

    /// Handles a pointer release, committing the active interaction.
    pub fn pointer_up(&mut self, scene: &mut S, event: PointerEvent) {
        match self.mode {
            ToolMode::Idle => {}
            ToolMode::Scale | ToolMode::Rotate => {
                if let Some(done) = self.controller.end(scene) {
                    let after = Self::snapshots_of(scene, &done.objects);
                    self.emit(AppEvent::Transform(TransformEvent::Finished {
                        gesture: done.gesture,
                        before: done.before,
                        after,
                    }));
                }
                self.rotation_base = None;
                self.refresh_overlay(scene);
            }
            ToolMode::Drag => {
                if let Some(drag) = self.drag.take() {
                    if drag.announced {
                        let after = self.snapshots(scene);
                        self.emit(AppEvent::Transform(TransformEvent::Finished {
                            gesture: GestureKind::Move,
                            before: drag.before,
                            after,
                        }));
                    }
                    tracing::debug!(
                        "End move by ({:.2}, {:.2})",
                        drag.applied.x,
                        drag.applied.y
                    );
                }
                self.refresh_overlay(scene);
            }
            ToolMode::Marquee => {
                let current = self.selection.clone();
                let next = match self.to_reference(scene, event.position) {
                    Some(point) => self.marquee.finish(&*scene, point, self.reference, &current),
                    None => {
                        self.marquee.cancel();
                        current
                    }
                };
                self.set_selection(scene, next);
            }
            ToolMode::CornerRadius => {
                self.corner_radius.end(scene);
                self.refresh_overlay(scene);
            }
        }

        self.mode = ToolMode::Idle;
        self.guides.clear();
    }

    /// Abandons the active interaction (Escape), restoring objects.
    pub fn cancel(&mut self, scene: &mut S) {
        match self.mode {
            ToolMode::Idle => return,
            ToolMode::Scale | ToolMode::Rotate => {
                if let Some(gesture) = self.controller.cancel(scene) {
                    self.emit(AppEvent::Transform(TransformEvent::Cancelled { gesture }));
                }
                self.rotation_base = None;
            }
            ToolMode::Drag => {
                if let Some(drag) = self.drag.take() {
                    for id in &self.selection {
                        translate_across_frames(scene, *id, -drag.applied.x, -drag.applied.y, self.reference);
                    }
                    if drag.announced {
                        self.emit(AppEvent::Transform(TransformEvent::Cancelled {
                            gesture: GestureKind::Move,
                        }));
                    }
                }
            }
            ToolMode::Marquee => self.marquee.cancel(),
            ToolMode::CornerRadius => self.corner_radius.cancel(scene),
        }
        tracing::debug!("Cancelled {:?}", self.mode);
        self.mode = ToolMode::Idle;
        self.guides.clear();
        self.refresh_overlay(scene);
    }

    /// Starts a corner-radius drag on a rounded shape.
    pub fn begin_corner_radius(&mut self, scene: &S, id: NodeId, pointer: Point) -> bool {
        if self.mode != ToolMode::Idle {
            return false;
        }
        match self.corner_radius.begin(scene, id, pointer) {
            Ok(()) => {
                self.mode = ToolMode::CornerRadius;
                true
            }
            Err(e) => {
                tracing::debug!("No corner radius drag: {}", e);
                false
            }
        }
    }

    // Edit commands

    pub fn copy(&mut self, scene: &S) {
        self.clipboard = self
            .selection
            .iter()
            .filter_map(|id| match scene.snapshot(*id) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::debug!("Not copying {}: {}", id, e);
                    None
                }
            })
            .collect();
        self.paste_count = 0;
        tracing::debug!("Copied {} object(s)", self.clipboard.len());
    }

    pub fn cut(&mut self, scene: &mut S) {
        self.copy(scene);
        self.delete_selected(scene);
    }

    /// Pastes the clipboard, each successive paste offset a bit further,
    /// and selects the copies.
    pub fn paste(&mut self, scene: &mut S) -> Vec<NodeId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        self.paste_count += 1;
        let offset = self.config.clipboard.paste_offset * f64::from(self.paste_count);

        let mut pasted = Vec::with_capacity(self.clipboard.len());
        for snapshot in &self.clipboard {
            match scene.instantiate(self.reference, snapshot) {
                Ok(id) => {
                    translate_across_frames(scene, id, offset, offset, self.reference);
                    pasted.push(id);
                }
                Err(e) => tracing::warn!("Could not paste into {}: {}", self.reference, e),
            }
        }
        self.set_selection(scene, pasted.clone());
        pasted
    }

    pub fn delete_selected(&mut self, scene: &mut S) {
        for id in &self.selection {
            if let Err(e) = scene.remove(*id) {
                tracing::debug!("Could not remove {}: {}", id, e);
            }
        }
        self.set_selection(scene, Vec::new());
    }

    /// Groups the selection (two or more objects) and selects the group.
    pub fn group_selection(&mut self, scene: &mut S) -> Option<NodeId> {
        if self.selection.len() < 2 {
            return None;
        }
        match scene.group(&self.selection) {
            Ok(group) => {
                self.set_selection(scene, vec![group]);
                Some(group)
            }
            Err(e) => {
                tracing::warn!("Could not group selection: {}", e);
                None
            }
        }
    }

    /// Dissolves every selected group and selects the former members.
    pub fn ungroup_selection(&mut self, scene: &mut S) -> Vec<NodeId> {
        let mut next = Vec::new();
        for id in self.selection.clone() {
            if scene.kind(id) != Some(drawkit_core::ShapeKind::Group) {
                next.push(id);
                continue;
            }
            match scene.ungroup(id) {
                Ok(children) => next.extend(children),
                Err(e) => {
                    tracing::warn!("Could not ungroup {}: {}", id, e);
                    next.push(id);
                }
            }
        }
        self.set_selection(scene, next.clone());
        next
    }

    /// Moves the selection in z-order, keeping the members' relative order.
    pub fn reorder(&mut self, scene: &mut S, order: ZOrder) {
        let mut ordered: Vec<(usize, NodeId)> = self
            .selection
            .iter()
            .filter_map(|id| {
                let parent = scene.parent(*id)?;
                let index = scene.children(parent).iter().position(|c| c == id)?;
                Some((index, *id))
            })
            .collect();
        ordered.sort_by_key(|(index, _)| *index);
        if matches!(order, ZOrder::BringForward | ZOrder::SendToBack) {
            ordered.reverse();
        }

        for (_, id) in ordered {
            if let Err(e) = scene.reorder(id, order) {
                tracing::debug!("Could not reorder {}: {}", id, e);
            }
        }
        self.refresh_overlay(scene);
    }

    /// Locks every selected object, or unlocks them all if all are locked.
    pub fn toggle_lock(&mut self, scene: &mut S) {
        let lock = self.selection.iter().any(|id| !scene.flags(*id).locked);
        for id in &self.selection {
            if let Err(e) = scene.set_locked(*id, lock) {
                tracing::debug!("Could not change lock of {}: {}", id, e);
            }
        }
        self.refresh_overlay(scene);
    }

    /// Hides every selected object (deselecting them), or shows them all if
    /// all are hidden.
    pub fn toggle_visibility(&mut self, scene: &mut S) {
        let hide = self.selection.iter().any(|id| scene.flags(*id).visible);
        for id in &self.selection {
            if let Err(e) = scene.set_visible(*id, !hide) {
                tracing::debug!("Could not change visibility of {}: {}", id, e);
            }
        }
        if hide {
            self.set_selection(scene, Vec::new());
        } else {
            self.refresh_overlay(scene);
        }
    }

    /// Mirrors the selection about its frame centre.
    ///
    /// Each object's pivot point is reflected across the centre line, the
    /// matching scale axis is negated and rotation is reversed, which is the
    /// exact mirror image for objects whose parent is not rotated relative
    /// to the reference container.
    pub fn flip(&mut self, scene: &mut S, axis: FlipAxis) {
        let Some(frame) = self.overlay.frame().copied() else {
            return;
        };
        let center = frame.center;
        let before = self.snapshots(scene);
        self.emit(AppEvent::Transform(TransformEvent::Started {
            gesture: GestureKind::Flip,
            before: before.clone(),
        }));

        for snapshot in &before {
            if let Err(e) = self.flip_object(scene, snapshot, center, axis) {
                tracing::debug!("Skipping {} in flip: {}", snapshot.id, e);
            }
        }

        let after = self.snapshots(scene);
        self.emit(AppEvent::Transform(TransformEvent::Finished {
            gesture: GestureKind::Flip,
            before,
            after,
        }));
        self.refresh_overlay(scene);
    }

    fn flip_object(
        &self,
        scene: &mut S,
        snapshot: &TransformSnapshot,
        center: Point,
        axis: FlipAxis,
    ) -> drawkit_core::GeometryResult<()> {
        let mut transform = snapshot.transform;
        let pivot_world = scene.to_global(snapshot.id, transform.pivot)?;
        let pivot_ref = scene.to_local(self.reference, pivot_world)?;
        let mirrored_ref = match axis {
            FlipAxis::Horizontal => Point::new(2.0 * center.x - pivot_ref.x, pivot_ref.y),
            FlipAxis::Vertical => Point::new(pivot_ref.x, 2.0 * center.y - pivot_ref.y),
        };
        let mirrored_world = scene.to_global(self.reference, mirrored_ref)?;

        transform.position = parent_to_local(&*scene, snapshot.id, mirrored_world)?;
        match axis {
            FlipAxis::Horizontal => transform.scale.x = -transform.scale.x,
            FlipAxis::Vertical => transform.scale.y = -transform.scale.y,
        }
        transform.rotation = -transform.rotation;
        scene.set_transform(snapshot.id, transform)?;
        scene.redraw(snapshot.id);
        Ok(())
    }
}
