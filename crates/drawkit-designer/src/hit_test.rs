//! Pointer hit-testing and click resolution.
//!
//! A click is resolved against the stack of every pickable object under
//! the pointer, ordered front-to-back. Repeated clicks at the same spot
//! (or clicks with a cycling modifier) walk down that stack so objects
//! hidden behind others stay reachable.

use drawkit_core::{NodeId, Point};
use drawkit_settings::ClickSettings;

use crate::input::Modifiers;
use crate::scene::SceneGraph;

/// Objects under `point`, topmost first.
///
/// Hidden or locked nodes are skipped with their subtrees. Pickable nodes
/// are tested against their world bounds (grown by `tolerance`) and are not
/// descended into. Non-selectable containers are searched unless they are
/// opaque.
pub fn hit_stack(scene: &dyn SceneGraph, point: Point, root: NodeId, tolerance: f64) -> Vec<NodeId> {
    let mut hits = Vec::new();
    collect_hits(scene, root, point, tolerance, &mut hits);
    hits
}

fn collect_hits(
    scene: &dyn SceneGraph,
    node: NodeId,
    point: Point,
    tolerance: f64,
    hits: &mut Vec<NodeId>,
) {
    for child in scene.children(node).into_iter().rev() {
        let flags = scene.flags(child);
        if !flags.visible || flags.locked {
            continue;
        }
        if flags.selectable {
            match scene.world_bounds(child) {
                Ok(bounds) if bounds.inflate(tolerance).contains_point(&point) => hits.push(child),
                Ok(_) => {}
                Err(e) => tracing::debug!("Skipping {} in hit test: {}", child, e),
            }
        } else if !flags.opaque {
            collect_hits(scene, child, point, tolerance, hits);
        }
    }
}

/// Every pickable object below `container`, back-to-front.
///
/// Uses the same traversal rules as [`hit_stack`].
pub fn selectable_nodes(scene: &dyn SceneGraph, container: NodeId) -> Vec<NodeId> {
    let mut found = Vec::new();
    collect_selectable(scene, container, &mut found);
    found
}

fn collect_selectable(scene: &dyn SceneGraph, node: NodeId, found: &mut Vec<NodeId>) {
    for child in scene.children(node) {
        let flags = scene.flags(child);
        if flags.is_pickable() {
            found.push(child);
        } else if flags.is_searchable_container() {
            collect_selectable(scene, child, found);
        }
    }
}

/// Outcome of a resolved click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickResult {
    /// Object picked by the click, if any.
    pub target: Option<NodeId>,
    /// Second click on the same object within the double-click interval.
    pub is_double_click: bool,
    /// Double click on a text object; hand off to the text editor.
    pub is_text_double_click: bool,
    /// The target came from walking the previous hit stack.
    pub cycled: bool,
}

/// How a click changes the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAction {
    Replace(NodeId),
    Add(NodeId),
    Remove(NodeId),
    Clear,
}

impl SelectionAction {
    /// Applies the action to a selection list, preserving order.
    pub fn apply(&self, selection: &mut Vec<NodeId>) {
        match *self {
            SelectionAction::Replace(id) => {
                selection.clear();
                selection.push(id);
            }
            SelectionAction::Add(id) => {
                if !selection.contains(&id) {
                    selection.push(id);
                }
            }
            SelectionAction::Remove(id) => selection.retain(|s| *s != id),
            SelectionAction::Clear => selection.clear(),
        }
    }
}

/// Decides how a click on `clicked` changes `current`.
pub fn selection_action(clicked: Option<NodeId>, current: &[NodeId], shift: bool) -> SelectionAction {
    let Some(id) = clicked else {
        return SelectionAction::Clear;
    };

    if shift {
        if current.contains(&id) {
            SelectionAction::Remove(id)
        } else {
            SelectionAction::Add(id)
        }
    } else if current == [id] {
        SelectionAction::Remove(id)
    } else {
        SelectionAction::Replace(id)
    }
}

/// Tracks click history for stack cycling and double-click detection.
#[derive(Debug, Clone)]
pub struct ClickResolver {
    settings: ClickSettings,
    last_click_ms: Option<u64>,
    last_object: Option<NodeId>,
    last_point: Option<Point>,
    stack: Vec<NodeId>,
    cursor: usize,
}

impl ClickResolver {
    pub fn new(settings: ClickSettings) -> Self {
        Self {
            settings,
            last_click_ms: None,
            last_object: None,
            last_point: None,
            stack: Vec::new(),
            cursor: 0,
        }
    }

    /// Resolves a pointer-down at `point` (world space).
    pub fn resolve(
        &mut self,
        scene: &dyn SceneGraph,
        point: Point,
        root: NodeId,
        timestamp_ms: u64,
        modifiers: Modifiers,
    ) -> ClickResult {
        let elapsed = self
            .last_click_ms
            .map(|last| timestamp_ms.saturating_sub(last));
        let same_spot = match (self.last_point, elapsed) {
            (Some(last), Some(dt)) => {
                last.distance_to(&point) <= self.settings.cycle_tolerance
                    && dt <= self.settings.cycle_window_ms
            }
            _ => false,
        };

        // Cycling only walks the stored stack while the pointer is still
        // over exactly the same objects.
        let fresh = hit_stack(scene, point, root, self.settings.hit_tolerance);
        let cycled = (modifiers.cycle_stack() || same_spot)
            && !fresh.is_empty()
            && fresh == self.stack;

        let target = if cycled {
            self.cursor = (self.cursor + 1) % self.stack.len();
            Some(self.stack[self.cursor])
        } else {
            self.stack = fresh;
            self.cursor = 0;
            self.stack.first().copied()
        };

        let is_double_click = target.is_some()
            && target == self.last_object
            && elapsed.is_some_and(|dt| dt <= self.settings.double_click_ms);
        let is_text_double_click = is_double_click
            && target
                .and_then(|id| scene.kind(id))
                .is_some_and(|kind| kind.is_text());

        if is_double_click {
            tracing::debug!("Double click on {:?}", target);
            // A third click starts a new sequence.
            self.last_click_ms = None;
        } else {
            self.last_click_ms = Some(timestamp_ms);
        }
        self.last_object = target;
        self.last_point = Some(point);

        ClickResult {
            target,
            is_double_click,
            is_text_double_click,
            cycled,
        }
    }

    /// Forgets the click history.
    pub fn reset(&mut self) {
        self.last_click_ms = None;
        self.last_object = None;
        self.last_point = None;
        self.stack.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeFlags, Scene};
    use drawkit_core::{Rect, ShapeKind};

    fn stacked_scene() -> (Scene, NodeId, NodeId, NodeId) {
        let mut scene = Scene::new();
        let root = scene.root();
        let back = scene.add_object(root, ShapeKind::Shape, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let middle = scene.add_object(root, ShapeKind::Text, Rect::new(10.0, 10.0, 50.0, 50.0)).unwrap();
        let front = scene.add_object(root, ShapeKind::Pen, Rect::new(20.0, 20.0, 30.0, 30.0)).unwrap();
        (scene, back, middle, front)
    }

    #[test]
    fn test_hit_stack_is_front_to_back() {
        let (scene, back, middle, front) = stacked_scene();
        let stack = hit_stack(&scene, Point::new(25.0, 25.0), scene.root(), 0.0);
        assert_eq!(stack, vec![front, middle, back]);
    }

    #[test]
    fn test_hit_stack_skips_locked_and_overlays() {
        let (mut scene, back, middle, front) = stacked_scene();
        scene.set_flags(front, NodeFlags { locked: true, ..NodeFlags::OBJECT }).unwrap();
        let root = scene.root();
        let overlay = scene.add_overlay(root, Rect::new(0.0, 0.0, 200.0, 200.0)).unwrap();
        scene.add_object(overlay, ShapeKind::Shape, Rect::new(0.0, 0.0, 200.0, 200.0)).unwrap();

        let stack = hit_stack(&scene, Point::new(25.0, 25.0), root, 0.0);
        assert_eq!(stack, vec![middle, back]);
    }

    #[test]
    fn test_hit_stack_searches_layers() {
        let mut scene = Scene::new();
        let root = scene.root();
        let layer = scene.add_layer(root, Default::default()).unwrap();
        let inner = scene.add_object(layer, ShapeKind::Shape, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(hit_stack(&scene, Point::new(5.0, 5.0), root, 0.0), vec![inner]);
        assert_eq!(selectable_nodes(&scene, root), vec![inner]);
    }

    #[test]
    fn test_repeated_clicks_cycle_the_stack() {
        let (scene, back, middle, front) = stacked_scene();
        let mut resolver = ClickResolver::new(ClickSettings::default());
        let p = Point::new(25.0, 25.0);

        let first = resolver.resolve(&scene, p, scene.root(), 0, Modifiers::NONE);
        assert_eq!(first.target, Some(front));
        assert!(!first.cycled);

        let second = resolver.resolve(&scene, p, scene.root(), 400, Modifiers::NONE);
        assert_eq!(second.target, Some(middle));
        assert!(second.cycled);

        let third = resolver.resolve(&scene, p, scene.root(), 800, Modifiers::NONE);
        assert_eq!(third.target, Some(back));

        let wrapped = resolver.resolve(&scene, p, scene.root(), 1200, Modifiers::NONE);
        assert_eq!(wrapped.target, Some(front));

        // Past the cycle window a fresh stack is computed.
        let fresh = resolver.resolve(&scene, p, scene.root(), 5000, Modifiers::NONE);
        assert_eq!(fresh.target, Some(front));
        assert!(!fresh.cycled);
    }

    #[test]
    fn test_alt_click_elsewhere_picks_object_under_pointer() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add_object(root, ShapeKind::Shape, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = scene.add_object(root, ShapeKind::Shape, Rect::new(500.0, 500.0, 10.0, 10.0)).unwrap();
        let mut resolver = ClickResolver::new(ClickSettings::default());

        let first = resolver.resolve(&scene, Point::new(5.0, 5.0), root, 0, Modifiers::NONE);
        assert_eq!(first.target, Some(a));

        let elsewhere = resolver.resolve(&scene, Point::new(505.0, 505.0), root, 100, Modifiers::alt());
        assert_eq!(elsewhere.target, Some(b));
        assert!(!elsewhere.cycled);

        // Back over the stacked spot, alt walks the stack again.
        let (scene, _, middle, front) = stacked_scene();
        let root = scene.root();
        let mut resolver = ClickResolver::new(ClickSettings::default());
        let p = Point::new(25.0, 25.0);
        assert_eq!(resolver.resolve(&scene, p, root, 0, Modifiers::NONE).target, Some(front));
        let cycled = resolver.resolve(&scene, Point::new(40.0, 40.0), root, 5000, Modifiers::alt());
        assert!(cycled.cycled);
        assert_eq!(cycled.target, Some(middle));
    }

    #[test]
    fn test_double_click_on_text() {
        let mut scene = Scene::new();
        let root = scene.root();
        let text = scene.add_object(root, ShapeKind::Text, Rect::new(0.0, 0.0, 40.0, 20.0)).unwrap();
        let mut resolver = ClickResolver::new(ClickSettings::default());

        let first = resolver.resolve(&scene, Point::new(5.0, 5.0), root, 1000, Modifiers::NONE);
        assert!(!first.is_double_click);

        let second = resolver.resolve(&scene, Point::new(6.0, 5.0), root, 1200, Modifiers::NONE);
        assert_eq!(second.target, Some(text));
        assert!(second.is_double_click);
        assert!(second.is_text_double_click);

        let third = resolver.resolve(&scene, Point::new(6.0, 5.0), root, 1300, Modifiers::NONE);
        assert!(!third.is_double_click);
    }

    #[test]
    fn test_selection_actions() {
        let a = NodeId(1);
        let b = NodeId(2);
        assert_eq!(selection_action(None, &[a], false), SelectionAction::Clear);
        assert_eq!(selection_action(Some(a), &[a], false), SelectionAction::Remove(a));
        assert_eq!(selection_action(Some(a), &[a, b], false), SelectionAction::Replace(a));
        assert_eq!(selection_action(Some(b), &[a], true), SelectionAction::Add(b));
        assert_eq!(selection_action(Some(a), &[a, b], true), SelectionAction::Remove(a));

        let mut selection = vec![a];
        SelectionAction::Add(b).apply(&mut selection);
        assert_eq!(selection, vec![a, b]);
        SelectionAction::Remove(a).apply(&mut selection);
        assert_eq!(selection, vec![b]);
    }
}
