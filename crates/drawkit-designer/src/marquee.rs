//! Rubber-band selection.
//!
//! Points are in the local space of the container being selected from.
//! An object is picked when its bounds overlap the marquee with positive
//! area; touching edges do not count.

use drawkit_core::{NodeId, Point, Rect};

use crate::geometry::object_bounds_in;
use crate::hit_test::selectable_nodes;
use crate::scene::SceneGraph;

#[derive(Debug, Clone, Default)]
pub struct MarqueeSelector {
    anchor: Option<Point>,
    additive: bool,
    rect: Option<Rect>,
}

impl MarqueeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a marquee at `point`; `additive` keeps the current selection.
    pub fn start(&mut self, point: Point, additive: bool) {
        tracing::debug!("Marquee started at ({:.1}, {:.1})", point.x, point.y);
        self.anchor = Some(point);
        self.additive = additive;
        self.rect = Some(Rect::from_points(point, point));
    }

    /// Stretches the marquee to `point` and returns the normalized rectangle.
    pub fn update(&mut self, point: Point) -> Option<Rect> {
        let anchor = self.anchor?;
        let rect = Rect::from_points(anchor, point);
        self.rect = Some(rect);
        Some(rect)
    }

    /// Completes the gesture and returns the resulting selection.
    ///
    /// Without the additive flag the result replaces `current`; with it the
    /// hits are appended to `current` in draw order.
    pub fn finish(
        &mut self,
        scene: &dyn SceneGraph,
        point: Point,
        container: NodeId,
        current: &[NodeId],
    ) -> Vec<NodeId> {
        let Some(rect) = self.update(point) else {
            return current.to_vec();
        };
        let additive = self.additive;
        self.cancel();

        let hits = objects_in_rect(scene, &rect, container);
        tracing::debug!("Marquee finished with {} hit(s)", hits.len());

        if additive {
            let mut selection = current.to_vec();
            for id in hits {
                if !selection.contains(&id) {
                    selection.push(id);
                }
            }
            selection
        } else {
            hits
        }
    }

    pub fn cancel(&mut self) {
        self.anchor = None;
        self.rect = None;
        self.additive = false;
    }

    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    /// Current marquee rectangle, for drawing.
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }
}

/// Selectable objects under `container` whose bounds overlap `rect`.
///
/// A marquee with no width or no height covers no area and picks nothing.
pub fn objects_in_rect(scene: &dyn SceneGraph, rect: &Rect, container: NodeId) -> Vec<NodeId> {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return Vec::new();
    }
    selectable_nodes(scene, container)
        .into_iter()
        .filter(|id| match object_bounds_in(scene, *id, container) {
            Ok(bounds) => bounds.intersects(rect),
            Err(e) => {
                tracing::debug!("Skipping {} in marquee: {}", id, e);
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use drawkit_core::ShapeKind;

    #[test]
    fn test_update_normalizes() {
        let mut marquee = MarqueeSelector::new();
        assert_eq!(marquee.update(Point::new(1.0, 1.0)), None);

        marquee.start(Point::new(50.0, 40.0), false);
        let rect = marquee.update(Point::new(10.0, 0.0)).unwrap();
        assert_eq!(rect, Rect::new(10.0, 0.0, 40.0, 40.0));
        assert!(marquee.is_active());
    }

    #[test]
    fn test_additive_finish_keeps_selection() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add_object(root, ShapeKind::Shape, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = scene.add_object(root, ShapeKind::Shape, Rect::new(100.0, 0.0, 10.0, 10.0)).unwrap();

        let mut marquee = MarqueeSelector::new();
        marquee.start(Point::new(90.0, -5.0), true);
        let selection = marquee.finish(&scene, Point::new(120.0, 20.0), root, &[a]);
        assert_eq!(selection, vec![a, b]);
        assert!(!marquee.is_active());

        marquee.start(Point::new(90.0, -5.0), false);
        let selection = marquee.finish(&scene, Point::new(120.0, 20.0), root, &[a]);
        assert_eq!(selection, vec![b]);
    }

    #[test]
    fn test_empty_click_clears() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add_object(root, ShapeKind::Shape, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();

        let mut marquee = MarqueeSelector::new();
        marquee.start(Point::new(50.0, 50.0), false);
        assert!(marquee.finish(&scene, Point::new(50.0, 50.0), root, &[a]).is_empty());
    }

    #[test]
    fn test_degenerate_marquee_picks_nothing() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add_object(root, ShapeKind::Shape, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();

        assert!(objects_in_rect(&scene, &Rect::new(-5.0, 5.0, 20.0, 0.0), root).is_empty());
        assert!(objects_in_rect(&scene, &Rect::new(5.0, -5.0, 0.0, 20.0), root).is_empty());
        assert_eq!(objects_in_rect(&scene, &Rect::new(-5.0, 5.0, 20.0, 1.0), root), vec![a]);

        let mut marquee = MarqueeSelector::new();
        marquee.start(Point::new(-5.0, 5.0), false);
        assert!(marquee.finish(&scene, Point::new(15.0, 5.0), root, &[]).is_empty());
    }
}
