//! Coordinate-frame helpers shared by the selection components.
//!
//! Selected objects may live at different nesting depths than the
//! reference container the selection frame is drawn in, so every bounds
//! query and delta goes through world space.

use std::f64::consts::PI;

use drawkit_core::{GeometryResult, NodeId, Point, Rect};

use crate::scene::{parent_to_local, SceneGraph};

/// Combined bounds of `objects` expressed in the local space of `reference`.
///
/// Returns [`Rect::ZERO`] when `objects` is empty or no object reports
/// bounds; failures are logged and skipped.
pub fn combined_local_bounds(scene: &dyn SceneGraph, objects: &[NodeId], reference: NodeId) -> Rect {
    try_combined_local_bounds(scene, objects, reference).unwrap_or(Rect::ZERO)
}

/// Like [`combined_local_bounds`] but distinguishes "nothing measurable".
pub fn try_combined_local_bounds(
    scene: &dyn SceneGraph,
    objects: &[NodeId],
    reference: NodeId,
) -> Option<Rect> {
    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    let mut found = false;

    for id in objects {
        match scene.world_bounds(*id) {
            Ok(bounds) => {
                min.x = min.x.min(bounds.left());
                min.y = min.y.min(bounds.top());
                max.x = max.x.max(bounds.right());
                max.y = max.y.max(bounds.bottom());
                found = true;
            }
            Err(e) => tracing::debug!("Skipping {} in combined bounds: {}", id, e),
        }
    }

    if !found {
        return None;
    }

    let local_min = scene.to_local(reference, min);
    let local_max = scene.to_local(reference, max);
    match (local_min, local_max) {
        (Ok(a), Ok(b)) => Some(Rect::from_points(a, b)),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!("Reference frame {} cannot map bounds: {}", reference, e);
            None
        }
    }
}

/// Bounds of a world-space rectangle in the local space of `reference`.
pub fn world_rect_to_local(
    scene: &dyn SceneGraph,
    reference: NodeId,
    rect: &Rect,
) -> GeometryResult<Rect> {
    let corners = rect
        .corners()
        .iter()
        .map(|c| scene.to_local(reference, *c))
        .collect::<GeometryResult<Vec<_>>>()?;
    Ok(Rect::bounding(corners).unwrap_or(Rect::ZERO))
}

/// Bounds of an object in the local space of `reference`.
pub fn object_bounds_in(scene: &dyn SceneGraph, id: NodeId, reference: NodeId) -> GeometryResult<Rect> {
    let world = scene.world_bounds(id)?;
    world_rect_to_local(scene, reference, &world)
}

/// Moves an object by a delta expressed in the reference frame.
///
/// The delta is carried through world space into the object's parent
/// space, so objects nested under scaled or rotated containers travel the
/// same visual distance as the frame. No-op for a zero delta or an
/// object without a parent.
pub fn translate_across_frames(
    scene: &mut dyn SceneGraph,
    id: NodeId,
    dx: f64,
    dy: f64,
    reference: NodeId,
) {
    if dx == 0.0 && dy == 0.0 {
        return;
    }
    if scene.parent(id).is_none() {
        tracing::debug!("{} has no parent, not translating", id);
        return;
    }

    if let Err(e) = try_translate(scene, id, dx, dy, reference) {
        tracing::debug!("Skipping translation of {}: {}", id, e);
    }
}

fn try_translate(
    scene: &mut dyn SceneGraph,
    id: NodeId,
    dx: f64,
    dy: f64,
    reference: NodeId,
) -> GeometryResult<()> {
    let origin = scene.to_global(reference, Point::ORIGIN)?;
    let target = scene.to_global(reference, Point::new(dx, dy))?;
    let local_origin = parent_to_local(&*scene, id, origin)?;
    let local_target = parent_to_local(&*scene, id, target)?;

    let mut transform = scene.transform(id)?;
    transform.position = transform.position + (local_target - local_origin);
    scene.set_transform(id, transform)
}

/// Wraps an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use drawkit_core::{NodeTransform, ShapeKind};

    #[test]
    fn test_combined_bounds_of_two_objects() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add_object(root, ShapeKind::Shape, Rect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
        let b = scene.add_object(root, ShapeKind::Shape, Rect::new(100.0, 0.0, 50.0, 50.0)).unwrap();

        let bounds = combined_local_bounds(&scene, &[a, b], root);
        assert_eq!(bounds, Rect::new(0.0, 0.0, 150.0, 50.0));
    }

    #[test]
    fn test_combined_bounds_empty_and_missing() {
        let scene = Scene::new();
        assert_eq!(combined_local_bounds(&scene, &[], scene.root()), Rect::ZERO);
        assert_eq!(
            combined_local_bounds(&scene, &[NodeId(42)], scene.root()),
            Rect::ZERO
        );
    }

    #[test]
    fn test_translate_through_scaled_parent() {
        let mut scene = Scene::new();
        let root = scene.root();
        let layer = scene
            .add_layer(
                root,
                NodeTransform {
                    scale: Point::new(2.0, 2.0),
                    ..NodeTransform::default()
                },
            )
            .unwrap();
        let id = scene.add_object(layer, ShapeKind::Shape, Rect::new(10.0, 10.0, 5.0, 5.0)).unwrap();

        translate_across_frames(&mut scene, id, 20.0, 0.0, root);

        // 20 world units inside a 2x layer is 10 local units.
        assert_eq!(scene.transform(id).unwrap().position, Point::new(20.0, 10.0));
        assert_eq!(scene.world_bounds(id).unwrap().left(), 40.0);
    }

    #[test]
    fn test_translate_zero_is_noop() {
        let mut scene = Scene::new();
        let root = scene.root();
        let id = scene
            .add_object(root, ShapeKind::Shape, Rect::new(1.0, 2.0, 3.0, 4.0))
            .unwrap();
        translate_across_frames(&mut scene, id, 0.0, 0.0, root);
        assert_eq!(scene.transform(id).unwrap().position, Point::new(1.0, 2.0));
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
        assert_eq!(normalize_angle(0.5), 0.5);
    }
}
