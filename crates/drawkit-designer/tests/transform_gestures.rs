//! Integration tests for scale and rotate gestures

use drawkit_core::{GestureKind, NodeId, NodeTransform, Point, Rect, ShapeKind};
use drawkit_designer::{
    HandlePosition, Modifiers, ObjectTransformState, PivotPolicy, Scene, SceneGraph,
    SelectionOverlay, TransformController, TransformKind,
};
use drawkit_settings::{HandleSettings, TransformSettings};
use proptest::prelude::*;

struct Fixture {
    scene: Scene,
    objects: Vec<NodeId>,
    overlay: SelectionOverlay,
    controller: TransformController,
}

impl Fixture {
    fn new(rects: &[Rect]) -> Self {
        let mut scene = Scene::new();
        let root = scene.root();
        let objects = rects
            .iter()
            .map(|r| scene.add_object(root, ShapeKind::Shape, *r).unwrap())
            .collect::<Vec<_>>();
        let mut overlay = SelectionOverlay::new(HandleSettings::default());
        overlay.refresh(&scene, &objects, root);
        Self {
            scene,
            objects,
            overlay,
            controller: TransformController::new(TransformSettings::default()),
        }
    }

    fn begin(&mut self, kind: TransformKind, pointer: Point, modifiers: Modifiers) -> bool {
        let frame = *self.overlay.frame().unwrap();
        let handles = self.overlay.handles().to_vec();
        let root = self.scene.root();
        self.controller.begin(
            &mut self.scene,
            &self.objects,
            &frame,
            &handles,
            kind,
            pointer,
            modifiers,
            root,
        )
    }

    fn update(&mut self, pointer: Point, modifiers: Modifiers) {
        self.controller.update(&mut self.scene, pointer, modifiers);
    }

    fn bounds(&self) -> Rect {
        drawkit_designer::combined_local_bounds(&self.scene, &self.objects, self.scene.root())
    }
}

#[test]
fn test_center_anchor_keeps_center_fixed() {
    let mut f = Fixture::new(&[Rect::new(0.0, 0.0, 100.0, 50.0)]);
    assert!(f.begin(
        TransformKind::Scale(HandlePosition::BottomRight),
        Point::new(100.0, 50.0),
        Modifiers::alt(),
    ));
    f.update(Point::new(150.0, 75.0), Modifiers::alt());

    let bounds = f.bounds();
    assert!(bounds.center().approx_eq(&Point::new(50.0, 25.0), 1e-9));
    assert!((bounds.width - 200.0).abs() < 1e-9);
    assert!((bounds.height - 100.0).abs() < 1e-9);
}

#[test]
fn test_toggling_center_anchor_mid_drag() {
    let mut f = Fixture::new(&[Rect::new(0.0, 0.0, 100.0, 50.0)]);
    f.begin(
        TransformKind::Scale(HandlePosition::BottomRight),
        Point::new(100.0, 50.0),
        Modifiers::NONE,
    );
    f.update(Point::new(150.0, 75.0), Modifiers::NONE);
    assert!(f.bounds().approx_eq(&Rect::new(0.0, 0.0, 150.0, 75.0), 1e-9));

    // Holding alt re-anchors at the centre and rescales from the start state.
    f.update(Point::new(150.0, 75.0), Modifiers::alt());
    assert!(f.bounds().center().approx_eq(&Point::new(50.0, 25.0), 1e-9));

    // Releasing it goes back to the opposite corner.
    f.update(Point::new(150.0, 75.0), Modifiers::NONE);
    assert!(f.bounds().approx_eq(&Rect::new(0.0, 0.0, 150.0, 75.0), 1e-9));
}

#[test]
fn test_aspect_lock_on_corner() {
    let mut f = Fixture::new(&[Rect::new(0.0, 0.0, 100.0, 50.0)]);
    f.begin(
        TransformKind::Scale(HandlePosition::BottomRight),
        Point::new(100.0, 50.0),
        Modifiers::NONE,
    );
    f.update(Point::new(300.0, 60.0), Modifiers::shift());
    assert_eq!(f.controller.scale_factors(), (3.0, 3.0));
    assert!(f.bounds().approx_eq(&Rect::new(0.0, 0.0, 300.0, 150.0), 1e-9));
}

#[test]
fn test_multi_object_scale_from_top_left() {
    let mut f = Fixture::new(&[
        Rect::new(0.0, 0.0, 50.0, 50.0),
        Rect::new(100.0, 0.0, 50.0, 50.0),
    ]);
    f.begin(
        TransformKind::Scale(HandlePosition::TopLeft),
        Point::new(0.0, 0.0),
        Modifiers::NONE,
    );
    f.update(Point::new(-150.0, -50.0), Modifiers::NONE);

    // Bottom-right anchor at (150, 50) stays put; the selection doubles.
    assert!(f.bounds().approx_eq(&Rect::new(-150.0, -50.0, 300.0, 100.0), 1e-9));
    let second = f.scene.world_bounds(f.objects[1]).unwrap();
    assert!(second.approx_eq(&Rect::new(50.0, -50.0, 100.0, 100.0), 1e-9));

    let done = f.controller.end(&mut f.scene).unwrap();
    assert_eq!(done.objects, f.objects);
    for id in &f.objects {
        assert_eq!(f.scene.transform(*id).unwrap().pivot, Point::ORIGIN);
    }
    assert!(f.bounds().approx_eq(&Rect::new(-150.0, -50.0, 300.0, 100.0), 1e-9));
}

fn rotate_by_degrees(degrees: f64, modifiers: Modifiers) -> f64 {
    let mut f = Fixture::new(&[Rect::new(0.0, 0.0, 100.0, 50.0)]);
    let center = Point::new(50.0, 25.0);
    f.begin(TransformKind::Rotate, center + Point::new(100.0, 0.0), Modifiers::NONE);
    let angle = degrees.to_radians();
    f.update(center + Point::new(100.0 * angle.cos(), 100.0 * angle.sin()), modifiers);
    f.controller.end(&mut f.scene);
    f.scene.transform(f.objects[0]).unwrap().rotation
}

#[test]
fn test_rotation_follows_pointer() {
    let rotation = rotate_by_degrees(40.0, Modifiers::NONE);
    assert!((rotation - 40.0f64.to_radians()).abs() < 1e-9);
}

#[test]
fn test_rotation_snaps_to_nearest_step() {
    assert!((rotate_by_degrees(40.0, Modifiers::shift()) - 45.0f64.to_radians()).abs() < 1e-12);
    assert!((rotate_by_degrees(38.0, Modifiers::shift()) - 45.0f64.to_radians()).abs() < 1e-12);
    assert!((rotate_by_degrees(23.0, Modifiers::shift()) - 30.0f64.to_radians()).abs() < 1e-12);
    assert!((rotate_by_degrees(-7.0, Modifiers::shift()) - (-0.0f64)).abs() < 1e-12);
}

#[test]
fn test_rotation_keeps_pivot_at_center() {
    let mut f = Fixture::new(&[Rect::new(0.0, 0.0, 100.0, 50.0)]);
    f.begin(TransformKind::Rotate, Point::new(150.0, 25.0), Modifiers::NONE);
    f.update(Point::new(50.0, 125.0), Modifiers::NONE);
    let done = f.controller.end(&mut f.scene).unwrap();
    assert_eq!(done.gesture, GestureKind::Rotate);

    let t = f.scene.transform(f.objects[0]).unwrap();
    assert!(t.pivot.approx_eq(&Point::new(50.0, 25.0), 1e-9));
    assert!(t.position.approx_eq(&Point::new(50.0, 25.0), 1e-9));
    // A quarter turn about the centre swaps width and height.
    assert!(f.bounds().approx_eq(&Rect::new(25.0, -25.0, 50.0, 100.0), 1e-9));
}

#[test]
fn test_multi_object_rotate_spins_each_about_itself() {
    let mut f = Fixture::new(&[
        Rect::new(0.0, 0.0, 20.0, 20.0),
        Rect::new(100.0, 0.0, 20.0, 20.0),
    ]);
    f.begin(TransformKind::Rotate, Point::new(200.0, 10.0), Modifiers::NONE);
    f.update(Point::new(60.0, 150.0), Modifiers::NONE);
    f.controller.end(&mut f.scene);

    let second = f.scene.world_bounds(f.objects[1]).unwrap();
    assert!(second.center().approx_eq(&Point::new(110.0, 10.0), 1e-9));
}

#[test]
fn test_rotated_frame_scale_uses_frame_axes() {
    let mut scene = Scene::new();
    let root = scene.root();
    let id = scene
        .add_node(
            root,
            ShapeKind::Shape,
            Rect::new(0.0, 0.0, 100.0, 20.0),
            NodeTransform {
                position: Point::new(10.0, 10.0),
                rotation: 0.6,
                ..NodeTransform::default()
            },
        )
        .unwrap();
    let mut overlay = SelectionOverlay::new(HandleSettings::default());
    overlay.refresh(&scene, &[id], root);
    let frame = *overlay.frame().unwrap();
    let handles = overlay.handles().to_vec();

    let mut controller = TransformController::new(TransformSettings::default());
    let start = frame.handle_point(HandlePosition::Right);
    controller.begin(
        &mut scene,
        &[id],
        &frame,
        &handles,
        TransformKind::Scale(HandlePosition::Right),
        start,
        Modifiers::NONE,
        root,
    );
    // Drag the right edge outwards along the rotated X axis.
    let (u, _) = frame.axes();
    controller.update(&mut scene, start + u * 50.0, Modifiers::NONE);
    assert!((controller.scale_factors().0 - 1.5).abs() < 1e-9);
    controller.end(&mut scene);

    let t = scene.transform(id).unwrap();
    assert!((t.scale.x - 1.5).abs() < 1e-9);
    assert!((t.scale.y - 1.0).abs() < 1e-9);
    // The left edge (the anchor) did not move.
    assert!(t.position.approx_eq(&Point::new(10.0, 10.0), 1e-9));
}

proptest! {
    #[test]
    fn prop_begin_keeps_pivot_on_screen(
        x in -200.0f64..200.0,
        y in -200.0f64..200.0,
        w in 1.0f64..300.0,
        h in 1.0f64..300.0,
        rotation in -3.0f64..3.0,
        sx in 0.2f64..4.0,
        sy in -4.0f64..-0.2,
        ax in -500.0f64..500.0,
        ay in -500.0f64..500.0,
    ) {
        let mut scene = Scene::new();
        let root = scene.root();
        let layer = scene
            .add_layer(root, NodeTransform { position: Point::new(30.0, -20.0), rotation: 0.4, scale: Point::new(1.5, 1.5), ..NodeTransform::default() })
            .unwrap();
        let id = scene
            .add_node(
                layer,
                ShapeKind::Shape,
                Rect::new(0.0, 0.0, w, h),
                NodeTransform {
                    position: Point::new(x, y),
                    scale: Point::new(sx, sy),
                    rotation,
                    pivot: Point::new(w / 3.0, h / 4.0),
                },
            )
            .unwrap();

        let before = scene.transform(id).unwrap();
        let pivot_world = scene.to_global(id, before.pivot).unwrap();
        let corner_world = scene.to_global(id, Point::new(w, h)).unwrap();

        let anchor = Point::new(ax, ay);
        let state = ObjectTransformState::begin_transform(&mut scene, id, anchor).unwrap();

        // Nothing moved on screen.
        prop_assert!(scene.to_global(id, before.pivot).unwrap().approx_eq(&pivot_world, 1e-6));
        prop_assert!(scene.to_global(id, Point::new(w, h)).unwrap().approx_eq(&corner_world, 1e-6));
        // The new pivot sits on the anchor.
        let after = scene.transform(id).unwrap();
        prop_assert!(scene.to_global(id, after.pivot).unwrap().approx_eq(&anchor, 1e-6));

        state.end_transform(&mut scene, PivotPolicy::Restore).unwrap();
        let restored = scene.transform(id).unwrap();
        prop_assert!(restored.pivot.approx_eq(&before.pivot, 1e-12));
        prop_assert!(restored.position.approx_eq(&before.position, 1e-6));
    }

    #[test]
    fn prop_scale_keeps_anchor_fixed(
        w in 10.0f64..300.0,
        h in 10.0f64..300.0,
        px in -400.0f64..400.0,
        py in -400.0f64..400.0,
        handle in 0usize..8,
    ) {
        let mut f = Fixture::new(&[Rect::new(20.0, 30.0, w, h)]);
        let position = HandlePosition::ALL[handle];
        let frame = *f.overlay.frame().unwrap();
        let anchor = frame.handle_point(position.opposite());

        f.begin(TransformKind::Scale(position), frame.handle_point(position), Modifiers::NONE);
        f.update(Point::new(px, py), Modifiers::NONE);

        let id = f.objects[0];
        let t = f.scene.transform(id).unwrap();
        prop_assert!(f.scene.to_global(id, t.pivot).unwrap().approx_eq(&anchor, 1e-6));

        f.controller.end(&mut f.scene);
        let b = f.scene.world_bounds(id).unwrap();
        let corners = [
            Point::new(b.left(), b.top()),
            Point::new(b.right(), b.top()),
            Point::new(b.right(), b.bottom()),
            Point::new(b.left(), b.bottom()),
            Point::new(b.center_x(), b.top()),
            Point::new(b.right(), b.center_y()),
            Point::new(b.center_x(), b.bottom()),
            Point::new(b.left(), b.center_y()),
        ];
        // The anchor is still one of the frame's handle points, or the frame
        // has been mirrored across it.
        prop_assert!(corners.iter().any(|c| c.approx_eq(&anchor, 1e-6)));
    }
}
