//! Scripted editing session driven through the public selection tool API.
//!
//! Used by the `drawkit` binary to show the engine at work, and by the
//! integration tests as an end-to-end smoke check.

use std::sync::{Arc, Mutex};

use drawkit_core::{AppEvent, EventBus, EventFilter, NodeId, NodeTransform, Point, Rect, ShapeKind};
use drawkit_designer::{FlipAxis, Modifiers, PointerEvent, Scene, SceneGraph, SelectionTool};
use drawkit_settings::Config;

/// What the session did.
#[derive(Debug, Clone)]
pub struct DemoReport {
    /// Every event published on the bus, in order.
    pub events: Vec<AppEvent>,
    /// Selection when the script finished.
    pub selection: Vec<NodeId>,
    /// World bounds of the named objects when the script finished.
    pub bounds: Vec<(&'static str, Rect)>,
}

/// Pointer script with timestamps far enough apart that no two presses
/// count as a double click or a stack cycle.
struct Script {
    clock: u64,
}

impl Script {
    fn new() -> Self {
        Self { clock: 0 }
    }

    fn event(&mut self, p: Point, modifiers: Modifiers) -> PointerEvent {
        self.clock += 1000;
        PointerEvent::new(p.x, p.y, self.clock).with_modifiers(modifiers)
    }

    fn drag(
        &mut self,
        tool: &mut SelectionTool<Scene>,
        scene: &mut Scene,
        from: Point,
        to: Point,
        modifiers: Modifiers,
    ) {
        let down = self.event(from, modifiers);
        tool.pointer_down(scene, down);
        let step = self.event(from.midpoint(&to), modifiers);
        tool.pointer_move(scene, step);
        let last = self.event(to, modifiers);
        tool.pointer_move(scene, last);
        tool.pointer_up(scene, last.released());
    }

    fn click(&mut self, tool: &mut SelectionTool<Scene>, scene: &mut Scene, at: Point) {
        let down = self.event(at, Modifiers::NONE);
        tool.pointer_down(scene, down);
        tool.pointer_up(scene, down.released());
    }
}

/// Runs the scripted session against a fresh scene.
pub fn run(config: Config) -> anyhow::Result<DemoReport> {
    let mut scene = Scene::new();
    let root = scene.root();
    let artwork = scene.add_layer(root, NodeTransform::default())?;

    let card = scene.add_object(artwork, ShapeKind::Shape, Rect::new(0.0, 0.0, 100.0, 50.0))?;
    let badge = scene.add_object(artwork, ShapeKind::Shape, Rect::new(160.0, 0.0, 60.0, 60.0))?;
    let caption = scene.add_object(artwork, ShapeKind::Text, Rect::new(0.0, 120.0, 120.0, 30.0))?;
    let stroke = scene.add_object(artwork, ShapeKind::Pen, Rect::new(240.0, 120.0, 40.0, 40.0))?;

    let bus = Arc::new(EventBus::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    bus.subscribe(EventFilter::All, move |event| {
        tracing::info!("{}", event.description());
        if let Ok(mut events) = sink.lock() {
            events.push(event);
        }
    });

    let mut tool: SelectionTool<Scene> = SelectionTool::new(config, artwork, bus);
    let mut script = Script::new();

    // Drag the card right until it snaps against the badge.
    script.drag(&mut tool, &mut scene, Point::new(50.0, 25.0), Point::new(107.0, 25.0), Modifiers::NONE);

    // Grow it from its bottom-right corner with the aspect ratio locked.
    let corner = tool
        .frame()
        .map(|f| f.corners().br)
        .ok_or_else(|| anyhow::anyhow!("card is not selected"))?;
    script.drag(
        &mut tool,
        &mut scene,
        corner,
        corner + Point::new(50.0, 25.0),
        Modifiers::shift(),
    );

    // Rotate the caption by its top-right hotspot, snapping to the step.
    script.click(&mut tool, &mut scene, Point::new(60.0, 135.0));
    let frame = tool
        .frame()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("caption is not selected"))?;
    let hotspot = frame.corners().tr + Point::new(10.0, -10.0);
    let target = hotspot.rotate_about(frame.center, 32f64.to_radians());
    script.drag(&mut tool, &mut scene, hotspot, target, Modifiers::shift());

    // Marquee everything, group it, then paste a mirrored copy.
    script.drag(
        &mut tool,
        &mut scene,
        Point::new(-20.0, -20.0),
        Point::new(400.0, 300.0),
        Modifiers::NONE,
    );
    if let Some(group) = tool.group_selection(&mut scene) {
        tracing::info!("Grouped selection as {}", group);
    }
    tool.copy(&scene);
    let pasted = tool.paste(&mut scene);
    tool.flip(&mut scene, FlipAxis::Horizontal);
    tracing::info!("Pasted {} mirrored object(s)", pasted.len());

    let bounds = [
        ("card", card),
        ("badge", badge),
        ("caption", caption),
        ("stroke", stroke),
    ]
    .into_iter()
    .map(|(name, id)| Ok((name, scene.world_bounds(id)?)))
    .collect::<anyhow::Result<Vec<_>>>()?;

    let events = events
        .lock()
        .map(|events| events.clone())
        .map_err(|_| anyhow::anyhow!("event log poisoned"))?;

    Ok(DemoReport {
        events,
        selection: tool.selection().to_vec(),
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawkit_core::{GestureKind, TransformEvent};

    fn gestures(events: &[AppEvent]) -> Vec<GestureKind> {
        events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Transform(TransformEvent::Finished { gesture, .. }) => Some(*gesture),
                _ => None,
            })
            .collect()
    }

    fn card_bounds(report: &DemoReport) -> Rect {
        report
            .bounds
            .iter()
            .find(|(name, _)| *name == "card")
            .map(|(_, bounds)| *bounds)
            .unwrap()
    }

    #[test]
    fn test_session_with_defaults() {
        let report = run(Config::default()).unwrap();

        assert_eq!(
            gestures(&report.events),
            vec![
                GestureKind::Move,
                GestureKind::Scale,
                GestureKind::Rotate,
                GestureKind::Flip
            ]
        );

        // Snapped against the badge, then grown by half from its top-left.
        let card = card_bounds(&report);
        assert!((card.x - 60.0).abs() < 1e-9);
        assert!((card.width - 150.0).abs() < 1e-9);
        assert!((card.height - 75.0).abs() < 1e-9);

        // The pasted group ends up selected.
        assert_eq!(report.selection.len(), 1);
    }

    #[test]
    fn test_session_with_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut config = Config::default();
        config.guides.enabled = false;
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        let report = run(loaded).unwrap();

        // Without snapping the card stops where the pointer left it.
        assert!((card_bounds(&report).x - 57.0).abs() < 1e-9);
    }
}
