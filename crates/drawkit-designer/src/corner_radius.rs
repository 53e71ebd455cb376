//! Corner-radius drag for rounded shapes.
//!
//! Dragging inward along the shape's diagonal grows the radius. Updates are
//! throttled to the configured rate; the last throttled value is applied
//! when the drag ends. Redrawing a shape must not move it, so the drag
//! never touches the object's transform.

use drawkit_core::{GeometryError, GeometryResult, NodeId, Point};
use drawkit_settings::CornerRadiusSettings;

use crate::scene::SceneEditor;

#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    id: NodeId,
    start_radius: f64,
    start_local: Point,
    max_radius: f64,
    last_update_ms: Option<u64>,
    pending: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CornerRadiusDrag {
    min_interval_ms: u64,
    active: Option<ActiveDrag>,
}

impl CornerRadiusDrag {
    pub fn new(settings: &CornerRadiusSettings) -> Self {
        Self {
            min_interval_ms: settings.min_interval_ms(),
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn target(&self) -> Option<NodeId> {
        self.active.map(|a| a.id)
    }

    /// Starts dragging the radius of `id` from a world-space pointer.
    pub fn begin<S: SceneEditor + ?Sized>(&mut self, scene: &S, id: NodeId, pointer: Point) -> GeometryResult<()> {
        let start_radius = scene.corner_radius(id).ok_or(GeometryError::Unsupported {
            node: id,
            capability: "corner radius",
        })?;
        let bounds = scene.local_bounds(id)?;
        let start_local = scene.to_local(id, pointer)?;

        self.active = Some(ActiveDrag {
            id,
            start_radius,
            start_local,
            max_radius: bounds.width.min(bounds.height) / 2.0,
            last_update_ms: None,
            pending: None,
        });
        tracing::debug!("Corner radius drag on {} from {:.1}", id, start_radius);
        Ok(())
    }

    /// Follows the pointer; returns the radius applied this tick, if any.
    pub fn update<S: SceneEditor + ?Sized>(&mut self, scene: &mut S, pointer: Point, timestamp_ms: u64) -> Option<f64> {
        let active = self.active.as_mut()?;
        let local = match scene.to_local(active.id, pointer) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!("Corner radius drag lost {}: {}", active.id, e);
                return None;
            }
        };

        // Inward along the top-left diagonal.
        let travel = local - active.start_local;
        let inward = (travel.x + travel.y) / std::f64::consts::SQRT_2;
        let radius = (active.start_radius + inward).clamp(0.0, active.max_radius.max(0.0));

        let due = active
            .last_update_ms
            .is_none_or(|last| timestamp_ms.saturating_sub(last) >= self.min_interval_ms);
        if !due {
            active.pending = Some(radius);
            return None;
        }

        active.last_update_ms = Some(timestamp_ms);
        active.pending = None;
        apply(scene, active.id, radius).then_some(radius)
    }

    /// Applies any throttled value and finishes the drag.
    pub fn end<S: SceneEditor + ?Sized>(&mut self, scene: &mut S) -> Option<f64> {
        let active = self.active.take()?;
        if let Some(radius) = active.pending {
            apply(scene, active.id, radius);
        }
        scene.corner_radius(active.id)
    }

    /// Puts the starting radius back.
    pub fn cancel<S: SceneEditor + ?Sized>(&mut self, scene: &mut S) {
        if let Some(active) = self.active.take() {
            apply(scene, active.id, active.start_radius);
        }
    }
}

fn apply<S: SceneEditor + ?Sized>(scene: &mut S, id: NodeId, radius: f64) -> bool {
    match scene.set_corner_radius(id, radius) {
        Ok(()) => {
            scene.redraw(id);
            true
        }
        Err(e) => {
            tracing::debug!("Could not set corner radius of {}: {}", id, e);
            false
        }
    }
}
