//! Smart alignment guides.
//!
//! While a selection is dragged or resized, the left/centre/right and
//! top/centre/bottom coordinates of its frame are compared with those of
//! sibling objects. Coordinates within the threshold are bucketed into
//! guide lines; nearby lines merge instead of duplicating. A line whose
//! members are evenly spaced along it is flagged as an equal-spacing guide
//! and labelled with its gaps.
//!
//! The same candidates drive drag snapping: a proposed move is corrected
//! so the nearest frame edge or centre lands exactly on a candidate
//! coordinate, or so the frame sits midway between its neighbours.

use smallvec::SmallVec;
use serde::{Deserialize, Serialize};

use drawkit_core::{NodeId, Point, Rect};
use drawkit_settings::GuideSettings;

use crate::geometry::object_bounds_in;
use crate::hit_test::selectable_nodes;
use crate::scene::SceneGraph;

/// Orientation of a guide line. A vertical line sits at an X coordinate
/// and snaps horizontal motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuideAxis {
    Vertical,
    Horizontal,
}

impl GuideAxis {
    /// Start, centre and end of `rect` across the line.
    fn coords(self, rect: &Rect) -> [f64; 3] {
        match self {
            GuideAxis::Vertical => [rect.left(), rect.center_x(), rect.right()],
            GuideAxis::Horizontal => [rect.top(), rect.center_y(), rect.bottom()],
        }
    }

    /// Extent of `rect` across the line (the snapped axis).
    fn main_range(self, rect: &Rect) -> (f64, f64) {
        match self {
            GuideAxis::Vertical => (rect.left(), rect.right()),
            GuideAxis::Horizontal => (rect.top(), rect.bottom()),
        }
    }

    /// Extent of `rect` along the line.
    fn cross_range(self, rect: &Rect) -> (f64, f64) {
        match self {
            GuideAxis::Vertical => (rect.top(), rect.bottom()),
            GuideAxis::Horizontal => (rect.left(), rect.right()),
        }
    }

    fn point(self, position: f64, along: f64) -> Point {
        match self {
            GuideAxis::Vertical => Point::new(position, along),
            GuideAxis::Horizontal => Point::new(along, position),
        }
    }
}

/// Rectangles aligned at one coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideLine {
    pub axis: GuideAxis,
    pub position: f64,
    pub rects: SmallVec<[Rect; 4]>,
}

impl GuideLine {
    fn push_unique(&mut self, rect: Rect) {
        if !self.rects.iter().any(|r| r.approx_eq(&rect, 1e-9)) {
            self.rects.push(rect);
        }
    }
}

/// Distance label between two consecutive members of an equal-spacing line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapLabel {
    pub at: Point,
    pub distance: f64,
}

/// A guide line ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideVisual {
    pub axis: GuideAxis,
    pub from: Point,
    pub to: Point,
    pub color: u32,
    pub equal_spacing: bool,
    pub gaps: Vec<GapLabel>,
}

/// What a snap correction aligned to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapTarget {
    /// An edge or centre coordinate of a sibling.
    Guide(f64),
    /// Midway between the nearest neighbours on either side.
    EqualSpacing,
}

/// Corrected drag delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapAdjustment {
    pub dx: f64,
    pub dy: f64,
    pub snapped_x: Option<SnapTarget>,
    pub snapped_y: Option<SnapTarget>,
}

impl SnapAdjustment {
    fn passthrough(dx: f64, dy: f64) -> Self {
        Self {
            dx,
            dy,
            snapped_x: None,
            snapped_y: None,
        }
    }
}

/// Source of the rectangles guides align to.
pub trait SnapCandidateProvider {
    /// Candidate bounds in the local space of `reference`, excluding `selected`.
    fn candidates(&self, scene: &dyn SceneGraph, reference: NodeId, selected: &[NodeId]) -> Vec<Rect>;
}

/// Snaps to every unselected pickable object under the reference container.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiblingSnapCandidates;

impl SnapCandidateProvider for SiblingSnapCandidates {
    fn candidates(&self, scene: &dyn SceneGraph, reference: NodeId, selected: &[NodeId]) -> Vec<Rect> {
        selectable_nodes(scene, reference)
            .into_iter()
            .filter(|id| !selected.contains(id))
            .filter_map(|id| match object_bounds_in(scene, id, reference) {
                Ok(rect) => Some(rect),
                Err(e) => {
                    tracing::debug!("Skipping {} as snap candidate: {}", id, e);
                    None
                }
            })
            // Degenerate or invisible
            .filter(|rect| rect.width.round() != 0.0 && rect.height.round() != 0.0)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct SmartGuides {
    enabled: bool,
    threshold: f64,
    equal_tolerance: f64,
    line_color: u32,
    equal_spacing_color: u32,
    candidates: Vec<Rect>,
    lines: Vec<GuideLine>,
    visuals: Vec<GuideVisual>,
}

impl SmartGuides {
    pub fn new(settings: &GuideSettings) -> Self {
        Self {
            enabled: settings.enabled,
            threshold: settings.threshold,
            equal_tolerance: settings.equal_tolerance,
            line_color: settings.line_color(),
            equal_spacing_color: settings.equal_spacing_color(),
            candidates: Vec::new(),
            lines: Vec::new(),
            visuals: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Gathers candidate rectangles for the coming gesture.
    pub fn refresh_candidates(
        &mut self,
        scene: &dyn SceneGraph,
        reference: NodeId,
        selected: &[NodeId],
        provider: &dyn SnapCandidateProvider,
    ) {
        self.candidates = if self.enabled {
            provider.candidates(scene, reference, selected)
        } else {
            Vec::new()
        };
    }

    pub fn set_candidates(&mut self, candidates: Vec<Rect>) {
        self.candidates = candidates;
    }

    pub fn candidates(&self) -> &[Rect] {
        &self.candidates
    }

    pub fn lines(&self) -> &[GuideLine] {
        &self.lines
    }

    pub fn visuals(&self) -> &[GuideVisual] {
        &self.visuals
    }

    /// Hides the guides and forgets the candidates.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.lines.clear();
        self.visuals.clear();
    }

    /// Recomputes guide lines for the frame at `frame_bounds`.
    pub fn update(&mut self, frame_bounds: Rect) -> &[GuideVisual] {
        self.lines.clear();
        self.visuals.clear();
        if !self.enabled {
            return &self.visuals;
        }

        for axis in [GuideAxis::Vertical, GuideAxis::Horizontal] {
            let frame_coords = axis.coords(&frame_bounds);
            for i in 0..self.candidates.len() {
                let rect = self.candidates[i];
                for coord in axis.coords(&rect) {
                    if frame_coords
                        .iter()
                        .any(|f| (coord - f).abs() <= self.threshold)
                    {
                        self.add_to_line(axis, coord, rect);
                    }
                }
            }
        }

        // Every line was found through the frame, so the frame belongs to all.
        for line in self.lines.iter_mut() {
            line.push_unique(frame_bounds);
        }

        let visuals: Vec<GuideVisual> = self
            .lines
            .iter()
            .filter(|line| line.rects.len() >= 2)
            .map(|line| self.render(line))
            .collect();
        self.visuals = visuals;
        &self.visuals
    }

    fn add_to_line(&mut self, axis: GuideAxis, position: f64, rect: Rect) {
        let threshold = self.threshold;
        match self
            .lines
            .iter_mut()
            .find(|l| l.axis == axis && (l.position - position).abs() <= threshold)
        {
            Some(line) => line.push_unique(rect),
            None => {
                let mut rects = SmallVec::new();
                rects.push(rect);
                self.lines.push(GuideLine {
                    axis,
                    position,
                    rects,
                });
            }
        }
    }

    fn render(&self, line: &GuideLine) -> GuideVisual {
        let axis = line.axis;
        let mut members: SmallVec<[(f64, f64); 4]> =
            line.rects.iter().map(|r| axis.cross_range(r)).collect();
        members.sort_by(|a, b| a.0.total_cmp(&b.0));

        let start = members.iter().map(|m| m.0).fold(f64::INFINITY, f64::min);
        let end = members.iter().map(|m| m.1).fold(f64::NEG_INFINITY, f64::max);

        let gaps: Vec<GapLabel> = members
            .windows(2)
            .filter_map(|pair| {
                let distance = pair[1].0 - pair[0].1;
                (distance > 0.0).then(|| GapLabel {
                    at: axis.point(line.position, (pair[0].1 + pair[1].0) / 2.0),
                    distance,
                })
            })
            .collect();

        let equal_spacing = gaps.len() >= 2 && {
            let min = gaps.iter().map(|g| g.distance).fold(f64::INFINITY, f64::min);
            let max = gaps.iter().map(|g| g.distance).fold(f64::NEG_INFINITY, f64::max);
            max - min <= self.equal_tolerance
        };

        GuideVisual {
            axis,
            from: axis.point(line.position, start),
            to: axis.point(line.position, end),
            color: if equal_spacing {
                self.equal_spacing_color
            } else {
                self.line_color
            },
            equal_spacing,
            gaps: if equal_spacing { gaps } else { Vec::new() },
        }
    }

    /// Corrects a proposed drag delta so the frame lands on a guide.
    ///
    /// `frame_bounds` is the frame before the delta is applied. Each axis
    /// picks the smallest correction within the threshold among edge/centre
    /// alignment and equal spacing between neighbours.
    pub fn compute_snap_adjustments(&self, frame_bounds: Rect, dx: f64, dy: f64) -> SnapAdjustment {
        if !self.enabled || self.candidates.is_empty() {
            return SnapAdjustment::passthrough(dx, dy);
        }

        let projected = frame_bounds.translate(dx, dy);
        let (cx, snapped_x) = self.snap_axis(GuideAxis::Vertical, &projected);
        let (cy, snapped_y) = self.snap_axis(GuideAxis::Horizontal, &projected);

        SnapAdjustment {
            dx: dx + cx,
            dy: dy + cy,
            snapped_x,
            snapped_y,
        }
    }

    fn snap_axis(&self, axis: GuideAxis, projected: &Rect) -> (f64, Option<SnapTarget>) {
        let mut best: Option<(f64, SnapTarget)> = None;

        let frame_coords = axis.coords(projected);
        for rect in &self.candidates {
            for coord in axis.coords(rect) {
                for f in frame_coords {
                    let correction = coord - f;
                    if correction.abs() <= self.threshold
                        && best.is_none_or(|(b, _)| correction.abs() < b.abs())
                    {
                        best = Some((correction, SnapTarget::Guide(coord)));
                    }
                }
            }
        }

        if let Some(correction) = self.equal_spacing_correction(axis, projected) {
            if best.is_none_or(|(b, _)| correction.abs() < b.abs()) {
                best = Some((correction, SnapTarget::EqualSpacing));
            }
        }

        match best {
            Some((correction, target)) => (correction, Some(target)),
            None => (0.0, None),
        }
    }

    /// Correction that centres the frame between its nearest neighbours on
    /// the same row (or column).
    fn equal_spacing_correction(&self, axis: GuideAxis, projected: &Rect) -> Option<f64> {
        let (frame_start, frame_end) = axis.main_range(projected);
        let frame_center = (frame_start + frame_end) / 2.0;
        let (cross_start, cross_end) = axis.cross_range(projected);

        let mut before: Option<f64> = None;
        let mut after: Option<f64> = None;
        for rect in &self.candidates {
            let (rect_cross_start, rect_cross_end) = axis.cross_range(rect);
            if rect_cross_start >= cross_end || rect_cross_end <= cross_start {
                continue;
            }
            let (start, end) = axis.main_range(rect);
            if end <= frame_center {
                before = Some(before.map_or(end, |b: f64| b.max(end)));
            } else if start >= frame_center {
                after = Some(after.map_or(start, |a: f64| a.min(start)));
            }
        }

        let (before, after) = (before?, after?);
        let correction = ((after - frame_end) - (frame_start - before)) / 2.0;
        (correction.abs() <= self.threshold).then_some(correction)
    }
}
