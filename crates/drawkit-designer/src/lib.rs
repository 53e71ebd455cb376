//! # DrawKit Designer
//!
//! Selection and transform engine for the DrawKit 2D canvas. It lets a
//! user pick objects with clicks or a marquee, shows the selection as an
//! oriented frame with handles, and moves, scales and rotates the selected
//! objects while snapping to alignment guides from their siblings.
//!
//! ## Core Components
//!
//! - **Scene contract**: [`SceneGraph`] / [`SceneEditor`] traits the host's
//!   scene graph implements, plus the in-memory [`Scene`]
//! - **Geometry utilities**: combined bounds and cross-frame translation
//! - **Hit testing**: front-to-back hit stacks, stacked-object cycling and
//!   double-click detection
//! - **Marquee**: rubber-band selection by intersection
//! - **Selection overlay**: oriented frame inference, handles and rotation
//!   hotspots
//! - **Smart guides**: alignment lines, equal-spacing highlights and drag
//!   snapping
//! - **Transform controller**: scale/rotate state machine with the
//!   anchor-preserving pivot protocol
//! - **Selection tool**: routes pointer events and exposes clipboard,
//!   grouping, z-order, lock/visibility and flip commands
//!
//! ## Architecture
//!
//! ```text
//! SelectionTool
//!   ├── ClickResolver / MarqueeSelector   (what to select)
//!   ├── SelectionOverlay                  (frame + handles)
//!   ├── TransformController               (scale / rotate)
//!   ├── SmartGuides                       (guides + snapping)
//!   └── CornerRadiusDrag
//!
//! SceneGraph / SceneEditor  (implemented by the host, or Scene)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use drawkit_core::{EventBus, Rect, ShapeKind};
//! use drawkit_designer::{PointerEvent, Scene, SceneGraph, SelectionTool};
//! use drawkit_settings::Config;
//!
//! let mut scene = Scene::new();
//! let root = scene.root();
//! let shape = scene.add_object(root, ShapeKind::Shape, Rect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
//!
//! let mut tool: SelectionTool<Scene> = SelectionTool::new(Config::default(), root, Arc::new(EventBus::new()));
//! tool.pointer_down(&mut scene, PointerEvent::new(10.0, 10.0, 0));
//! tool.pointer_move(&mut scene, PointerEvent::new(30.0, 10.0, 16));
//! tool.pointer_up(&mut scene, PointerEvent::new(30.0, 10.0, 32));
//!
//! assert_eq!(tool.selection(), &[shape]);
//! assert_eq!(scene.world_bounds(shape).unwrap().left(), 20.0);
//! ```

pub mod corner_radius;
pub mod geometry;
pub mod guides;
pub mod hit_test;
pub mod input;
pub mod marquee;
pub mod overlay;
pub mod scene;
pub mod selection_frame;
pub mod selection_tool;
pub mod transform;

pub use corner_radius::CornerRadiusDrag;
pub use geometry::{combined_local_bounds, translate_across_frames};
pub use guides::{
    GuideAxis, GuideLine, GuideVisual, SiblingSnapCandidates, SmartGuides, SnapAdjustment,
    SnapCandidateProvider, SnapTarget,
};
pub use hit_test::{hit_stack, selection_action, ClickResolver, ClickResult, SelectionAction};
pub use input::{CursorHint, Modifiers, PointerEvent};
pub use marquee::MarqueeSelector;
pub use overlay::{infer_oriented_frame, HandleHit, SelectionOverlay};
pub use scene::{NodeFlags, NodeSnapshot, Scene, SceneEditor, SceneGraph, SceneNode, ZOrder};
pub use selection_frame::{
    FrameCorners, HandleKind, HandlePosition, SelectionFrame, TransformHandle,
};
pub use selection_tool::{FlipAxis, SelectionTool, ToolMode};
pub use transform::{
    CompletedTransform, ObjectTransformState, PivotPolicy, TransformController, TransformKind,
};
