//! # DrawKit
//!
//! Selection and transform engine for a 2D drawing canvas editor:
//! - Click, shift-click, stacked-object cycling and marquee selection
//! - Oriented selection frames with scale handles and rotation hotspots
//! - Anchor-preserving scale and rotate gestures
//! - Smart guides with equal-spacing detection and drag snapping
//! - Clipboard, grouping, z-order, lock/visibility and flip commands
//!
//! ## Architecture
//!
//! DrawKit is organized as a workspace with multiple crates:
//!
//! 1. **drawkit-core** - Geometry primitives, data model, errors, event bus
//! 2. **drawkit-settings** - Tool configuration and persistence
//! 3. **drawkit-designer** - Scene contract, selection tool and its parts
//! 4. **drawkit** - Re-exports plus the `drawkit` demo binary

pub mod demo;

pub use drawkit_core as core;
pub use drawkit_designer as designer;
pub use drawkit_settings as settings;

pub use drawkit_core::{
    AppEvent, EventBus, EventFilter, GeometryError, GestureKind, NodeId, NodeTransform, Point,
    Rect, SelectionEvent, SelectionKind, ShapeKind, TransformEvent,
};

pub use drawkit_designer::{
    CursorHint, FlipAxis, Modifiers, PointerEvent, Scene, SceneEditor, SceneGraph, SelectionTool,
    SmartGuides, ToolMode, TransformController, ZOrder,
};

pub use drawkit_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting, or JSON lines when
///   `DRAWKIT_LOG_FORMAT=json`
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("DRAWKIT_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(true)
            .json();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_line_number(true)
            .pretty();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
