//! # DrawKit Core
//!
//! Core types, traits, and utilities for DrawKit.
//! Provides the geometry primitives, shared data model, error types,
//! and the event bus used by the selection-and-transform engine.

pub mod color;
pub mod data;
pub mod error;
pub mod event_bus;
pub mod geometry;

pub use color::{parse_color, ColorValue};

pub use data::{GestureKind, NodeId, NodeTransform, SelectionKind, ShapeKind};

pub use error::{Error, GeometryError, GeometryResult, Result};

// Re-export event bus for convenience
pub use event_bus::{
    AppEvent, EventBus, EventBusError, EventCategory, EventFilter, SelectionEvent,
    SubscriptionId, TransformEvent, TransformSnapshot,
};

pub use geometry::{Affine2, Point, Rect};
