//! # Event Bus Module
//!
//! Provides a synchronous publish/subscribe bus for decoupled communication
//! between the selection engine and the panels, toolbars, and history
//! collaborators that react to it.
//!
//! ## Overview
//!
//! - Publishers emit typed events without knowing subscribers
//! - Subscribers filter and receive events of interest
//! - Handlers run on the publishing thread, in the same UI callback
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use drawkit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter, SelectionEvent};
//!
//! let bus = Arc::new(EventBus::new());
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Selection]),
//!     |event| {
//!         if let AppEvent::Selection(sel) = event {
//!             let _ = sel;
//!         }
//!     },
//! );
//!
//! bus.publish(AppEvent::Selection(SelectionEvent::Cleared)).ok();
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
