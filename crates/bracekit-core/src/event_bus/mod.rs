//! Pipeline notifications.
//!
//! The recompute pipeline publishes configuration pushes and per-cycle
//! outcomes here; status bars, error toasts and log panels subscribe
//! without the pipeline knowing about them.
//!
//! ```rust,ignore
//! use bracekit_core::event_bus::{AppEvent, EventBus, EventFilter, SceneEvent};
//! use bracekit_core::Group;
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(EventFilter::Groups(vec![Group::Bolts]), |event| {
//!     if let AppEvent::Scene(SceneEvent::CycleFailed { reason, .. }) = event {
//!         eprintln!("bolts not updated: {reason}");
//!     }
//! });
//!
//! // A status line that opens late can still show the last result.
//! let last = bus.latest_outcome(Group::Bolts);
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
