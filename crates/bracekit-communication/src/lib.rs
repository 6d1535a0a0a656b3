//! # BraceKit Communication
//!
//! The narrow contract to the external structural calculation engine.
//! The engine owns the structural state; the viewer pushes configuration
//! values with the `set_*` calls and reads back geometry and utilization.

pub mod engine;

pub use engine::{EngineCall, EngineClient, NoOpEngine};
