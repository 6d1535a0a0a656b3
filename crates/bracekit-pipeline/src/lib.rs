//! # BraceKit Pipeline
//!
//! Keeps the 3D scene in step with the configuration: each change pushes
//! the new value to the engine, then recomputes the affected groups. Cycles
//! may overlap; the newest triggered cycle of a group always wins.

pub mod controller;
pub mod orchestrator;

pub use controller::{ConfigurationChange, ConfigurationController, EngineCatalog};
pub use orchestrator::{
    CommitReport, CycleState, GroupSet, PipelineOptions, RecomputeOrchestrator, SequenceGuard,
};
