//! # BraceKit Core
//!
//! Core types, errors, and utilities for BraceKit.
//! Provides the engine payload types, the configuration store, length units
//! and the event bus shared by the visualizer and the recompute pipeline.

pub mod data;
pub mod error;
pub mod event_bus;
pub mod units;

pub use data::{
    BoltCoordinate, BoltDimensions, BoltSpec, Configuration, ConfigurationSnapshot,
    ConfigurationStore, Group, GussetPlateSpec, ProfilePolyline, SectionKind, SectionProfile,
    UtilizationResult,
};

pub use error::{ColorError, EngineError, Error, GeometryError, Result};

pub use event_bus::{
    AppEvent, ConfigurationEvent, EventBus, EventBusConfig, EventCategory, EventFilter,
    SceneEvent, SubscriptionId,
};

pub use units::LengthUnit;
