//! # BraceKit Visualizer
//!
//! Turns engine payloads into displayable solids: utilization coloring,
//! profile extrusion, mesh tessellation, and the per-role scene state that
//! the render loop draws from.

pub mod visualizer;

pub use visualizer::{
    bolt_head, color_for, extrude, hex_bolt_profile, Color, ColoredSolid, ExtrudedSolid, HeadlessSurface,
    MeshHandle, MeshMaterial, Placement, RenderSurface, RenderableMesh, Role, SceneEntry,
    SceneState, SharedScene,
};
