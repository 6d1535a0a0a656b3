//! 3D model view module
//!
//! This module provides:
//! - Utilization ratio to color mapping (color)
//! - Profile extrusion and the bolt head outline (geometry)
//! - Triangle meshes for upload (mesh_rendering)
//! - The rendering surface contract (surface)
//! - Role-keyed ownership of displayed meshes (scene_state)

pub mod color;
pub mod geometry;
pub mod mesh_rendering;
pub mod scene_state;
pub mod surface;

pub use color::{color_for, Color};
pub use geometry::{bolt_head, extrude, hex_bolt_profile, ExtrudedSolid, Placement};
pub use mesh_rendering::{MeshMaterial, RenderableMesh};
pub use scene_state::{ColoredSolid, Role, SceneEntry, SceneState, SharedScene};
pub use surface::{HeadlessSurface, MeshHandle, RenderSurface};
