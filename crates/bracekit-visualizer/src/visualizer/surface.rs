//! Rendering surface contract and a headless implementation.
//!
//! The real surface (camera, lights, ground, orbit controls, present loop)
//! lives outside this crate. [`HeadlessSurface`] keeps meshes in memory and
//! records what each frame would have drawn; tests and offscreen tooling use it.

use super::color::Color;
use super::geometry::{ExtrudedSolid, Placement};
use super::mesh_rendering::RenderableMesh;
use bracekit_core::GeometryError;
use std::collections::{BTreeSet, HashMap};
use tracing::trace;

/// Opaque handle to a mesh owned by a rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

impl std::fmt::Display for MeshHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}

/// What the scene state needs from the rendering surface
pub trait RenderSurface: Send {
    /// Build a mesh for `solid`; it is not displayed until added
    fn create_solid_mesh(
        &mut self,
        solid: &ExtrudedSolid,
        placement: &Placement,
        color: Color,
    ) -> Result<MeshHandle, GeometryError>;

    fn add_to_scene(&mut self, handle: MeshHandle);

    /// Take the mesh off the scene and release it; also releases meshes
    /// that were created but never added
    fn remove_from_scene(&mut self, handle: MeshHandle);

    fn render_frame(&mut self);
}

/// In-memory surface
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    next_id: u64,
    meshes: HashMap<MeshHandle, RenderableMesh>,
    displayed: BTreeSet<MeshHandle>,
    frames: Vec<Vec<MeshHandle>>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&RenderableMesh> {
        self.meshes.get(&handle)
    }

    pub fn is_displayed(&self, handle: MeshHandle) -> bool {
        self.displayed.contains(&handle)
    }

    /// Handles currently on the scene, in creation order
    pub fn displayed(&self) -> Vec<MeshHandle> {
        self.displayed.iter().copied().collect()
    }

    /// Meshes alive on the surface, displayed or not
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Displayed handles of every rendered frame so far
    pub fn frames(&self) -> &[Vec<MeshHandle>] {
        &self.frames
    }
}

impl RenderSurface for HeadlessSurface {
    fn create_solid_mesh(
        &mut self,
        solid: &ExtrudedSolid,
        placement: &Placement,
        color: Color,
    ) -> Result<MeshHandle, GeometryError> {
        let mesh = RenderableMesh::from_solid(solid, placement, color)?;
        self.next_id += 1;
        let handle = MeshHandle(self.next_id);
        trace!(
            "Created {} with {} triangles",
            handle,
            mesh.triangle_count()
        );
        self.meshes.insert(handle, mesh);
        Ok(handle)
    }

    fn add_to_scene(&mut self, handle: MeshHandle) {
        if self.meshes.contains_key(&handle) {
            self.displayed.insert(handle);
        }
    }

    fn remove_from_scene(&mut self, handle: MeshHandle) {
        self.displayed.remove(&handle);
        self.meshes.remove(&handle);
    }

    fn render_frame(&mut self) {
        self.frames.push(self.displayed());
    }
}
