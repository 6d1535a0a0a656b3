//! # Scene State
//!
//! Owns every mesh handle on display, keyed by role. Replacing a role's mesh
//! (or a whole group's) happens inside one `&mut self` call, so a render
//! tick sharing the state through [`SharedScene`] sees either the old set or
//! the new set, never a role with nothing in it.
//!
//! New meshes are created before anything is removed; if creation fails the
//! previous entries are left untouched.

use super::color::Color;
use super::geometry::{ExtrudedSolid, Placement};
use super::surface::{MeshHandle, RenderSurface};
use bracekit_core::{GeometryError, Group};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Scene state shared between the recompute pipeline and the render loop
pub type SharedScene<S> = Arc<Mutex<SceneState<S>>>;

/// Stable key of one displayed entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Base,
    Bolt(usize),
    GussetPlate,
}

impl Role {
    pub fn group(self) -> Group {
        match self {
            Role::Base => Group::Base,
            Role::Bolt(_) => Group::Bolts,
            Role::GussetPlate => Group::GussetPlate,
        }
    }

    /// Role of the `index`-th member of `group`; single-member groups only
    /// have index 0
    pub fn in_group(group: Group, index: usize) -> Option<Role> {
        match (group, index) {
            (Group::Base, 0) => Some(Role::Base),
            (Group::GussetPlate, 0) => Some(Role::GussetPlate),
            (Group::Bolts, i) => Some(Role::Bolt(i)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = self.group().role_prefix();
        match self {
            Role::Bolt(i) => write!(f, "{}[{}]", prefix, i),
            Role::Base | Role::GussetPlate => f.write_str(prefix),
        }
    }
}

/// A solid ready to be committed: geometry, where it goes, and its color
#[derive(Debug, Clone, PartialEq)]
pub struct ColoredSolid {
    pub solid: ExtrudedSolid,
    pub placement: Placement,
    pub color: Color,
}

impl ColoredSolid {
    pub fn new(solid: ExtrudedSolid, placement: Placement, color: Color) -> Self {
        Self {
            solid,
            placement,
            color,
        }
    }
}

/// One displayed entity and the description it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntry {
    pub role: Role,
    pub handle: MeshHandle,
    pub source: ColoredSolid,
}

/// Role-keyed set of displayed meshes on top of a rendering surface
#[derive(Debug)]
pub struct SceneState<S: RenderSurface> {
    surface: S,
    entries: BTreeMap<Role, SceneEntry>,
}

impl<S: RenderSurface> SceneState<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            entries: BTreeMap::new(),
        }
    }

    /// Wrap in the shared handle used by the pipeline and the render loop
    pub fn shared(surface: S) -> SharedScene<S> {
        Arc::new(Mutex::new(Self::new(surface)))
    }

    /// Replace the mesh of `role` with one built from `solid`
    ///
    /// Returns the new handle; the previous occupant of the role, if any,
    /// is removed from the surface.
    pub fn commit(&mut self, role: Role, solid: ColoredSolid) -> Result<MeshHandle, GeometryError> {
        let handle = self
            .surface
            .create_solid_mesh(&solid.solid, &solid.placement, solid.color)?;

        if let Some(previous) = self.entries.remove(&role) {
            trace!("Replacing {} ({} -> {})", role, previous.handle, handle);
            self.surface.remove_from_scene(previous.handle);
        }
        self.surface.add_to_scene(handle);
        self.entries.insert(
            role,
            SceneEntry {
                role,
                handle,
                source: solid,
            },
        );
        Ok(handle)
    }

    /// Replace every entry of `group` with the given set
    ///
    /// All previous entries of the group are removed first, then the new
    /// ones are inserted as `group[0..n]`. An empty set clears the group.
    pub fn commit_group(
        &mut self,
        group: Group,
        solids: Vec<ColoredSolid>,
    ) -> Result<Vec<MeshHandle>, GeometryError> {
        let roles = (0..solids.len())
            .map(|i| {
                Role::in_group(group, i).ok_or_else(|| {
                    GeometryError::invalid(format!("{} holds a single solid, got {}", group, solids.len()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut handles = Vec::with_capacity(solids.len());
        for solid in &solids {
            match self
                .surface
                .create_solid_mesh(&solid.solid, &solid.placement, solid.color)
            {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    for handle in handles {
                        self.surface.remove_from_scene(handle);
                    }
                    return Err(err);
                }
            }
        }

        let removed = self.clear_group(group);
        for ((role, handle), source) in roles.into_iter().zip(handles.iter().copied()).zip(solids)
        {
            self.surface.add_to_scene(handle);
            self.entries.insert(
                role,
                SceneEntry {
                    role,
                    handle,
                    source,
                },
            );
        }
        debug!(
            "Committed {}: {} removed, {} inserted",
            group,
            removed,
            handles.len()
        );
        Ok(handles)
    }

    /// Remove every entry of `group`; returns how many were removed
    pub fn clear_group(&mut self, group: Group) -> usize {
        let roles: Vec<Role> = self
            .entries
            .keys()
            .copied()
            .filter(|role| role.group() == group)
            .collect();
        for role in &roles {
            if let Some(entry) = self.entries.remove(role) {
                self.surface.remove_from_scene(entry.handle);
            }
        }
        roles.len()
    }

    pub fn entry(&self, role: Role) -> Option<&SceneEntry> {
        self.entries.get(&role)
    }

    /// Entries of `group` in role order
    pub fn group_entries(&self, group: Group) -> Vec<&SceneEntry> {
        self.entries
            .values()
            .filter(|entry| entry.role.group() == group)
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &SceneEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draw one frame of whatever is currently held
    pub fn render_frame(&mut self) {
        self.surface.render_frame();
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}
