//! Data models for BraceKit
//!
//! Provides:
//! - The user-selected connection configuration and its store
//! - Component groups of the displayed model
//! - Engine payload types (profiles, bolt layout, utilization)

mod profile;

pub use profile::{
    BoltCoordinate, BoltDimensions, ProfilePolyline, SectionKind, SectionProfile,
    UtilizationResult,
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Structural component group; each is recomputed and committed independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Group {
    /// The brace member itself
    Base,
    /// All bolts of the connection
    Bolts,
    /// The gusset plate
    GussetPlate,
}

impl Group {
    /// All groups in commit order
    pub const ALL: [Group; 3] = [Group::Base, Group::Bolts, Group::GussetPlate];

    /// Stable role prefix used for scene entries of this group
    pub fn role_prefix(self) -> &'static str {
        match self {
            Group::Base => "base",
            Group::Bolts => "bolt",
            Group::GussetPlate => "gusset-plate",
        }
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Group::Base => write!(f, "base"),
            Group::Bolts => write!(f, "bolts"),
            Group::GussetPlate => write!(f, "gusset-plate"),
        }
    }
}

/// Bolt specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoltSpec {
    /// Bolt material identifier, e.g. `F10T`
    pub material: String,
    /// Nominal diameter identifier, e.g. `M20`
    pub diameter: String,
    /// Number of bolts per gauge line
    pub count: u32,
}

impl Default for BoltSpec {
    fn default() -> Self {
        Self {
            material: "F10T".to_string(),
            diameter: "M20".to_string(),
            count: 2,
        }
    }
}

/// Gusset plate specification; lengths in millimeters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GussetPlateSpec {
    pub material: String,
    pub thickness_mm: f64,
    pub length_mm: f64,
}

impl Default for GussetPlateSpec {
    fn default() -> Self {
        Self {
            material: "SS400".to_string(),
            thickness_mm: 9.0,
            length_mm: 300.0,
        }
    }
}

/// The current user-selected connection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Section identifier, e.g. `L-80x80x6`
    pub section: String,
    /// Steel grade of the member
    pub material: String,
    pub bolts: BoltSpec,
    pub gusset_plate: GussetPlateSpec,
    /// Applied axial force in kN
    pub load_kn: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            section: "L-80x80x6".to_string(),
            material: "SS400".to_string(),
            bolts: BoltSpec::default(),
            gusset_plate: GussetPlateSpec::default(),
            load_kn: 0.0,
        }
    }
}

/// Point-in-time copy of the configuration taken when a cycle is triggered
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationSnapshot {
    /// Store revision the snapshot was taken at
    pub revision: u64,
    pub configuration: Configuration,
}

#[derive(Debug, Default)]
struct StoreInner {
    revision: u64,
    configuration: Configuration,
}

/// Holder of the single live [`Configuration`]
///
/// Written only by UI-event collaborators, read by the recompute pipeline
/// through [`ConfigurationStore::snapshot`]. Cloning shares the same store.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl ConfigurationStore {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                revision: 0,
                configuration,
            })),
        }
    }

    /// Copy of the current configuration and its revision
    pub fn snapshot(&self) -> ConfigurationSnapshot {
        let inner = self.inner.read();
        ConfigurationSnapshot {
            revision: inner.revision,
            configuration: inner.configuration.clone(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.inner.read().revision
    }

    pub fn set_section(&self, section: impl Into<String>) {
        let section = section.into();
        self.update(|c| c.section = section);
    }

    pub fn set_material(&self, material: impl Into<String>) {
        let material = material.into();
        self.update(|c| c.material = material);
    }

    pub fn set_bolts(&self, bolts: BoltSpec) {
        self.update(|c| c.bolts = bolts);
    }

    pub fn set_gusset_plate(&self, gusset_plate: GussetPlateSpec) {
        self.update(|c| c.gusset_plate = gusset_plate);
    }

    pub fn set_load_kn(&self, load_kn: f64) {
        self.update(|c| c.load_kn = load_kn);
    }

    fn update(&self, apply: impl FnOnce(&mut Configuration)) {
        let mut inner = self.inner.write();
        apply(&mut inner.configuration);
        inner.revision += 1;
        tracing::trace!("Configuration revision {}", inner.revision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_roles() {
        assert_eq!(Group::Bolts.role_prefix(), "bolt");
        assert_eq!(Group::GussetPlate.to_string(), "gusset-plate");
        assert_eq!(Group::ALL.len(), 3);
    }

    #[test]
    fn test_store_revision_bumps_on_every_setter() {
        let store = ConfigurationStore::default();
        assert_eq!(store.revision(), 0);

        store.set_section("L-100x100x10");
        store.set_load_kn(10.0);
        store.set_bolts(BoltSpec {
            count: 4,
            ..BoltSpec::default()
        });

        let snapshot = store.snapshot();
        assert_eq!(snapshot.revision, 3);
        assert_eq!(snapshot.configuration.section, "L-100x100x10");
        assert_eq!(snapshot.configuration.load_kn, 10.0);
        assert_eq!(snapshot.configuration.bolts.count, 4);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = ConfigurationStore::default();
        let before = store.snapshot();
        store.set_material("SN490B");
        assert_eq!(before.configuration.material, "SS400");
        assert_eq!(store.snapshot().configuration.material, "SN490B");
    }

    #[test]
    fn test_clones_share_state() {
        let store = ConfigurationStore::default();
        let other = store.clone();
        other.set_gusset_plate(GussetPlateSpec {
            thickness_mm: 12.0,
            ..GussetPlateSpec::default()
        });
        assert_eq!(store.snapshot().configuration.gusset_plate.thickness_mm, 12.0);
    }
}
