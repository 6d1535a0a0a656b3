//! UI-event entry points
//!
//! Each change is pushed to the engine first. Only when the engine accepts
//! it is the store updated and the affected groups recomputed, so the
//! engine and the displayed configuration never disagree past one event.
//! Changes are applied one at a time: a second change waits until the
//! first has been pushed and recorded, so both sides see the same order.

use crate::orchestrator::{CommitReport, GroupSet, RecomputeOrchestrator};
use bracekit_core::{
    AppEvent, BoltSpec, ConfigurationEvent, EngineError, Group, GussetPlateSpec, Result,
};
use bracekit_visualizer::RenderSurface;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// One edit of the connection configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationChange {
    Section(String),
    Material(String),
    Bolts(BoltSpec),
    GussetPlate(GussetPlateSpec),
    LoadKn(f64),
}

impl ConfigurationChange {
    /// Groups whose geometry or utilization the change can alter
    pub fn affected_groups(&self) -> GroupSet {
        match self {
            ConfigurationChange::Section(_)
            | ConfigurationChange::Material(_)
            | ConfigurationChange::LoadKn(_) => GroupSet::ALL,
            ConfigurationChange::Bolts(_) => GroupSet::only(Group::Bolts),
            ConfigurationChange::GussetPlate(_) => GroupSet::only(Group::GussetPlate),
        }
    }

    pub fn event(&self) -> ConfigurationEvent {
        match self {
            ConfigurationChange::Section(section) => ConfigurationEvent::SectionChanged {
                section: section.clone(),
            },
            ConfigurationChange::Material(material) => ConfigurationEvent::MaterialChanged {
                material: material.clone(),
            },
            ConfigurationChange::Bolts(bolts) => ConfigurationEvent::BoltsChanged {
                diameter: bolts.diameter.clone(),
                count: bolts.count,
            },
            ConfigurationChange::GussetPlate(plate) => ConfigurationEvent::GussetPlateChanged {
                thickness_mm: plate.thickness_mm,
                length_mm: plate.length_mm,
            },
            ConfigurationChange::LoadKn(load_kn) => ConfigurationEvent::LoadChanged {
                load_kn: *load_kn,
            },
        }
    }
}

/// Option lists the engine offers, for populating the input controls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineCatalog {
    pub sections: Vec<String>,
    pub materials: Vec<String>,
    pub bolt_diameters: Vec<String>,
    pub bolt_materials: Vec<String>,
}

/// Applies configuration changes and requests the matching recomputes
pub struct ConfigurationController<S: RenderSurface> {
    orchestrator: RecomputeOrchestrator<S>,
    // held across push, record and trigger
    apply_lock: Mutex<()>,
}

impl<S: RenderSurface + 'static> ConfigurationController<S> {
    pub fn new(orchestrator: RecomputeOrchestrator<S>) -> Self {
        Self {
            orchestrator,
            apply_lock: Mutex::new(()),
        }
    }

    pub fn orchestrator(&self) -> &RecomputeOrchestrator<S> {
        &self.orchestrator
    }

    /// Push `change` to the engine, record it, then recompute affected groups
    ///
    /// Returns the spawned cycles. An engine rejection leaves the store
    /// unchanged and triggers nothing.
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime; see
    /// [`RecomputeOrchestrator::configuration_changed`].
    pub async fn apply(
        &self,
        change: ConfigurationChange,
    ) -> Result<Vec<JoinHandle<Result<CommitReport>>>> {
        let _serial = self.apply_lock.lock().await;
        if let Err(err) = self.push(&change).await {
            warn!("Engine rejected {:?}: {}", change, err);
            return Err(err.into());
        }
        self.record(&change);

        let event = change.event();
        info!("{}", AppEvent::Configuration(event.clone()).description());
        let _ = self
            .orchestrator
            .events()
            .publish(AppEvent::Configuration(event));

        Ok(self
            .orchestrator
            .configuration_changed(change.affected_groups()))
    }

    /// Push the whole current configuration to the engine and recompute
    /// every group; used once a fresh engine is attached
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime, like [`apply`](Self::apply).
    pub async fn synchronize(&self) -> Result<Vec<JoinHandle<Result<CommitReport>>>> {
        let _serial = self.apply_lock.lock().await;
        let configuration = self.orchestrator.store().snapshot().configuration;
        let changes = [
            ConfigurationChange::Section(configuration.section),
            ConfigurationChange::Material(configuration.material),
            ConfigurationChange::Bolts(configuration.bolts),
            ConfigurationChange::GussetPlate(configuration.gusset_plate),
            ConfigurationChange::LoadKn(configuration.load_kn),
        ];
        for change in &changes {
            self.push(change).await?;
        }
        Ok(self.orchestrator.configuration_changed(GroupSet::ALL))
    }

    pub async fn catalog(&self) -> Result<EngineCatalog> {
        let engine = self.orchestrator.engine();
        let (sections, materials, bolt_diameters, bolt_materials) = tokio::try_join!(
            engine.list_sections(),
            engine.list_materials(),
            engine.list_bolt_diameters(),
            engine.list_bolt_materials(),
        )?;
        Ok(EngineCatalog {
            sections,
            materials,
            bolt_diameters,
            bolt_materials,
        })
    }

    async fn push(&self, change: &ConfigurationChange) -> std::result::Result<(), EngineError> {
        let engine = self.orchestrator.engine();
        match change {
            ConfigurationChange::Section(section) => engine.set_section(section).await,
            ConfigurationChange::Material(material) => engine.set_material(material).await,
            ConfigurationChange::Bolts(bolts) => {
                engine
                    .set_bolts(&bolts.material, &bolts.diameter, bolts.count)
                    .await
            }
            ConfigurationChange::GussetPlate(plate) => {
                engine
                    .set_gusset_plate(plate.thickness_mm, plate.length_mm, &plate.material)
                    .await
            }
            ConfigurationChange::LoadKn(load_kn) => engine.set_load_kn(*load_kn).await,
        }
    }

    fn record(&self, change: &ConfigurationChange) {
        let store = self.orchestrator.store();
        match change {
            ConfigurationChange::Section(section) => store.set_section(section.clone()),
            ConfigurationChange::Material(material) => store.set_material(material.clone()),
            ConfigurationChange::Bolts(bolts) => store.set_bolts(bolts.clone()),
            ConfigurationChange::GussetPlate(plate) => store.set_gusset_plate(plate.clone()),
            ConfigurationChange::LoadKn(load_kn) => store.set_load_kn(*load_kn),
        }
    }
}
