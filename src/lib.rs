//! # BraceKit
//!
//! Live 3D view of a bolted brace-to-gusset-plate connection, colored by
//! the utilization ratios an external structural engine computes.
//!
//! ## Architecture
//!
//! BraceKit is organized as a workspace with multiple crates:
//!
//! 1. **bracekit-core** - Configuration store, engine payload types, errors, events
//! 2. **bracekit-communication** - Engine client contract
//! 3. **bracekit-visualizer** - Coloring, extrusion, meshes, scene state
//! 4. **bracekit-pipeline** - Recompute orchestration and UI entry points
//! 5. **bracekit-settings** - Viewer settings and persistence
//! 6. **bracekit** - Wiring of the above into one viewer

pub use bracekit_communication::{EngineCall, EngineClient, NoOpEngine};
pub use bracekit_core::{
    AppEvent, BoltSpec, Configuration, ConfigurationStore, Error, EventBus, EventCategory,
    EventFilter, Group, GussetPlateSpec, LengthUnit, Result, SceneEvent,
};
pub use bracekit_pipeline::{
    CommitReport, ConfigurationChange, ConfigurationController, CycleState, GroupSet,
    PipelineOptions, RecomputeOrchestrator,
};
pub use bracekit_settings::{LoggingSettings, ViewerSettings};
pub use bracekit_visualizer::{
    color_for, HeadlessSurface, RenderSurface, Role, SceneState, SharedScene,
};

use std::sync::Arc;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging from the logging settings
///
/// `RUST_LOG` wins over `settings.level` when set. Fails if a global
/// subscriber is already installed.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)?,
    };

    if settings.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_target(true)
                    .with_level(true)
                    .with_thread_names(true)
                    .with_line_number(true),
            )
            .try_init()?;
    }

    Ok(())
}

/// Pipeline options taken from the viewer settings
pub fn pipeline_options(settings: &ViewerSettings) -> PipelineOptions {
    PipelineOptions {
        base_length_mm: settings.scene.base_length_mm,
        bolt_standoff: settings.scene.bolt_standoff,
        length_unit: settings.engine.length_unit,
    }
}

/// One viewer instance: configuration, scene, event bus and pipeline
pub struct Viewer<S: RenderSurface> {
    controller: ConfigurationController<S>,
}

impl<S: RenderSurface + 'static> Viewer<S> {
    pub fn new(
        engine: Arc<dyn EngineClient>,
        surface: S,
        configuration: Configuration,
        settings: &ViewerSettings,
    ) -> anyhow::Result<Self> {
        settings.validate()?;
        let events = Arc::new(EventBus::with_config(settings.events.to_bus_config()));
        let orchestrator = RecomputeOrchestrator::new(
            engine,
            ConfigurationStore::new(configuration),
            SceneState::shared(surface),
            events,
            pipeline_options(settings),
        );
        tracing::info!("BraceKit viewer {} ready", VERSION);
        Ok(Self {
            controller: ConfigurationController::new(orchestrator),
        })
    }

    pub fn controller(&self) -> &ConfigurationController<S> {
        &self.controller
    }

    pub fn orchestrator(&self) -> &RecomputeOrchestrator<S> {
        self.controller.orchestrator()
    }

    pub fn scene(&self) -> &SharedScene<S> {
        self.orchestrator().scene()
    }

    pub fn events(&self) -> &Arc<EventBus> {
        self.orchestrator().events()
    }

    /// Draw whatever the scene holds right now; never waits on a recompute
    pub fn render_frame(&self) {
        self.scene().lock().render_frame();
    }
}
