//! Scripted engine and harness shared by the pipeline integration tests.
//!
//! The engine answers from its own state, captured when a call starts, and
//! sleeps for a latency the test picks per call. Run the tests on a paused
//! clock to make interleavings exact.

#![allow(dead_code)]

use async_trait::async_trait;
use bracekit_communication::{EngineCall, EngineClient};
use bracekit_core::{
    AppEvent, BoltCoordinate, BoltDimensions, Configuration, ConfigurationStore, EngineError,
    EventBus, LengthUnit, ProfilePolyline, Result, SceneEvent, SectionKind, SectionProfile,
    UtilizationResult,
};
use bracekit_pipeline::{
    CommitReport, ConfigurationController, PipelineOptions, RecomputeOrchestrator,
};
use bracekit_visualizer::{HeadlessSurface, SceneState};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// What the engine was told through the `set_*` calls
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    pub section: String,
    pub material: String,
    pub bolt_material: String,
    pub bolt_diameter: String,
    pub bolt_count: u32,
    pub plate_thickness_mm: f64,
    pub plate_length_mm: f64,
    pub plate_material: String,
    pub load_kn: f64,
}

impl From<&Configuration> for EngineState {
    fn from(configuration: &Configuration) -> Self {
        Self {
            section: configuration.section.clone(),
            material: configuration.material.clone(),
            bolt_material: configuration.bolts.material.clone(),
            bolt_diameter: configuration.bolts.diameter.clone(),
            bolt_count: configuration.bolts.count,
            plate_thickness_mm: configuration.gusset_plate.thickness_mm,
            plate_length_mm: configuration.gusset_plate.length_mm,
            plate_material: configuration.gusset_plate.material.clone(),
            load_kn: configuration.load_kn,
        }
    }
}

impl EngineState {
    /// Legs and thickness of an angle named like `L50x50x6` or `L-80x80x6`
    pub fn angle_dimensions(&self) -> (f64, f64, f64) {
        let dims: Vec<f64> = self
            .section
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .split('x')
            .filter_map(|part| part.parse().ok())
            .collect();
        match dims.as_slice() {
            [a, b, t] => (*a, *b, *t),
            _ => (80.0, 80.0, 6.0),
        }
    }

    pub fn section_outline_mm(&self) -> Vec<(f64, f64)> {
        let (a, b, t) = self.angle_dimensions();
        vec![(0.0, 0.0), (a, 0.0), (a, t), (t, t), (t, b), (0.0, b)]
    }

    pub fn joint_length_mm(&self) -> f64 {
        80.0 + 60.0 * self.bolt_count.saturating_sub(1) as f64
    }

    pub fn bolt_coordinates_mm(&self) -> Vec<(f64, f64)> {
        let (a, _, _) = self.angle_dimensions();
        (0..self.bolt_count)
            .map(|i| (40.0 + 60.0 * i as f64, a / 2.0))
            .collect()
    }

    /// Head (height, width) from the nominal diameter, `M20` -> 13 x 32
    pub fn bolt_head_mm(&self) -> (f64, f64) {
        let d: f64 = self
            .bolt_diameter
            .trim_start_matches('M')
            .parse()
            .unwrap_or(20.0);
        (0.65 * d, 1.6 * d)
    }

    pub fn plate_outline_mm(&self) -> Vec<(f64, f64)> {
        let (a, _, _) = self.angle_dimensions();
        let l = self.plate_length_mm;
        vec![(0.0, -100.0), (l, -100.0), (l, a + 100.0), (0.0, a + 100.0)]
    }

    pub fn base_gamma(&self) -> f64 {
        self.load_kn / 25.0
    }

    pub fn bolts_gamma(&self) -> f64 {
        if self.bolt_count == 0 {
            0.0
        } else {
            self.load_kn / (12.5 * self.bolt_count as f64)
        }
    }

    pub fn plate_gamma(&self) -> f64 {
        self.load_kn / (2.0 * self.plate_thickness_mm)
    }
}

type Latency = Arc<dyn Fn(&EngineState, EngineCall) -> Duration + Send + Sync>;

pub struct ScriptedEngine {
    unit: LengthUnit,
    state: Mutex<EngineState>,
    latency: Mutex<Latency>,
    push_latency: Mutex<Latency>,
    failing: Mutex<HashSet<EngineCall>>,
    calls: Mutex<Vec<EngineCall>>,
}

impl ScriptedEngine {
    pub fn new(configuration: &Configuration) -> Self {
        Self::with_unit(configuration, LengthUnit::Millimeter)
    }

    pub fn with_unit(configuration: &Configuration, unit: LengthUnit) -> Self {
        Self {
            unit,
            state: Mutex::new(EngineState::from(configuration)),
            latency: Mutex::new(Arc::new(|_, _| Duration::ZERO)),
            push_latency: Mutex::new(Arc::new(|_, _| Duration::ZERO)),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Latency of each query, chosen from the state the query observes
    pub fn set_latency(
        &self,
        latency: impl Fn(&EngineState, EngineCall) -> Duration + Send + Sync + 'static,
    ) {
        *self.latency.lock() = Arc::new(latency);
    }

    /// Delay before a `set_*` call returns, chosen from the state it produced
    pub fn set_push_latency(
        &self,
        latency: impl Fn(&EngineState, EngineCall) -> Duration + Send + Sync + 'static,
    ) {
        *self.push_latency.lock() = Arc::new(latency);
    }

    pub fn fail(&self, call: EngineCall) {
        self.failing.lock().insert(call);
    }

    pub fn heal(&self) {
        self.failing.lock().clear();
    }

    pub fn state(&self) -> EngineState {
        self.state.lock().clone()
    }

    pub fn count(&self, call: EngineCall) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    fn length(&self, mm: f64) -> f64 {
        mm / self.unit.mm_factor()
    }

    async fn mutate(
        &self,
        call: EngineCall,
        apply: impl FnOnce(&mut EngineState) + Send,
    ) -> std::result::Result<(), EngineError> {
        self.calls.lock().push(call);
        if self.failing.lock().contains(&call) {
            return Err(call.failed("scripted failure"));
        }
        let delay = {
            let mut state = self.state.lock();
            apply(&mut state);
            let latency = Arc::clone(&self.push_latency.lock());
            latency(&state, call)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn answer<T: Send>(
        &self,
        call: EngineCall,
        respond: impl FnOnce(&EngineState) -> T + Send,
    ) -> std::result::Result<T, EngineError> {
        let state = self.state();
        self.calls.lock().push(call);
        let fails = self.failing.lock().contains(&call);
        let latency = Arc::clone(&self.latency.lock());
        let delay = latency(&state, call);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if fails {
            return Err(call.failed("scripted failure"));
        }
        Ok(respond(&state))
    }
}

#[async_trait]
impl EngineClient for ScriptedEngine {
    fn length_unit(&self) -> LengthUnit {
        self.unit
    }

    async fn list_sections(&self) -> std::result::Result<Vec<String>, EngineError> {
        self.answer(EngineCall::ListSections, |_| {
            vec!["L-50x50x6".to_string(), "L-80x80x6".to_string()]
        })
        .await
    }

    async fn list_materials(&self) -> std::result::Result<Vec<String>, EngineError> {
        self.answer(EngineCall::ListMaterials, |_| vec!["SS400".to_string()])
            .await
    }

    async fn list_bolt_diameters(&self) -> std::result::Result<Vec<String>, EngineError> {
        self.answer(EngineCall::ListBoltDiameters, |_| {
            vec!["M16".to_string(), "M20".to_string()]
        })
        .await
    }

    async fn list_bolt_materials(&self) -> std::result::Result<Vec<String>, EngineError> {
        self.answer(EngineCall::ListBoltMaterials, |_| vec!["F10T".to_string()])
            .await
    }

    async fn set_section(&self, name: &str) -> std::result::Result<(), EngineError> {
        self.mutate(EngineCall::SetSection, |s| s.section = name.to_string())
            .await
    }

    async fn set_material(&self, name: &str) -> std::result::Result<(), EngineError> {
        self.mutate(EngineCall::SetMaterial, |s| s.material = name.to_string())
            .await
    }

    async fn set_bolts(
        &self,
        material: &str,
        diameter: &str,
        count: u32,
    ) -> std::result::Result<(), EngineError> {
        self.mutate(EngineCall::SetBolts, |s| {
            s.bolt_material = material.to_string();
            s.bolt_diameter = diameter.to_string();
            s.bolt_count = count;
        })
        .await
    }

    async fn set_gusset_plate(
        &self,
        thickness_mm: f64,
        length_mm: f64,
        material: &str,
    ) -> std::result::Result<(), EngineError> {
        self.mutate(EngineCall::SetGussetPlate, |s| {
            s.plate_thickness_mm = thickness_mm;
            s.plate_length_mm = length_mm;
            s.plate_material = material.to_string();
        })
        .await
    }

    async fn set_load_kn(&self, load_kn: f64) -> std::result::Result<(), EngineError> {
        self.mutate(EngineCall::SetLoad, |s| s.load_kn = load_kn)
            .await
    }

    async fn section_profile(&self) -> std::result::Result<SectionProfile, EngineError> {
        let state = self.state();
        let points: Vec<(f64, f64)> = state
            .section_outline_mm()
            .into_iter()
            .map(|(x, y)| (self.length(x), self.length(y)))
            .collect();
        let polyline = ProfilePolyline::from_points(points)
            .map_err(|e| EngineCall::GetSectionProfile.failed(e.to_string()))?;
        let kind = SectionKind::from_section_name(&state.section).unwrap_or(SectionKind::Angle);
        self.answer(EngineCall::GetSectionProfile, move |_| SectionProfile {
            kind,
            polyline,
        })
        .await
    }

    async fn joint_length(&self) -> std::result::Result<f64, EngineError> {
        self.answer(EngineCall::GetJointLength, |s| self.length(s.joint_length_mm()))
            .await
    }

    async fn bolt_coordinates(&self) -> std::result::Result<Vec<BoltCoordinate>, EngineError> {
        self.answer(EngineCall::GetBoltCoordinates, |s| {
            s.bolt_coordinates_mm()
                .into_iter()
                .map(|(axial, transverse)| {
                    BoltCoordinate::new(self.length(axial), self.length(transverse))
                })
                .collect()
        })
        .await
    }

    async fn bolt_dimensions(&self) -> std::result::Result<BoltDimensions, EngineError> {
        self.answer(EngineCall::GetBoltDimensions, |s| {
            let (height, width) = s.bolt_head_mm();
            BoltDimensions::new(self.length(height), self.length(width))
        })
        .await
    }

    async fn section_thickness(&self) -> std::result::Result<f64, EngineError> {
        self.answer(EngineCall::GetSectionThickness, |s| {
            self.length(s.angle_dimensions().2)
        })
        .await
    }

    async fn gusset_plate_profile(&self) -> std::result::Result<ProfilePolyline, EngineError> {
        let points: Vec<(f64, f64)> = self
            .state()
            .plate_outline_mm()
            .into_iter()
            .map(|(x, y)| (self.length(x), self.length(y)))
            .collect();
        let polyline = ProfilePolyline::from_points(points)
            .map_err(|e| EngineCall::GetGussetPlateProfile.failed(e.to_string()))?;
        self.answer(EngineCall::GetGussetPlateProfile, move |_| polyline)
            .await
    }

    async fn gusset_plate_thickness(&self) -> std::result::Result<f64, EngineError> {
        self.answer(EngineCall::GetGussetPlateThickness, |s| {
            self.length(s.plate_thickness_mm)
        })
        .await
    }

    async fn calculate_base(&self) -> std::result::Result<UtilizationResult, EngineError> {
        self.answer(EngineCall::CalculateBase, |s| {
            UtilizationResult::new(s.base_gamma())
        })
        .await
    }

    async fn calculate_bolts(&self) -> std::result::Result<UtilizationResult, EngineError> {
        self.answer(EngineCall::CalculateBolts, |s| {
            UtilizationResult::new(s.bolts_gamma())
        })
        .await
    }

    async fn calculate_gusset_plate(
        &self,
    ) -> std::result::Result<UtilizationResult, EngineError> {
        self.answer(EngineCall::CalculateGussetPlate, |s| {
            UtilizationResult::new(s.plate_gamma())
        })
        .await
    }
}

/// Engine, orchestrator and controller wired to a headless scene
pub struct Harness {
    pub engine: Arc<ScriptedEngine>,
    pub orchestrator: RecomputeOrchestrator<HeadlessSurface>,
    pub controller: ConfigurationController<HeadlessSurface>,
    pub events: broadcast::Receiver<AppEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(LengthUnit::Millimeter, PipelineOptions::default())
    }

    pub fn build(unit: LengthUnit, options: PipelineOptions) -> Self {
        let configuration = Configuration::default();
        let engine = Arc::new(ScriptedEngine::with_unit(&configuration, unit));
        let events = Arc::new(EventBus::new());
        let receiver = events.receiver();
        let orchestrator = RecomputeOrchestrator::new(
            engine.clone(),
            ConfigurationStore::new(configuration),
            SceneState::shared(HeadlessSurface::new()),
            events,
            options,
        );
        Self {
            engine,
            controller: ConfigurationController::new(orchestrator.clone()),
            orchestrator,
            events: receiver,
        }
    }

    pub fn scene(&self) -> MutexGuard<'_, SceneState<HeadlessSurface>> {
        self.orchestrator.scene().lock()
    }

    /// Yield until the engine has seen `n` calls of kind `call`
    pub async fn wait_for(&self, call: EngineCall, n: usize) {
        while self.engine.count(call) < n {
            tokio::task::yield_now().await;
        }
    }

    pub fn scene_events(&mut self) -> Vec<SceneEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            if let AppEvent::Scene(event) = event {
                events.push(event);
            }
        }
        events
    }
}

/// Await every spawned cycle
pub async fn settle(handles: Vec<JoinHandle<Result<CommitReport>>>) -> Vec<Result<CommitReport>> {
    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => panic!("recompute task panicked: {}", err),
        }
    }
    outcomes
}

/// Await every spawned cycle; each must commit or be superseded
pub async fn settle_ok(handles: Vec<JoinHandle<Result<CommitReport>>>) {
    for outcome in settle(handles).await {
        if let Err(err) = outcome {
            assert!(err.is_stale(), "cycle failed: {}", err);
        }
    }
}
