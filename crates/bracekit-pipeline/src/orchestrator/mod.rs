//! # Recompute Orchestrator
//!
//! Turns a configuration change into engine calls, geometry, colors and a
//! scene commit, one group at a time.
//!
//! Every cycle takes a sequence token, a configuration snapshot and the
//! engine length unit at trigger time. Cycles are never cancelled: a cycle
//! that finishes after a newer cycle of its group has committed is
//! discarded with [`Error::StaleCycleDiscarded`]. Failed cycles leave the
//! scene untouched. Every outcome is published on the event bus as a
//! [`SceneEvent`].

mod payload;
mod sequence;

pub use sequence::SequenceGuard;

use payload::{fetch, GroupPayload};

use bracekit_communication::EngineClient;
use bracekit_core::{
    AppEvent, ConfigurationSnapshot, ConfigurationStore, Error, EventBus, Group, LengthUnit,
    Result, SceneEvent,
};
use bracekit_visualizer::{
    color_for, Color, ColoredSolid, MeshHandle, RenderSurface, SharedScene,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Progress of the newest in-flight cycle of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    FetchingBase,
    FetchingBolts,
    FetchingGpl,
    Committing,
}

impl CycleState {
    fn fetching(group: Group) -> Self {
        match group {
            Group::Base => CycleState::FetchingBase,
            Group::Bolts => CycleState::FetchingBolts,
            Group::GussetPlate => CycleState::FetchingGpl,
        }
    }
}

/// Scene layout and unit handling for every cycle
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Visible stretch of member before the joint, in millimeters
    pub base_length_mm: f64,
    /// Seat bolt heads on the section thickness
    pub bolt_standoff: bool,
    /// Overrides the unit declared by the engine client
    pub length_unit: Option<LengthUnit>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            base_length_mm: 1000.0,
            bolt_standoff: true,
            length_unit: None,
        }
    }
}

/// Set of groups a configuration change affects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupSet {
    base: bool,
    bolts: bool,
    gusset_plate: bool,
}

impl GroupSet {
    pub const ALL: GroupSet = GroupSet {
        base: true,
        bolts: true,
        gusset_plate: true,
    };

    pub const fn empty() -> Self {
        GroupSet {
            base: false,
            bolts: false,
            gusset_plate: false,
        }
    }

    pub fn only(group: Group) -> Self {
        Self::empty().with(group)
    }

    pub fn with(mut self, group: Group) -> Self {
        match group {
            Group::Base => self.base = true,
            Group::Bolts => self.bolts = true,
            Group::GussetPlate => self.gusset_plate = true,
        }
        self
    }

    pub fn contains(&self, group: Group) -> bool {
        match group {
            Group::Base => self.base,
            Group::Bolts => self.bolts,
            Group::GussetPlate => self.gusset_plate,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.base || self.bolts || self.gusset_plate)
    }

    /// Members in commit order
    pub fn iter(&self) -> impl Iterator<Item = Group> + '_ {
        Group::ALL.into_iter().filter(|group| self.contains(*group))
    }
}

impl From<Group> for GroupSet {
    fn from(group: Group) -> Self {
        GroupSet::only(group)
    }
}

impl FromIterator<Group> for GroupSet {
    fn from_iter<I: IntoIterator<Item = Group>>(iter: I) -> Self {
        iter.into_iter().fold(GroupSet::empty(), GroupSet::with)
    }
}

/// Outcome of a committed cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    pub group: Group,
    pub token: u64,
    /// Configuration revision the cycle was triggered at
    pub revision: u64,
    pub handles: Vec<MeshHandle>,
    pub gamma: f64,
    pub color: Color,
}

impl CommitReport {
    pub fn renderables(&self) -> usize {
        self.handles.len()
    }
}

struct Shared<S: RenderSurface> {
    engine: Arc<dyn EngineClient>,
    store: ConfigurationStore,
    scene: SharedScene<S>,
    events: Arc<EventBus>,
    options: PipelineOptions,
    sequence: SequenceGuard,
    in_flight: Mutex<BTreeMap<(Group, u64), CycleState>>,
}

/// Everything a cycle captured at trigger time; leaving the in-flight table
/// happens on drop, including when the cycle future is dropped unfinished
struct Cycle<S: RenderSurface> {
    shared: Arc<Shared<S>>,
    group: Group,
    token: u64,
    snapshot: ConfigurationSnapshot,
    unit: LengthUnit,
}

impl<S: RenderSurface> Cycle<S> {
    fn enter(&self, state: CycleState) {
        if let Some(slot) = self.shared.in_flight.lock().get_mut(&(self.group, self.token)) {
            *slot = state;
        }
    }
}

impl<S: RenderSurface> Drop for Cycle<S> {
    fn drop(&mut self) {
        self.shared
            .in_flight
            .lock()
            .remove(&(self.group, self.token));
    }
}

/// Recompute state machine for the base member, bolt group and gusset plate
///
/// Cloning yields another handle to the same orchestrator.
pub struct RecomputeOrchestrator<S: RenderSurface> {
    shared: Arc<Shared<S>>,
}

impl<S: RenderSurface> Clone for RecomputeOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: RenderSurface + 'static> RecomputeOrchestrator<S> {
    pub fn new(
        engine: Arc<dyn EngineClient>,
        store: ConfigurationStore,
        scene: SharedScene<S>,
        events: Arc<EventBus>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                engine,
                store,
                scene,
                events,
                options,
                sequence: SequenceGuard::new(),
                in_flight: Mutex::new(BTreeMap::new()),
            }),
        }
    }

    /// Start a cycle for `group`
    ///
    /// The token, configuration snapshot and length unit are taken now; the
    /// engine is first called when the returned future is polled.
    pub fn recompute(
        &self,
        group: Group,
    ) -> impl Future<Output = Result<CommitReport>> + Send + 'static {
        let cycle = self.begin(group);
        async move {
            let outcome = execute(&cycle).await;
            publish_outcome(&cycle, &outcome);
            outcome
        }
    }

    /// Spawn one cycle per affected group on the current tokio runtime
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, as [`tokio::spawn`] does.
    /// Await [`recompute`](Self::recompute) directly to drive a cycle on
    /// another executor.
    pub fn configuration_changed(
        &self,
        groups: GroupSet,
    ) -> Vec<JoinHandle<Result<CommitReport>>> {
        groups
            .iter()
            .map(|group| tokio::spawn(self.recompute(group)))
            .collect()
    }

    /// State of the newest in-flight cycle of `group`, `Idle` if none
    pub fn state(&self, group: Group) -> CycleState {
        self.shared
            .in_flight
            .lock()
            .range((group, 0)..=(group, u64::MAX))
            .next_back()
            .map(|(_, state)| *state)
            .unwrap_or(CycleState::Idle)
    }

    /// Number of cycles of `group` triggered but not yet finished
    pub fn in_flight(&self, group: Group) -> usize {
        self.shared
            .in_flight
            .lock()
            .range((group, 0)..=(group, u64::MAX))
            .count()
    }

    pub fn latest_committed(&self, group: Group) -> Option<u64> {
        self.shared.sequence.latest_committed(group)
    }

    pub fn scene(&self) -> &SharedScene<S> {
        &self.shared.scene
    }

    pub fn store(&self) -> &ConfigurationStore {
        &self.shared.store
    }

    pub fn engine(&self) -> &Arc<dyn EngineClient> {
        &self.shared.engine
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.shared.events
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.shared.options
    }

    fn begin(&self, group: Group) -> Cycle<S> {
        let shared = &self.shared;
        let token = shared.sequence.issue();
        let snapshot = shared.store.snapshot();
        let unit = shared
            .options
            .length_unit
            .unwrap_or_else(|| shared.engine.length_unit());
        shared
            .in_flight
            .lock()
            .insert((group, token), CycleState::fetching(group));
        debug!(
            "Cycle {} #{} triggered at revision {}",
            group, token, snapshot.revision
        );
        Cycle {
            shared: Arc::clone(shared),
            group,
            token,
            snapshot,
            unit,
        }
    }
}

async fn execute<S: RenderSurface>(cycle: &Cycle<S>) -> Result<CommitReport> {
    let shared = &cycle.shared;
    let payload = fetch(shared.engine.as_ref(), cycle.group, cycle.unit).await?;

    cycle.enter(CycleState::Committing);
    if let GroupPayload::Bolts { coordinates, .. } = &payload {
        let configured = cycle.snapshot.configuration.bolts.count as usize;
        if coordinates.len() != configured {
            debug!(
                "Engine placed {} bolts, configuration asks for {}",
                coordinates.len(),
                configured
            );
        }
    }
    let gamma = payload.gamma();
    let color = color_for(gamma)?;
    let solids = payload.build(color, &shared.options)?;
    commit(cycle, solids, gamma, color)
}

fn commit<S: RenderSurface>(
    cycle: &Cycle<S>,
    solids: Vec<ColoredSolid>,
    gamma: f64,
    color: Color,
) -> Result<CommitReport> {
    let shared = &cycle.shared;
    shared
        .sequence
        .commit_if_current(cycle.group, cycle.token, || {
            let handles = shared.scene.lock().commit_group(cycle.group, solids)?;
            Ok(CommitReport {
                group: cycle.group,
                token: cycle.token,
                revision: cycle.snapshot.revision,
                handles,
                gamma,
                color,
            })
        })
}

fn publish_outcome<S: RenderSurface>(cycle: &Cycle<S>, outcome: &Result<CommitReport>) {
    let (group, token) = (cycle.group, cycle.token);
    let event = match outcome {
        Ok(report) => {
            debug!(
                "Cycle {} #{} committed {} renderables (gamma {:.3})",
                group,
                token,
                report.renderables(),
                report.gamma
            );
            SceneEvent::Committed {
                group,
                token,
                renderables: report.renderables(),
                gamma: report.gamma,
            }
        }
        Err(Error::StaleCycleDiscarded { latest, .. }) => {
            debug!("Cycle {} #{} superseded by #{}", group, token, latest);
            SceneEvent::CycleDiscarded {
                group,
                token,
                latest: *latest,
            }
        }
        Err(err) => {
            warn!("Cycle {} #{} abandoned: {}", group, token, err);
            SceneEvent::CycleFailed {
                group,
                token,
                reason: err.to_string(),
            }
        }
    };
    // nobody listening is not an error for the pipeline
    let _ = cycle.shared.events.publish(AppEvent::Scene(event));
}
