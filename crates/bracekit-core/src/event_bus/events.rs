//! Event type definitions for the event bus.

use serde::{Deserialize, Serialize};

use crate::data::Group;

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// A configuration value was pushed to the engine
    Configuration(ConfigurationEvent),
    /// Outcome of a recompute cycle
    Scene(SceneEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Configuration(_) => EventCategory::Configuration,
            AppEvent::Scene(_) => EventCategory::Scene,
        }
    }

    /// Group a scene event refers to; configuration events have none
    pub fn group(&self) -> Option<Group> {
        match self {
            AppEvent::Configuration(_) => None,
            AppEvent::Scene(e) => Some(e.group()),
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Configuration(e) => e.description(),
            AppEvent::Scene(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Configuration change events.
    Configuration,
    /// Scene commit and cycle outcome events.
    Scene,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Configuration => write!(f, "Configuration"),
            EventCategory::Scene => write!(f, "Scene"),
        }
    }
}

/// Configuration-related events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfigurationEvent {
    /// Section selection changed.
    SectionChanged {
        /// New section identifier.
        section: String,
    },
    /// Member material changed.
    MaterialChanged {
        /// New material identifier.
        material: String,
    },
    /// Bolt specification changed.
    BoltsChanged {
        /// Bolt diameter identifier.
        diameter: String,
        /// Bolt count per gauge line.
        count: u32,
    },
    /// Gusset plate specification changed.
    GussetPlateChanged {
        /// Plate thickness in mm.
        thickness_mm: f64,
        /// Plate length in mm.
        length_mm: f64,
    },
    /// Applied load changed.
    LoadChanged {
        /// Axial force in kN.
        load_kn: f64,
    },
}

impl ConfigurationEvent {
    fn description(&self) -> String {
        match self {
            ConfigurationEvent::SectionChanged { section } => format!("Section: {}", section),
            ConfigurationEvent::MaterialChanged { material } => format!("Material: {}", material),
            ConfigurationEvent::BoltsChanged { diameter, count } => {
                format!("Bolts: {} x{}", diameter, count)
            }
            ConfigurationEvent::GussetPlateChanged {
                thickness_mm,
                length_mm,
            } => format!("Gusset plate: t={} L={}", thickness_mm, length_mm),
            ConfigurationEvent::LoadChanged { load_kn } => format!("Load: {} kN", load_kn),
        }
    }
}

/// Recompute outcome events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// A cycle replaced the displayed geometry of its group.
    Committed {
        /// Group that was committed.
        group: Group,
        /// Sequence token of the committed cycle.
        token: u64,
        /// Number of renderables now displayed for the group.
        renderables: usize,
        /// Utilization ratio the group was colored by.
        gamma: f64,
    },
    /// A cycle was abandoned; the previous geometry stays displayed.
    CycleFailed {
        /// Group of the abandoned cycle.
        group: Group,
        /// Sequence token of the abandoned cycle.
        token: u64,
        /// Error message.
        reason: String,
    },
    /// A cycle finished after a newer one had committed and was dropped.
    CycleDiscarded {
        /// Group of the discarded cycle.
        group: Group,
        /// Sequence token of the discarded cycle.
        token: u64,
        /// Newest token already committed for the group.
        latest: u64,
    },
}

impl SceneEvent {
    pub fn group(&self) -> Group {
        match self {
            SceneEvent::Committed { group, .. }
            | SceneEvent::CycleFailed { group, .. }
            | SceneEvent::CycleDiscarded { group, .. } => *group,
        }
    }

    pub fn token(&self) -> u64 {
        match self {
            SceneEvent::Committed { token, .. }
            | SceneEvent::CycleFailed { token, .. }
            | SceneEvent::CycleDiscarded { token, .. } => *token,
        }
    }

    fn description(&self) -> String {
        match self {
            SceneEvent::Committed {
                group,
                token,
                renderables,
                gamma,
            } => format!(
                "Committed {} #{}: {} renderables, gamma {:.3}",
                group, token, renderables, gamma
            ),
            SceneEvent::CycleFailed {
                group,
                token,
                reason,
            } => format!("Cycle {} #{} failed: {}", group, token, reason),
            SceneEvent::CycleDiscarded {
                group,
                token,
                latest,
            } => format!("Cycle {} #{} superseded by #{}", group, token, latest),
        }
    }
}
