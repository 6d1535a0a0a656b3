//! Per-group fetch and build steps of one recompute cycle
//!
//! All engine calls of a group are issued together, so they observe the
//! engine state at the moment the cycle starts running. Lengths are
//! converted to millimeters right after they arrive.

use super::PipelineOptions;
use bracekit_communication::EngineClient;
use bracekit_core::{
    BoltCoordinate, BoltDimensions, EngineError, Group, LengthUnit, ProfilePolyline, Result,
    SectionProfile, UtilizationResult,
};
use bracekit_visualizer::{bolt_head, extrude, Color, ColoredSolid, Placement};
use tracing::trace;

/// Engine responses for one group, lengths in millimeters
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GroupPayload {
    Base {
        section: SectionProfile,
        joint_length: f64,
        utilization: UtilizationResult,
    },
    Bolts {
        coordinates: Vec<BoltCoordinate>,
        dimensions: BoltDimensions,
        section_thickness: f64,
        utilization: UtilizationResult,
    },
    GussetPlate {
        profile: ProfilePolyline,
        thickness: f64,
        utilization: UtilizationResult,
    },
}

pub(crate) async fn fetch(
    engine: &dyn EngineClient,
    group: Group,
    unit: LengthUnit,
) -> std::result::Result<GroupPayload, EngineError> {
    let factor = unit.mm_factor();
    let payload = match group {
        Group::Base => {
            let (section, joint_length, utilization) = tokio::try_join!(
                engine.section_profile(),
                engine.joint_length(),
                engine.calculate_base(),
            )?;
            GroupPayload::Base {
                section: SectionProfile {
                    kind: section.kind,
                    polyline: section.polyline.scaled(factor),
                },
                joint_length: joint_length * factor,
                utilization,
            }
        }
        Group::Bolts => {
            let (coordinates, dimensions, section_thickness, utilization) = tokio::try_join!(
                engine.bolt_coordinates(),
                engine.bolt_dimensions(),
                engine.section_thickness(),
                engine.calculate_bolts(),
            )?;
            GroupPayload::Bolts {
                coordinates: coordinates.into_iter().map(|c| c.scaled(factor)).collect(),
                dimensions: dimensions.scaled(factor),
                section_thickness: section_thickness * factor,
                utilization,
            }
        }
        Group::GussetPlate => {
            let (profile, thickness, utilization) = tokio::try_join!(
                engine.gusset_plate_profile(),
                engine.gusset_plate_thickness(),
                engine.calculate_gusset_plate(),
            )?;
            GroupPayload::GussetPlate {
                profile: profile.scaled(factor),
                thickness: thickness * factor,
                utilization,
            }
        }
    };
    trace!("Fetched {} payload in {}", group, unit);
    Ok(payload)
}

impl GroupPayload {
    pub(crate) fn gamma(&self) -> f64 {
        match self {
            GroupPayload::Base { utilization, .. }
            | GroupPayload::Bolts { utilization, .. }
            | GroupPayload::GussetPlate { utilization, .. } => utilization.gamma,
        }
    }

    /// Solids of the group in role order, all tinted with `color`
    pub(crate) fn build(
        &self,
        color: Color,
        options: &PipelineOptions,
    ) -> Result<Vec<ColoredSolid>> {
        let solids = match self {
            GroupPayload::Base {
                section,
                joint_length,
                ..
            } => {
                let depth = options.base_length_mm + joint_length;
                let solid = extrude(section.polyline.clone(), depth)?;
                trace!("Base {} swept by {} mm", section.kind, depth);
                vec![ColoredSolid::new(
                    solid,
                    Placement::member(options.base_length_mm),
                    color,
                )]
            }
            GroupPayload::Bolts {
                coordinates,
                dimensions,
                section_thickness,
                ..
            } => {
                let seat = if options.bolt_standoff {
                    *section_thickness
                } else {
                    0.0
                };
                coordinates
                    .iter()
                    .map(|c| {
                        Ok(ColoredSolid::new(
                            bolt_head(*dimensions)?,
                            Placement::bolt(seat, c.axial, c.transverse),
                            color,
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?
            }
            GroupPayload::GussetPlate {
                profile, thickness, ..
            } => vec![ColoredSolid::new(
                extrude(profile.clone(), *thickness)?,
                Placement::gusset_plate(),
                color,
            )],
        };
        Ok(solids)
    }
}
