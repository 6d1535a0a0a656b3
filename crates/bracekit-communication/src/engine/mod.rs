//! Engine client interface
//!
//! Implemented by the transport that reaches the calculation engine (IPC,
//! HTTP, in-process). Every call may suspend, and calls issued by different
//! recompute cycles can complete in any order.

mod noop;

pub use noop::NoOpEngine;

use async_trait::async_trait;
use bracekit_core::{
    BoltCoordinate, BoltDimensions, EngineError, LengthUnit, ProfilePolyline, SectionProfile,
    UtilizationResult,
};
use serde::{Deserialize, Serialize};

/// Names of the engine calls, used in logs and error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineCall {
    ListSections,
    ListMaterials,
    ListBoltDiameters,
    ListBoltMaterials,
    SetSection,
    SetMaterial,
    SetBolts,
    SetGussetPlate,
    SetLoad,
    GetSectionProfile,
    GetJointLength,
    GetBoltCoordinates,
    GetBoltDimensions,
    GetSectionThickness,
    GetGussetPlateProfile,
    GetGussetPlateThickness,
    CalculateBase,
    CalculateBolts,
    CalculateGussetPlate,
}

impl EngineCall {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListSections => "list_sections",
            Self::ListMaterials => "list_materials",
            Self::ListBoltDiameters => "list_bolt_diameters",
            Self::ListBoltMaterials => "list_bolt_materials",
            Self::SetSection => "set_section",
            Self::SetMaterial => "set_material",
            Self::SetBolts => "set_bolts",
            Self::SetGussetPlate => "set_gpl",
            Self::SetLoad => "set_force_in_kn",
            Self::GetSectionProfile => "get_section",
            Self::GetJointLength => "get_joint_length",
            Self::GetBoltCoordinates => "get_bolt_coord_list",
            Self::GetBoltDimensions => "get_bolt_dimension",
            Self::GetSectionThickness => "get_section_thickness",
            Self::GetGussetPlateProfile => "get_gpl_shape",
            Self::GetGussetPlateThickness => "get_gpl_thickness",
            Self::CalculateBase => "calculate_base",
            Self::CalculateBolts => "calculate_bolts",
            Self::CalculateGussetPlate => "calculate_gpl",
        }
    }

    /// Error for this call with the given reason
    pub fn failed(self, reason: impl Into<String>) -> EngineError {
        EngineError::call_failed(self.as_str(), reason)
    }
}

impl std::fmt::Display for EngineCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client of the structural calculation engine
///
/// Length-bearing responses are expressed in [`EngineClient::length_unit`].
/// Inputs of the `set_*` calls are always millimeters and kN.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Unit of every length the engine returns
    fn length_unit(&self) -> LengthUnit {
        LengthUnit::Millimeter
    }

    async fn list_sections(&self) -> Result<Vec<String>, EngineError>;
    async fn list_materials(&self) -> Result<Vec<String>, EngineError>;
    async fn list_bolt_diameters(&self) -> Result<Vec<String>, EngineError>;
    async fn list_bolt_materials(&self) -> Result<Vec<String>, EngineError>;

    async fn set_section(&self, name: &str) -> Result<(), EngineError>;
    async fn set_material(&self, name: &str) -> Result<(), EngineError>;
    async fn set_bolts(
        &self,
        material: &str,
        diameter: &str,
        count: u32,
    ) -> Result<(), EngineError>;
    async fn set_gusset_plate(
        &self,
        thickness_mm: f64,
        length_mm: f64,
        material: &str,
    ) -> Result<(), EngineError>;
    async fn set_load_kn(&self, load_kn: f64) -> Result<(), EngineError>;

    async fn section_profile(&self) -> Result<SectionProfile, EngineError>;
    async fn joint_length(&self) -> Result<f64, EngineError>;
    /// Ordered (axial, transverse) bolt positions
    async fn bolt_coordinates(&self) -> Result<Vec<BoltCoordinate>, EngineError>;
    /// Bolt head (height, width)
    async fn bolt_dimensions(&self) -> Result<BoltDimensions, EngineError>;
    async fn section_thickness(&self) -> Result<f64, EngineError>;
    async fn gusset_plate_profile(&self) -> Result<ProfilePolyline, EngineError>;
    async fn gusset_plate_thickness(&self) -> Result<f64, EngineError>;

    async fn calculate_base(&self) -> Result<UtilizationResult, EngineError>;
    async fn calculate_bolts(&self) -> Result<UtilizationResult, EngineError>;
    async fn calculate_gusset_plate(&self) -> Result<UtilizationResult, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_names() {
        assert_eq!(EngineCall::GetBoltCoordinates.to_string(), "get_bolt_coord_list");
        let err = EngineCall::CalculateGussetPlate.failed("no plate");
        assert_eq!(
            err,
            EngineError::CallFailed {
                call: "calculate_gpl".to_string(),
                reason: "no plate".to_string(),
            }
        );
    }
}
