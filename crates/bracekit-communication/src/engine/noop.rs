use super::{EngineCall, EngineClient};
use async_trait::async_trait;
use bracekit_core::{
    BoltCoordinate, BoltDimensions, EngineError, ProfilePolyline, SectionProfile,
    UtilizationResult,
};

/// Engine stand-in used before a real engine is attached
///
/// Accepts every `set_*` call and fails every query, so recompute cycles
/// are abandoned and nothing is displayed.
#[derive(Debug, Default, Clone)]
pub struct NoOpEngine;

impl NoOpEngine {
    pub fn new() -> Self {
        Self
    }

    fn detached<T>(call: EngineCall) -> Result<T, EngineError> {
        tracing::debug!("{} ignored: no engine attached", call);
        Err(call.failed("no engine attached"))
    }
}

#[async_trait]
impl EngineClient for NoOpEngine {
    async fn list_sections(&self) -> Result<Vec<String>, EngineError> {
        Ok(Vec::new())
    }

    async fn list_materials(&self) -> Result<Vec<String>, EngineError> {
        Ok(Vec::new())
    }

    async fn list_bolt_diameters(&self) -> Result<Vec<String>, EngineError> {
        Ok(Vec::new())
    }

    async fn list_bolt_materials(&self) -> Result<Vec<String>, EngineError> {
        Ok(Vec::new())
    }

    async fn set_section(&self, _name: &str) -> Result<(), EngineError> {
        Ok(())
    }

    async fn set_material(&self, _name: &str) -> Result<(), EngineError> {
        Ok(())
    }

    async fn set_bolts(
        &self,
        _material: &str,
        _diameter: &str,
        _count: u32,
    ) -> Result<(), EngineError> {
        Ok(())
    }

    async fn set_gusset_plate(
        &self,
        _thickness_mm: f64,
        _length_mm: f64,
        _material: &str,
    ) -> Result<(), EngineError> {
        Ok(())
    }

    async fn set_load_kn(&self, _load_kn: f64) -> Result<(), EngineError> {
        Ok(())
    }

    async fn section_profile(&self) -> Result<SectionProfile, EngineError> {
        Self::detached(EngineCall::GetSectionProfile)
    }

    async fn joint_length(&self) -> Result<f64, EngineError> {
        Self::detached(EngineCall::GetJointLength)
    }

    async fn bolt_coordinates(&self) -> Result<Vec<BoltCoordinate>, EngineError> {
        Self::detached(EngineCall::GetBoltCoordinates)
    }

    async fn bolt_dimensions(&self) -> Result<BoltDimensions, EngineError> {
        Self::detached(EngineCall::GetBoltDimensions)
    }

    async fn section_thickness(&self) -> Result<f64, EngineError> {
        Self::detached(EngineCall::GetSectionThickness)
    }

    async fn gusset_plate_profile(&self) -> Result<ProfilePolyline, EngineError> {
        Self::detached(EngineCall::GetGussetPlateProfile)
    }

    async fn gusset_plate_thickness(&self) -> Result<f64, EngineError> {
        Self::detached(EngineCall::GetGussetPlateThickness)
    }

    async fn calculate_base(&self) -> Result<UtilizationResult, EngineError> {
        Self::detached(EngineCall::CalculateBase)
    }

    async fn calculate_bolts(&self) -> Result<UtilizationResult, EngineError> {
        Self::detached(EngineCall::CalculateBolts)
    }

    async fn calculate_gusset_plate(&self) -> Result<UtilizationResult, EngineError> {
        Self::detached(EngineCall::CalculateGussetPlate)
    }
}
