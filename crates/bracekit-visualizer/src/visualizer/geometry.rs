//! # Geometry Builder
//!
//! Pure functions from 2D profiles to extruded solids. Profiles lie in the
//! local XY plane and are swept along local +Z; a [`Placement`] moves the
//! solid into model space. All lengths are millimeters.
//!
//! Model space: Z runs along the brace axis (joint region at `z >= 0`),
//! Y is transverse across the connected flange, X is normal to it.

use bracekit_core::{BoltDimensions, GeometryError, ProfilePolyline};
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::FRAC_PI_2;
use tracing::trace;

/// A closed profile swept by a positive depth; no bevel
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrudedSolid {
    profile: ProfilePolyline,
    depth: f64,
}

impl ExtrudedSolid {
    /// The swept outline, exactly as it was supplied
    pub fn footprint(&self) -> &ProfilePolyline {
        &self.profile
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }
}

/// Sweep `profile` by `depth` along local +Z
pub fn extrude(profile: ProfilePolyline, depth: f64) -> Result<ExtrudedSolid, GeometryError> {
    if !depth.is_finite() || depth <= 0.0 {
        return Err(GeometryError::invalid(format!(
            "extrusion depth must be positive, got {}",
            depth
        )));
    }
    profile.validate()?;
    Ok(ExtrudedSolid { profile, depth })
}

/// Bolt head outline: a hexagon approximation centered on the local origin
///
/// Seven vertices, starting on the +X flat at `(b/2, 0)`. `height` is the
/// extrusion depth the outline is meant for; it does not shape the outline.
pub fn hex_bolt_profile(height: f64, width: f64) -> Result<ProfilePolyline, GeometryError> {
    if !width.is_finite() || width <= 0.0 {
        return Err(GeometryError::invalid(format!(
            "bolt head width must be positive, got {}",
            width
        )));
    }
    let half = width / 2.0;
    let flat = width / (2.0 * 3f64.sqrt());
    trace!("Bolt head outline b={} for h={}", width, height);

    ProfilePolyline::new(
        (half, 0.0),
        vec![
            (half, flat),
            (0.0, half),
            (-half, flat),
            (-half, -flat),
            (0.0, -half),
            (half, -flat),
        ],
    )
}

/// Bolt head solid: the hex outline extruded by the head height
pub fn bolt_head(dimensions: BoltDimensions) -> Result<ExtrudedSolid, GeometryError> {
    let profile = hex_bolt_profile(dimensions.height, dimensions.width)?;
    extrude(profile, dimensions.height)
}

/// Rigid transform from a solid's local frame to model space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Placement {
    pub const IDENTITY: Placement = Placement {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    /// Section profile swept along the member axis, starting `setback`
    /// before the joint
    pub fn member(setback: f64) -> Self {
        Self {
            rotation: Quat::IDENTITY,
            translation: Vec3::new(0.0, 0.0, -(setback as f32)),
        }
    }

    /// Bolt head with its axis along +X, seated at `seat` above the flange
    /// back, at the given (axial, transverse) position
    pub fn bolt(seat: f64, axial: f64, transverse: f64) -> Self {
        Self {
            rotation: Quat::from_rotation_y(FRAC_PI_2),
            translation: Vec3::new(seat as f32, transverse as f32, axial as f32),
        }
    }

    /// Gusset plate in the (axial, transverse) plane, thickness toward -X
    pub fn gusset_plate() -> Self {
        Self {
            rotation: Quat::from_rotation_y(-FRAC_PI_2),
            translation: Vec3::ZERO,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    pub fn transform_normal(&self, normal: Vec3) -> Vec3 {
        self.rotation * normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gusset_outline() -> ProfilePolyline {
        ProfilePolyline::from_points(vec![
            (0.0, 40.0),
            (160.0, 150.0),
            (200.0, 150.0),
            (200.0, -150.0),
            (160.0, -150.0),
            (0.0, -40.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_extrude_rejects_non_positive_depth() {
        for depth in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                extrude(gusset_outline(), depth),
                Err(GeometryError::InvalidGeometry { .. })
            ));
        }
    }

    #[test]
    fn test_extrude_keeps_footprint_exactly() {
        let profile = gusset_outline();
        let solid = extrude(profile.clone(), 500.0).unwrap();
        assert_eq!(solid.depth(), 500.0);
        assert_eq!(solid.footprint(), &profile);
        assert_eq!(solid.footprint().vertex_count(), 6);
    }

    #[test]
    fn test_hex_profile_shape() {
        let profile = hex_bolt_profile(20.0, 16.0).unwrap();
        let points: Vec<(f64, f64)> = profile.points().collect();
        assert_eq!(points.len(), 7);
        assert_eq!(points[0], (8.0, 0.0));
        assert_eq!(points[2], (0.0, 8.0));

        let flat = 8.0 / 3f64.sqrt();
        assert!((points[1].1 - flat).abs() < 1e-12);

        // symmetric about the local x-axis
        for &(x, y) in &points {
            assert!(points
                .iter()
                .any(|&(mx, my)| (mx - x).abs() < 1e-12 && (my + y).abs() < 1e-12));
        }
    }

    #[test]
    fn test_hex_profile_degenerate_width() {
        assert!(hex_bolt_profile(20.0, 0.0).is_err());
        assert!(hex_bolt_profile(20.0, -16.0).is_err());
    }

    #[test]
    fn test_bolt_head_depth_is_height() {
        let solid = bolt_head(BoltDimensions::new(13.0, 32.0)).unwrap();
        assert_eq!(solid.depth(), 13.0);
        assert_eq!(solid.footprint().vertex_count(), 7);
        assert!(bolt_head(BoltDimensions::new(0.0, 32.0)).is_err());
    }

    #[test]
    fn test_placements() {
        let member = Placement::member(1000.0);
        assert_eq!(
            member.transform_point(Vec3::new(0.0, 0.0, 1200.0)),
            Vec3::new(0.0, 0.0, 200.0)
        );

        let bolt = Placement::bolt(6.0, 40.0, 0.0);
        let tip = bolt.transform_point(Vec3::new(0.0, 0.0, 13.0));
        assert!((tip - Vec3::new(19.0, 0.0, 40.0)).length() < 1e-4);

        let plate = Placement::gusset_plate();
        let corner = plate.transform_point(Vec3::new(200.0, 150.0, 9.0));
        assert!((corner - Vec3::new(-9.0, 150.0, 200.0)).length() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_extrude_footprint_fidelity(
            points in prop::collection::vec((-1.0e4f64..1.0e4, -1.0e4f64..1.0e4), 2..12),
            depth in 1.0e-3f64..1.0e5,
        ) {
            let profile = ProfilePolyline::from_points(points.clone()).unwrap();
            let solid = extrude(profile, depth).unwrap();
            let footprint: Vec<(f64, f64)> = solid.footprint().points().collect();
            prop_assert_eq!(footprint, points);
        }
    }
}
