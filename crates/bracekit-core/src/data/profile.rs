//! Parametric payloads returned by the calculation engine.
//!
//! Lengths are in whatever unit the engine declares; [`ProfilePolyline::scaled`]
//! and friends convert a whole payload at once so that one cycle never mixes
//! units.

use crate::error::GeometryError;
use serde::{Deserialize, Serialize};

/// One closed cross-section outline: a start point plus the points that follow it.
///
/// The loop is implicitly closed back to `start_point` by the extrusion step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePolyline {
    start_point: (f64, f64),
    next_points: Vec<(f64, f64)>,
}

impl ProfilePolyline {
    /// Create a polyline, validating that it has a successor point and
    /// finite coordinates
    pub fn new(
        start_point: (f64, f64),
        next_points: Vec<(f64, f64)>,
    ) -> Result<Self, GeometryError> {
        let polyline = Self {
            start_point,
            next_points,
        };
        polyline.validate()?;
        Ok(polyline)
    }

    /// Create a polyline from an ordered point list; the first point is the start
    pub fn from_points(points: Vec<(f64, f64)>) -> Result<Self, GeometryError> {
        let mut iter = points.into_iter();
        let start = iter
            .next()
            .ok_or_else(|| GeometryError::invalid("polyline has no points"))?;
        Self::new(start, iter.collect())
    }

    /// Check the invariants; payloads deserialized from the engine go through here
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.next_points.is_empty() {
            return Err(GeometryError::invalid(
                "polyline needs at least one point after the start point",
            ));
        }
        let finite = self
            .points()
            .all(|(x, y)| x.is_finite() && y.is_finite());
        if !finite {
            return Err(GeometryError::invalid("polyline has non-finite coordinates"));
        }
        Ok(())
    }

    pub fn start_point(&self) -> (f64, f64) {
        self.start_point
    }

    pub fn next_points(&self) -> &[(f64, f64)] {
        &self.next_points
    }

    /// All vertices in order, starting with the start point
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        std::iter::once(self.start_point).chain(self.next_points.iter().copied())
    }

    /// Number of vertices including the start point
    pub fn vertex_count(&self) -> usize {
        self.next_points.len() + 1
    }

    /// Vertices of the closed loop with a trailing point equal to the start
    /// removed, if the outline repeats it explicitly
    pub fn loop_points(&self) -> Vec<(f64, f64)> {
        let mut points: Vec<(f64, f64)> = self.points().collect();
        if points.len() > 1 && points.last() == Some(&self.start_point) {
            points.pop();
        }
        points
    }

    /// Multiply every coordinate by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |(x, y): (f64, f64)| (x * factor, y * factor);
        Self {
            start_point: scale(self.start_point),
            next_points: self.next_points.iter().copied().map(scale).collect(),
        }
    }

    /// Axis-aligned bounds as ((min_x, min_y), (max_x, max_y))
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        self.points().fold(
            (self.start_point, self.start_point),
            |((min_x, min_y), (max_x, max_y)), (x, y)| {
                ((min_x.min(x), min_y.min(y)), (max_x.max(x), max_y.max(y)))
            },
        )
    }
}

/// Family of a steel cross-section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Cut tee, named `CT-...`
    CutTee,
    /// Equal or unequal angle, named `L-...`
    Angle,
    /// Channel, named `[-...`
    Channel,
}

impl SectionKind {
    /// Derive the kind from a catalog section name
    pub fn from_section_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.starts_with("CT") {
            Some(Self::CutTee)
        } else if name.starts_with('L') {
            Some(Self::Angle)
        } else if name.starts_with('[') || name.starts_with('C') {
            Some(Self::Channel)
        } else {
            None
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CutTee => write!(f, "cut tee"),
            Self::Angle => write!(f, "angle"),
            Self::Channel => write!(f, "channel"),
        }
    }
}

/// Section outline tagged with its section family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionProfile {
    pub kind: SectionKind,
    pub polyline: ProfilePolyline,
}

/// Bolt position on the connected flange: (axial, transverse)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltCoordinate {
    pub axial: f64,
    pub transverse: f64,
}

impl BoltCoordinate {
    pub fn new(axial: f64, transverse: f64) -> Self {
        Self { axial, transverse }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.axial * factor, self.transverse * factor)
    }
}

impl From<(f64, f64)> for BoltCoordinate {
    fn from((axial, transverse): (f64, f64)) -> Self {
        Self::new(axial, transverse)
    }
}

/// Bolt head dimensions: extrusion height and across-flats width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltDimensions {
    pub height: f64,
    pub width: f64,
}

impl BoltDimensions {
    pub fn new(height: f64, width: f64) -> Self {
        Self { height, width }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.height * factor, self.width * factor)
    }
}

impl From<(f64, f64)> for BoltDimensions {
    fn from((height, width): (f64, f64)) -> Self {
        Self::new(height, width)
    }
}

/// Utilization of one component group; `gamma == 1.0` is exactly at capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationResult {
    pub gamma: f64,
    /// Label of the check that produced the ratio, when the engine provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UtilizationResult {
    pub fn new(gamma: f64) -> Self {
        Self { gamma, name: None }
    }

    pub fn is_overstressed(&self) -> bool {
        self.gamma >= 1.0
    }
}
