//! Unit conversion utilities
//!
//! The engine reports lengths in a single declared unit; geometry is always
//! built in millimeters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length unit used by the engine's length-bearing responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Millimeters
    Millimeter,
    /// Meters
    Meter,
}

impl Default for LengthUnit {
    fn default() -> Self {
        Self::Millimeter
    }
}

impl LengthUnit {
    /// Multiplier that converts a value in this unit to millimeters
    pub fn mm_factor(self) -> f64 {
        match self {
            Self::Millimeter => 1.0,
            Self::Meter => 1000.0,
        }
    }

    /// Convert a value in this unit to millimeters
    pub fn to_mm(self, value: f64) -> f64 {
        value * self.mm_factor()
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millimeter => write!(f, "mm"),
            Self::Meter => write!(f, "m"),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" => Ok(Self::Millimeter),
            "m" | "meter" | "meters" => Ok(Self::Meter),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}
