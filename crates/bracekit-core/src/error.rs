//! Error handling for BraceKit
//!
//! Provides error types for every layer of the recompute pipeline:
//! - Geometry errors (profile validation, extrusion)
//! - Color errors (utilization ratio mapping)
//! - Engine errors (calls to the external calculation engine)
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::data::Group;
use thiserror::Error;

/// Geometry error type
///
/// Raised when a profile or an extrusion request cannot produce a solid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Non-positive depth or width, non-finite coordinates, empty outline
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry {
        /// What made the geometry degenerate.
        reason: String,
    },
}

impl GeometryError {
    /// Create an invalid-geometry error with the given reason
    pub fn invalid(reason: impl Into<String>) -> Self {
        GeometryError::InvalidGeometry {
            reason: reason.into(),
        }
    }
}

/// Color mapping error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    /// Negative utilization ratios have no physical meaning
    #[error("Invalid utilization ratio: {rate}")]
    InvalidUtilization {
        /// The rejected ratio.
        rate: f64,
    },
}

/// Engine error type
///
/// Represents failures reported by, or while talking to, the external
/// structural calculation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The engine answered a call with an application error
    #[error("Engine call '{call}' failed: {reason}")]
    CallFailed {
        /// Name of the engine call.
        call: String,
        /// The reason reported by the engine.
        reason: String,
    },

    /// The request never reached the engine or the reply was lost
    #[error("Engine transport error: {reason}")]
    Transport {
        /// The reason for the transport failure.
        reason: String,
    },
}

impl EngineError {
    /// Create a call failure for the named engine call
    pub fn call_failed(call: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::CallFailed {
            call: call.into(),
            reason: reason.into(),
        }
    }
}

/// Main error type for BraceKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Color error
    #[error(transparent)]
    Color(#[from] ColorError),

    /// Engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A newer cycle already committed for this group; not user-visible
    #[error("Cycle {token} for {group} discarded, token {latest} already committed")]
    StaleCycleDiscarded {
        /// The group the cycle was computing.
        group: Group,
        /// The discarded cycle's token.
        token: u64,
        /// The newest token committed for the group.
        latest: u64,
    },

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is the internal stale-cycle outcome
    pub fn is_stale(&self) -> bool {
        matches!(self, Error::StaleCycleDiscarded { .. })
    }

    /// Check if this is an engine error
    pub fn is_engine_error(&self) -> bool {
        matches!(self, Error::Engine(_))
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }

    /// Check if this is a color error
    pub fn is_color_error(&self) -> bool {
        matches!(self, Error::Color(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
