//! BraceKit Settings Crate
//!
//! Viewer settings: scene layout, engine unit, event bus sizing and logging.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, EngineSettings, EventSettings, LoggingSettings, SceneSettings,
    ViewerSettings,
};
pub use error::{SettingsError, SettingsResult};
