//! DrawKit Settings Crate
//!
//! Handles selection tool configuration: defaults, validation, and
//! persistence as TOML or JSON.

pub mod config;
pub mod error;

pub use config::{
    ClickSettings, ClipboardSettings, Config, CornerRadiusSettings, GuideSettings,
    HandleSettings, TransformSettings, DEFAULT_EQUAL_SPACING_COLOR, DEFAULT_GUIDE_COLOR,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
