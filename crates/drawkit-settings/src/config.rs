//! Configuration for the DrawKit selection tool
//!
//! Provides configuration file handling, defaults, and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Smart guide thresholds and colours
//! - Handle and rotation hotspot sizes
//! - Click timing (double-click, stacked-object cycling)
//! - Transform limits (rotation snap step, minimum scale)
//! - Clipboard paste offset
//! - Corner-radius drag throttling

use drawkit_core::ColorValue;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Default colour of ordinary alignment guides.
pub const DEFAULT_GUIDE_COLOR: u32 = 0xff3366;

/// Default colour of guides that show equal spacing.
pub const DEFAULT_EQUAL_SPACING_COLOR: u32 = 0x00b3ff;

/// Smart guide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideSettings {
    /// Show guides and snap to them while dragging
    pub enabled: bool,
    /// Distance (in reference-frame units) within which edges are considered aligned
    pub threshold: f64,
    /// Maximum spread between gaps for them to count as equal
    pub equal_tolerance: f64,
    /// Colour of alignment guides
    pub line_color: ColorValue,
    /// Colour of equal-spacing guides
    pub equal_spacing_color: ColorValue,
}

impl Default for GuideSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 6.0,
            equal_tolerance: 1.0,
            line_color: ColorValue::Text("#ff3366".to_string()),
            equal_spacing_color: ColorValue::Text("#00b3ff".to_string()),
        }
    }
}

impl GuideSettings {
    /// Resolved guide colour, falling back to the default when unparseable.
    pub fn line_color(&self) -> u32 {
        self.line_color.resolve_or(DEFAULT_GUIDE_COLOR)
    }

    /// Resolved equal-spacing colour, falling back to the default when unparseable.
    pub fn equal_spacing_color(&self) -> u32 {
        self.equal_spacing_color
            .resolve_or(DEFAULT_EQUAL_SPACING_COLOR)
    }
}

/// Selection frame handle settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleSettings {
    /// Side length of the square scale handles
    pub handle_size: f64,
    /// How far outside a corner the rotation hotspot reaches
    pub rotation_hotspot_reach: f64,
    /// Half-width of the rotation hotspot around the corner diagonal
    pub rotation_hotspot_width: f64,
}

impl Default for HandleSettings {
    fn default() -> Self {
        Self {
            handle_size: 8.0,
            rotation_hotspot_reach: 18.0,
            rotation_hotspot_width: 6.0,
        }
    }
}

/// Click timing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickSettings {
    /// Maximum interval between clicks on the same object to count as a double-click
    pub double_click_ms: u64,
    /// Window in which a repeated click at the same spot cycles through stacked objects
    pub cycle_window_ms: u64,
    /// Maximum pointer travel between clicks for them to count as "the same spot"
    pub cycle_tolerance: f64,
    /// Extra slop added around object bounds when hit-testing
    pub hit_tolerance: f64,
}

impl Default for ClickSettings {
    fn default() -> Self {
        Self {
            double_click_ms: 300,
            cycle_window_ms: 500,
            cycle_tolerance: 4.0,
            hit_tolerance: 0.0,
        }
    }
}

/// Transform gesture settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// Angular step used when the rotation snap modifier is held
    pub rotation_snap_degrees: f64,
    /// Smallest scale factor magnitude a drag may produce
    pub min_scale: f64,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            rotation_snap_degrees: 15.0,
            min_scale: 0.01,
        }
    }
}

impl TransformSettings {
    /// Rotation snap step in radians.
    pub fn rotation_snap_step(&self) -> f64 {
        self.rotation_snap_degrees.to_radians()
    }
}

/// Clipboard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardSettings {
    /// Offset added per successive paste of the same clipboard contents
    pub paste_offset: f64,
}

impl Default for ClipboardSettings {
    fn default() -> Self {
        Self { paste_offset: 10.0 }
    }
}

/// Corner-radius drag settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerRadiusSettings {
    /// Upper bound on redraws per second while dragging a corner radius
    pub max_updates_per_second: u32,
}

impl Default for CornerRadiusSettings {
    fn default() -> Self {
        Self {
            max_updates_per_second: 60,
        }
    }
}

impl CornerRadiusSettings {
    /// Minimum interval between redraws, in milliseconds.
    pub fn min_interval_ms(&self) -> u64 {
        1000 / u64::from(self.max_updates_per_second.max(1))
    }
}

/// Complete selection tool configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Smart guide settings
    pub guides: GuideSettings,
    /// Handle settings
    pub handles: HandleSettings,
    /// Click timing settings
    pub clicks: ClickSettings,
    /// Transform settings
    pub transform: TransformSettings,
    /// Clipboard settings
    pub clipboard: ClipboardSettings,
    /// Corner-radius drag settings
    pub corner_radius: CornerRadiusSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform-specific location of the settings file.
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string())
        })?;
        Ok(dir.join("drawkit").join("settings.toml"))
    }

    /// Load the config from the default location, falling back to defaults
    /// when it is missing or invalid.
    pub fn load_or_default() -> Self {
        let path = match Self::default_path() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("No config directory, using default settings: {}", e);
                return Self::default();
            }
        };
        if !path.exists() {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| SettingsError::SaveError(e.to_string()))?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.guides.threshold < 0.0 {
            return Err(out_of_range("guides.threshold", self.guides.threshold));
        }

        if self.guides.equal_tolerance < 0.0 {
            return Err(out_of_range(
                "guides.equal_tolerance",
                self.guides.equal_tolerance,
            ));
        }

        if self.handles.handle_size <= 0.0 {
            return Err(out_of_range("handles.handle_size", self.handles.handle_size));
        }

        if self.handles.rotation_hotspot_reach < 0.0 || self.handles.rotation_hotspot_width < 0.0 {
            return Err(SettingsError::InvalidSetting {
                key: "handles.rotation_hotspot".to_string(),
                reason: "hotspot dimensions must be >= 0".to_string(),
            });
        }

        if self.clicks.double_click_ms == 0 {
            return Err(out_of_range("clicks.double_click_ms", self.clicks.double_click_ms));
        }

        if self.transform.rotation_snap_degrees <= 0.0 || self.transform.rotation_snap_degrees > 180.0
        {
            return Err(out_of_range(
                "transform.rotation_snap_degrees",
                self.transform.rotation_snap_degrees,
            ));
        }

        if self.transform.min_scale <= 0.0 {
            return Err(out_of_range("transform.min_scale", self.transform.min_scale));
        }

        if self.corner_radius.max_updates_per_second == 0 {
            return Err(out_of_range(
                "corner_radius.max_updates_per_second",
                self.corner_radius.max_updates_per_second,
            ));
        }

        Ok(())
    }
}

/// On-disk config format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into()),
        }
    }
}

fn out_of_range(key: &str, value: impl ToString) -> SettingsError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}
