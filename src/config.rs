//! Configuration file support for thermview.
//!
//! Settings are stored as versioned JSON. Every field has a default, so a
//! partial file only overrides what it names.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_OPERATOR, FALLBACK_IMAGE_SIZE, HANDLE_HIT_RADIUS, MIN_REGION_SIZE,
};
use crate::view_transform::ZoomLimits;

/// Log level setting for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Get all log levels in order from least to most verbose.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    /// One step more verbose, saturating at trace.
    pub fn more_verbose(&self) -> Self {
        match self {
            LogLevel::Error => LogLevel::Warn,
            LogLevel::Warn => LogLevel::Info,
            LogLevel::Info => LogLevel::Debug,
            LogLevel::Debug | LogLevel::Trace => LogLevel::Trace,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    /// Parse a level name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::all()
            .iter()
            .copied()
            .find(|level| level.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = LogLevel::all().iter().map(|l| l.name()).collect();
                format!("unknown log level '{}', expected one of {}", s, names.join(", "))
            })
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Version of the configuration file format
    pub version: u32,

    #[serde(default)]
    pub preferences: Preferences,

    #[serde(default)]
    pub interaction: InteractionConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Actor recorded for drawn and deleted regions
    #[serde(default = "default_operator")]
    pub operator: String,
}

fn default_operator() -> String {
    DEFAULT_OPERATOR.to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            operator: default_operator(),
        }
    }
}

/// Pointer interaction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Minimum region width and height in image pixels
    #[serde(default = "default_min_region_size")]
    pub min_region_size: f32,

    /// Grab radius of resize handles in screen pixels
    #[serde(default = "default_handle_hit_radius")]
    pub handle_hit_radius: f32,

    #[serde(default)]
    pub zoom: ZoomLimits,
}

fn default_min_region_size() -> f32 {
    MIN_REGION_SIZE
}

fn default_handle_hit_radius() -> f32 {
    HANDLE_HIT_RADIUS
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_region_size: default_min_region_size(),
            handle_hit_radius: default_handle_hit_radius(),
            zoom: ZoomLimits::default(),
        }
    }
}

/// Detection and re-analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Image size assumed when the detector reports none
    #[serde(default = "default_fallback_image_size")]
    pub fallback_image_size: [f32; 2],

    /// Keep manual regions when a new analysis replaces detected ones
    #[serde(default = "default_preserve_manual")]
    pub preserve_manual_on_reanalysis: bool,

    #[serde(default)]
    pub detector: DetectorConfig,
}

fn default_fallback_image_size() -> [f32; 2] {
    [FALLBACK_IMAGE_SIZE.0, FALLBACK_IMAGE_SIZE.1]
}

fn default_preserve_manual() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fallback_image_size: default_fallback_image_size(),
            preserve_manual_on_reanalysis: default_preserve_manual(),
            detector: DetectorConfig::default(),
        }
    }
}

/// How to launch the analysis script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Interpreter or executable
    #[serde(default = "default_program")]
    pub program: String,

    /// Script passed as the first argument
    #[serde(default = "default_script")]
    pub script: PathBuf,
}

fn default_program() -> String {
    "python3".to_string()
}

fn default_script() -> PathBuf {
    PathBuf::from("analyze.py")
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            script: default_script(),
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: Preferences::default(),
            interaction: InteractionConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zoom = &self.interaction.zoom;
        let zoom_ok = zoom.min > 0.0 && zoom.max >= zoom.min && zoom.step > 0.0;
        if !zoom_ok {
            return Err(ConfigError::InvalidValue(format!(
                "zoom limits min={} max={} step={}",
                zoom.min, zoom.max, zoom.step
            )));
        }
        let min = self.interaction.min_region_size;
        if min.is_nan() || min < 0.0 {
            return Err(ConfigError::InvalidValue(format!("min_region_size={}", min)));
        }
        let [w, h] = self.analysis.fallback_image_size;
        let size_ok = w > 0.0 && h > 0.0;
        if !size_ok {
            return Err(ConfigError::InvalidValue(format!(
                "fallback_image_size=[{}, {}]",
                w, h
            )));
        }
        Ok(())
    }

    /// Read and parse a configuration file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "thermview-config.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("thermview").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("thermview")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(&path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A setting is out of range
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.preferences.operator, "Manual User");
        assert_eq!(config.interaction.min_region_size, 5.0);
        assert_eq!(config.interaction.handle_hit_radius, 6.0);
        assert_eq!(config.interaction.zoom, ZoomLimits::default());
        assert_eq!(config.analysis.fallback_image_size, [1000.0, 1000.0]);
        assert!(config.analysis.preserve_manual_on_reanalysis);
        assert_eq!(config.analysis.detector.program, "python3");
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = EngineConfig::default();
        config.preferences.operator = "alice".to_string();
        config.preferences.log_level = LogLevel::Debug;
        config.analysis.preserve_manual_on_reanalysis = false;

        let json = config.to_json().expect("serialize");
        let loaded = EngineConfig::from_json(&json).expect("parse");

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let json = r#"{"version":1,"interaction":{"min_region_size":8.0},"preferences":{"log_level":"warn"}}"#;
        let config = EngineConfig::from_json(json).expect("parse");

        assert_eq!(config.interaction.min_region_size, 8.0);
        assert_eq!(config.interaction.handle_hit_radius, 6.0);
        assert_eq!(config.preferences.log_level, LogLevel::Warn);
        assert_eq!(config.preferences.operator, "Manual User");
        assert_eq!(config.analysis, AnalysisConfig::default());
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = format!(r#"{{"version":{}}}"#, CONFIG_VERSION + 1);
        assert!(matches!(
            EngineConfig::from_json(&json),
            Err(ConfigError::VersionTooNew { .. })
        ));
    }

    #[test]
    fn test_invalid_zoom_rejected() {
        let json = r#"{"version":1,"interaction":{"zoom":{"min":2.0,"max":1.0,"step":0.5}}}"#;
        assert!(matches!(
            EngineConfig::from_json(json),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::Info.more_verbose(), LogLevel::Debug);
        assert_eq!(LogLevel::Trace.more_verbose(), LogLevel::Trace);
        assert_eq!(LogLevel::all().len(), 5);
    }

    #[test]
    fn test_log_level_from_name() {
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
        for level in LogLevel::all() {
            assert_eq!(level.to_string().parse::<LogLevel>(), Ok(*level));
        }
        let err = "loud".parse::<LogLevel>().unwrap_err();
        assert!(err.contains("Error, Warn, Info, Debug, Trace"));
    }

    #[test]
    fn test_default_path_file_name() {
        if let Some(path) = EngineConfig::default_path() {
            assert!(path.ends_with("thermview/thermview-config.json"));
        }
    }
}
