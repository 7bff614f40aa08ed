//! Configuration loading and types for dotrelay
//!
//! Configuration is loaded in layers:
//! 1. Built-in defaults
//! 2. Config file (~/.config/dotrelay/config.toml)
//! 3. Environment variables (DOTRELAY_*)
//! 4. CLI arguments (highest priority)
//!
//! A missing or corrupt config file falls back to the documented defaults;
//! display settings are a persistence convenience, never a hard requirement.

use crate::segment::{CellWeights, SegmentOptions, Strategy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file content
pub const DEFAULT_CONFIG: &str = r#"# Dotrelay Configuration
#
# Location: ~/.config/dotrelay/config.toml
# All settings can be overridden via CLI flags

[display]
# Display capacity in braille cells (3, 6, 12, 20, ...)
max_cells = 3

# Scroll mode: "manual" (navigate with next/prev) or "auto" (timed advance)
scroll_mode = "manual"

# Chunk boundary strategy: "word", "sentence", or "smart"
# - word: greedy whitespace-word packing
# - sentence: sentence units first, word fallback for long sentences
# - smart: keeps formulas and idiomatic phrases on one chunk where possible
chunk_strategy = "smart"

[device]
# Hardware family: "orbit", "generic", "mock", or "auto"
# "auto" consults DOTRELAY_DEVICE, then defaults to "generic"
type = "auto"

# Generic adapter discovery parameters (defaults are the standard GATT
# Device Information profile used by unbranded displays)
# service_uuid = "0000180a-0000-1000-8000-00805f9b34fb"
# characteristic_uuid = "00002a29-0000-1000-8000-00805f9b34fb"
# name_prefix = "Braille"

[translate]
# Braille translation service endpoint. Omit to use the offline
# placeholder translation only.
# endpoint = "http://localhost:8000/api/braille/convert/"

# Request timeout in milliseconds
timeout_ms = 5000

# Fall back to the offline placeholder translation when the service fails
fallback = true

[playback]
# Auto-advance interval between chunks in milliseconds
interval_ms = 2000
"#;

/// Scroll mode for chunk playback
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScrollMode {
    /// Timed auto-advance through chunks
    Auto,
    /// Navigate with explicit next/prev (default)
    #[default]
    Manual,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub translate: TranslateConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,
}

/// Braille display presentation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Display capacity in cells
    #[serde(default = "default_max_cells")]
    pub max_cells: usize,

    /// Auto vs manual chunk advancement
    #[serde(default)]
    pub scroll_mode: ScrollMode,

    /// Chunk boundary strategy
    #[serde(default)]
    pub chunk_strategy: Strategy,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_cells: default_max_cells(),
            scroll_mode: ScrollMode::default(),
            chunk_strategy: Strategy::default(),
        }
    }
}

impl DisplayConfig {
    /// Segmentation options derived from the display settings
    pub fn segment_options(&self) -> SegmentOptions {
        SegmentOptions {
            max_cells: self.max_cells,
            strategy: self.chunk_strategy,
            weights: CellWeights::default(),
        }
    }
}

/// Device selection and discovery parameters
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Hardware family selecting the concrete adapter
    #[serde(rename = "type", default)]
    pub kind: crate::device::DeviceKind,

    /// GATT service UUID (generic adapter only)
    #[serde(default)]
    pub service_uuid: Option<String>,

    /// Writable GATT characteristic UUID (generic adapter only)
    #[serde(default)]
    pub characteristic_uuid: Option<String>,

    /// Device name prefix used during discovery (generic adapter only)
    #[serde(default)]
    pub name_prefix: Option<String>,
}

/// Translation service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslateConfig {
    /// Service endpoint; None uses the offline placeholder translation only
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_translate_timeout")]
    pub timeout_ms: u64,

    /// Fall back to offline placeholder translation on service failure
    #[serde(default = "default_true")]
    pub fallback: bool,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_translate_timeout(),
            fallback: true,
        }
    }
}

/// Playback controller configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Auto-advance interval in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_max_cells() -> usize {
    3
}

fn default_translate_timeout() -> u64 {
    5000
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "dotrelay")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "dotrelay")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }
}

/// Load configuration from file, with defaults for missing values.
/// A corrupt file logs a warning and falls back to defaults rather than
/// failing; display settings must never block the pipeline.
pub fn load_config(path: Option<&Path>) -> Config {
    let mut config = Config::default();

    let config_path = path.map(PathBuf::from).or_else(Config::default_path);

    if let Some(ref path) = config_path {
        if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            match std::fs::read_to_string(path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(parsed) => config = parsed,
                    Err(e) => {
                        tracing::warn!("Invalid config {:?}, using defaults: {}", path, e)
                    }
                },
                Err(e) => tracing::warn!("Failed to read config {:?}: {}", path, e),
            }
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
        }
    }

    // Override from environment variables
    if let Ok(cells) = std::env::var("DOTRELAY_MAX_CELLS") {
        match cells.parse::<usize>() {
            Ok(n) if n > 0 => config.display.max_cells = n,
            _ => tracing::warn!("Ignoring invalid DOTRELAY_MAX_CELLS={:?}", cells),
        }
    }
    if let Ok(strategy) = std::env::var("DOTRELAY_STRATEGY") {
        match strategy.parse() {
            Ok(s) => config.display.chunk_strategy = s,
            Err(e) => tracing::warn!("Ignoring DOTRELAY_STRATEGY: {}", e),
        }
    }
    if let Ok(endpoint) = std::env::var("DOTRELAY_ENDPOINT") {
        config.translate.endpoint = Some(endpoint);
    }

    config
}

/// Save configuration to file
pub fn save_config(config: &Config, path: &Path) -> crate::error::Result<()> {
    use crate::error::RelayError;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| RelayError::Config(format!("Failed to create config dir: {}", e)))?;
    }

    let contents = toml::to_string_pretty(config)
        .map_err(|e| RelayError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(path, contents)
        .map_err(|e| RelayError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}
